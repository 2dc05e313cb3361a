use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

const NAME_CACHE_CAPACITY: u64 = 10_000;

/// Display name -> employee id, guarded by a write generation.
///
/// A lookup takes a ticket before it reads the database. If any employee
/// write bumps the generation before the lookup stores its answer, the
/// answer may predate the write and is dropped.
pub struct NameCache {
    names: Cache<String, u64>,
    generation: AtomicU64,
}

/// Generation observed before a database read.
#[derive(Debug, Clone, Copy)]
pub struct Ticket(u64);

impl NameCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            names: Cache::builder()
                .max_capacity(NAME_CACHE_CAPACITY)
                .time_to_live(ttl)
                .build(),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, name: &str) -> Option<u64> {
        self.names.get(name).await
    }

    pub fn ticket(&self) -> Ticket {
        Ticket(self.generation.load(Ordering::SeqCst))
    }

    /// Caches `name -> id` unless a write happened since `ticket` was taken.
    pub async fn store(&self, ticket: Ticket, name: &str, id: u64) {
        if self.ticket().0 != ticket.0 {
            return;
        }
        self.names.insert(name.to_string(), id).await;

        // a write that landed between the check and the insert
        if self.ticket().0 != ticket.0 {
            self.names.invalidate(name).await;
        }
    }

    /// Call after every committed employee write.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.names.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> NameCache {
        NameCache::new(Duration::from_secs(60))
    }

    #[actix_web::test]
    async fn stores_answer_when_no_write_intervened() {
        let cache = cache();
        let ticket = cache.ticket();
        cache.store(ticket, "Ada Lovelace", 3).await;
        assert_eq!(cache.get("Ada Lovelace").await, Some(3));
    }

    #[actix_web::test]
    async fn drops_answer_read_before_a_rename() {
        let cache = cache();
        // lookup reads "Ada Lovelace" -> 3, then the employee is renamed
        let ticket = cache.ticket();
        cache.clear();
        cache.store(ticket, "Ada Lovelace", 3).await;
        assert_eq!(cache.get("Ada Lovelace").await, None);

        // a lookup started after the write caches normally
        let ticket = cache.ticket();
        cache.store(ticket, "Augusta King", 3).await;
        assert_eq!(cache.get("Augusta King").await, Some(3));
    }

    #[actix_web::test]
    async fn clear_evicts_cached_names() {
        let cache = cache();
        cache.store(cache.ticket(), "Ada Lovelace", 3).await;
        cache.clear();
        assert_eq!(cache.get("Ada Lovelace").await, None);
    }
}
