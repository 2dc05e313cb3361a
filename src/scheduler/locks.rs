use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per employee, serializing check-then-write sequences.
///
/// Operations on different employees never contend.
#[derive(Default)]
pub struct EmployeeLocks {
    locks: DashMap<u64, Arc<Mutex<()>>>,
}

/// Guards held for the duration of one scheduler operation.
pub struct EmployeeGuards {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl EmployeeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, employee_id: u64) -> Arc<Mutex<()>> {
        // clone the Arc out so the shard lock is released before awaiting
        self.locks.entry(employee_id).or_default().clone()
    }

    /// Locks every given employee, always in ascending id order.
    pub async fn acquire(&self, employee_ids: &[u64]) -> EmployeeGuards {
        let mut ids = employee_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.lock_for(id).lock_owned().await);
        }
        EmployeeGuards { _guards: guards }
    }

    /// Drops the mutex of a removed employee if nobody is holding it.
    pub fn forget(&self, employee_id: u64) {
        self.locks
            .remove_if(&employee_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[actix_web::test]
    async fn same_employee_is_exclusive() {
        let locks = EmployeeLocks::new();
        let held = locks.acquire(&[7]).await;

        let second = tokio::time::timeout(Duration::from_millis(20), locks.acquire(&[7])).await;
        assert!(second.is_err(), "second acquire should wait");

        drop(held);
        let third = tokio::time::timeout(Duration::from_millis(20), locks.acquire(&[7])).await;
        assert!(third.is_ok());
    }

    #[actix_web::test]
    async fn different_employees_do_not_contend() {
        let locks = EmployeeLocks::new();
        let _a = locks.acquire(&[1]).await;
        let b = tokio::time::timeout(Duration::from_millis(20), locks.acquire(&[2])).await;
        assert!(b.is_ok());
    }

    #[actix_web::test]
    async fn duplicate_ids_lock_once() {
        let locks = EmployeeLocks::new();
        let guards = locks.acquire(&[3, 3, 1]).await;
        assert_eq!(guards._guards.len(), 2);
    }

    #[actix_web::test]
    async fn forget_keeps_held_locks() {
        let locks = EmployeeLocks::new();
        let held = locks.acquire(&[5]).await;
        locks.forget(5);
        assert!(locks.locks.contains_key(&5));

        drop(held);
        locks.forget(5);
        assert!(!locks.locks.contains_key(&5));
    }
}
