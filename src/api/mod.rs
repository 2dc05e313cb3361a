pub mod employee;
pub mod leave;

use serde::Deserialize;
use utoipa::IntoParams;

/// Query-string paging shared by the list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Pagination page number (starts with 1)
    pub page: Option<u32>,
    /// Items per page (1..=100)
    pub per_page: Option<u32>,
}

impl PageQuery {
    pub fn bounds(&self) -> (u32, u32) {
        page_bounds(self.page, self.per_page)
    }
}

/// `(page, per_page)` with defaults applied and bounds enforced.
pub(crate) fn page_bounds(page: Option<u32>, per_page: Option<u32>) -> (u32, u32) {
    (page.unwrap_or(1).max(1), per_page.unwrap_or(20).clamp(1, 100))
}

/// Cuts one page out of an already ordered listing.
pub(crate) fn slice_page<T>(items: Vec<T>, page: u32, per_page: u32) -> Vec<T> {
    let offset = (page as usize - 1) * per_page as usize;
    items
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_apply_defaults_and_clamp() {
        assert_eq!(PageQuery::default().bounds(), (1, 20));
        let q = PageQuery {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(q.bounds(), (1, 100));
        let q = PageQuery {
            page: Some(3),
            per_page: Some(0),
        };
        assert_eq!(q.bounds(), (3, 1));
    }

    #[test]
    fn slice_page_returns_requested_window() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(slice_page(items.clone(), 1, 3), vec![1, 2, 3]);
        assert_eq!(slice_page(items.clone(), 3, 3), vec![7]);
        assert!(slice_page(items, 4, 3).is_empty());
    }
}
