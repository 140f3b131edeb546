//! Optional paging for list endpoints

use serde::Deserialize;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: usize = 100;

/// `?page=&limit=` query parameters; pages are 1-based
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl PageParams {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Slice `items` to the requested page; without a limit nothing is cut
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let Some(limit) = self.limit else {
            return items;
        };
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let page = self.page.unwrap_or(1).max(1);

        items
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect()
    }
}
