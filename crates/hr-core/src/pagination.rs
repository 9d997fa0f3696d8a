//! Pagination types for list responses

use serde::{Deserialize, Serialize};

/// Pagination parameters (from query string)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    #[serde(default)]
    pub offset: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    50
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: 0,
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    pub fn new(offset: usize, page_size: usize) -> Self {
        Self {
            offset,
            page_size: page_size.clamp(1, 1000),
        }
    }

    pub fn limit(&self) -> usize {
        self.page_size.clamp(1, 1000)
    }
}

/// Collection envelope returned by list endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection<T> {
    #[serde(rename = "_type")]
    pub kind: &'static str,
    pub total: usize,
    pub count: usize,
    pub page_size: usize,
    pub offset: usize,
    #[serde(rename = "_embedded")]
    pub embedded: Embedded<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embedded<T> {
    pub elements: Vec<T>,
}

impl<T> Collection<T> {
    /// Slice an already-loaded list into one page
    pub fn paginate(items: Vec<T>, params: &PaginationParams) -> Self {
        let total = items.len();
        let page_size = params.limit();
        let elements: Vec<T> = items
            .into_iter()
            .skip(params.offset)
            .take(page_size)
            .collect();

        Self {
            kind: "Collection",
            total,
            count: elements.len(),
            page_size,
            offset: params.offset,
            embedded: Embedded { elements },
        }
    }

    pub fn elements(&self) -> &[T] {
        &self.embedded.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_slices_items() {
        let items: Vec<u32> = (1..=12).collect();
        let page = Collection::paginate(items, &PaginationParams::new(10, 5));

        assert_eq!(page.total, 12);
        assert_eq!(page.count, 2);
        assert_eq!(page.elements(), &[11, 12]);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let params = PaginationParams::new(0, 0);
        assert_eq!(params.limit(), 1);
    }
}
