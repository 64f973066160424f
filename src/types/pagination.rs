use std::collections::HashMap;

use serde::Serialize;

/// Default number of questions on one page.
pub const QUESTIONS_PER_PAGE: usize = 10;

/// A window over a filtered collection, together with the size of that collection.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T: Clone> Page<T> {
    pub fn new(items: &[T], page: usize, page_size: usize, total: usize) -> Self {
        Page {
            items: paginate(items, page, page_size).to_vec(),
            total,
        }
    }
}

/// Reads the 1-based `page` query parameter.
///
/// Anything that is not a positive integer falls back to the first page, so a
/// malformed query string never turns into an error.
pub fn extract_page(params: &HashMap<String, String>) -> usize {
    params
        .get("page")
        .and_then(|page| page.trim().parse::<usize>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

/// Returns the slice of `items` that makes up `page`, clamped to the bounds of `items`.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page
        .saturating_sub(1)
        .saturating_mul(page_size)
        .min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}
