use std::collections::HashSet;

use crate::models::Item;

/// Keeps the first occurrence of every `asin`, preserving input order.
pub fn dedup_by_asin(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.asin.clone()))
        .collect()
}
