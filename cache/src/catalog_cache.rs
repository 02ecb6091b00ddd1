use std::{sync::Arc, time::Duration};

use catalog::{Catalog, Item};
use chrono::{DateTime, Utc};
use common::error::Res;
use serde::Serialize;
use serde_json::Value;

use crate::store::KvStore;

/// Version tag written with every entry.
pub const CACHE_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a> {
    version: u32,
    url: &'a str,
    products: &'a [Item],
    created_at: DateTime<Utc>,
}

/// Author-keyed catalog cache on top of any [`KvStore`].
#[derive(Clone)]
pub struct CatalogCache {
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

impl CatalogCache {
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        CatalogCache { store, ttl }
    }

    /// Cached catalog for `key`. Entries written by older ingestion versions
    /// are normalized; `url` fills in what those entries did not record.
    pub async fn get(&self, key: &str, url: &str) -> Res<Option<Catalog>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };

        let catalog = decode(&raw, url);
        if catalog.is_none() {
            log::warn!("Ignoring unrecognized cache entry under {}", key);
        }
        Ok(catalog)
    }

    pub async fn set(&self, key: &str, catalog: &Catalog) -> Res<()> {
        let envelope = Envelope {
            version: CACHE_VERSION,
            url: &catalog.url,
            products: &catalog.products,
            created_at: catalog.created_at,
        };
        let payload = serde_json::to_string(&envelope)?;
        self.store.set_ex(key, &payload, self.ttl).await
    }
}

/// Accepts a bare item list, a JSON string holding either shape, or an
/// object with a `products` list.
fn decode(raw: &str, url: &str) -> Option<Catalog> {
    let mut value: Value = serde_json::from_str(raw).ok()?;
    if let Value::String(inner) = &value {
        value = serde_json::from_str(inner).ok()?;
    }

    match value {
        Value::Array(entries) => Some(Catalog::new(url, items(entries))),
        Value::Object(mut object) => {
            let Some(Value::Array(entries)) = object.remove("products") else {
                return None;
            };
            let url = object
                .get("url")
                .and_then(Value::as_str)
                .filter(|u| !u.is_empty())
                .unwrap_or(url);
            let mut catalog = Catalog::new(url, items(entries));
            if let Some(created_at) = object
                .get("created_at")
                .and_then(Value::as_str)
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            {
                catalog.created_at = created_at.with_timezone(&Utc);
            }
            Some(catalog)
        }
        _ => None,
    }
}

fn items(entries: Vec<Value>) -> Vec<Item> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Item>(entry) {
            Ok(item) if !item.asin.is_empty() => Some(item),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Dropping unreadable cached item: {}", e);
                None
            }
        })
        .collect()
}
