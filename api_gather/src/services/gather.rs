use std::time::Duration;

use cache::CatalogCache;
use catalog::{Catalog, Storefront, ingest_storefront};
use common::error::{AppError, Res};
use db::models::subscription::ActiveSubscription;
use limiter::QuotaGuard;
use unlocker::UnlockerClient;
use uuid::Uuid;

/// One gather request end to end: quota gate, cache or fresh ingestion,
/// then metering. Shared across workers through `web::Data`.
pub struct Pipeline {
    quota: QuotaGuard,
    cache: CatalogCache,
    unlocker: UnlockerClient,
    deadline: Duration,
}

impl Pipeline {
    pub fn new(
        quota: QuotaGuard,
        cache: CatalogCache,
        unlocker: UnlockerClient,
        deadline: Duration,
    ) -> Self {
        Pipeline {
            quota,
            cache,
            unlocker,
            deadline,
        }
    }

    pub fn quota(&self) -> &QuotaGuard {
        &self.quota
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    pub async fn gather(&self, user_id: Uuid, url: Option<&str>) -> Res<Catalog> {
        let subscription = self.quota.check(user_id).await?;
        log::debug!("User {} passed quota check", user_id);

        let url = url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::BadRequest("URL is required".to_string()))?;
        let storefront = Storefront::parse(url)?;

        let catalog = tokio::time::timeout(self.deadline, self.lookup_or_ingest(&storefront))
            .await
            .map_err(|_| {
                log::warn!(
                    "Gather for {} exceeded {}s deadline",
                    storefront.url,
                    self.deadline.as_secs()
                );
                AppError::Timeout(format!(
                    "Request too large or too slow: no result within {}s",
                    self.deadline.as_secs()
                ))
            })??;

        self.record(&subscription, &catalog).await;
        Ok(catalog)
    }

    async fn lookup_or_ingest(&self, storefront: &Storefront) -> Res<Catalog> {
        let key = storefront.cache_key();

        if let Some(catalog) = self.cache.get(&key, &storefront.url).await? {
            log::debug!("Cache hit for {} ({} items)", key, catalog.products.len());
            return Ok(catalog);
        }
        log::debug!("Cache miss for {}, ingesting {}", key, storefront.url);

        let catalog = ingest_storefront(&self.unlocker, storefront).await?;
        log::debug!("Ingested {} unique items for {}", catalog.products.len(), key);

        if let Err(e) = self.cache.set(&key, &catalog).await {
            log::error!("Failed to cache catalog under {}: {}", key, e);
        }
        Ok(catalog)
    }

    async fn record(&self, subscription: &ActiveSubscription, catalog: &Catalog) {
        log::debug!("Recording usage for subscription {}", subscription.subscription_id);
        self.quota.record(subscription, catalog).await;
    }
}
