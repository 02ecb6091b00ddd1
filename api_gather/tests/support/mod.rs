//! Shared fixtures: in-memory stores, a mock proxy and a wired test app.

#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use actix_web::web;
use api_gather::Pipeline;
use async_trait::async_trait;
use cache::{CatalogCache, MemoryStore};
use chrono::{DateTime, Utc};
use common::{
    env_config::{JwtConfig, UnlockerConfig},
    error::Res,
    jwt::issue_jwt,
};
use db::{
    BookStore, SubscriptionStore,
    dtos::book::BookUpsertRequest,
    models::{download::DownloadSnapshot, subscription::ActiveSubscription},
};
use limiter::QuotaGuard;
use serde_json::{Value, json};
use unlocker::UnlockerClient;
use uuid::Uuid;
use wiremock::MockServer;

pub const STOREFRONT: &str = "https://site.example/stores/author/A123/allbooks?ref=xyz";
pub const PUSH_KEY: &str = "push-key";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        audience: "authenticated".to_string(),
    }
}

pub fn bearer(user_id: Uuid) -> (&'static str, String) {
    let token = issue_jwt(user_id, chrono::Duration::minutes(5), &jwt_config()).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

#[derive(Default)]
pub struct FakeStore {
    pub subscription: Mutex<Option<ActiveSubscription>>,
    pub downloads: Mutex<Vec<DownloadSnapshot>>,
    pub books: Mutex<Vec<BookUpsertRequest>>,
}

impl FakeStore {
    pub fn with_plan(user_id: Uuid, monthly_usage: i32, max_usage: Option<i32>) -> Arc<Self> {
        Arc::new(FakeStore {
            subscription: Mutex::new(Some(ActiveSubscription {
                subscription_id: 1,
                user_id,
                plan_id: 1,
                plan_name: "Starter".to_string(),
                plan_description: Some("Starter plan".to_string()),
                max_usage,
                monthly_usage,
                total_usage: monthly_usage,
                start_date: Utc::now(),
                last_reset: Utc::now(),
                last_usage: None,
                billing_customer_id: None,
                cancellation_date: None,
            })),
            ..FakeStore::default()
        })
    }

    pub fn monthly_usage(&self) -> i32 {
        self.subscription
            .lock()
            .unwrap()
            .as_ref()
            .map_or(0, |s| s.monthly_usage)
    }
}

#[async_trait]
impl SubscriptionStore for FakeStore {
    async fn active_subscription(&self, user_id: Uuid) -> Res<Option<ActiveSubscription>> {
        Ok(self
            .subscription
            .lock()
            .unwrap()
            .clone()
            .filter(|s| s.user_id == user_id))
    }

    async fn reset_monthly_usage(&self, _id: i64, _period: DateTime<Utc>) -> Res<Option<i32>> {
        Ok(None)
    }

    async fn record_usage(&self, _id: i64, amount: i32) -> Res<Option<i32>> {
        let mut guard = self.subscription.lock().unwrap();
        let s = guard.as_mut().unwrap();
        if s.max_usage.is_some_and(|max| s.monthly_usage + amount > max) {
            return Ok(None);
        }
        s.monthly_usage += amount;
        Ok(Some(s.monthly_usage))
    }

    async fn insert_download(&self, user_id: Uuid, id: i64, data: Value) -> Res<()> {
        let mut downloads = self.downloads.lock().unwrap();
        let next_id = downloads.len() as i64 + 1;
        downloads.push(DownloadSnapshot {
            id: next_id,
            user_id,
            user_plan_id: id,
            data,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_downloads(&self, user_id: Uuid, limit: i64, offset: i64) -> Res<Vec<DownloadSnapshot>> {
        let downloads = self.downloads.lock().unwrap();
        Ok(downloads
            .iter()
            .rev()
            .filter(|d| d.user_id == user_id)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookStore for FakeStore {
    async fn upsert_books(&self, books: &[BookUpsertRequest]) -> Res<usize> {
        self.books.lock().unwrap().extend_from_slice(books);
        Ok(books.len())
    }
}

pub fn unlocker(server: &MockServer) -> UnlockerClient {
    UnlockerClient::new(UnlockerConfig {
        api_url: format!("{}/request", server.uri()),
        api_key: "proxy-key".to_string(),
        zone: "test_zone".to_string(),
        country: "US".to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

/// A page rendering `rendered` and listing `listed`, with a request-context script.
pub fn storefront_html(rendered: &[&str], listed: &[&str]) -> String {
    let products: Vec<Value> = rendered
        .iter()
        .map(|asin| {
            json!({
                "asin": asin,
                "title": { "displayString": format!("Book {}", asin) },
                "byLine": { "contributors": [{ "name": "Jane Doe" }] },
                "detailPageLinkURL": format!("/dp/{}", asin)
            })
        })
        .collect();
    format!(
        "<html><body><script>var config = {};</script><script>var config = {};</script></body></html>",
        json!({ "content": { "products": products, "ASINList": listed } }),
        json!({ "requestContext": { "sessionId": "SID", "appendedParameters": { "visitId": "V" } } }),
    )
}

/// Everything a test app is wired from; clones of the `web::Data` handles
/// share state with the running service.
pub struct TestState {
    pub store: Arc<FakeStore>,
    pub cache: CatalogCache,
    pub pipeline: web::Data<Pipeline>,
    pub subscriptions: web::Data<Arc<dyn SubscriptionStore>>,
    pub books: web::Data<Arc<dyn BookStore>>,
}

pub fn state(server: &MockServer, store: Arc<FakeStore>, deadline: Duration) -> TestState {
    let cache = CatalogCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(60));
    let subscriptions: Arc<dyn SubscriptionStore> = store.clone();
    let books: Arc<dyn BookStore> = store.clone();
    let pipeline = Pipeline::new(
        QuotaGuard::new(subscriptions.clone()),
        cache.clone(),
        unlocker(server),
        deadline,
    );

    TestState {
        store,
        cache,
        pipeline: web::Data::new(pipeline),
        subscriptions: web::Data::new(subscriptions),
        books: web::Data::new(books),
    }
}

/// Builds the service the way `main` mounts it.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(common::http::json_config())
                .app_data($state.pipeline.clone())
                .app_data($state.subscriptions.clone())
                .app_data($state.books.clone())
                .app_data(actix_web::web::Data::new(api_gather::AuthorCacheKey(
                    support::PUSH_KEY.to_string(),
                )))
                .wrap(extractor::middleware(support::jwt_config()))
                .service(
                    actix_web::web::scope("/api/v1")
                        .service(api_gather::mount_author_cache())
                        .service(api_gather::mount_gather().wrap(extractor::auth_middleware())),
                ),
        )
    };
}
