use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::Res;
use sqlx::{PgPool, types::JsonValue};
use uuid::Uuid;

use crate::{
    dtos::{
        book::BookUpsertRequest,
        download::{DownloadCreateRequest, DownloadFilter},
    },
    models::{download::DownloadSnapshot, subscription::ActiveSubscription},
};

/// Subscription bookkeeping the ingestion pipeline reads and meters against.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn active_subscription(&self, user_id: Uuid) -> Res<Option<ActiveSubscription>>;

    /// Returns the new monthly counter if a reset happened.
    async fn reset_monthly_usage(
        &self,
        subscription_id: i64,
        period_start: DateTime<Utc>,
    ) -> Res<Option<i32>>;

    /// Appends a usage record and bumps the running counters in one unit.
    /// Returns the monthly counter after the increment, or `None` without
    /// writing anything when the plan's ceiling is already reached.
    async fn record_usage(&self, subscription_id: i64, amount: i32) -> Res<Option<i32>>;

    async fn insert_download(
        &self,
        user_id: Uuid,
        subscription_id: i64,
        data: JsonValue,
    ) -> Res<()>;

    async fn list_downloads(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Res<Vec<DownloadSnapshot>>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Returns the number of rows written.
    async fn upsert_books(&self, books: &[BookUpsertRequest]) -> Res<usize>;
}

/// Postgres-backed implementation of both stores.
#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn active_subscription(&self, user_id: Uuid) -> Res<Option<ActiveSubscription>> {
        crate::subscription::get_active_subscription(&*self.pool, user_id).await
    }

    async fn reset_monthly_usage(
        &self,
        subscription_id: i64,
        period_start: DateTime<Utc>,
    ) -> Res<Option<i32>> {
        crate::subscription::reset_monthly_usage(&*self.pool, subscription_id, period_start).await
    }

    async fn record_usage(&self, subscription_id: i64, amount: i32) -> Res<Option<i32>> {
        let mut tx = self.pool.begin().await?;

        let Some(monthly_usage) =
            crate::subscription::increment_usage(&mut *tx, subscription_id, amount).await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };
        crate::subscription::insert_usage(&mut *tx, subscription_id, amount).await?;

        tx.commit().await?;
        Ok(Some(monthly_usage))
    }

    async fn insert_download(
        &self,
        user_id: Uuid,
        subscription_id: i64,
        data: JsonValue,
    ) -> Res<()> {
        crate::download::insert_download(
            &*self.pool,
            DownloadCreateRequest {
                user_id,
                user_plan_id: subscription_id,
                data,
            },
        )
        .await
    }

    async fn list_downloads(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Res<Vec<DownloadSnapshot>> {
        crate::download::get_downloads(
            &*self.pool,
            DownloadFilter {
                user_id,
                limit,
                offset,
            },
        )
        .await
    }
}

#[async_trait]
impl BookStore for PgStore {
    async fn upsert_books(&self, books: &[BookUpsertRequest]) -> Res<usize> {
        let mut tx = self.pool.begin().await?;
        for book in books {
            crate::book::upsert_book(&mut *tx, book).await?;
        }
        tx.commit().await?;
        Ok(books.len())
    }
}
