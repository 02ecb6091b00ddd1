use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Active `user_plans` row joined with its plan.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ActiveSubscription {
    pub subscription_id: i64,
    pub user_id: Uuid,
    pub plan_id: i64,
    pub plan_name: String,
    pub plan_description: Option<String>,
    pub max_usage: Option<i32>,
    pub monthly_usage: i32,
    pub total_usage: i32,
    pub start_date: DateTime<Utc>,
    pub last_reset: DateTime<Utc>,
    pub last_usage: Option<DateTime<Utc>>,
    pub billing_customer_id: Option<String>,
    pub cancellation_date: Option<DateTime<Utc>>,
}
