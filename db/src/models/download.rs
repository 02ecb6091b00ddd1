use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct DownloadSnapshot {
    pub id: i64,
    pub user_id: Uuid,
    pub user_plan_id: i64,
    pub data: JsonValue,
    pub created_at: DateTime<Utc>,
}
