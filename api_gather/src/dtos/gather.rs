use catalog::Item;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct GatherRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GatherResponse {
    pub products: Vec<Item>,
}

#[derive(Debug, Serialize)]
pub struct UsageSummary {
    pub monthly_usage: i32,
}

#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub name: String,
    pub description: Option<String>,
    pub max_usage: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub usage: UsageSummary,
    pub max_usage: Option<i32>,
    pub plan: Option<PlanSummary>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DownloadSummary {
    pub id: i64,
    pub author: String,
    pub book_count: usize,
    pub created_at: DateTime<Utc>,
    pub products: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct DownloadsPage {
    pub page: i64,
    pub per_page: i64,
    pub downloads: Vec<DownloadSummary>,
}
