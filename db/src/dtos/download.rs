use sqlx::types::JsonValue;
use uuid::Uuid;

pub struct DownloadCreateRequest {
    pub user_id: Uuid,
    pub user_plan_id: i64,
    pub data: JsonValue,
}

pub struct DownloadFilter {
    pub user_id: Uuid,
    pub limit: i64,
    pub offset: i64,
}
