use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};

use crate::{
    dtos::download::{DownloadCreateRequest, DownloadFilter},
    models::download::DownloadSnapshot,
};

pub async fn insert_download<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: DownloadCreateRequest,
) -> Res<()> {
    sqlx::query("INSERT INTO downloads (user_id, user_plan_id, data) VALUES ($1, $2, $3)")
        .bind(data.user_id)
        .bind(data.user_plan_id)
        .bind(data.data)
        .execute(executor)
        .await
        .map_err(AppError::from)?;
    Ok(())
}

pub async fn get_downloads<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: DownloadFilter,
) -> Res<Vec<DownloadSnapshot>> {
    sqlx::query_as::<_, DownloadSnapshot>(
        r#"
        SELECT id, user_id, user_plan_id, data, created_at
        FROM downloads
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(filter.user_id)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}
