use std::sync::Arc;

use actix_web::{HttpRequest, Responder, http::header, web};
use common::{
    error::{AppError, Res},
    http::Success,
};
use db::BookStore;

use crate::{
    AuthorCacheKey,
    dtos::author_cache::AuthorCacheRequest,
    services::{self, gather::Pipeline},
};

/// Pushes an already-gathered author catalog into the cache and the `books` table.
pub async fn post_author_cache(
    http_req: HttpRequest,
    key: web::Data<AuthorCacheKey>,
    pipeline: web::Data<Pipeline>,
    books: web::Data<Arc<dyn BookStore>>,
    body: web::Bytes,
) -> Res<impl Responder> {
    let presented = http_req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if !services::author_cache::key_matches(presented, &key.0) {
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
    }

    // parsed only after the key check
    let req: AuthorCacheRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?;

    let response = services::author_cache::store_author(pipeline.cache(), &books, req).await?;
    Success::ok(response)
}
