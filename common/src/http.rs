use actix_web::{HttpResponse, Responder, error::JsonPayloadError, web};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Res};

pub struct Success;
impl Success {
    pub fn ok<T: Serialize>(body: T) -> Res<impl Responder> {
        Result::Ok(HttpResponse::Ok().json(body))
    }
}

/// Body shape shared by every non-2xx response.
pub fn error_body(message: &str) -> Value {
    serde_json::json!({ "error": message })
}

/// JSON extractor config that turns malformed bodies into `400 { error }`
/// instead of actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err: JsonPayloadError, _req| {
            let message = match &err {
                JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
                other => format!("Invalid request body: {}", other),
            };
            AppError::BadRequest(message).into()
        })
}
