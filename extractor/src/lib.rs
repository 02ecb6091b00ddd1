use common::env_config::JwtConfig;
use middleware::{auth::AuthMiddleware, extractor::ExtractionMiddleware};

pub mod middleware {
    pub mod auth;
    pub mod extractor;
}

/// Decodes bearer tokens into request extensions. Never rejects.
pub fn middleware(jwt_config: JwtConfig) -> ExtractionMiddleware {
    ExtractionMiddleware::new(jwt_config)
}

/// Rejects requests without valid claims. Wrap inside [`middleware`].
pub fn auth_middleware() -> AuthMiddleware {
    AuthMiddleware::new()
}
