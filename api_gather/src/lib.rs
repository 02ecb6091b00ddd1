use actix_web::web;

pub use services::gather::Pipeline;

pub mod routes {
    pub mod author_cache;
    pub mod gather;
}

pub mod services {
    pub mod author_cache;
    pub mod downloads;
    pub mod gather;
}

pub mod dtos {
    pub mod author_cache;
    pub mod gather;
}

/// Static bearer key accepted by the author-cache push. Empty disables the push.
#[derive(Clone)]
pub struct AuthorCacheKey(pub String);

/// User-facing gather endpoints. Expects claims from `extractor::auth_middleware`.
pub fn mount_gather() -> actix_web::Scope {
    web::scope("/asin-gather")
        .route("", web::post().to(routes::gather::post_gather))
        .service(routes::gather::get_plan)
        .service(routes::gather::get_downloads)
}

/// Server-to-server cache push, authenticated by [`AuthorCacheKey`].
pub fn mount_author_cache() -> actix_web::Scope {
    web::scope("/author-cache")
        .route("", web::post().to(routes::author_cache::post_author_cache))
}
