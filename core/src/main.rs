mod cors;
mod redis;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use api_gather::{AuthorCacheKey, Pipeline};
use cache::{CatalogCache, KvStore, MemoryStore, RedisStore};
use common::env_config::Config;
use db::{BookStore, PgStore, SubscriptionStore};
use limiter::QuotaGuard;
use unlocker::UnlockerClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // init logger
    logger::setup(&config.log_file, config.console_logging_enabled)
        .expect("Failed to set up logger");

    // init db connection
    let pool = db::setup(
        &config.database_url,
        config.is_production(),
        config.db_max_connections,
    )
    .await
    .expect("Failed to set up database");
    let pg_store = PgStore::new(pool);
    let subscriptions: Arc<dyn SubscriptionStore> = Arc::new(pg_store.clone());
    let books: Arc<dyn BookStore> = Arc::new(pg_store);

    // init cache backend
    let kv_store: Arc<dyn KvStore> = match &config.redis_url {
        Some(url) => {
            let pool = redis::setup_redis(url).expect("Failed to create pool of Redis connections");
            log::info!("Catalog cache backed by Redis");
            Arc::new(RedisStore::new(pool))
        }
        None => {
            log::warn!("REDIS_URL not set, catalog cache is process-local");
            Arc::new(MemoryStore::new())
        }
    };
    let catalog_cache = CatalogCache::new(kv_store, config.cache_ttl);

    // init proxy client
    let unlocker =
        UnlockerClient::new(config.unlocker.clone()).expect("Failed to build unlocker client");

    let pipeline = web::Data::new(Pipeline::new(
        QuotaGuard::new(subscriptions.clone()),
        catalog_cache,
        unlocker,
        config.request_timeout,
    ));
    let subscriptions = web::Data::new(subscriptions);
    let books = web::Data::new(books);
    let author_cache_key = web::Data::new(AuthorCacheKey(config.author_cache_api_key.clone()));
    if config.author_cache_api_key.is_empty() {
        log::warn!("AUTHOR_CACHE_API_KEY not set, author-cache push is disabled");
    }

    log::info!(
        "Starting server on {}:{} with {} workers",
        config.server_host,
        config.server_port,
        config.num_workers
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config_data.clone()))
            .app_data(common::http::json_config())
            .app_data(pipeline.clone())
            .app_data(subscriptions.clone())
            .app_data(books.clone())
            .app_data(author_cache_key.clone())
            .wrap(logger::middleware()) // 3rd
            .wrap(extractor::middleware(config_data.jwt_config.clone())) // 2nd
            .wrap(cors::middleware()) // 1st
            .service(
                web::scope("/api/v1")
                    .service(api_gather::mount_author_cache())
                    .service(api_gather::mount_gather().wrap(extractor::auth_middleware())),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
