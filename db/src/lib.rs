use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use std::{str::FromStr, sync::Arc, time::Duration};

pub mod book;
pub mod download;
pub mod store;
pub mod subscription;

pub use store::{BookStore, PgStore, SubscriptionStore};

pub mod models {
    pub mod download;
    pub mod subscription;
}

pub mod dtos {
    pub mod book;
    pub mod download;
}

/// Connects to Postgres and brings the schema up to date.
///
/// The relational store is owned by the billing side; the embedded
/// migrations only create the tables this service touches when missing.
pub async fn setup(
    database_url: &str,
    require_ssl: bool,
    max_connections: u32,
) -> Result<Arc<PgPool>, Box<dyn std::error::Error>> {
    let mut options = PgConnectOptions::from_str(database_url)?;
    if require_ssl {
        options = options.ssl_mode(PgSslMode::Require);
    }

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Database ready ({} max connections)", max_connections);

    Ok(Arc::new(pool))
}
