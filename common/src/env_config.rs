use std::{env, sync::Arc, time::Duration};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Holds everything needed to wire the ingestion pipeline at startup:
/// database and cache locations, identity-token validation settings,
/// unlocking-proxy credentials, server binding and logging preferences.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Maximum number of pooled database connections.
    pub db_max_connections: u32,
    /// The URL of Redis server to connect to. `None` selects the in-memory cache.
    pub redis_url: Option<String>,
    /// Settings used to validate bearer tokens from the identity provider.
    pub jwt_config: JwtConfig,
    /// Credentials and targeting for the unlocking proxy.
    pub unlocker: UnlockerConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// File the logger appends to in addition to stdout.
    pub log_file: String,
    /// Overall deadline for one ingestion, cache lookup through cache store.
    pub request_timeout: Duration,
    /// Lifetime of a cached catalog.
    pub cache_ttl: Duration,
    /// Static bearer key for the author-cache push endpoint. Empty disables it.
    pub author_cache_api_key: String,
}

#[derive(Clone, Debug)]
/// Validation settings for identity-provider JWTs (HS256, shared secret).
pub struct JwtConfig {
    /// The secret key used to verify JWTs.
    pub secret: String,
    /// Expected `aud` claim.
    pub audience: String,
}

#[derive(Clone, Debug)]
/// Unlocking proxy settings.
pub struct UnlockerConfig {
    /// Request endpoint of the proxy API.
    pub api_url: String,
    /// Bearer key for the proxy API.
    pub api_key: String,
    /// Proxy zone the requests are billed to.
    pub zone: String,
    /// Country the proxy exits from, matching the storefront's locale.
    pub country: String,
    /// Per-call transport timeout.
    pub timeout: Duration,
}

impl JwtConfig {
    /// Reads `JWT_SECRET` (required) and `JWT_AUDIENCE` (default `authenticated`).
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set.
    pub fn from_env() -> Self {
        JwtConfig {
            secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string()),
        }
    }
}

impl UnlockerConfig {
    /// Reads the `UNLOCKER_*` variables. Only `UNLOCKER_API_KEY` is required.
    ///
    /// # Panics
    ///
    /// Panics if `UNLOCKER_API_KEY` is not set.
    pub fn from_env() -> Self {
        UnlockerConfig {
            api_url: env::var("UNLOCKER_API_URL")
                .unwrap_or_else(|_| "https://api.brightdata.com/request".to_string()),
            api_key: env::var("UNLOCKER_API_KEY").expect("UNLOCKER_API_KEY must be set"),
            zone: env::var("UNLOCKER_ZONE").unwrap_or_else(|_| "arborhouse_unlocker".to_string()),
            country: env::var("UNLOCKER_COUNTRY").unwrap_or_else(|_| "US".to_string()),
            timeout: Duration::from_secs(parse_or("UNLOCKER_TIMEOUT_SECS", 30)),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `ENVIRONMENT`: `development` or `production`
    /// - `DATABASE_URL`: Connection string for the database
    /// - `JWT_SECRET`: Secret used to verify identity tokens
    /// - `UNLOCKER_API_KEY`: Bearer key for the unlocking proxy
    ///
    /// Optional (with defaults):
    /// - `REDIS_URL`: Redis cache (unset: in-memory cache)
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_FILE`: Log file path (default: "asin_gather.log")
    /// - `DB_MAX_CONNECTIONS`: Pool size (default: 10)
    /// - `REQUEST_TIMEOUT_SECS`: Ingestion deadline (default: 60)
    /// - `CACHE_TTL_SECS`: Catalog cache lifetime (default: 86400)
    /// - `AUTHOR_CACHE_API_KEY`: Key for the author-cache push endpoint (default: disabled)
    /// - `JWT_AUDIENCE`, `UNLOCKER_*`: see [`JwtConfig`] and [`UnlockerConfig`]
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            jwt_config: JwtConfig::from_env(),
            unlocker: UnlockerConfig::from_env(),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_or("PORT", 8080),
            num_workers: parse_or("WORKERS", 4),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "asin_gather.log".to_string()),
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 60)),
            cache_ttl: Duration::from_secs(parse_or("CACHE_TTL_SECS", 24 * 60 * 60)),
            author_cache_api_key: env::var("AUTHOR_CACHE_API_KEY").unwrap_or_default(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
