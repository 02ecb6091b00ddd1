mod catalog_cache;
mod store;

pub use catalog_cache::{CACHE_VERSION, CatalogCache};
pub use store::{KvStore, MemoryStore, RedisStore};
