//! Storefront catalog ingestion: markup extraction, identifier backfill and
//! deduplication of the items published under one author storefront.

pub mod dedup;
pub mod extract;
pub mod gapfill;
pub mod ingest;
pub mod models;
mod payload;
pub mod storefront;

pub use ingest::ingest_storefront;
pub use models::{Catalog, Item, NOT_AVAILABLE, Price};
pub use storefront::Storefront;
