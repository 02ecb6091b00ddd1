use std::sync::Arc;

use cache::CatalogCache;
use catalog::{Catalog, Item, Storefront};
use common::error::{AppError, Res};
use db::{BookStore, dtos::book::BookUpsertRequest};

use crate::dtos::author_cache::{AuthorCacheRequest, AuthorCacheResponse};

/// Constant-time comparison of the presented bearer key with the configured one.
/// Lengths are compared first since the key length is not secret; the fold then
/// touches every byte so timing does not reveal the first mismatch.
pub fn key_matches(presented: Option<&str>, expected: &str) -> bool {
    let Some(presented) = presented else {
        return false;
    };
    if expected.is_empty() || presented.len() != expected.len() {
        return false;
    }
    presented
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn to_book(item: &Item) -> BookUpsertRequest {
    BookUpsertRequest {
        asin: item.asin.clone(),
        author: item.author.clone(),
        rating: item.rating.clone(),
        item_type: item.item_type.clone(),
        title: item.title.clone(),
        url: item.url.clone(),
        price: item.price.as_amount(),
    }
}

/// Seeds the cache for an author and stores every book. Unlike the gather
/// path, cache write failures are reported to the caller.
pub async fn store_author(
    cache: &CatalogCache,
    books: &Arc<dyn BookStore>,
    request: AuthorCacheRequest,
) -> Res<AuthorCacheResponse> {
    if request.products.is_empty() {
        return Err(AppError::BadRequest("No products data provided".to_string()));
    }
    let url = request
        .url
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("URL is required".to_string()))?;
    let storefront = Storefront::parse(url)?;

    let author = request.products[0].author.clone();
    let rows: Vec<BookUpsertRequest> = request.products.iter().map(to_book).collect();
    let catalog = Catalog::new(storefront.url.clone(), request.products);

    cache.set(&storefront.cache_key(), &catalog).await?;
    let written = books.upsert_books(&rows).await?;
    log::info!(
        "Cached {} items for {} and stored {} books",
        catalog.products.len(),
        storefront.cache_key(),
        written
    );

    Ok(AuthorCacheResponse {
        message: "Author data cached and books stored successfully".to_string(),
        author,
        book_count: catalog.products.len(),
    })
}
