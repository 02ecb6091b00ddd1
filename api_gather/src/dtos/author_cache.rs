use catalog::Item;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AuthorCacheRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub products: Vec<Item>,
}

#[derive(Debug, Serialize)]
pub struct AuthorCacheResponse {
    pub message: String,
    pub author: String,
    pub book_count: usize,
}
