/// Row written by the author-cache push. `price` is `None` for the "N/A" sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct BookUpsertRequest {
    pub asin: String,
    pub author: String,
    pub rating: String,
    pub item_type: String,
    pub title: String,
    pub url: String,
    pub price: Option<f64>,
}
