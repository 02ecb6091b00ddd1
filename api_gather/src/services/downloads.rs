use std::sync::Arc;

use common::error::{AppError, Res};
use db::{SubscriptionStore, models::download::DownloadSnapshot};
use serde_json::Value;
use uuid::Uuid;

use crate::dtos::gather::{DownloadSummary, DownloadsPage, DownloadsQuery};

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;
const UNKNOWN_AUTHOR: &str = "Unknown Author";

pub async fn list_downloads(
    store: &Arc<dyn SubscriptionStore>,
    user_id: Uuid,
    query: DownloadsQuery,
) -> Res<DownloadsPage> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or_else(|| AppError::BadRequest(format!("Page {} is out of range", page)))?;

    let snapshots = store.list_downloads(user_id, per_page, offset).await?;

    Ok(DownloadsPage {
        page,
        per_page,
        downloads: snapshots.into_iter().map(summarize).collect(),
    })
}

/// Older snapshots stored the bare item list; newer ones the whole catalog.
fn summarize(snapshot: DownloadSnapshot) -> DownloadSummary {
    let products = match snapshot.data {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("products") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let author = products
        .first()
        .and_then(|item| item.get("author"))
        .and_then(Value::as_str)
        .filter(|author| !author.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string();

    DownloadSummary {
        id: snapshot.id,
        author,
        book_count: products.len(),
        created_at: snapshot.created_at,
        products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn snapshot(data: Value) -> DownloadSnapshot {
        DownloadSnapshot {
            id: 1,
            user_id: Uuid::new_v4(),
            user_plan_id: 2,
            data,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn catalog_snapshots_are_summarized() {
        let summary = summarize(snapshot(json!({
            "url": "https://site.example/stores/author/A1",
            "products": [{ "asin": "B01", "author": "Jane" }, { "asin": "B02", "author": "Jane" }],
            "created_at": "2025-01-01T00:00:00Z"
        })));
        assert_eq!(summary.author, "Jane");
        assert_eq!(summary.book_count, 2);
    }

    #[test]
    fn bare_list_snapshots_are_summarized() {
        let summary = summarize(snapshot(json!([{ "asin": "B01", "author": "Sam" }])));
        assert_eq!(summary.author, "Sam");
        assert_eq!(summary.book_count, 1);
    }

    #[test]
    fn empty_snapshots_have_unknown_author() {
        let summary = summarize(snapshot(json!({ "products": [] })));
        assert_eq!(summary.author, "Unknown Author");
        assert_eq!(summary.book_count, 0);
        assert_eq!(summarize(snapshot(Value::Null)).author, "Unknown Author");
    }
}
