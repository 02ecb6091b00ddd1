//! Raw storefront product records and their mapping onto [`Item`].

use serde::Deserialize;
use serde_json::Value;

use crate::models::{Item, NOT_AVAILABLE, Price};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawProduct {
    asin: Option<String>,
    by_line: Option<ByLine>,
    customer_reviews_summary: Option<ReviewsSummary>,
    product_category: Option<ProductCategory>,
    title: Option<DisplayString>,
    #[serde(rename = "detailPageLinkURL")]
    detail_page_link_url: Option<String>,
    buying_options: Option<Vec<BuyingOption>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ByLine {
    contributors: Option<Vec<Contributor>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Contributor {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReviewsSummary {
    rating: Option<Rating>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Rating {
    short_display_string: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProductCategory {
    product_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DisplayString {
    display_string: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BuyingOption {
    price: Option<Value>,
}

/// How to build `url` when the record carries no detail-page link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DetailUrl {
    /// Rendered products: leave the sentinel.
    Sentinel,
    /// Gap-filled products: `<origin>/dp/<asin>`.
    FromAsin,
}

fn or_sentinel(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Walks `price.priceToPay.moneyValueOrRange.value.amount` without failing.
fn price_of(option: Option<&BuyingOption>) -> Price {
    let amount = option
        .and_then(|o| o.price.as_ref())
        .and_then(|p| p.pointer("/priceToPay/moneyValueOrRange/value/amount"));
    Price::from_json(amount)
}

/// Maps one upstream record to an [`Item`]. Records that do not decode as
/// expected are salvaged down to their `asin`; records without an `asin` are
/// dropped.
pub(crate) fn map_product(value: &Value, origin: &str, fallback: DetailUrl) -> Option<Item> {
    let raw = match RawProduct::deserialize(value) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Malformed product record, keeping asin only: {}", e);
            RawProduct {
                asin: value.get("asin").and_then(Value::as_str).map(str::to_string),
                ..RawProduct::default()
            }
        }
    };

    let Some(asin) = raw.asin.filter(|asin| !asin.trim().is_empty()) else {
        log::warn!("Skipping product record without asin");
        return None;
    };

    let url = match (raw.detail_page_link_url.filter(|p| !p.is_empty()), fallback) {
        (Some(path), _) => format!("{}{}", origin, path),
        (None, DetailUrl::FromAsin) => format!("{}/dp/{}", origin, asin),
        (None, DetailUrl::Sentinel) => NOT_AVAILABLE.to_string(),
    };

    let author = raw
        .by_line
        .and_then(|b| b.contributors)
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.name);

    Some(Item {
        author: or_sentinel(author),
        rating: or_sentinel(
            raw.customer_reviews_summary
                .and_then(|s| s.rating)
                .and_then(|r| r.short_display_string),
        ),
        item_type: or_sentinel(raw.product_category.and_then(|c| c.product_type)),
        title: or_sentinel(raw.title.and_then(|t| t.display_string)),
        price: price_of(raw.buying_options.as_ref().and_then(|o| o.first())),
        url,
        asin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORIGIN: &str = "https://site.example";

    #[test]
    fn maps_fully_populated_record() {
        let record = json!({
            "asin": "B01",
            "byLine": { "contributors": [{ "name": "Jane Doe" }, { "name": "Other" }] },
            "customerReviewsSummary": { "rating": { "shortDisplayString": "4.5" } },
            "productCategory": { "productType": "ABIS_BOOK" },
            "title": { "displayString": "First Book" },
            "detailPageLinkURL": "/First-Book/dp/B01",
            "buyingOptions": [{
                "price": { "priceToPay": { "moneyValueOrRange": { "value": { "amount": 9.99 } } } }
            }]
        });

        let item = map_product(&record, ORIGIN, DetailUrl::Sentinel).unwrap();
        assert_eq!(item.asin, "B01");
        assert_eq!(item.author, "Jane Doe");
        assert_eq!(item.rating, "4.5");
        assert_eq!(item.item_type, "ABIS_BOOK");
        assert_eq!(item.title, "First Book");
        assert_eq!(item.url, "https://site.example/First-Book/dp/B01");
        assert_eq!(item.price, Price::Amount(9.99));
    }

    #[test]
    fn missing_nested_fields_become_sentinels() {
        let record = json!({ "asin": "B02", "byLine": { "contributors": [] }, "buyingOptions": [] });
        let item = map_product(&record, ORIGIN, DetailUrl::Sentinel).unwrap();
        assert_eq!(item.author, "N/A");
        assert_eq!(item.rating, "N/A");
        assert_eq!(item.url, "N/A");
        assert!(item.price.is_unknown());
    }

    #[test]
    fn gap_filled_records_fall_back_to_dp_path() {
        let item = map_product(&json!({ "asin": "B03" }), ORIGIN, DetailUrl::FromAsin).unwrap();
        assert_eq!(item.url, "https://site.example/dp/B03");
    }

    #[test]
    fn wrongly_typed_record_keeps_its_asin() {
        let record = json!({ "asin": "B04", "title": "not an object", "byLine": 7 });
        let item = map_product(&record, ORIGIN, DetailUrl::Sentinel).unwrap();
        assert_eq!(item.asin, "B04");
        assert_eq!(item.title, "N/A");
        assert_eq!(item.author, "N/A");
    }

    #[test]
    fn records_without_asin_are_dropped() {
        assert!(map_product(&json!({ "title": { "displayString": "x" } }), ORIGIN, DetailUrl::Sentinel).is_none());
        assert!(map_product(&json!("B05"), ORIGIN, DetailUrl::Sentinel).is_none());
    }

    #[test]
    fn string_price_is_preserved() {
        let record = json!({
            "asin": "B06",
            "buyingOptions": [{
                "price": { "priceToPay": { "moneyValueOrRange": { "value": { "amount": "12.99" } } } }
            }]
        });
        let item = map_product(&record, ORIGIN, DetailUrl::Sentinel).unwrap();
        assert_eq!(item.price, Price::Text("12.99".into()));
    }

    #[test]
    fn zero_price_is_kept_as_delivered() {
        let record = json!({
            "asin": "B07",
            "buyingOptions": [{
                "price": { "priceToPay": { "moneyValueOrRange": { "value": { "amount": 0 } } } }
            }]
        });
        let item = map_product(&record, ORIGIN, DetailUrl::Sentinel).unwrap();
        assert_eq!(item.price, Price::Amount(0.0));
    }
}
