use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Sentinel for any field the storefront did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Price as delivered by the storefront. The `"N/A"` sentinel means
/// "unknown", never "free", so it is kept as text rather than coerced to 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

impl Price {
    pub fn unknown() -> Self {
        Price::Text(not_available())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Price::Text(text) if text == NOT_AVAILABLE)
    }

    /// Numeric value, parsing textual amounts such as `"12.99"`.
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            Price::Amount(amount) => Some(*amount),
            Price::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Null, missing, empty strings and non-scalar values all map to `"N/A"`.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(number)) => number.as_f64().map_or_else(Price::unknown, Price::Amount),
            Some(Value::String(text)) if !text.trim().is_empty() => Price::Text(text.clone()),
            _ => Price::unknown(),
        }
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::unknown()
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(Price::from_json(value.as_ref()))
    }
}

/// One catalog entry. `asin` is the stable key; every other field may carry
/// the `"N/A"` sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub asin: String,
    #[serde(default = "not_available")]
    pub author: String,
    #[serde(default = "not_available")]
    pub rating: String,
    #[serde(rename = "type", default = "not_available")]
    pub item_type: String,
    #[serde(default = "not_available")]
    pub title: String,
    #[serde(default = "not_available")]
    pub url: String,
    #[serde(default)]
    pub price: Price,
}

/// Snapshot of one storefront: its cleaned URL and unique items in
/// first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub url: String,
    pub products: Vec<Item>,
    pub created_at: DateTime<Utc>,
}

impl Catalog {
    pub fn new(url: impl Into<String>, products: Vec<Item>) -> Self {
        Catalog {
            url: url.into(),
            products,
            created_at: Utc::now(),
        }
    }

    /// Author of the first item, used to label snapshots.
    pub fn author(&self) -> Option<&str> {
        self.products
            .first()
            .map(|item| item.author.as_str())
            .filter(|author| *author != NOT_AVAILABLE)
    }
}
