//! Pulls the embedded `config = {...}` objects out of storefront markup.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    models::Item,
    payload::{DetailUrl, map_product},
};

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid selector"));
static CONFIG_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"config\s*=\s*\{").expect("valid regex"));

/// Rendered items and the complete identifier list from the product script.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub items: Vec<Item>,
    /// Every identifier the storefront lists, rendered or not.
    pub asin_list: Vec<String>,
}

/// Session fields the product-grid endpoint needs to accept a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub obfuscated_marketplace_id: Option<String>,
    pub obfuscated_merchant_id: Option<String>,
    pub session_id: Option<String>,
    pub slate_token: Option<String>,
    pub fresh_cart_csrf_token: Option<String>,
    pub amazon_api_csrf_token: Option<String>,
    pub visit_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContext {
    obfuscated_marketplace_id: Option<String>,
    obfuscated_merchant_id: Option<String>,
    session_id: Option<String>,
    slate_token: Option<String>,
    fresh_cart_csrf_token: Option<String>,
    amazon_api_csrf_token: Option<String>,
    appended_parameters: Option<AppendedParameters>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendedParameters {
    visit_id: Option<String>,
}

impl From<RawContext> for RequestContext {
    fn from(raw: RawContext) -> Self {
        RequestContext {
            obfuscated_marketplace_id: raw.obfuscated_marketplace_id,
            obfuscated_merchant_id: raw.obfuscated_merchant_id,
            session_id: raw.session_id,
            slate_token: raw.slate_token,
            fresh_cart_csrf_token: raw.fresh_cart_csrf_token,
            amazon_api_csrf_token: raw.amazon_api_csrf_token,
            visit_id: raw.appended_parameters.and_then(|p| p.visit_id),
        }
    }
}

/// Everything one parse of the page yields.
#[derive(Debug, Clone, PartialEq)]
pub struct PageScan {
    /// `None` when no script carried a product list.
    pub rendered: Option<RenderedPage>,
    pub context: Option<RequestContext>,
}

/// Parses the document once and runs both script scans over it.
pub fn scan_page(html: &str, origin: &str) -> PageScan {
    let document = Html::parse_document(html);
    let scripts: Vec<String> = document
        .select(&SCRIPT)
        .map(|script| script.text().collect::<String>())
        .collect();

    PageScan {
        rendered: scan_products(&scripts, origin),
        context: scan_context(&scripts),
    }
}

/// Decodes the object literal assigned to `config` in a script body. The
/// assignment is located by pattern and the object itself is read by the
/// JSON parser, so trailing statements do not matter.
fn config_object(script: &str) -> Option<Value> {
    for found in CONFIG_ASSIGNMENT.find_iter(script) {
        let start = found.end() - 1;
        let mut stream = serde_json::Deserializer::from_str(&script[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value @ Value::Object(_))) => return Some(value),
            Some(Err(e)) => log::debug!("config assignment is not JSON: {}", e),
            _ => {}
        }
    }
    None
}

fn scan_products(scripts: &[String], origin: &str) -> Option<RenderedPage> {
    scripts
        .iter()
        .filter(|s| s.contains("config") && s.contains("content"))
        .filter_map(|s| config_object(s))
        .find_map(|config| {
            let products = config.pointer("/content/products")?.as_array()?;
            let items = products
                .iter()
                .filter_map(|product| map_product(product, origin, DetailUrl::Sentinel))
                .collect();
            let asin_list = config
                .pointer("/content/ASINList")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(Value::as_str)
                        .filter(|asin| !asin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Some(RenderedPage { items, asin_list })
        })
}

fn scan_context(scripts: &[String]) -> Option<RequestContext> {
    scripts
        .iter()
        .filter(|s| s.contains("config") && s.contains("requestContext"))
        .filter_map(|s| config_object(s))
        .find_map(|config| {
            let raw = config.get("requestContext")?;
            match RawContext::deserialize(raw) {
                Ok(raw) => Some(RequestContext::from(raw)),
                Err(e) => {
                    log::warn!("Unreadable request context: {}", e);
                    None
                }
            }
        })
}

/// Identifiers listed by the storefront but absent from the rendered items,
/// in listing order and without repeats.
pub fn missing_asins(page: &RenderedPage) -> Vec<String> {
    let mut seen: std::collections::HashSet<&str> =
        page.items.iter().map(|item| item.asin.as_str()).collect();
    page.asin_list
        .iter()
        .filter(|asin| seen.insert(asin.as_str()))
        .cloned()
        .collect()
}
