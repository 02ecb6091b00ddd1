use std::collections::BTreeMap;

use serde::Serialize;

/// Envelope the proxy API expects for every unlocked request.
#[derive(Debug, Serialize)]
pub struct UnlockRequest<'a> {
    /// Target URL on the storefront.
    pub url: &'a str,
    /// Serialized body forwarded to the target (POST only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub zone: &'a str,
    /// Always `raw`: the target's response body is passed through untouched.
    pub format: &'static str,
    pub method: &'static str,
    pub country: &'a str,
    /// Headers forwarded to the target.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}
