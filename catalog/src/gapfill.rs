//! Fetches full records for identifiers the storefront listed but did not render.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use unlocker::UnlockerClient;

use crate::{
    extract::RequestContext,
    models::Item,
    payload::{DetailUrl, map_product},
    storefront::Storefront,
};

/// Identifiers per product-grid call.
pub const BATCH_SIZE: usize = 16;

const PRODUCT_GRID_PATH: &str = "/juvec";

const WEBLAB_TREATMENTS: &[(&str, &str)] = &[
    ("ADPT_SE_STORES_CX_SLIDER_THUMBNAILS_614390", "C"),
    ("SE_STORES_AX_CCAPI_MIGRATION_545698", "T1"),
    ("ADPT_SE_PREMIUM_BEAUTY_THEME_702020", "C"),
    ("STORES_JUVEC_RSAS_MIGRATION_TO_SGW_990022", "T2"),
    ("ADPT_SE_STORES_CX_ATC_AND_QL_ON_SEARCH_RESULTS_597002", "T1"),
    ("ADPT_SE_STORES_LIGHTNING_DEAL_ATC_1091731", "T1"),
    ("ADPT_BSX_LOYALTY_FOLLOW_NEW_FOLLOW_BUTTON_EXPERIMENT_647291", "C"),
    ("STORES_CX_LINKOUT_VALIDATION_502746", "T1"),
    ("STORES_POSTS_337508", "T1"),
    ("LIVE_VIDEO_MAX_AGE_940615", "T1"),
    ("STORES_386110", "C"),
    ("ADPT_SE_STORES_BTPBADGEANDCLIPPING_808127", "T1"),
    ("ADPT_SE_STORES_CX_OUT_OF_STOCK_FILTER_621421", "T1"),
    ("STORES_TEST_TRAFFIC_446265", "C"),
    ("ADPT_SE_STORES_GATING_PREMIUM_BEAUTY_LIVE_CHAT_KILL_SWITCH_1094714", "C"),
    ("STORES_JUVEC_RSAS_MIGRATION_TO_SGW_SEARCH_PAGE_1014242", "T2"),
    ("SE_STORES_PG_LBR_NODE_418262", "T1"),
    ("ADPT_SE_STORES_CX_SOCIAL_SHARE_ON_HEADER_844025", "T1"),
    ("ADPT_SE_STORES_CX_PRICE_DISCLAIMER_890047", "C"),
    ("ADPT_SE_STORES_CLEAN_UP_EXPERIMENTAL_VIDEOS_902186", "T1"),
    ("SE_STORES_CX_SHOW_OOS_PARENT_572684", "T1"),
    ("ADPT_SE_STORES_CX_DEAL_BANNER_UPDATER_820054", "T1"),
    ("CM_CR_OMNIBUS_426621", "T1"),
    ("ADPT_SE_STORES_PREMIUM_BEAUTY_LIVE_CHAT_CSA_MIGRATION_1084032", "T1"),
    ("F3_SB_BADGE_945791", "C"),
    ("STORE_CX_AWLS_623218", "T1"),
    ("STORE_CX_NODE_540986", "T1"),
    ("EVENT_MASTER_BADGING_232372", "C"),
    ("ADPT_SE_STORES_CX_SLIDER_MAGNIFIER_614391", "T1"),
    ("PE_PRICING_PDAY_EVENT_213702", "C"),
    ("ADPT_SE_STORES_CX_MOBILE_NAV_EXPERIMENT_1_635886", "T1"),
    ("SHOPBOP_FASHION_THEME_792179", "T1"),
    ("STORES_ANALYTICS_NEW_INGRESS_TYPE_517426", "C"),
    ("STORES_AUTHORSTORE_POSTS_941563", "C"),
];

#[derive(Debug, Default, Deserialize)]
struct ProductGridReply {
    #[serde(default)]
    products: Option<Vec<Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductGridRequest<'a> {
    request_context: Value,
    widget_type: &'static str,
    section_type: &'static str,
    product_grid_type: &'static str,
    author_filters: Value,
    is_manual_grid: bool,
    content: Value,
    include_out_of_stock: bool,
    endpoint: &'static str,
    #[serde(rename = "ASINList")]
    asin_list: &'a [String],
}

fn request_context(context: &RequestContext) -> Value {
    let weblabs: Map<String, Value> = WEBLAB_TREATMENTS
        .iter()
        .map(|(name, arm)| (name.to_string(), Value::from(*arm)))
        .collect();

    json!({
        "obfuscatedMarketplaceId": context.obfuscated_marketplace_id,
        "obfuscatedMerchantId": context.obfuscated_merchant_id,
        "language": "en-US",
        "sessionId": context.session_id,
        "currency": "USD",
        "almThresholdsMap": {},
        "queryParameterMap": {},
        "weblabMap": weblabs,
        "appendedParameters": { "ingress": "0", "visitId": context.visit_id },
        "isPreviewCampaign": false,
        "deviceType": "desktop",
        "deviceMode": "Desktop",
        "appVersion": "",
        "osName": "",
        "pageSubType": "Author",
        "previewWidgetGroup": null,
        "slateToken": context.slate_token,
        "freshCartCsrfToken": context.fresh_cart_csrf_token,
        "painterContentId": "",
        "internal": false,
        "profile": false,
        "mshop": false,
        "debug": false,
        "previewCampaignId": null,
        "inBlacklist": false,
        "customerId": "",
        "amazonApiAjaxEndpoint": "data.amazon.com",
        "amazonApiCsrfToken": context.amazon_api_csrf_token,
    })
}

fn grid_request<'a>(context: &RequestContext, batch: &'a [String]) -> ProductGridRequest<'a> {
    ProductGridRequest {
        request_context: request_context(context),
        widget_type: "ProductGrid",
        section_type: "AuthorAllBooksProductGrid",
        product_grid_type: "ma",
        author_filters: json!({ "format": ["allFormats"], "language": ["All Languages"] }),
        is_manual_grid: true,
        content: json!({ "includeOutOfStock": true }),
        include_out_of_stock: true,
        endpoint: "ajax-data",
        asin_list: batch,
    }
}

/// Backfills `missing` in batches of [`BATCH_SIZE`], one call at a time.
///
/// A failed batch ends the backfill: items from earlier batches are returned
/// and later batches are not attempted.
pub async fn backfill(
    client: &UnlockerClient,
    storefront: &Storefront,
    context: &RequestContext,
    missing: &[String],
) -> Vec<Item> {
    let endpoint = storefront.absolute(PRODUCT_GRID_PATH);
    let referer = endpoint.clone();
    let headers = [
        ("Content-Type", "application/json"),
        ("Accept", "application/json"),
        ("X-Requested-With", "XMLHttpRequest"),
        ("Origin", storefront.origin.as_str()),
        ("Referer", referer.as_str()),
    ];

    let mut filled = Vec::with_capacity(missing.len());
    for (index, batch) in missing.chunks(BATCH_SIZE).enumerate() {
        let request = grid_request(context, batch);
        let reply: ProductGridReply = match client.post_json(&endpoint, &request, &headers).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!(
                    "Gap-fill batch {} of {} for {} failed, keeping {} backfilled items: {}",
                    index + 1,
                    missing.len().div_ceil(BATCH_SIZE),
                    storefront.url,
                    filled.len(),
                    e
                );
                break;
            }
        };

        let products = reply.products.unwrap_or_default();
        log::debug!(
            "Gap-fill batch {} returned {} of {} requested products",
            index + 1,
            products.len(),
            batch.len()
        );
        filled.extend(
            products
                .iter()
                .filter_map(|product| map_product(product, &storefront.origin, DetailUrl::FromAsin)),
        );
    }

    filled
}
