use common::error::{AppError, Res};
use unlocker::UnlockerClient;

use crate::{
    dedup::dedup_by_asin,
    extract::{PageScan, missing_asins, scan_page},
    gapfill::backfill,
    models::Catalog,
    storefront::Storefront,
};

/// Cache-miss path: fetch the storefront, extract, backfill and dedup.
///
/// Fails with `ExtractionFailed` when the page carries no product script,
/// which is distinct from a storefront that genuinely lists nothing.
pub async fn ingest_storefront(client: &UnlockerClient, storefront: &Storefront) -> Res<Catalog> {
    let html = client.fetch_page(&storefront.url).await?;
    log::debug!("Fetched {} bytes for {}", html.len(), storefront.url);

    let origin = storefront.origin.clone();
    let PageScan { rendered, context } =
        tokio::task::spawn_blocking(move || scan_page(&html, &origin))
            .await
            .map_err(|e| AppError::Internal(format!("Page parsing task failed: {}", e)))?;

    let Some(rendered) = rendered else {
        return Err(AppError::ExtractionFailed(format!(
            "No product data found on {}",
            storefront.url
        )));
    };

    let missing = missing_asins(&rendered);
    let mut items = rendered.items;
    log::info!(
        "Extracted {} rendered items from {}, {} listed but not rendered",
        items.len(),
        storefront.url,
        missing.len()
    );

    if !missing.is_empty() {
        match context {
            Some(context) => {
                let filled = backfill(client, storefront, &context, &missing).await;
                items.extend(filled);
            }
            None => log::warn!(
                "No request context on {}, skipping backfill of {} items",
                storefront.url,
                missing.len()
            ),
        }
    }

    let products = dedup_by_asin(items);
    Ok(Catalog::new(storefront.url.clone(), products))
}
