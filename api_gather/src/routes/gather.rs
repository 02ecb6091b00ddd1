use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use db::SubscriptionStore;

use crate::{
    dtos::gather::{
        DownloadsQuery, GatherRequest, GatherResponse, PlanResponse, PlanSummary, UsageSummary,
    },
    services::{self, gather::Pipeline},
};

/// Gathers the full catalog of a storefront.
///
/// Quota is checked before the URL is validated, so an exhausted plan gets
/// 429 even for a request without a URL. Returns `{ products }`.
pub async fn post_gather(
    claims: web::ReqData<JwtClaims>,
    pipeline: web::Data<Pipeline>,
    req: web::Json<GatherRequest>,
) -> Res<impl Responder> {
    let user_id = claims.user_id();
    let catalog = pipeline.gather(user_id, req.url.as_deref()).await?;
    Success::ok(GatherResponse {
        products: catalog.products,
    })
}

/// Current month's usage and the plan it is metered against.
#[get("/plan")]
pub async fn get_plan(
    claims: web::ReqData<JwtClaims>,
    pipeline: web::Data<Pipeline>,
) -> Res<impl Responder> {
    let subscription = pipeline.quota().current(claims.user_id()).await?;

    let response = match subscription {
        Some(subscription) => PlanResponse {
            usage: UsageSummary {
                monthly_usage: subscription.monthly_usage,
            },
            max_usage: subscription.max_usage,
            plan: Some(PlanSummary {
                name: subscription.plan_name,
                description: subscription.plan_description,
                max_usage: subscription.max_usage,
            }),
        },
        None => PlanResponse {
            usage: UsageSummary { monthly_usage: 0 },
            max_usage: None,
            plan: None,
        },
    };
    Success::ok(response)
}

/// Previous downloads, newest first. `?page=` is 1-based, `?per_page=` at most 100.
#[get("/downloads")]
pub async fn get_downloads(
    claims: web::ReqData<JwtClaims>,
    store: web::Data<Arc<dyn SubscriptionStore>>,
    query: web::Query<DownloadsQuery>,
) -> Res<impl Responder> {
    let page =
        services::downloads::list_downloads(&store, claims.user_id(), query.into_inner()).await?;
    Success::ok(page)
}
