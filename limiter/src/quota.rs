use std::sync::Arc;

use catalog::Catalog;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use common::error::{AppError, Res};
use db::{SubscriptionStore, models::subscription::ActiveSubscription};
use uuid::Uuid;

/// Start of the UTC calendar month containing `now`.
pub fn period_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Monthly metering against the caller's active plan.
///
/// `check` is a hard gate run before any work; `record` runs after the
/// response payload exists and never fails the request.
#[derive(Clone)]
pub struct QuotaGuard {
    store: Arc<dyn SubscriptionStore>,
}

impl QuotaGuard {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        QuotaGuard { store }
    }

    /// Active subscription with its counter rolled over to the current
    /// month, or `None` when the user has no plan.
    pub async fn current(&self, user_id: Uuid) -> Res<Option<ActiveSubscription>> {
        let Some(mut subscription) = self.store.active_subscription(user_id).await? else {
            return Ok(None);
        };

        let period = period_start(Utc::now());
        if subscription.last_reset < period {
            match self
                .store
                .reset_monthly_usage(subscription.subscription_id, period)
                .await?
            {
                Some(monthly_usage) => {
                    log::info!(
                        "Monthly usage reset for subscription {}",
                        subscription.subscription_id
                    );
                    subscription.monthly_usage = monthly_usage;
                    subscription.last_reset = Utc::now();
                }
                // another request reset it first
                None => {
                    return self.store.active_subscription(user_id).await;
                }
            }
        }

        Ok(Some(subscription))
    }

    pub async fn check(&self, user_id: Uuid) -> Res<ActiveSubscription> {
        let subscription = self.current(user_id).await?.ok_or(AppError::NoActivePlan)?;

        let limit = subscription.max_usage.ok_or_else(|| {
            AppError::InvalidPlanConfig(format!(
                "Plan '{}' has no usage ceiling",
                subscription.plan_name
            ))
        })?;

        if subscription.monthly_usage >= limit {
            log::info!(
                "User {} over quota ({}/{})",
                user_id,
                subscription.monthly_usage,
                limit
            );
            return Err(AppError::QuotaExceeded {
                used: subscription.monthly_usage as i64,
                limit: limit as i64,
            });
        }

        Ok(subscription)
    }

    /// Meters one unit and stores a download snapshot. Failures are logged only.
    pub async fn record(&self, subscription: &ActiveSubscription, catalog: &Catalog) {
        let id = subscription.subscription_id;

        match self.store.record_usage(id, 1).await {
            Ok(Some(monthly_usage)) => log::debug!(
                "Subscription {} usage now {}/{}",
                id,
                monthly_usage,
                subscription.max_usage.unwrap_or_default()
            ),
            // a concurrent request took the last unit after our check
            Ok(None) => log::warn!(
                "Subscription {} already at its ceiling, usage not recorded",
                id
            ),
            Err(e) => log::error!("Failed to record usage for subscription {}: {}", id, e),
        }

        let snapshot = match serde_json::to_value(catalog) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("Failed to serialize download snapshot: {}", e);
                return;
            }
        };
        if let Err(e) = self
            .store
            .insert_download(subscription.user_id, id, snapshot)
            .await
        {
            log::error!("Failed to store download for subscription {}: {}", id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_starts_at_midnight_on_the_first() {
        let now = Utc.with_ymd_and_hms(2025, 3, 17, 14, 5, 9).unwrap();
        assert_eq!(
            period_start(now),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );
    }
}
