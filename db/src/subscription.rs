use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::subscription::ActiveSubscription;

pub async fn get_active_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<ActiveSubscription>> {
    sqlx::query_as::<_, ActiveSubscription>(
        r#"
        SELECT up.id AS subscription_id, up.user_id, up.plan_id,
               p.name AS plan_name, p.description AS plan_description, p.max_usage,
               up.monthly_usage, up.total_usage, up.start_date, up.last_reset,
               up.last_usage, up.billing_customer_id, up.cancellation_date
        FROM user_plans up
        JOIN plans p ON p.id = up.plan_id
        WHERE up.user_id = $1 AND up.end_date IS NULL
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Zeroes the monthly counter when the last reset predates `period_start`.
/// Returns the new counter, or `None` when the row was already current.
pub async fn reset_monthly_usage<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: i64,
    period_start: DateTime<Utc>,
) -> Res<Option<i32>> {
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE user_plans
        SET monthly_usage = 0, last_reset = now()
        WHERE id = $1 AND end_date IS NULL AND last_reset < $2
        RETURNING monthly_usage
        "#,
    )
    .bind(subscription_id)
    .bind(period_start)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_usage<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: i64,
    amount: i32,
) -> Res<()> {
    sqlx::query("INSERT INTO usage (user_plan_id, usage_amount) VALUES ($1, $2)")
        .bind(subscription_id)
        .bind(amount)
        .execute(executor)
        .await
        .map_err(AppError::from)?;
    Ok(())
}

/// Increments the counters unless that would pass the plan's ceiling.
/// Returns `None` when the ceiling is already reached.
pub async fn increment_usage<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    subscription_id: i64,
    amount: i32,
) -> Res<Option<i32>> {
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE user_plans
        SET monthly_usage = monthly_usage + $2,
            total_usage = total_usage + $2,
            last_usage = now()
        WHERE id = $1
          AND monthly_usage + $2 <= (SELECT max_usage FROM plans WHERE plans.id = user_plans.plan_id)
        RETURNING monthly_usage
        "#,
    )
    .bind(subscription_id)
    .bind(amount)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}
