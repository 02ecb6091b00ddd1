use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};

use crate::dtos::book::BookUpsertRequest;

pub async fn upsert_book<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    book: &BookUpsertRequest,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO books (asin, author, rating, type, title, url, price)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (asin) DO UPDATE
        SET author = EXCLUDED.author,
            rating = EXCLUDED.rating,
            type = EXCLUDED.type,
            title = EXCLUDED.title,
            url = EXCLUDED.url,
            price = EXCLUDED.price,
            updated_at = now()
        "#,
    )
    .bind(&book.asin)
    .bind(&book.author)
    .bind(&book.rating)
    .bind(&book.item_type)
    .bind(&book.title)
    .bind(&book.url)
    .bind(book.price)
    .execute(executor)
    .await
    .map_err(AppError::from)?;
    Ok(())
}
