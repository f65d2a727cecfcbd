//! Database operations for product reviews.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use mercato_core::{ProductId, Rating, ReviewId, UserId};

use super::RepositoryError;
use crate::models::review::{NewReview, Review, ReviewEdit};

const REVIEW_COLUMNS: &str =
    "id, customer_id, product_id, rating, body, images, reply, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    customer_id: UserId,
    product_id: ProductId,
    rating: i16,
    body: String,
    images: Vec<String>,
    reply: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = Rating::new(i64::from(row.rating)).map_err(|e| {
            RepositoryError::DataCorruption(format!("review {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            customer_id: row.customer_id,
            product_id: row.product_id,
            rating,
            review: row.body,
            images: row.images,
            reply: row.reply,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn collect(rows: Vec<ReviewRow>) -> Result<Vec<Review>, RepositoryError> {
    rows.into_iter().map(Review::try_from).collect()
}

/// Insert a review.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the product doesn't exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    customer_id: UserId,
    input: &NewReview,
) -> Result<Review, RepositoryError> {
    let sql = format!(
        r"
        INSERT INTO storefront.review (customer_id, product_id, rating, body, images)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {REVIEW_COLUMNS}
        "
    );
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(customer_id)
        .bind(input.product_id)
        .bind(input.rating.as_i16())
        .bind(&input.review)
        .bind(&input.images)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict("product does not exist".to_owned());
            }
            RepositoryError::Database(e)
        })?;

    row.try_into()
}

/// Get a review by ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
/// Returns `RepositoryError::DataCorruption` if the stored rating is invalid.
pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: ReviewId,
) -> Result<Option<Review>, RepositoryError> {
    let sql = format!("SELECT {REVIEW_COLUMNS} FROM storefront.review WHERE id = $1");
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    row.map(Review::try_from).transpose()
}

/// Replace a review's rating and text.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the review doesn't exist.
/// Returns `RepositoryError::Database` if the update fails.
pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: ReviewId,
    edit: &ReviewEdit,
) -> Result<Review, RepositoryError> {
    let sql = format!(
        r"
        UPDATE storefront.review
        SET rating = $2, body = $3, updated_at = now()
        WHERE id = $1
        RETURNING {REVIEW_COLUMNS}
        "
    );
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(id)
        .bind(edit.rating.as_i16())
        .bind(&edit.review)
        .fetch_optional(executor)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    row.try_into()
}

/// Set the store's reply on a review.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the review doesn't exist.
/// Returns `RepositoryError::Database` if the update fails.
pub async fn set_reply<'e>(
    executor: impl PgExecutor<'e>,
    id: ReviewId,
    reply: &str,
) -> Result<Review, RepositoryError> {
    let sql = format!(
        r"
        UPDATE storefront.review
        SET reply = $2, updated_at = now()
        WHERE id = $1
        RETURNING {REVIEW_COLUMNS}
        "
    );
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(id)
        .bind(reply)
        .fetch_optional(executor)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    row.try_into()
}

/// Delete a review.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the review doesn't exist.
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: ReviewId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM storefront.review WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// List a product's reviews, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_for_product<'e>(
    executor: impl PgExecutor<'e>,
    product_id: ProductId,
) -> Result<Vec<Review>, RepositoryError> {
    let sql = format!(
        "SELECT {REVIEW_COLUMNS} FROM storefront.review \
         WHERE product_id = $1 ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(product_id)
        .fetch_all(executor)
        .await?;

    collect(rows)
}

/// List the reviews a customer has written, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_for_customer<'e>(
    executor: impl PgExecutor<'e>,
    customer_id: UserId,
) -> Result<Vec<Review>, RepositoryError> {
    let sql = format!(
        "SELECT {REVIEW_COLUMNS} FROM storefront.review \
         WHERE customer_id = $1 ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(customer_id)
        .fetch_all(executor)
        .await?;

    collect(rows)
}
