//! Review service.
//!
//! Each review write locks the reviewed product and recomputes its average
//! rating in the same transaction, so the rating always matches the stored
//! reviews.

use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use mercato_core::{ProductId, ReviewId};

use crate::db::{self, RepositoryError};
use crate::error::{AppError, Entity};
use crate::models::review::{AddReviewRequest, ReplyRequest, Review, UpdateReviewRequest};
use crate::models::{CurrentUser, require_text};
use crate::services::require_store_access;

/// Review operations for shoppers and store admins.
pub struct ReviewService {
    pool: PgPool,
}

/// Map a lost race on the review row to the caller-facing error.
fn review_missing(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(Entity::Review),
        other => other.into(),
    }
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a review the caller wrote and lock its product.
    async fn own_review(
        conn: &mut PgConnection,
        user: &CurrentUser,
        id: ReviewId,
    ) -> Result<Review, AppError> {
        let review = db::reviews::get_by_id(&mut *conn, id)
            .await?
            .ok_or(AppError::NotFound(Entity::Review))?;
        if review.customer_id != user.id {
            return Err(AppError::AccessDenied);
        }
        db::products::lock(&mut *conn, review.product_id)
            .await?
            .ok_or(AppError::NotFound(Entity::Product))?;
        Ok(review)
    }

    /// Review a product as the caller.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` unless product, rating and text are all given,
    /// `InvalidField` for a rating outside 1-5, and `NotFound(Product)`.
    #[instrument(skip(self, user, request), fields(customer_id = %user.id))]
    pub async fn add_review(
        &self,
        user: &CurrentUser,
        request: AddReviewRequest,
    ) -> Result<Review, AppError> {
        let input = request.validate()?;

        let mut tx = self.pool.begin().await?;
        db::products::lock(&mut *tx, input.product_id)
            .await?
            .ok_or(AppError::NotFound(Entity::Product))?;

        let review = db::reviews::insert(&mut *tx, user.id, &input).await?;
        let avg = db::products::recompute_rating(&mut *tx, input.product_id).await?;
        tx.commit().await?;

        debug!(review_id = %review.id, product_id = %input.product_id, %avg, "Review added");
        Ok(review)
    }

    /// Edit the rating and text of one of the caller's reviews.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Review)`, `AccessDenied` for someone else's review,
    /// or `MissingField`/`InvalidField` for a malformed edit.
    #[instrument(skip(self, user, request), fields(review_id = %id))]
    pub async fn update_review(
        &self,
        user: &CurrentUser,
        id: ReviewId,
        request: UpdateReviewRequest,
    ) -> Result<Review, AppError> {
        let edit = request.validate()?;

        let mut tx = self.pool.begin().await?;
        let review = Self::own_review(&mut tx, user, id).await?;

        let updated = db::reviews::update(&mut *tx, id, &edit)
            .await
            .map_err(review_missing)?;
        db::products::recompute_rating(&mut *tx, review.product_id).await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Delete one of the caller's reviews.
    ///
    /// The review disappears from its product's and its author's review lists
    /// together with the row itself.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Review)` or `AccessDenied` for someone else's review.
    #[instrument(skip(self, user), fields(review_id = %id))]
    pub async fn delete_review(&self, user: &CurrentUser, id: ReviewId) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let review = Self::own_review(&mut tx, user, id).await?;

        db::reviews::delete(&mut *tx, id)
            .await
            .map_err(review_missing)?;
        db::products::recompute_rating(&mut *tx, review.product_id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Answer a review of one of the caller's store's products.
    ///
    /// # Errors
    ///
    /// Returns `MissingField("reply")`, `NotFound(Review)`, or `AccessDenied`
    /// if the product belongs to another store.
    #[instrument(skip(self, user, request), fields(review_id = %id))]
    pub async fn reply(
        &self,
        user: &CurrentUser,
        id: ReviewId,
        request: ReplyRequest,
    ) -> Result<Review, AppError> {
        let reply = require_text(request.reply, "reply")?;

        let review = self.get_review(id).await?;
        let product = db::products::get_by_id(&self.pool, review.product_id)
            .await?
            .ok_or(AppError::NotFound(Entity::Product))?;
        require_store_access(user, product.store_id)?;

        db::reviews::set_reply(&self.pool, id, &reply)
            .await
            .map_err(review_missing)
    }

    /// Get a review by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Review)` if it doesn't exist.
    #[instrument(skip(self))]
    pub async fn get_review(&self, id: ReviewId) -> Result<Review, AppError> {
        db::reviews::get_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound(Entity::Review))
    }

    /// A product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Product)` if the product doesn't exist.
    #[instrument(skip(self))]
    pub async fn product_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, AppError> {
        if db::products::get_by_id(&self.pool, product_id).await?.is_none() {
            return Err(AppError::NotFound(Entity::Product));
        }
        Ok(db::reviews::list_for_product(&self.pool, product_id).await?)
    }

    /// The caller's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    #[instrument(skip(self, user), fields(customer_id = %user.id))]
    pub async fn user_reviews(&self, user: &CurrentUser) -> Result<Vec<Review>, AppError> {
        Ok(db::reviews::list_for_customer(&self.pool, user.id).await?)
    }
}
