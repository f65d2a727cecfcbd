//! Review domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercato_core::{ProductId, Rating, ReviewId, UserId};

use super::{ValidationError, require, require_text};

/// A shopper's review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub customer_id: UserId,
    pub product_id: ProductId,
    pub rating: Rating,
    /// Review text.
    pub review: String,
    pub images: Vec<String>,
    /// Store's public answer, if any.
    pub reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for adding a review.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddReviewRequest {
    pub product: Option<ProductId>,
    #[serde(alias = "ratting")]
    pub rating: Option<i64>,
    pub review: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A validated review ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub product_id: ProductId,
    pub rating: Rating,
    pub review: String,
    pub images: Vec<String>,
}

fn parse_rating(value: Option<i64>) -> Result<Rating, ValidationError> {
    let raw = require(value, "rating")?;
    Rating::new(raw).map_err(|e| ValidationError::invalid("rating", e.to_string()))
}

impl AddReviewRequest {
    /// Validate that product, rating and text are all present.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for an absent product, rating or text and
    /// `InvalidField` for a rating outside 1-5.
    pub fn validate(self) -> Result<NewReview, ValidationError> {
        let product_id = require(self.product, "product")?;
        let rating = parse_rating(self.rating)?;
        let review = require_text(self.review, "review")?;

        Ok(NewReview {
            product_id,
            rating,
            review,
            images: self.images,
        })
    }
}

/// Request body for editing a review.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReviewRequest {
    #[serde(alias = "ratting")]
    pub rating: Option<i64>,
    pub review: Option<String>,
}

/// A validated review edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEdit {
    pub rating: Rating,
    pub review: String,
}

impl UpdateReviewRequest {
    /// Validate the edit.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for an absent rating or text and `InvalidField`
    /// for a rating outside 1-5.
    pub fn validate(self) -> Result<ReviewEdit, ValidationError> {
        Ok(ReviewEdit {
            rating: parse_rating(self.rating)?,
            review: require_text(self.review, "review")?,
        })
    }
}

/// Request body for a store's reply to a review.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyRequest {
    pub reply: Option<String>,
}
