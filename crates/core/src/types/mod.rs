//! Core types for Mercato.
//!
//! This module provides type-safe wrappers for common marketplace concepts.

pub mod id;
pub mod price;
pub mod rating;
pub mod status;

pub use id::*;
pub use price::{PriceError, SizePrice};
pub use rating::{Rating, RatingError};
pub use status::*;
