//! Database operations for marketplace accounts.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use mercato_core::{StoreId, UserId, UserRole};

use super::RepositoryError;
use crate::models::user::User;

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    role: UserRole,
    store_id: Option<StoreId>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            role: row.role,
            store_id: row.store_id,
            created_at: row.created_at,
        }
    }
}

/// Parameters for creating an account.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub store_id: Option<StoreId>,
}

/// Get a user by ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: UserId,
) -> Result<Option<User>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(
        r"
        SELECT id, email, name, role, store_id, created_at
        FROM storefront.user
        WHERE id = $1
        ",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(User::from))
}

/// Lock a user's row for the rest of the transaction.
///
/// Cart and wishlist mutations take this lock first so that concurrent
/// requests for the same shopper are applied one after the other.
///
/// Returns `false` if the user does not exist.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock<'e>(executor: impl PgExecutor<'e>, id: UserId) -> Result<bool, RepositoryError> {
    let row: Option<(UserId,)> =
        sqlx::query_as("SELECT id FROM storefront.user WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;

    Ok(row.is_some())
}

/// Create a new account.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the email already exists.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    input: &CreateUser,
) -> Result<User, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(
        r"
        INSERT INTO storefront.user (email, name, role, store_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, name, role, store_id, created_at
        ",
    )
    .bind(&input.email)
    .bind(&input.name)
    .bind(input.role)
    .bind(input.store_id)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict("email already exists".to_owned());
        }
        RepositoryError::Database(e)
    })?;

    Ok(row.into())
}
