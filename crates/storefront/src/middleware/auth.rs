//! Authentication extractors.
//!
//! The caller's identity is read from the session and handed to services as
//! an explicit [`CurrentUser`]. Sessions are issued by the login service that
//! shares the session store; this crate only reads them.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use mercato_core::StoreId;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires an authenticated caller.
///
/// Rejects with a `not_authenticated` envelope (401) when the session holds
/// no user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, user {}!", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AppError::NotAuthenticated)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AppError::NotAuthenticated)?;

        set_sentry_user(&user.id);
        Ok(Self(user))
    }
}

/// Extractor that requires a store admin, yielding the caller and their store.
///
/// Rejects with 401 when not logged in and with an `access_denied` envelope
/// (403) for callers who administer no store.
pub struct RequireStoreAdmin(pub CurrentUser, pub StoreId);

impl<S> FromRequestParts<S> for RequireStoreAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        let store = user.managed_store().ok_or(AppError::AccessDenied)?;
        Ok(Self(user, store))
    }
}
