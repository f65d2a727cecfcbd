//! Client for the external image host.
//!
//! Product images are stored by a third-party asset host and referenced by
//! URL. The host addresses each asset by an identifier embedded in that URL:
//! the last path segment without its file extension.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;
use url::Url;

use crate::config::AssetHostConfig;

/// Errors that can occur when talking to the asset host.
#[derive(Debug, Error)]
pub enum AssetError {
    /// No asset host is configured.
    #[error("asset host is not configured")]
    NotConfigured,

    /// An image URL carries no asset identifier.
    #[error("cannot derive asset id from {0}")]
    InvalidUrl(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The host refused the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Derive the asset identifier from a hosted image URL.
///
/// `https://cdn.example/img/upload/v17/abc123.jpg` yields `abc123`.
///
/// # Errors
///
/// Returns `AssetError::InvalidUrl` if the URL doesn't parse or has no
/// non-empty final path segment.
pub fn asset_id_from_url(image_url: &str) -> Result<String, AssetError> {
    let invalid = || AssetError::InvalidUrl(image_url.to_owned());

    let url = Url::parse(image_url).map_err(|_| invalid())?;
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .ok_or_else(invalid)?;

    let id = segment
        .rsplit_once('.')
        .map_or(segment, |(stem, _ext)| stem);
    if id.is_empty() {
        return Err(invalid());
    }
    Ok(id.to_owned())
}

/// Asset host API client.
#[derive(Clone)]
pub struct AssetClient {
    client: reqwest::Client,
    base_url: Url,
}

impl AssetClient {
    /// Create a new asset host client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key isn't a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &AssetHostConfig) -> Result<Self, AssetError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth = HeaderValue::from_str(&auth_value).map_err(|e| AssetError::Api {
            status: 0,
            message: format!("Invalid API key format: {e}"),
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Delete one asset by identifier.
    ///
    /// An asset the host no longer knows about counts as deleted.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the host rejects it.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, asset_id: &str) -> Result<(), AssetError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AssetError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["assets", asset_id]);

        let response = self.client.delete(url).send().await?;
        let status = response.status();

        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(AssetError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Delete every asset behind the given image URLs.
    ///
    /// All identifiers are derived before any request is sent, and the first
    /// failure stops the run, so the caller can refuse to delete the record
    /// that owns the images.
    ///
    /// # Errors
    ///
    /// Returns the first derivation or deletion error.
    pub async fn delete_images(&self, image_urls: &[String]) -> Result<(), AssetError> {
        let ids = image_urls
            .iter()
            .map(|url| asset_id_from_url(url))
            .collect::<Result<Vec<_>, _>>()?;

        for id in &ids {
            self.delete(id).await?;
        }
        tracing::debug!(count = ids.len(), "Deleted hosted images");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_id_is_last_segment_without_extension() {
        assert_eq!(
            asset_id_from_url("https://cdn.example/img/upload/v17/abc123.jpg").unwrap(),
            "abc123"
        );
        assert_eq!(
            asset_id_from_url("https://cdn.example/raw/report.v2.pdf").unwrap(),
            "report.v2"
        );
    }

    #[test]
    fn test_asset_id_without_extension_is_kept_whole() {
        assert_eq!(
            asset_id_from_url("https://cdn.example/img/xyz789").unwrap(),
            "xyz789"
        );
    }

    #[test]
    fn test_asset_id_ignores_query_string() {
        assert_eq!(
            asset_id_from_url("https://cdn.example/img/abc.png?w=200").unwrap(),
            "abc"
        );
    }

    #[test]
    fn test_asset_id_rejects_urls_without_a_segment() {
        assert!(matches!(
            asset_id_from_url("https://cdn.example/"),
            Err(AssetError::InvalidUrl(_))
        ));
        assert!(matches!(
            asset_id_from_url("not a url"),
            Err(AssetError::InvalidUrl(_))
        ));
        assert!(matches!(
            asset_id_from_url("https://cdn.example/img/.jpg"),
            Err(AssetError::InvalidUrl(_))
        ));
    }
}
