//! Tag Manager API v2 HTTP client.
//!
//! Thin typed wrapper over the REST endpoints the connector consumes. Every
//! call is a single request: no retries, no caching.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use idsync_core::{CancelSignal, SyncResult};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::TagManagerConfig;
use crate::error::{TagManagerError, TagManagerResult};
use crate::types::{
    ApiErrorBody, ListAccountsResponse, ListContainersResponse, ListUserPermissionsResponse,
    UserPermission,
};

const API_SEGMENTS: [&str; 2] = ["tagmanager", "v2"];

/// Tag Manager API client.
#[derive(Clone)]
pub struct TagManagerClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl fmt::Debug for TagManagerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagManagerClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl TagManagerClient {
    /// Create a client from a validated configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL or token is missing or the HTTP client
    /// cannot be built.
    pub fn new(config: &TagManagerConfig) -> TagManagerResult<Self> {
        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| TagManagerError::Config("access_token is required".into()))?;

        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(TagManagerError::Config(format!(
                "base_url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(u64::from(config.connect_timeout_ms)))
            .timeout(Duration::from_millis(u64::from(config.request_timeout_ms)))
            .user_agent(concat!("idsync-tagmanager/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            access_token,
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> TagManagerResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                TagManagerError::Config("base_url cannot carry a path".into())
            })?;
            path.pop_if_empty();
            path.extend(API_SEGMENTS);
            path.extend(segments);
        }
        Ok(url)
    }

    fn record_endpoint(&self, record_path: &str) -> TagManagerResult<Url> {
        let segments: Vec<&str> = record_path.split('/').collect();
        if segments.first() != Some(&"accounts")
            || segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..")
        {
            return Err(TagManagerError::Config(format!(
                "invalid permission record path '{record_path}'"
            )));
        }
        self.endpoint(segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    async fn send(&self, request: RequestBuilder) -> TagManagerResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(api_error(response).await)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        page_token: &str,
    ) -> TagManagerResult<T> {
        let url = self.endpoint(segments.iter().copied())?;
        debug!(url = %url, page_token, "tagmanager list");

        let mut request = self.request(Method::GET, url);
        if !page_token.is_empty() {
            request = request.query(&[("pageToken", page_token)]);
        }
        let response = self.send(request).await?;
        decode(response).await
    }

    /// List accounts visible to the caller (one page).
    ///
    /// # Errors
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn list_accounts(&self, page_token: &str) -> TagManagerResult<ListAccountsResponse> {
        self.get_page(&["accounts"], page_token).await
    }

    /// List containers of an account (one page).
    ///
    /// # Errors
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn list_containers(
        &self,
        account_id: &str,
        page_token: &str,
    ) -> TagManagerResult<ListContainersResponse> {
        self.get_page(&["accounts", account_id, "containers"], page_token)
            .await
    }

    /// List user permission records of an account (one page).
    ///
    /// # Errors
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn list_user_permissions(
        &self,
        account_id: &str,
        page_token: &str,
    ) -> TagManagerResult<ListUserPermissionsResponse> {
        self.get_page(&["accounts", account_id, "user_permissions"], page_token)
            .await
    }

    /// Fetch one permission record.
    ///
    /// # Errors
    /// Returns an error if the path is malformed, the request fails, or the
    /// body cannot be decoded.
    pub async fn get_user_permission(&self, path: &str) -> TagManagerResult<UserPermission> {
        let url = self.record_endpoint(path)?;
        debug!(path, "tagmanager get user permission");
        let response = self.send(self.request(Method::GET, url)).await?;
        decode(response).await
    }

    /// Replace one permission record wholesale.
    ///
    /// # Errors
    /// Returns an error if the path is malformed, the request fails, or the
    /// body cannot be decoded.
    pub async fn update_user_permission(
        &self,
        path: &str,
        record: &UserPermission,
    ) -> TagManagerResult<UserPermission> {
        let url = self.record_endpoint(path)?;
        debug!(path, "tagmanager update user permission");
        let response = self
            .send(self.request(Method::PUT, url).json(record))
            .await?;
        decode(response).await
    }

    /// Delete one permission record.
    ///
    /// # Errors
    /// Returns an error if the path is malformed or the request fails.
    pub async fn delete_user_permission(&self, path: &str) -> TagManagerResult<()> {
        let url = self.record_endpoint(path)?;
        debug!(path, "tagmanager delete user permission");
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

/// Run one upstream call under `cancel`, mapping failures to sync errors
/// named after `operation`.
///
/// # Errors
/// Returns `SyncError::Cancelled` if the signal fires first, otherwise the
/// mapped upstream failure.
pub async fn call<T, F>(cancel: &CancelSignal, operation: &str, fut: F) -> SyncResult<T>
where
    F: Future<Output = TagManagerResult<T>>,
{
    cancel
        .run(operation, fut)
        .await?
        .map_err(|e| e.to_sync_error(operation))
}

async fn decode<T: DeserializeOwned>(response: Response) -> TagManagerResult<T> {
    let body = response.bytes().await?;
    if body.is_empty() {
        return Ok(serde_json::from_slice(b"{}")?);
    }
    Ok(serde_json::from_slice(&body)?)
}

async fn api_error(response: Response) -> TagManagerError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback_message(status, &body));

    TagManagerError::Api {
        status: status.as_u16(),
        message,
        retry_after,
    }
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }
    trimmed.chars().take(256).collect()
}
