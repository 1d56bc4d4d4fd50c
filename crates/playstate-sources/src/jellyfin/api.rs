use crate::error::ServerError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, trace};

const TOKEN_HEADER: &str = "x-emby-token";

/// `Fields` requested for played items during export
pub const PLAYED_ITEM_FIELDS: &str = "UserData,RunTimeTicks,ProviderIds";

#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDataDto {
    #[serde(rename = "PlaybackPositionTicks", default)]
    pub playback_position_ticks: Option<u64>,
    #[serde(rename = "PlayCount", default)]
    pub play_count: Option<u32>,
    #[serde(rename = "IsFavorite", default)]
    pub is_favorite: Option<bool>,
    #[serde(rename = "Played", default)]
    pub played: Option<bool>,
    #[serde(rename = "LastPlayedDate", default)]
    pub last_played_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseItemDto {
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Type", default)]
    pub item_type: Option<String>,
    #[serde(rename = "UserData", default)]
    pub user_data: Option<UserDataDto>,
    /// Provider name -> id; values may be null or empty on real servers
    #[serde(rename = "ProviderIds", default)]
    pub provider_ids: Option<HashMap<String, Option<String>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemsResponse {
    #[serde(rename = "Items", default)]
    pub items: Vec<BaseItemDto>,
    #[serde(rename = "TotalRecordCount", default)]
    pub total_record_count: usize,
}

/// Thin HTTP layer over the Jellyfin REST API.
///
/// Every request carries the API key header and is bounded by the client
/// timeout. Failures are logged with whatever response detail is available
/// and returned as [`ServerError`].
pub struct JellyfinHttpClient {
    client: Client,
    base_url: String,
}

impl JellyfinHttpClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ServerError> {
        let base_url = normalize_base_url(base_url)?;

        let client = Client::builder()
            .default_headers({
                let mut headers = HeaderMap::new();
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                let mut token = HeaderValue::from_str(api_key)
                    .map_err(|_| ServerError::InvalidToken("contains characters not allowed in a header".to_string()))?;
                token.set_sensitive(true);
                headers.insert(HeaderName::from_static(TOKEN_HEADER), token);
                headers
            })
            .timeout(timeout)
            .build()
            .map_err(|e| ServerError::Transport {
                url: base_url.clone(),
                source: e,
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, ServerError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!(method = "GET", url = %url, "Sending request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error("GET", &url, e))?;
        let response = check_status("GET", &url, response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| transport_error("GET", &url, e))?;
        trace!(url = %url, body = %body, "Response body");

        serde_json::from_str(&body).map_err(|e| {
            error!(url = %url, error = %e, body = %body, "Could not decode response");
            ServerError::Decode {
                url: url.clone(),
                message: e.to_string(),
            }
        })
    }

    pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<(), ServerError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        if tracing::enabled!(tracing::Level::DEBUG) {
            let payload = serde_json::to_string(body).unwrap_or_default();
            debug!(method = "POST", url = %url, body = %payload, "Sending request");
        }

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error("POST", &url, e))?;
        check_status("POST", &url, response).await?;
        Ok(())
    }
}

/// Validate a server URL and strip trailing slashes
pub fn normalize_base_url(raw: &str) -> Result<String, ServerError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match host {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ServerError::InvalidUrl(raw.to_string())),
    }
}

fn transport_error(method: &str, url: &str, e: reqwest::Error) -> ServerError {
    if e.is_timeout() {
        error!(method, url, "Request timed out");
        ServerError::Timeout { url: url.to_string() }
    } else {
        error!(method, url, error = %e, "Request failed");
        ServerError::Transport {
            url: url.to_string(),
            source: e,
        }
    }
}

async fn check_status(method: &str, url: &str, response: Response) -> Result<Response, ServerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = format!("{:?}", response.headers());
    let body = response.text().await.unwrap_or_default();
    error!(
        method,
        url,
        status = status.as_u16(),
        response_headers = %headers,
        response_body = %body,
        "Server returned an error status"
    );
    Err(ServerError::Status {
        status: status.as_u16(),
        url: url.to_string(),
    })
}
