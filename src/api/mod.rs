//! HTTP client wrapper around the backend's user endpoints.
//!
//! [`UserApi`] is the seam the service depends on; [`HttpUserApi`] is the
//! reqwest-backed implementation. Each call issues exactly one request and
//! maps any failure to an [`ApiError`]. No retries, no caching.

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{Config, endpoints};
use crate::error::{ApiError, ApiResult, ConfigError};
use crate::model::{User, UserPayload};

pub const API_KEY_HEADER: &str = "x-api-key";

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Backend operations on user records.
pub trait UserApi: Send + Sync {
    fn list(&self) -> ApiResult<Vec<User>>;
    fn get_by_id(&self, id: &str) -> ApiResult<User>;
    fn create(&self, payload: &UserPayload) -> ApiResult<User>;
    fn update(&self, id: &str, payload: &UserPayload) -> ApiResult<User>;
    /// Body is backend-defined; an empty body decodes to `Null`.
    fn delete(&self, id: &str) -> ApiResult<serde_json::Value>;
    fn delete_all(&self) -> ApiResult<serde_json::Value>;
}

/// `UserApi` over blocking reqwest with JSON and API-key default headers.
pub struct HttpUserApi {
    client: Client,
    config: Config,
}

impl HttpUserApi {
    /// # Errors
    ///
    /// Fails when the API key is not a valid header value or the client
    /// cannot be constructed.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(config.api_key().expose_secret())
            .map_err(|_| ConfigError::InvalidApiKey)?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, op: &'static str) -> ApiResult<T> {
        debug!(op, "sending request");
        let result = request
            .send()
            .map_err(map_transport_error)
            .and_then(|response| {
                let status = response.status();
                let body = response.bytes().map_err(map_transport_error)?;
                if !status.is_success() {
                    return Err(map_status_error(status, body.as_ref()));
                }
                decode_body(body.as_ref())
            });
        if let Err(e) = &result {
            warn!(op, error = %e, "request failed");
        }
        result
    }
}

impl UserApi for HttpUserApi {
    fn list(&self) -> ApiResult<Vec<User>> {
        let url = self.config.url(endpoints::users());
        self.execute(self.client.get(url), "list")
    }

    fn get_by_id(&self, id: &str) -> ApiResult<User> {
        let url = self.config.url(&endpoints::user_by_id(id));
        self.execute(self.client.get(url), "get_by_id")
    }

    fn create(&self, payload: &UserPayload) -> ApiResult<User> {
        let url = self.config.url(endpoints::users());
        self.execute(self.client.post(url).json(payload), "create")
    }

    fn update(&self, id: &str, payload: &UserPayload) -> ApiResult<User> {
        let url = self.config.url(&endpoints::user_by_id(id));
        self.execute(self.client.patch(url).json(payload), "update")
    }

    fn delete(&self, id: &str) -> ApiResult<serde_json::Value> {
        let url = self.config.url(&endpoints::user_by_id(id));
        self.execute(self.client.delete(url), "delete")
    }

    fn delete_all(&self) -> ApiResult<serde_json::Value> {
        let url = self.config.url(endpoints::users());
        self.execute(self.client.delete(url), "delete_all")
    }
}

/// A blank success body decodes as JSON `null`.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let json: &[u8] = if body.iter().all(u8::is_ascii_whitespace) { b"null" } else { body };
    serde_json::from_slice(json).map_err(|e| ApiError::Decode(e.to_string()))
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout(error.to_string())
    } else {
        ApiError::Transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = error_message(body).unwrap_or_else(|| {
        let preview = body_preview(body);
        if preview.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            preview
        }
    });
    ApiError::Status { status: status.as_u16(), message }
}

/// `message` or `error` string from a JSON error body.
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|k| value.get(k).and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
