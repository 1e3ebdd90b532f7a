//! WhatsApp service HTTP client
//!
//! Issues the three request kinds the service understands (status check, JSON
//! text message, multipart file upload) and folds every outcome into an
//! [`ApiResult`]. Failures are values here, never `Err`s.

pub mod mime;
pub mod types;

use log::{debug, warn};
use reqwest::{multipart, RequestBuilder, StatusCode};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

use types::{file_name_of, SendMessageRequest, WhatsappStatus};
pub use types::{FileInfo, StatusInfo};

/// Failure taxonomy of a single API call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection, DNS or body-read failure
    #[error("{0}")]
    Transport(String),

    /// Non-2xx status or a body that is not a JSON object
    #[error("{message}")]
    Protocol { status: Option<u16>, message: String },

    /// Well-formed response whose own `success` flag is not `true`
    #[error("{0}")]
    Application(String),

    /// Local file missing or unreadable; no request was sent
    #[error("{0}")]
    LocalInput(String),
}

/// Normalized outcome of one API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    pub success: bool,
    pub payload: Map<String, Value>,
    /// `None` when no HTTP response was received
    pub http_status: Option<u16>,
    pub error: Option<ApiError>,
    /// Response text exactly as received; `None` when no response arrived
    pub body: Option<String>,
}

impl ApiResult {
    fn succeeded(http_status: u16, payload: Map<String, Value>) -> Self {
        Self {
            success: true,
            payload,
            http_status: Some(http_status),
            error: None,
            body: None,
        }
    }

    fn failed(http_status: Option<u16>, payload: Map<String, Value>, error: ApiError) -> Self {
        Self {
            success: false,
            payload,
            http_status,
            error: Some(error),
            body: None,
        }
    }

    /// Human-readable failure text, if the call failed
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// Whether the server answered with a 2xx status
    pub fn server_online(&self) -> bool {
        self.http_status
            .map_or(false, |code| (200..300).contains(&code))
    }

    /// Connection state from a `/status` payload; defaults when absent
    pub fn status_info(&self) -> StatusInfo {
        self.payload
            .get("whatsapp")
            .cloned()
            .and_then(|v| serde_json::from_value::<WhatsappStatus>(v).ok())
            .map(StatusInfo::from)
            .unwrap_or_default()
    }

    /// `fileInfo` echoed by `/send-file`
    pub fn file_info(&self) -> Option<FileInfo> {
        self.payload
            .get("fileInfo")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

/// Client for the WhatsApp service
pub struct ApiClient {
    /// Base URL without trailing slash (e.g., "http://localhost:3000")
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("wa-tester/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /status`
    pub async fn get_status(&self) -> ApiResult {
        let url = self.url("/status");
        debug!("GET {}", url);
        self.dispatch(self.client.get(&url), "status").await
    }

    /// `POST /send-message` with `{phoneNumber, message}`.
    /// The phone number is passed through as-is; the server validates it.
    pub async fn send_message(&self, phone_number: &str, message: &str) -> ApiResult {
        let url = self.url("/send-message");
        debug!("POST {} ({} chars)", url, message.chars().count());
        let body = SendMessageRequest {
            phone_number,
            message,
        };
        self.dispatch(self.client.post(&url).json(&body), "send-message")
            .await
    }

    /// `POST /send-file` with the file at `path`.
    /// A missing file yields `ApiError::LocalInput` without any request.
    pub async fn send_file(
        &self,
        phone_number: &str,
        path: &Path,
        caption: Option<&str>,
    ) -> ApiResult {
        // File handle lives only inside the read
        let content = match tokio::fs::read(path).await {
            Ok(content) => content,
            Err(e) => {
                let message = if e.kind() == std::io::ErrorKind::NotFound {
                    format!("File not found: {}", path.display())
                } else {
                    format!("Failed to read {}: {}", path.display(), e)
                };
                warn!("send-file skipped: {}", message);
                return ApiResult::failed(None, Map::new(), ApiError::LocalInput(message));
            }
        };

        self.send_file_bytes(
            phone_number,
            &file_name_of(path),
            content,
            mime::detect_mime_type(path),
            caption,
        )
        .await
    }

    /// `POST /send-file` with in-memory content
    pub async fn send_file_bytes(
        &self,
        phone_number: &str,
        file_name: &str,
        content: Vec<u8>,
        mime_type: &str,
        caption: Option<&str>,
    ) -> ApiResult {
        let url = self.url("/send-file");
        debug!(
            "POST {} ({}, {}, {} bytes)",
            url,
            file_name,
            mime_type,
            content.len()
        );

        let part = match multipart::Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
        {
            Ok(part) => part,
            Err(e) => {
                let error = ApiError::LocalInput(format!("Invalid MIME type '{}': {}", mime_type, e));
                return ApiResult::failed(None, Map::new(), error);
            }
        };

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("phoneNumber", phone_number.to_string());
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }

        self.dispatch(self.client.post(&url).multipart(form), "send-file")
            .await
    }

    /// Send once and normalize; no retries
    async fn dispatch(&self, request: RequestBuilder, operation: &str) -> ApiResult {
        let result = match request.send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(body) => normalize(status, &body),
                    Err(e) => ApiResult::failed(
                        Some(status.as_u16()),
                        Map::new(),
                        ApiError::Transport(format!("Failed to read response body: {}", e)),
                    ),
                }
            }
            Err(e) => ApiResult::failed(None, Map::new(), ApiError::Transport(e.to_string())),
        };

        if let Some(ref error) = result.error {
            warn!("{} failed: {:?}", operation, error);
        }
        result
    }
}

/// Merge the transport status and the payload's own `success` flag
fn normalize(status: StatusCode, body: &str) -> ApiResult {
    let mut result = classify(status, body);
    result.body = Some(body.to_string());
    result
}

fn classify(status: StatusCode, body: &str) -> ApiResult {
    let code = Some(status.as_u16());

    let payload = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            let error = ApiError::Protocol {
                status: code,
                message: format!("HTTP {}: expected a JSON object body", status),
            };
            return ApiResult::failed(code, Map::new(), error);
        }
        Err(e) => {
            let error = ApiError::Protocol {
                status: code,
                message: format!("HTTP {}: response is not valid JSON ({})", status, e),
            };
            return ApiResult::failed(code, Map::new(), error);
        }
    };

    let server_error = payload
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string);

    if !status.is_success() {
        let message = server_error.unwrap_or_else(|| format!("HTTP {}", status));
        let error = ApiError::Protocol {
            status: code,
            message,
        };
        return ApiResult::failed(code, payload, error);
    }

    match payload.get("success") {
        None | Some(Value::Bool(true)) => ApiResult::succeeded(status.as_u16(), payload),
        Some(_) => {
            let message =
                server_error.unwrap_or_else(|| "Server reported success=false".to_string());
            ApiResult::failed(code, payload, ApiError::Application(message))
        }
    }
}
