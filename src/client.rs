//! HTTP client for the remote inquiry service
//!
//! Wraps the three inquiry endpoints (start, respond, image upload)
//! behind typed request/response structs. Each call is a single
//! request/response with no retry or backoff; failures are logged and
//! propagated to the caller.
//!
//! Callers issuing two respond calls for the same session before either
//! resolves may interleave store updates. Nothing here serializes
//! per-session requests; the interactive loop awaits each turn, which
//! is the only ordering guarantee.

use crate::config::ApiConfig;
use crate::error::{MedquiryError, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Response from `POST /inquiry/start`
#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    /// Opaque session id issued by the service
    pub session_id: String,
    /// The assistant's opening question
    pub question: String,
}

/// Response shared by `POST /inquiry/respond` and the image upload
#[derive(Debug, Clone, Deserialize)]
pub struct TurnResponse {
    /// Next prompt from the assistant
    pub question: String,

    /// Selectable answer options, when the assistant offers any
    #[serde(default)]
    pub options: Vec<String>,

    /// Whether the inquiry has concluded
    #[serde(default)]
    pub is_finished: bool,

    /// Final answer text, present on the concluding turn
    #[serde(default)]
    pub final_answer: Option<String>,

    /// Preview of the retrieved context the assistant consulted
    #[serde(default)]
    pub retrieved_context_preview: Option<String>,

    /// Whether the next turn expects a file upload
    #[serde(default)]
    pub requires_file_upload: Option<bool>,
}

/// Request body for `POST /inquiry/respond`
#[derive(Debug, Serialize)]
struct RespondRequest<'a> {
    session_id: &'a str,
    answer: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    llm_detail: Option<&'a str>,
}

/// Client for the inquiry service
///
/// Holds a connection pool with a fixed timeout ceiling and the
/// `X-Token` auth header applied to every request.
///
/// # Examples
///
/// ```no_run
/// use medquiry::client::InquiryClient;
/// use medquiry::config::ApiConfig;
///
/// # async fn example() -> medquiry::error::Result<()> {
/// let client = InquiryClient::new(&ApiConfig::default())?;
/// let started = client.start_session().await?;
/// let turn = client
///     .send_message(&started.session_id, "Headache", None)
///     .await?;
/// println!("{}", turn.question);
/// # Ok(())
/// # }
/// ```
pub struct InquiryClient {
    client: Client,
    base_url: String,
}

impl InquiryClient {
    /// Create a new inquiry client
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or HTTP
    /// client initialization fails
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&config.token)
            .map_err(|e| MedquiryError::Config(format!("Invalid API token: {}", e)))?;
        headers.insert("X-Token", token);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .user_agent(concat!("medquiry/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MedquiryError::Api(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized inquiry client: base_url={}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Start a new inquiry session
    ///
    /// # Returns
    ///
    /// The new session id and the assistant's opening question
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, timeout, or a non-2xx status
    pub async fn start_session(&self) -> Result<StartResponse> {
        let url = format!("{}/inquiry/start", self.base_url);
        let response = self.execute(self.client.post(&url), "start_session").await?;

        let parsed = response.json::<StartResponse>().await.map_err(|e| {
            tracing::error!("start_session returned an unreadable body: {}", e);
            MedquiryError::Http(e)
        })?;

        tracing::debug!(session_id = %parsed.session_id, "Started inquiry session");
        Ok(parsed)
    }

    /// Send the user's answer for the current turn
    ///
    /// # Arguments
    ///
    /// * `session_id` - Session to answer in; must be non-empty
    /// * `answer` - The user's answer; must be non-empty
    /// * `llm_detail` - Optional free-form detail, forwarded only when present
    ///
    /// # Errors
    ///
    /// Returns error on empty inputs, transport failure, timeout, or a
    /// non-2xx status
    pub async fn send_message(
        &self,
        session_id: &str,
        answer: &str,
        llm_detail: Option<&str>,
    ) -> Result<TurnResponse> {
        if session_id.is_empty() {
            return Err(MedquiryError::Api("session_id cannot be empty".to_string()).into());
        }
        if answer.is_empty() {
            return Err(MedquiryError::Api("answer cannot be empty".to_string()).into());
        }

        let url = format!("{}/inquiry/respond", self.base_url);
        let body = RespondRequest {
            session_id,
            answer,
            llm_detail,
        };

        let response = self
            .execute(self.client.post(&url).json(&body), "send_message")
            .await?;

        let parsed = response.json::<TurnResponse>().await.map_err(|e| {
            tracing::error!("send_message returned an unreadable body: {}", e);
            MedquiryError::Http(e)
        })?;

        Ok(parsed)
    }

    /// Upload an image for the current turn
    ///
    /// Sent as multipart form data with a `session_id` text part and a
    /// `file` binary part.
    ///
    /// # Arguments
    ///
    /// * `session_id` - Session the upload belongs to; must be non-empty
    /// * `file_name` - Original file name, forwarded with the part
    /// * `bytes` - Raw file contents
    ///
    /// # Errors
    ///
    /// Returns error on empty session id, transport failure, timeout,
    /// or a non-2xx status
    pub async fn upload_image(
        &self,
        session_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<TurnResponse> {
        if session_id.is_empty() {
            return Err(MedquiryError::Api("session_id cannot be empty".to_string()).into());
        }

        let url = format!("{}/inquiry/tongue_upload", self.base_url);
        let form = Form::new()
            .text("session_id", session_id.to_string())
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()));

        let response = self
            .execute(self.client.post(&url).multipart(form), "upload_image")
            .await?;

        let parsed = response.json::<TurnResponse>().await.map_err(|e| {
            tracing::error!("upload_image returned an unreadable body: {}", e);
            MedquiryError::Http(e)
        })?;

        Ok(parsed)
    }

    /// Send a request and fail on any non-2xx status
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<reqwest::Response> {
        match request.send().await.and_then(|r| r.error_for_status()) {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::error!("{} failed: {}", operation, e);
                Err(MedquiryError::Http(e).into())
            }
        }
    }
}
