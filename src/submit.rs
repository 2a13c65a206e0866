//! Report delivery
//!
//! Two independent routes: the authenticated intake API (multipart report,
//! optional bundle) and the hosted form fallback (URL-encoded, sanitized
//! fields). Both report failure as values.

use crate::archive::Archive;
use crate::error::SubmitError;
use crate::sanitize::sanitize;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("diagdrop/", env!("CARGO_PKG_VERSION"));

/// Maximum length for error body content in error messages
const MAX_ERROR_BODY_LEN: usize = 200;

// ============================================================================
// Intake API
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Os,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Os => "os",
        }
    }
}

/// One feedback report, built once per submission attempt.
#[derive(Debug, Clone)]
pub struct Report {
    pub text: String,
    pub email: String,
    pub category: Category,
    pub subject: String,
    pub attachment: Option<Archive>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub error_message: Option<String>,
}

impl SubmissionOutcome {
    pub fn delivered() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    success: Option<bool>,
    error: Option<String>,
    message: Option<String>,
}

/// Truncate an error body and redact it if it looks like it carries secrets.
fn sanitize_error_body(body: &str) -> String {
    const SECRET_PATTERNS: &[&str] = &["token", "secret", "password", "credential", "bearer"];

    let truncated = crate::util::truncate(body.trim(), MAX_ERROR_BODY_LEN);
    let lower = truncated.to_lowercase();
    if SECRET_PATTERNS.iter().any(|pattern| lower.contains(pattern)) {
        return "(error details redacted - may contain sensitive data)".to_string();
    }
    truncated
}

/// Client for the authenticated feedback intake endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, SubmitError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SubmitError::Client(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: format!("{}/feedback", base_url.trim_end_matches('/')),
            token: token.to_string(),
        })
    }

    /// Send a report. Never fails: errors come back in the outcome.
    pub async fn submit(&self, report: &Report) -> SubmissionOutcome {
        match self.try_submit(report).await {
            Ok(()) => SubmissionOutcome::delivered(),
            Err(err) => {
                tracing::warn!("report submission failed: {}", err);
                SubmissionOutcome::failed(err.to_string())
            }
        }
    }

    async fn try_submit(&self, report: &Report) -> Result<(), SubmitError> {
        let mut form = Form::new()
            .text("text", report.text.clone())
            .text("email", report.email.clone())
            .text("category", report.category.as_str())
            .text("subject", report.subject.clone());

        if let Some(archive) = &report.attachment {
            let part = Part::bytes(archive.bytes()?)
                .file_name(archive.file_name().to_string())
                .mime_str("application/gzip")
                .map_err(|e| SubmitError::Client(e.to_string()))?;
            form = form.part("report", part);
        }

        let resp = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let parsed: ApiResponse = serde_json::from_str(&body).unwrap_or_default();

        if status.is_success() && parsed.success != Some(false) {
            tracing::info!(status = status.as_u16(), "report accepted");
            return Ok(());
        }

        let message = parsed
            .error
            .or(parsed.message)
            .unwrap_or_else(|| sanitize_error_body(&body));
        Err(SubmitError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

// ============================================================================
// Hosted form fallback
// ============================================================================

/// Field keys assigned by the hosted form: title, username, body, email.
pub const FORM_FIELD_KEYS: [&str; 4] = [
    "entry.55383705",
    "entry.226915453",
    "entry.2017124825",
    "entry.31617144",
];

/// Transport status codes (curl numbering).
pub const STATUS_OK: i32 = 0;
pub const STATUS_FAILED: i32 = 1;
pub const STATUS_CONNECT: i32 = 7;
pub const STATUS_TIMEOUT: i32 = 28;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub title: String,
    pub username: String,
    pub body: String,
    pub email: String,
}

impl FormSubmission {
    /// Sanitize every field and URL-encode them under the fixed keys.
    pub fn encode(&self) -> String {
        let values = [&self.title, &self.username, &self.body, &self.email];
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in FORM_FIELD_KEYS.iter().zip(values) {
            serializer.append_pair(key, &sanitize(value));
        }
        serializer.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormResponse {
    pub success: bool,
    pub raw_error: String,
    pub status_code: i32,
}

/// Client for the hosted form endpoint.
#[derive(Debug, Clone)]
pub struct FormClient {
    http: reqwest::Client,
    url: String,
}

impl FormClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SubmitError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SubmitError::Client(e.to_string()))?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    /// Post the form. Success means the request completed; the response
    /// status and body are not inspected.
    pub async fn submit_form(&self, form: &FormSubmission) -> FormResponse {
        let result = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form.encode())
            .send()
            .await;

        match result {
            Ok(resp) => {
                tracing::debug!(status = resp.status().as_u16(), "form endpoint responded");
                FormResponse {
                    success: true,
                    raw_error: String::new(),
                    status_code: STATUS_OK,
                }
            }
            Err(err) => {
                let status_code = if err.is_timeout() {
                    STATUS_TIMEOUT
                } else if err.is_connect() {
                    STATUS_CONNECT
                } else {
                    STATUS_FAILED
                };
                FormResponse {
                    success: false,
                    raw_error: err.to_string(),
                    status_code,
                }
            }
        }
    }
}
