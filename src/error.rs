//! Error types for the Jenkins bridge
//!
//! Two layers: [`RemoteError`] is built once at the Jenkins capability
//! boundary from the transport failure, [`BridgeError`] is what the rest of
//! the crate propagates. [`ErrorCategory`] is the caller-facing classification
//! with its remediation checklist.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

// == Remote Error ==
/// Failure reported by a Jenkins call path.
#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    /// The request exceeded its connect or read timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The server could not be reached
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}: {body}")]
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// The response body could not be decoded
    #[error("invalid response from Jenkins: {0}")]
    Decode(String),

    /// Anything the transport did not describe more precisely
    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    /// Converts a transport error, inspecting it once.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return RemoteError::Timeout(err.to_string());
        }
        if err.is_connect() {
            return RemoteError::ConnectionRefused(err.to_string());
        }
        if let Some(status) = err.status() {
            return RemoteError::HttpStatus {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                body: String::new(),
            };
        }
        if err.is_decode() {
            return RemoteError::Decode(err.to_string());
        }
        RemoteError::Other(err.to_string())
    }

    /// Builds an HTTP status failure, keeping the first part of the body.
    pub fn from_status(status: u16, url: impl Into<String>, body: &str) -> Self {
        let body: String = body.chars().take(200).collect();
        RemoteError::HttpStatus {
            status,
            url: url.into(),
            body: body.trim().to_string(),
        }
    }

    /// Returns the HTTP status when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// == Bridge Error ==
/// Unified error type for the bridge.
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    /// Bad caller input, reported without touching Jenkins
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Missing or invalid connection settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No handler is registered under this name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Both call paths to Jenkins failed
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl BridgeError {
    /// Classifies this error into a caller-facing category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::Validation(_) | BridgeError::UnknownTool(_) => ErrorCategory::Validation,
            BridgeError::Configuration(_) => ErrorCategory::Configuration,
            BridgeError::Remote(remote) => ErrorCategory::classify(remote),
        }
    }
}

// == Error Category ==
/// Caller-facing failure classes, each with a fixed remediation checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Timeout,
    ConnectionRefused,
    AuthenticationFailed,
    PermissionDenied,
    NotFound,
    Unclassified,
}

impl ErrorCategory {
    /// Maps a remote failure to a category.
    ///
    /// Typed variants decide first. Untyped failures fall back to substring
    /// inspection in priority order: timeout, connection, 401, 403, 404.
    pub fn classify(err: &RemoteError) -> Self {
        match err {
            RemoteError::Timeout(_) => ErrorCategory::Timeout,
            RemoteError::ConnectionRefused(_) => ErrorCategory::ConnectionRefused,
            RemoteError::HttpStatus { status: 401, .. } => ErrorCategory::AuthenticationFailed,
            RemoteError::HttpStatus { status: 403, .. } => ErrorCategory::PermissionDenied,
            RemoteError::HttpStatus { status: 404, .. } => ErrorCategory::NotFound,
            RemoteError::HttpStatus { .. } | RemoteError::Decode(_) => ErrorCategory::Unclassified,
            RemoteError::Other(message) => Self::classify_message(message),
        }
    }

    /// Substring classification for failures without structure.
    pub fn classify_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("timeout") || lower.contains("timed out") {
            ErrorCategory::Timeout
        } else if lower.contains("connection") {
            ErrorCategory::ConnectionRefused
        } else if lower.contains("401") || lower.contains("unauthorized") {
            ErrorCategory::AuthenticationFailed
        } else if lower.contains("403") || lower.contains("forbidden") {
            ErrorCategory::PermissionDenied
        } else if lower.contains("404") || lower.contains("not found") {
            ErrorCategory::NotFound
        } else {
            ErrorCategory::Unclassified
        }
    }

    /// Short headline used in reports.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "Invalid input",
            ErrorCategory::Configuration => "Jenkins is not configured",
            ErrorCategory::Timeout => "Timeout connecting to Jenkins",
            ErrorCategory::ConnectionRefused => "Cannot connect to Jenkins",
            ErrorCategory::AuthenticationFailed => "Authentication failed",
            ErrorCategory::PermissionDenied => "Permission denied",
            ErrorCategory::NotFound => "Resource not found",
            ErrorCategory::Unclassified => "Jenkins operation failed",
        }
    }

    /// Fixed troubleshooting steps for this category.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            ErrorCategory::Validation => &["Check the parameter values and try again."],
            ErrorCategory::Configuration => &[
                "Set JENKINS_URL, JENKINS_USERNAME and JENKINS_TOKEN (or JENKINS_PASSWORD)",
                "Or add a \"jenkins-mcp-server\" section to the editor settings file",
                "Restart the bridge after changing the configuration",
            ],
            ErrorCategory::Timeout => &[
                "Check the Jenkins server is running",
                "Verify the configured URL is correct",
                "Ensure the network or VPN connection is active",
                "Check firewall settings",
            ],
            ErrorCategory::ConnectionRefused => &[
                "Verify the Jenkins server is accessible",
                "Check the port is correct (usually 8080)",
                "Ensure the firewall allows the connection",
                "Test with: curl <url>/api/json",
            ],
            ErrorCategory::AuthenticationFailed => &[
                "Verify the username is correct",
                "Check the API token is valid and not expired",
                "Generate a new token in Jenkins under Your Name > Configure > API Token",
                "Update JENKINS_TOKEN with the new token",
            ],
            ErrorCategory::PermissionDenied => &[
                "Check the user has permission to access Jenkins",
                "Verify the user has permission for this operation",
                "Contact the Jenkins admin to grant the necessary permissions",
            ],
            ErrorCategory::NotFound => &[
                "Check the job or resource name is correct (case-sensitive)",
                "Verify the resource exists in Jenkins",
                "Ensure the user has permission to view the resource",
                "List all jobs with the 'list-jobs' tool",
            ],
            ErrorCategory::Unclassified => &[
                "Run the 'health-check' tool to verify the connection",
                "Check the Jenkins logs for more details",
                "Verify all parameters are correct",
                "Try the operation manually in the Jenkins UI",
            ],
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = match &self {
            BridgeError::Validation(_) | BridgeError::UnknownTool(_) => StatusCode::BAD_REQUEST,
            BridgeError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BridgeError::Remote(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "category": self.category(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the bridge.
pub type Result<T> = std::result::Result<T, BridgeError>;
