use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub type AttemptId = u64;

/// Analysis report as returned by the analysis service.
///
/// Every field except `baseUrl` is required; a missing or mistyped field fails
/// deserialization as a whole. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlInfo {
    #[serde(default)]
    pub base_url: Option<String>,
    pub html_version: String,
    pub page_title: String,
    pub h1_count: u32,
    pub h2_count: u32,
    pub h3_count: u32,
    pub h4_count: u32,
    pub internal_links_count: u32,
    pub external_links_count: u32,
    pub broken_links: Vec<BrokenLinkInfo>,
    pub has_login_form: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLinkInfo {
    pub url: String,
    pub status_code: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Settled {
        attempt: AttemptId,
        url: String,
        result: Result<UrlInfo, AnalysisError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct AnalysisError {
    pub kind: FailureKind,
    pub message: String,
}

impl AnalysisError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn user_cancellation() -> Self {
        Self::new(FailureKind::UserCancellation, "aborted by caller")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport error, or a non-success status when `status` is set.
    FetchFailure { status: Option<u16> },
    ParseFailure,
    UserCancellation,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::FetchFailure { status: Some(code) } => {
                write!(f, "fetch failure (http status {code})")
            }
            FailureKind::FetchFailure { status: None } => write!(f, "fetch failure"),
            FailureKind::ParseFailure => write!(f, "parse failure"),
            FailureKind::UserCancellation => write!(f, "user cancellation"),
        }
    }
}
