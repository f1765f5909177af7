//! Pageprobe engine: the remote analysis client and the background runner.
mod client;
mod engine;
mod types;

pub use client::{AnalysisClient, ClientSettings, EndpointStyle, ReqwestAnalysisClient};
pub use engine::EngineHandle;
pub use tokio_util::sync::CancellationToken;
pub use types::{AnalysisError, AttemptId, BrokenLinkInfo, EngineEvent, FailureKind, UrlInfo};
