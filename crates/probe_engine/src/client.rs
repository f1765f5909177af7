use std::time::Duration;

use futures_util::StreamExt;
use probe_logging::{probe_debug, probe_info};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{AnalysisError, FailureKind, UrlInfo};

/// How the target URL is passed to the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointStyle {
    /// `GET <base>?url=<target>`
    #[default]
    Query,
    /// `GET <base>/url-info?url=<target>`
    UrlInfo,
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: Url,
    pub endpoint: EndpointStyle,
    pub connect_timeout: Duration,
    pub max_body_bytes: u64,
}

impl ClientSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            endpoint: EndpointStyle::default(),
            connect_timeout: Duration::from_secs(10),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }

    /// Service URL for analysing `target`. The target is query-encoded.
    pub fn request_url(&self, target: &str) -> Url {
        let mut url = self.base_url.clone();
        if self.endpoint == EndpointStyle::UrlInfo {
            let path = format!("{}/url-info", url.path().trim_end_matches('/'));
            url.set_path(&path);
        }
        url.query_pairs_mut().append_pair("url", target);
        url
    }
}

#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Requests one analysis of `url`. Settles with `UserCancellation` as soon
    /// as `cancel` fires, whatever the state of the request.
    async fn analyze(&self, url: &str, cancel: &CancellationToken)
        -> Result<UrlInfo, AnalysisError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestAnalysisClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestAnalysisClient {
    pub fn new(settings: ClientSettings) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| {
                AnalysisError::new(FailureKind::FetchFailure { status: None }, err.to_string())
            })?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    async fn fetch_report(&self, url: &str) -> Result<UrlInfo, AnalysisError> {
        let request_url = self.settings.request_url(url);
        probe_debug!("GET {}", request_url);

        let response = self
            .client
            .get(request_url.as_str())
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::new(
                FailureKind::FetchFailure {
                    status: Some(status.as_u16()),
                },
                format!("Failed with status: {}", status.as_u16()),
            ));
        }

        let max_bytes = self.settings.max_body_bytes;
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if body.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(AnalysisError::new(
                    FailureKind::FetchFailure { status: None },
                    format!("response larger than {max_bytes} bytes"),
                ));
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice::<UrlInfo>(&body)
            .map_err(|err| AnalysisError::new(FailureKind::ParseFailure, err.to_string()))
    }
}

#[async_trait::async_trait]
impl AnalysisClient for ReqwestAnalysisClient {
    async fn analyze(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<UrlInfo, AnalysisError> {
        if cancel.is_cancelled() {
            return Err(AnalysisError::user_cancellation());
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AnalysisError::user_cancellation()),
            result = self.fetch_report(url) => result,
        };

        match &result {
            Ok(info) => probe_info!("analysis ok url={} title={:?}", url, info.page_title),
            Err(err) => probe_info!("analysis failed url={}: {}", url, err),
        }
        result
    }
}

fn map_reqwest_error(err: reqwest::Error) -> AnalysisError {
    let status = err.status().map(|status| status.as_u16());
    AnalysisError::new(FailureKind::FetchFailure { status }, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base: &str, endpoint: EndpointStyle) -> ClientSettings {
        ClientSettings {
            endpoint,
            ..ClientSettings::new(Url::parse(base).unwrap())
        }
    }

    #[test]
    fn query_style_appends_encoded_target() {
        let url = settings("http://localhost:1534/url-info", EndpointStyle::Query)
            .request_url("https://a.com/page?x=1&y=2");
        assert_eq!(
            url.as_str(),
            "http://localhost:1534/url-info?url=https%3A%2F%2Fa.com%2Fpage%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn url_info_style_appends_path_segment() {
        let url = settings("http://localhost:1534/api/", EndpointStyle::UrlInfo)
            .request_url("https://a.com");
        assert_eq!(
            url.as_str(),
            "http://localhost:1534/api/url-info?url=https%3A%2F%2Fa.com"
        );
    }

    #[test]
    fn existing_query_is_kept() {
        let url = settings("http://svc.local/analyze?key=v", EndpointStyle::Query)
            .request_url("https://a.com");
        assert_eq!(
            url.as_str(),
            "http://svc.local/analyze?key=v&url=https%3A%2F%2Fa.com"
        );
    }
}
