use std::time::Duration;

use reqwest::Url;

use crate::{EngineError, FailureKind};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the robustify server, e.g. `http://localhost:5000/`.
    pub base_url: Url,
    pub connect_timeout: Duration,
    /// Timeout for plain request/response calls (LDN, mappings).
    pub request_timeout: Duration,
    /// Timeout for a whole robustify stream; `None` waits for the server.
    pub stream_timeout: Option<Duration>,
    pub redirect_limit: usize,
    pub max_line_bytes: usize,
}

impl ClientSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            stream_timeout: None,
            redirect_limit: 5,
            max_line_bytes: 1024 * 1024,
        }
    }

    /// Parses `base_url` and applies the default timeouts and limits.
    pub fn for_server(base_url: &str) -> Result<Self, EngineError> {
        let parsed = Url::parse(base_url)
            .map_err(|err| EngineError::new(FailureKind::InvalidUrl, err.to_string()))?;
        Ok(Self::new(parsed))
    }

    /// `base_url` with `segments` appended as path segments (each one percent-encoded).
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, EngineError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                EngineError::new(
                    FailureKind::InvalidUrl,
                    format!("{} cannot be a base URL", self.base_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, EngineError> {
        let redirect_limit = self.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .redirect(policy)
            .build()
            .map_err(|err| EngineError::new(FailureKind::Network, err.to_string()))
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> EngineError {
    if err.is_timeout() {
        return EngineError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return EngineError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    EngineError::new(FailureKind::Network, err.to_string())
}
