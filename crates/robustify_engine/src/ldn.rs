use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Response;
use robustify_logging::{robustify_info, robustify_warn};
use serde::{Deserialize, Serialize};

use crate::settings::map_reqwest_error;
use crate::{ClientSettings, EngineError, FailureKind, Mappings};

const JSON: &str = "application/json";

/// Error body the server sends to JSON clients: `{ok, timestamp, error}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

#[derive(Serialize)]
struct SendLdnRequest<'a> {
    ld_server_url: &'a str,
}

/// Request/response wrappers around the server's LDN and mappings routes.
#[derive(Debug, Clone)]
pub struct LdnClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl LdnClient {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let client = settings.build_client()?;
        Ok(Self { settings, client })
    }

    /// Fetches the LDN offering the mappings of `key` to the LD server, as
    /// JSON indented with two spaces.
    pub async fn get_ldn(&self, key: &str, ld_server_url: &str) -> Result<String, EngineError> {
        let mut url = self.settings.endpoint(&["ldn", key])?;
        url.query_pairs_mut()
            .append_pair("ld_server_url", ld_server_url);
        robustify_info!("Fetching LDN for {} from {}", key, url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, JSON)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        let value: serde_json::Value = read_json(response).await?;
        serde_json::to_string_pretty(&value)
            .map_err(|err| EngineError::new(FailureKind::NotJson, err.to_string()))
    }

    /// Posts an LDN to the preview route and returns the location of the
    /// preview page the server redirected to.
    pub async fn preview_ldn(&self, ldn: &str) -> Result<String, EngineError> {
        let url = self.settings.endpoint(&["preview"])?;
        robustify_info!("Requesting LDN preview from {}", url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON)
            .body(ldn.to_string())
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        Ok(response.url().to_string())
    }

    /// Asks the server to deliver the LDN for `key` to the LD server's inbox.
    /// Returns the status the inbox answered with.
    pub async fn send_ldn(&self, key: &str, ld_server_url: &str) -> Result<u16, EngineError> {
        let url = self.settings.endpoint(&["ldn", key])?;
        let body = serde_json::to_vec(&SendLdnRequest { ld_server_url })
            .map_err(|err| EngineError::new(FailureKind::NotJson, err.to_string()))?;
        robustify_info!("Sending LDN for {} to {}", key, ld_server_url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .body(body)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        Ok(response.status().as_u16())
    }

    /// Fetches the URI-R -> URI-M records stored after the last robustify run.
    pub async fn fetch_mappings(&self, key: &str) -> Result<Mappings, EngineError> {
        let url = self.settings.endpoint(&["mappings", key])?;
        robustify_info!("Fetching mappings for {} from {}", key, url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, JSON)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        read_json(response).await
    }
}

async fn ensure_success(response: Response) -> Result<Response, EngineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    let message = match serde_json::from_slice::<ErrorEnvelope>(&body) {
        Ok(envelope) => envelope.error,
        Err(_) => status.to_string(),
    };
    robustify_warn!("Server answered {}: {}", status, message);
    Err(EngineError::new(
        FailureKind::HttpStatus(status.as_u16()),
        message,
    ))
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, EngineError> {
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body).map_err(|err| EngineError::new(FailureKind::NotJson, err.to_string()))
}
