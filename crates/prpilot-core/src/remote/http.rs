use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

use super::RemoteService;
use crate::error::RemoteError;
use crate::kind::TargetSystemKind;
use crate::model::{GenerationInput, GenerationResult};

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Clone)]
pub struct HttpRemoteService {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRemoteService {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> RemoteError {
        if e.is_timeout() {
            RemoteError::Timeout(self.timeout)
        } else {
            RemoteError::Unavailable(e.to_string())
        }
    }

    /// Turn a non-success response into `Rejected`, preferring the service's
    /// own `detail` message.
    async fn rejection(response: Response) -> RemoteError {
        let status = response.status();
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| "Failed to generate PR".to_string());

        RemoteError::Rejected {
            status: status.as_u16(),
            detail,
        }
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn hello(&self) -> Result<(), RemoteError> {
        let url = format!("{}/api/hello", self.base_url);
        tracing::debug!(%url, "probing generation service");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(RemoteError::Rejected {
                status: response.status().as_u16(),
                detail: "API test failed".to_string(),
            });
        }

        // Any JSON body counts; we only care that the service answers.
        response
            .json::<serde_json::Value>()
            .await
            .map(|_| ())
            .map_err(|e| RemoteError::Malformed(e.to_string()))
    }

    async fn generate(
        &self,
        kind: TargetSystemKind,
        input: &GenerationInput,
    ) -> Result<GenerationResult, RemoteError> {
        let url = format!("{}/api/generate-pr/{}", self.base_url, kind.as_str());
        tracing::debug!(%url, "requesting remote generation");

        let response = self
            .client
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str::<GenerationResult>(&body)
            .map_err(|e| RemoteError::Malformed(e.to_string()))
    }
}
