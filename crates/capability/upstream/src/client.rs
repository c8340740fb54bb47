use crate::envelope::{extract_rows, extract_token};
use crate::{LOGIN_ENDPOINT, TelemetryApi, TorCredentials, UpstreamError};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{info, warn};

/// 基于 reqwest 的上游客户端，每次调用单独设置超时。
#[derive(Clone)]
pub struct HttpTelemetryApi {
    client: Client,
    base_url: String,
    login_timeout: Duration,
    request_timeout: Duration,
}

impl HttpTelemetryApi {
    pub fn new(
        base_url: impl Into<String>,
        login_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .build()
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            login_timeout,
            request_timeout,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl TelemetryApi for HttpTelemetryApi {
    async fn login(&self, credentials: &TorCredentials) -> Result<String, UpstreamError> {
        let response = self
            .client
            .post(self.url(LOGIN_ENDPOINT))
            .timeout(self.login_timeout)
            .json(&json!({
                "username": credentials.username,
                "password": credentials.password,
            }))
            .send()
            .await
            .map_err(transport_error)?;
        let body = read_json(response).await?;
        match extract_token(&body) {
            Some(token) => {
                info!(target: "fleet.upstream", username = %credentials.username, "login_succeeded");
                Ok(token)
            }
            None => {
                warn!(target: "fleet.upstream", username = %credentials.username, "login_without_token");
                Err(UpstreamError::MissingToken)
            }
        }
    }

    async fn fetch_page(
        &self,
        token: &str,
        endpoint: &str,
        body: &Value,
    ) -> Result<Vec<Value>, UpstreamError> {
        let response = self
            .client
            .post(self.url(endpoint))
            .timeout(self.request_timeout)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        let body = read_json(response).await?;
        Ok(extract_rows(body))
    }
}

/// 校验状态码并解析 JSON 响应体。
async fn read_json(response: Response) -> Result<Value, UpstreamError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(UpstreamError::Unauthorized);
    }
    if !status.is_success() {
        return Err(UpstreamError::Status(status.as_u16()));
    }
    response
        .json::<Value>()
        .await
        .map_err(|err| UpstreamError::Decode(err.to_string()))
}

fn transport_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        return UpstreamError::Transport(format!("timeout: {err}"));
    }
    UpstreamError::Transport(err.to_string())
}
