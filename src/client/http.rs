use async_trait::async_trait;
use reqwest::{
    header,
    multipart::{Form, Part},
    Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::client::error::ClientError;
use crate::client::platform::Photo;
use crate::client::report::{IssueSink, PhotoVerifier, VerificationResult};
use crate::features::issues::dtos::{CreateIssueDto, IssueResponseDto};
use crate::features::users::dtos::UserProfileResponseDto;
use crate::shared::constants::CLIENT_USER_AGENT;
use crate::shared::recent_logs::log_operation;
use crate::shared::types::ApiResponse;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base of the backend API including the `/api` prefix
    pub api_base_url: String,
    /// Bound on the photo verification upload
    pub verify_timeout: Duration,
    /// Sent as `x-api-key` on AI calls when the backend gates them
    pub api_key: Option<String>,
}

impl ClientConfig {
    const DEFAULT_API_BASE_URL: &'static str = "http://localhost:3000/api";
    const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 20;

    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            verify_timeout: Duration::from_secs(Self::DEFAULT_VERIFY_TIMEOUT_SECS),
            api_key: None,
        }
    }

    pub fn from_env() -> Result<Self, String> {
        let api_base_url = std::env::var("NIVARAN_API_URL")
            .unwrap_or_else(|_| Self::DEFAULT_API_BASE_URL.to_string());

        let verify_timeout = std::env::var("NIVARAN_VERIFY_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_VERIFY_TIMEOUT_SECS.to_string())
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| "NIVARAN_VERIFY_TIMEOUT_SECS must be a valid number")?;

        let api_key = std::env::var("NIVARAN_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            api_base_url,
            verify_timeout,
            api_key,
        })
    }
}

/// JSON client for the backend API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn builder(&self, method: Method, endpoint: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(endpoint))
            .header(header::ACCEPT, "application/json");
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn request<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.builder(method.clone(), endpoint, token);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!("API call: {} {}", method, endpoint);
        let response = builder.send().await.map_err(|e| {
            tracing::error!("API request failed for {}: {}", endpoint, e);
            ClientError::from(e)
        })?;

        Self::decode(endpoint, response).await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        self.request::<(), T>(Method::GET, endpoint, None, token).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        self.request(Method::POST, endpoint, body, token).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        self.request(Method::PUT, endpoint, body, token).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        self.request::<(), T>(Method::DELETE, endpoint, None, token).await
    }

    /// POST a multipart form; the boundary content type is set by reqwest
    pub async fn upload<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
        token: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<T, ClientError> {
        let mut builder = self.builder(Method::POST, endpoint, token).multipart(form);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(key) = self.config.api_key.as_deref() {
            builder = builder.header("x-api-key", key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("API upload failed for {}: {}", endpoint, e);
            ClientError::from(e)
        })?;

        Self::decode(endpoint, response).await
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let err = ClientError::from_status(status.as_u16(), error_message(&bytes));
            tracing::error!("API request failed for {}: {} {}", endpoint, err.code(), err);
            return Err(err);
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Application profile of the token's user; `Ok(None)` while not provisioned
    pub async fn current_profile(
        &self,
        token: &str,
    ) -> Result<Option<UserProfileResponseDto>, ClientError> {
        match self
            .get::<ApiResponse<UserProfileResponseDto>>("/users/me", Some(token))
            .await
        {
            Ok(response) => Ok(response.data),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Server explanation from an error body: `error` first, then `message`
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl PhotoVerifier for ApiClient {
    async fn verify(&self, photo: &Photo) -> Result<VerificationResult, ClientError> {
        let part = Part::bytes(photo.bytes.clone())
            .file_name(photo.file_name.clone())
            .mime_str(&photo.mime_type)
            .map_err(|e| ClientError::Validation(format!("Invalid photo type: {}", e)))?;
        let form = Form::new().part("photo", part);

        log_operation(
            "verify_photo",
            None,
            self.upload("/ai/verify", form, None, Some(self.config.verify_timeout)),
        )
        .await
    }
}

#[async_trait]
impl IssueSink for ApiClient {
    async fn submit_issue(
        &self,
        access_token: &str,
        issue: &CreateIssueDto,
    ) -> Result<IssueResponseDto, ClientError> {
        let response: ApiResponse<IssueResponseDto> = log_operation(
            "submit_issue",
            None,
            self.post("/issues", Some(issue), Some(access_token)),
        )
        .await?;
        response
            .data
            .ok_or_else(|| ClientError::Decode("Issue response carried no data".to_string()))
    }
}
