//! Typed HTTP client for the website tracker API

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::model::{LoginResponse, Website, WebsiteRequest};

/// Message shown for failures the user can only retry
pub const RETRY_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not reach the URL; resubmitting with `force` stores it anyway
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// The server refused the request (validation, duplicate, not found, ...)
    #[error("http {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("count store error: {0}")]
    CountStore(#[from] redb::Error),
}

impl ClientError {
    pub fn is_verification_failed(&self) -> bool {
        matches!(self, ClientError::VerificationFailed(_))
    }

    /// Text suitable for a user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            ClientError::VerificationFailed(message) => message.clone(),
            ClientError::Rejected { message, .. } => message.clone(),
            ClientError::Transport(_) | ClientError::CountStore(_) => RETRY_MESSAGE.to_string(),
        }
    }
}

/// Error body returned by the server
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,

    #[serde(default, rename = "verificationFailed")]
    verification_failed: bool,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for the server at `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Sets the value sent in the `Authorization` header
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn websites_url(&self) -> String {
        format!("{}/api/websites", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", token.as_str()),
            None => request,
        }
    }

    /// Turns a non-success response into a [`ClientError`]
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        if body.verification_failed {
            return Err(ClientError::VerificationFailed(
                body.message
                    .unwrap_or_else(|| "Could not verify the website".to_string()),
            ));
        }

        Err(ClientError::Rejected {
            status: status.as_u16(),
            message: body.message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or(RETRY_MESSAGE)
                    .to_string()
            }),
        })
    }

    pub async fn list(&self) -> Result<Vec<Website>, ClientError> {
        let response = self.authorize(self.http.get(self.websites_url())).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn create(&self, name: &str, url: &str, force: bool) -> Result<Website, ClientError> {
        let body = WebsiteRequest {
            name: name.to_string(),
            url: url.to_string(),
            force,
        };
        let response = self
            .authorize(self.http.post(self.websites_url()).json(&body))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn update(
        &self,
        id: &str,
        name: &str,
        url: &str,
        force: bool,
    ) -> Result<Website, ClientError> {
        let body = WebsiteRequest {
            name: name.to_string(),
            url: url.to_string(),
            force,
        };
        let response = self
            .authorize(
                self.http
                    .put(self.websites_url())
                    .query(&[("id", id)])
                    .json(&body),
            )
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .authorize(self.http.delete(self.websites_url()).query(&[("id", id)]))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Logs in and keeps the returned API token for later requests
    ///
    /// Returns `false` when the server rejects the credentials.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<bool, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(false);
        }

        let login: LoginResponse = Self::check(response).await?.json().await?;
        self.token = login.token;
        Ok(login.success)
    }
}
