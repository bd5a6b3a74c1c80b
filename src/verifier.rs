//! Reachability checks for candidate URLs
//!
//! A failed check is advisory: the handlers report it as
//! `verificationFailed` and the client may resubmit with `force` to store the
//! URL anyway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Outcome of a reachability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    /// Carries a short human-readable reason
    Unreachable(String),
}

impl Reachability {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Reachability::Reachable)
    }
}

#[async_trait]
pub trait Verifier: Send + Sync {
    async fn check(&self, url: &str) -> Reachability;
}

/// Verifier issuing a HEAD request with a bounded timeout
///
/// Redirects are followed; only a final 2xx status counts as reachable.
#[derive(Debug, Clone)]
pub struct HttpVerifier {
    http: Client,
}

impl HttpVerifier {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sitetracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Uses a preconfigured client (its timeout applies)
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Verifier for HttpVerifier {
    async fn check(&self, url: &str) -> Reachability {
        match self.http.head(url).send().await {
            Ok(response) if response.status().is_success() => Reachability::Reachable,
            Ok(response) => {
                debug!(url, status = %response.status(), "reachability check got non-2xx");
                Reachability::Unreachable(format!("responded with {}", response.status()))
            }
            Err(err) if err.is_timeout() => {
                debug!(url, "reachability check timed out");
                Reachability::Unreachable("request timed out".to_string())
            }
            Err(err) => {
                debug!(url, error = %err, "reachability check failed");
                Reachability::Unreachable(format!("request failed: {}", err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use tokio::net::TcpListener;

    async fn spawn_site() -> String {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn verifier(timeout: Duration) -> HttpVerifier {
        let http = Client::builder().timeout(timeout).no_proxy().build().unwrap();
        HttpVerifier::with_client(http)
    }

    #[tokio::test]
    async fn test_success_status_is_reachable() {
        let base = spawn_site().await;
        let result = verifier(Duration::from_secs(5)).check(&format!("{}/", base)).await;
        assert_eq!(result, Reachability::Reachable);
    }

    #[tokio::test]
    async fn test_error_status_is_unreachable() {
        let base = spawn_site().await;
        let result = verifier(Duration::from_secs(5))
            .check(&format!("{}/missing", base))
            .await;
        assert!(!result.is_reachable());
    }

    #[tokio::test]
    async fn test_timeout_is_unreachable() {
        let base = spawn_site().await;
        let result = verifier(Duration::from_millis(200))
            .check(&format!("{}/slow", base))
            .await;
        assert_eq!(result, Reachability::Unreachable("request timed out".to_string()));
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        // Grab a free port, then close it again
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = verifier(Duration::from_secs(2))
            .check(&format!("http://{}/", addr))
            .await;
        assert!(!result.is_reachable());
    }
}
