//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const USER_AGENT: &str = "trend-client/0.1.0";

/// Reqwest-based HTTP client implementation
///
/// Provides HTTP operations with:
/// - Connection pooling via reqwest
/// - Optional retry with exponential backoff
/// - TLS support by default (rustls)
///
/// Retryable statuses (5xx, 429) are retried while attempts remain; the last
/// response is always handed back to the caller, whatever its status.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    default_policy: RetryPolicy,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with a 10 second timeout and no retries
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(10))
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(10)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self::with_client(client))
    }

    /// Create a new HTTP client from a preconfigured reqwest client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            default_policy: RetryPolicy::no_retry(),
        }
    }

    /// Policy used by [`HttpClient::execute`]
    pub fn with_default_policy(mut self, policy: RetryPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let mut req = self.client.get(&request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn map_send_error(error: reqwest::Error) -> BridgeError {
        if error.is_timeout() {
            BridgeError::Timeout(error.to_string())
        } else if error.is_connect() {
            BridgeError::ConnectionFailed(error.to_string())
        } else {
            BridgeError::OperationFailed(error.to_string())
        }
    }

    async fn into_bridge_response(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response.bytes().await.map_err(Self::map_send_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    /// Execute request with retry logic
    async fn execute_with_retry_internal(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let last_attempt = attempt >= max_attempts;

            debug!(
                attempt,
                max_attempts,
                url = %request.url,
                "Executing HTTP request"
            );

            match self.build_request(request.clone()).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let retryable = status >= 500 || status == 429;

                    if !retryable || last_attempt {
                        return Self::into_bridge_response(response).await;
                    }

                    warn!(status, attempt, "HTTP request failed with retryable status");
                }
                Err(e) => {
                    warn!(error = %e, attempt, url = %request.url, "HTTP request failed");

                    if last_attempt {
                        return Err(Self::map_send_error(e));
                    }
                }
            }

            let delay = policy.delay_after(attempt);
            debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.execute_with_retry_internal(request, self.default_policy.clone())
            .await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        self.execute_with_retry_internal(request, policy).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `status` with `body` to every connection, counting requests.
    async fn spawn_stub_server(
        status: &'static str,
        body: &'static str,
    ) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), hits)
    }

    #[tokio::test]
    async fn test_http_client_creation() {
        assert!(ReqwestHttpClient::new().is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_success_response_is_returned() {
        let (base, hits) = spawn_stub_server("200 OK", r#"{"api_status":"healthy"}"#).await;
        let client = ReqwestHttpClient::new().unwrap();

        let response = client
            .execute(HttpRequest::get(format!("{}/health", base)))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.text().unwrap(), r#"{"api_status":"healthy"}"#);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_server_error_is_returned_without_retry() {
        let (base, hits) = spawn_stub_server("500 Internal Server Error", "{}").await;
        let client = ReqwestHttpClient::new().unwrap();

        let response = client
            .execute(HttpRequest::get(format!("{}/trending?limit=5", base)))
            .await
            .unwrap();

        assert_eq!(response.status, 500);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_retry_policy_reissues_on_server_error() {
        let (base, hits) = spawn_stub_server("503 Service Unavailable", "{}").await;
        let client = ReqwestHttpClient::new().unwrap();
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            use_exponential_backoff: true,
        };

        let response = client
            .execute_with_retry(HttpRequest::get(format!("{}/analytics", base)), policy)
            .await
            .unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ReqwestHttpClient::new().unwrap();
        let err = client
            .execute(HttpRequest::get(format!("http://{}/health", addr)))
            .await
            .unwrap_err();

        assert!(err.is_transport(), "unexpected error: {err}");
    }
}
