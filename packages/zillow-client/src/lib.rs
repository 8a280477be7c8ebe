//! Pure Zillow property-record client (RapidAPI `zillow-working-api`).
//!
//! # Example
//!
//! ```rust,ignore
//! use zillow_client::ZillowClient;
//!
//! let client = ZillowClient::new("rapidapi-key".into());
//! let details = client
//!     .property_by_address("1 Main St, Richmond, VA 23220")
//!     .await?;
//! println!("{:?} bedrooms", details.bedrooms);
//! ```

pub mod error;
pub mod types;

pub use error::{Result, ZillowError};
pub use types::{PropertyDetails, PropertyResponse};

use std::time::Duration;

use tracing::{debug, warn};

const DEFAULT_HOST: &str = "zillow-working-api.p.rapidapi.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(8);

#[derive(Clone)]
pub struct ZillowClient {
    client: reqwest::Client,
    api_key: String,
    host: String,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl ZillowClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
            host: DEFAULT_HOST.to_string(),
            base_url: format!("https://{}", DEFAULT_HOST),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }

    /// Point at a different host; the RapidAPI host header follows it.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self.base_url = format!("https://{}", self.host);
        self
    }

    /// Override the base URL only (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// First retry delay; later ones double, up to eight seconds.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn by_address_url(&self, full_address: &str) -> String {
        format!(
            "{}/pro/byaddress?propertyaddress={}",
            self.base_url,
            urlencoding::encode(full_address)
        )
    }

    /// Look up a property by its full address ("street, city, state zip").
    ///
    /// Transient failures are retried up to `max_retries` times with
    /// doubling delays capped at eight seconds.
    pub async fn property_by_address(&self, full_address: &str) -> Result<PropertyDetails> {
        let mut attempt = 0;
        loop {
            match self.fetch_by_address(full_address).await {
                Ok(details) => return Ok(details),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = retry_delay(self.retry_base_delay, attempt);
                    attempt += 1;
                    warn!(
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Property lookup failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_by_address(&self, full_address: &str) -> Result<PropertyDetails> {
        let resp = self
            .client
            .get(self.by_address_url(full_address))
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ZillowError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let parsed: PropertyResponse =
            serde_json::from_str(&body).map_err(|e| ZillowError::Parse(e.to_string()))?;

        debug!(address = full_address, found = parsed.property_details.is_some(), "Property lookup");

        parsed
            .property_details
            .ok_or_else(|| ZillowError::NotFound(full_address.to_string()))
    }
}

/// `base * 2^attempt`, saturating, never above `MAX_RETRY_DELAY`.
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt))
        .map_or(MAX_RETRY_DELAY, |d| d.min(MAX_RETRY_DELAY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const DETAILS: &str = r#"{"propertyDetails":{"bedrooms":3,"livingArea":1850}}"#;

    /// Answer connection `n` with `responses[n]` (the last one repeats).
    /// Returns the base URL and a count of requests served.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = responses[n.min(responses.len() - 1)];
                let mut buf = vec![0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let reply = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), hits)
    }

    fn client(base_url: String, max_retries: u32) -> ZillowClient {
        ZillowClient::new("k".into())
            .with_base_url(base_url)
            .with_max_retries(max_retries)
            .with_retry_base_delay(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_server_errors_retried_up_to_limit() {
        let (base, hits) = serve(vec![(503, "unavailable")]).await;

        let err = client(base, 2).property_by_address("1 Main St").await.unwrap_err();

        assert!(matches!(err, ZillowError::Api { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_throttled_then_found() {
        let (base, hits) = serve(vec![(429, "slow down"), (200, DETAILS)]).await;

        let details = client(base, 2).property_by_address("1 Main St").await.unwrap();

        assert_eq!(details.bedrooms, Some(3.0));
        assert_eq!(details.living_area, Some(1850.0));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_errors_not_retried() {
        let (base, hits) = serve(vec![(404, "no such route")]).await;

        let err = client(base, 3).property_by_address("1 Main St").await.unwrap_err();

        assert!(matches!(err, ZillowError::Api { status: 404, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_property_not_retried() {
        let (base, hits) = serve(vec![(200, r#"{"message":"not found"}"#)]).await;

        let err = client(base, 3).property_by_address("1 Main St").await.unwrap_err();

        assert!(matches!(err, ZillowError::NotFound(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        let base = Duration::from_millis(500);
        assert_eq!(retry_delay(base, 0), Duration::from_millis(500));
        assert_eq!(retry_delay(base, 1), Duration::from_secs(1));
        assert_eq!(retry_delay(base, 3), Duration::from_secs(4));
        assert_eq!(retry_delay(base, 5), MAX_RETRY_DELAY);
        assert_eq!(retry_delay(base, 40), MAX_RETRY_DELAY);
        assert_eq!(retry_delay(base, u32::MAX), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_address_is_url_encoded() {
        let client = ZillowClient::new("k".into()).with_base_url("http://localhost");
        assert_eq!(
            client.by_address_url("1 Main St, Richmond, VA 23220"),
            "http://localhost/pro/byaddress?propertyaddress=1%20Main%20St%2C%20Richmond%2C%20VA%2023220"
        );
    }

    #[test]
    fn test_with_host_moves_base_url() {
        let client = ZillowClient::new("k".into()).with_host("example.test");
        assert_eq!(client.base_url, "https://example.test");
        assert_eq!(client.host, "example.test");
    }

    #[tokio::test]
    async fn test_unreachable_host_gives_up_after_retries() {
        let client = ZillowClient::new("k".into())
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(1))
            .unwrap()
            .with_max_retries(0);

        let err = client.property_by_address("1 Main St").await.unwrap_err();
        assert!(matches!(err, ZillowError::Http(_)));
    }
}
