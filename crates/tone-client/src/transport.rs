//! HTTP transport layer for GDELT DOC API requests

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, Response};
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;
use tone_core::{Error, Result, ToneConfig};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

const UTF8_BOM: char = '\u{feff}';

/// Requests-per-minute limiter; zero falls back to the default rate
fn per_minute_limiter(rate_limit: u32) -> DefaultDirectRateLimiter {
    let rate_limit_value = NonZeroU32::new(rate_limit)
        .or_else(|| NonZeroU32::new(tone_core::DEFAULT_RATE_LIMIT))
        .unwrap_or(NonZeroU32::MIN);
    RateLimiter::direct(Quota::per_minute(rate_limit_value))
}

/// HTTP transport layer for making requests to the GDELT DOC API
///
/// Every attempt, retries included, waits on the rate limiter first.
pub struct Transport {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
    rate_limiter: DefaultDirectRateLimiter,
}

impl Transport {
    /// Create a new transport instance
    pub fn new(config: &ToneConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("tone-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(1000),
            rate_limiter: per_minute_limiter(config.rate_limit),
        })
    }

    /// Create a mock transport for testing
    #[cfg(test)]
    pub fn new_mock() -> Self {
        Self {
            client: Client::new(),
            base_url: "https://mock.gdeltproject.org/api/v2/doc/doc".to_string(),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(1),
            rate_limiter: per_minute_limiter(tone_core::DEFAULT_RATE_LIMIT),
        }
    }

    /// Override the first retry delay; later retries double it
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Make a GET request and return the validated response body
    ///
    /// # Arguments
    ///
    /// * `params` - Query string pairs, appended in order
    ///
    /// # Returns
    ///
    /// The raw CSV text, or an error once all retries are spent. Network
    /// failures, non-success statuses and GDELT throttling notices are
    /// retried with exponential backoff; other API errors are returned
    /// immediately.
    #[instrument(skip(self, params))]
    pub async fn get_text(&self, params: &[(&str, String)]) -> Result<String> {
        let url = self.build_url(params)?;
        debug!("Making request to: {}", url);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            if attempt > 0 {
                let delay = self.retry_base_delay * 2_u32.pow(attempt - 1); // Exponential backoff
                warn!("Retrying request in {}ms (attempt {})", delay.as_millis(), attempt + 1);
                tokio::time::sleep(delay).await;
            }

            self.rate_limiter.until_ready().await;
            let outcome = match self.make_request(&url).await {
                Ok(response) => match response.text().await {
                    Ok(text) => {
                        debug!("Response body length: {} bytes", text.len());
                        self.check_api_error(&text).map(|_| text)
                    }
                    Err(e) => Err(Error::Http(format!("Failed to read response body: {}", e))),
                },
                Err(e) => Err(e),
            };

            match outcome {
                Ok(text) => {
                    info!("Received tone chart ({} bytes)", text.len());
                    return Ok(text);
                }
                Err(e @ (Error::Http(_) | Error::RateLimit(_))) => {
                    warn!("Request failed (attempt {}): {}", attempt + 1, e);
                    last_error = Some(e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Http("Max retries exceeded".to_string())))
    }

    /// Build the full URL for an API request
    pub fn build_url(&self, params: &[(&str, String)]) -> Result<String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Http(format!("Invalid base URL: {}", e)))?;

        {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in params {
                query_pairs.append_pair(key, value);
            }
        }

        Ok(url.to_string())
    }

    /// Make the actual HTTP request
    async fn make_request(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            debug!("Request successful with status: {}", status);
            Ok(response)
        } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Request throttled with status: {}", status);
            Err(Error::RateLimit(format!("HTTP {}", status)))
        } else {
            error!("Request failed with status: {}", status);
            Err(Error::Http(format!("HTTP error: {}", status)))
        }
    }

    /// Check for GDELT error messages in a successful response
    ///
    /// GDELT answers most problems with HTTP 200 and a plain-text notice, so
    /// anything that is neither empty nor a CSV starting with a `Label`
    /// header is treated as an error.
    fn check_api_error(&self, response_text: &str) -> Result<()> {
        let body = response_text.trim_start_matches(UTF8_BOM).trim();

        // No matching articles
        if body.is_empty() {
            return Ok(());
        }

        if body.get(..5).is_some_and(|head| head.eq_ignore_ascii_case("label")) {
            return Ok(());
        }

        let first_line: String = body.lines().next().unwrap_or_default().chars().take(200).collect();

        if body.contains("limit requests") {
            return Err(Error::RateLimit(first_line));
        }

        if body.starts_with('<') {
            return Err(Error::InvalidResponse(format!("Unexpected markup: {}", first_line)));
        }

        Err(Error::Api(first_line))
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TONE_CSV: &str = "Label,Count,TopArts\n-2,3,\"\"\n5,2,\"\"\n";

    fn transport_for(server: &MockServer, max_retries: u32) -> Transport {
        let config = ToneConfig {
            base_url: format!("{}/api/v2/doc/doc", server.uri()),
            max_retries,
            timeout_secs: 5,
            ..ToneConfig::default()
        };
        Transport::new(&config).unwrap().with_retry_base_delay(Duration::from_millis(1))
    }

    #[test]
    fn test_build_url() {
        let transport = Transport::new_mock();
        let params = vec![
            ("format", "csv".to_string()),
            ("query", "\"health\" -mental sourcecountry:NZ".to_string()),
            ("mode", "tonechart".to_string()),
        ];

        let url = transport.build_url(&params).unwrap();

        assert!(url.starts_with("https://mock.gdeltproject.org/api/v2/doc/doc?format=csv&"));
        assert!(url.contains("query=%22health%22+-mental+sourcecountry%3ANZ"));
        assert!(url.ends_with("mode=tonechart"));
    }

    #[test]
    fn test_check_api_error_rate_limit() {
        let transport = Transport::new_mock();
        let response = "Please limit requests to one every 5 seconds or contact us.";

        let result = transport.check_api_error(response);
        assert!(matches!(result, Err(Error::RateLimit(_))));
    }

    #[test]
    fn test_check_api_error_query_message() {
        let transport = Transport::new_mock();
        let response = "Your search contained a phrase that was too short.";

        let result = transport.check_api_error(response);
        assert!(matches!(result, Err(Error::Api(_))));
    }

    #[test]
    fn test_check_api_error_html() {
        let transport = Transport::new_mock();
        let result = transport.check_api_error("<html><body>Bad Gateway</body></html>");
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[test]
    fn test_check_api_error_success() {
        let transport = Transport::new_mock();
        assert!(transport.check_api_error(TONE_CSV).is_ok());
        assert!(transport.check_api_error("\u{feff}Label,Count\n1,1\n").is_ok());
        assert!(transport.check_api_error("").is_ok());
        assert!(transport.check_api_error("  \n").is_ok());
    }

    #[tokio::test]
    async fn test_get_text_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/doc/doc"))
            .and(query_param("mode", "tonechart"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TONE_CSV))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server, 0);
        let body = transport.get_text(&[("mode", "tonechart".to_string())]).await.unwrap();
        assert_eq!(body, TONE_CSV);
    }

    #[tokio::test]
    async fn test_get_text_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let transport = transport_for(&server, 2);
        let result = transport.get_text(&[]).await;
        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[tokio::test]
    async fn test_retries_wait_on_rate_limiter() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

        // Two requests per minute: the third attempt has to wait ~30s
        let config = ToneConfig {
            base_url: format!("{}/api/v2/doc/doc", server.uri()),
            max_retries: 5,
            rate_limit: 2,
            ..ToneConfig::default()
        };
        let transport = Transport::new(&config).unwrap().with_retry_base_delay(Duration::from_millis(1));

        let result = tokio::time::timeout(Duration::from_millis(500), transport.get_text(&[])).await;
        assert!(result.is_err());

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 2);
    }

    #[tokio::test]
    async fn test_get_text_does_not_retry_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Invalid query."))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server, 3);
        let result = transport.get_text(&[]).await;
        assert!(matches!(result, Err(Error::Api(_))));
    }
}
