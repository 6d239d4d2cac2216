//! HTTP client wrapper for fetching pages from the FARA eFile site.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{FaraError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("fara-harvester/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Create a configured HTTP client.
///
/// # Returns
/// A `reqwest::blocking::Client` configured with appropriate timeout and
/// user agent. Cookies are kept so the APEX session stays valid across
/// paginated requests.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .build()?;
    Ok(client)
}

/// Fetch an HTML page with a GET request.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - URL to fetch
///
/// # Returns
/// Response body as a string
pub fn get_html(client: &Client, url: &str) -> Result<String> {
    send_with_retry(url, || client.get(url))
}

/// Fetch an HTML page with a form-encoded POST request.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - URL to post to
/// * `form` - Form payload as key/value pairs
///
/// # Returns
/// Response body as a string
pub fn post_form(client: &Client, url: &str, form: &[(&str, String)]) -> Result<String> {
    send_with_retry(url, || client.post(url).form(form))
}

/// Send a request with retry logic.
///
/// Uses exponential backoff for transient failures (connection errors,
/// timeouts, 5xx responses). Client errors (4xx) are not retried - they
/// won't succeed.
fn send_with_retry<F>(url: &str, build: F) -> Result<String>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<String> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 500ms, 1000ms, 2000ms
            let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
            tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
            thread::sleep(Duration::from_millis(delay));
        }

        match build().send() {
            Ok(response) => {
                let status = response.status();

                if status.is_server_error() {
                    tracing::warn!(
                        status = %status,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Server error, will retry"
                    );
                    last_error = Some(format!("Server error: {status}"));
                    continue;
                }

                let response = response.error_for_status()?;
                return Ok(response.text()?);
            }
            Err(e) => {
                if e.is_connect() || e.is_timeout() {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Connection error, will retry"
                    );
                    last_error = Some(e.to_string());
                    continue;
                }
                return Err(FaraError::Http(e));
            }
        }
    }

    Err(FaraError::RetriesExhausted {
        attempts: MAX_RETRIES,
        url: url.to_string(),
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}
