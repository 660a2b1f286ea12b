// src/fetch/client.rs
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::fetch::{HttpTransport, ReqwestTransport};
use crate::types::RetryPolicy;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::sleep;

/// HTTP GET with bounded retry on transient and rate-limit failures.
///
/// The inter-attempt delay is fixed, no backoff: the upstreams throttle in
/// sub-second bursts, and the attempt cap bounds total wait regardless.
pub struct RateLimitedFetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl RateLimitedFetcher {
    pub fn new(policy: RetryPolicy) -> AnalyzerResult<Self> {
        let transport = ReqwestTransport::new(policy.request_timeout)?;
        Ok(Self::with_transport(Arc::new(transport), policy))
    }

    /// Swap the transport, used by tests to script upstream behavior.
    pub fn with_transport(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Fetch a URL, retrying up to `max_retries` attempts in total.
    ///
    /// Transient transport failures and 200 responses carrying a rate-limit
    /// message both count as retryable. Exhaustion yields `RetriesExhausted`;
    /// any other failure returns on the attempt that produced it.
    pub async fn fetch_json(&self, url: &str, headers: &[(&str, &str)]) -> AnalyzerResult<Value> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.get_json(url, headers).await {
                Ok(body) => match rate_limit_message(&body) {
                    None => return Ok(body),
                    Some(msg) => {
                        log::warn!(
                            "Rate limited on attempt {}/{} for {}: {}",
                            attempt,
                            self.policy.max_retries,
                            url,
                            msg
                        );
                    }
                },
                Err(e) if e.is_retryable() => {
                    log::warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt,
                        self.policy.max_retries,
                        url,
                        e
                    );
                }
                Err(e) => return Err(e),
            }

            if attempt >= self.policy.max_retries {
                break;
            }
            sleep(self.policy.retry_delay).await;
        }

        Err(AnalyzerError::RetriesExhausted { attempts: attempt })
    }
}

/// Etherscan signals throttling inside a 200 response: the `result` field
/// carries a message string instead of data.
fn rate_limit_message(body: &Value) -> Option<&str> {
    let result = body.get("result")?.as_str()?;
    if result.to_ascii_lowercase().contains("rate limit") {
        Some(result)
    } else {
        None
    }
}
