//! Availability polling for CDN assets that are still being processed.
//! The upstream edge answers 423 while a derived asset is generated;
//! every other response is terminal.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Status the CDN uses to signal "asset not ready yet, try again shortly".
pub const PROCESSING_STATUS: u16 = 423;

/// Sentinel status reported when the fetch itself failed and no real
/// status line was obtained.
const TRANSPORT_FAILURE_STATUS: u16 = 500;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Input to one polling session. Reused unchanged on every retry attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollRequest {
    /// Locator of the asset to check.
    pub src: String,
}

impl PollRequest {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }
}

/// Terminal result of a polling session. Exactly one is produced per
/// session; the transient "processing" state is never reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOutcome {
    pub success: bool,
    /// Status of the final response observed (500 when the transport failed).
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Minimal view of one upstream response: the status line, nothing else.
#[derive(Debug, Clone)]
pub struct FetchedStatus {
    pub code: u16,
    /// Reason phrase, when the client knows one for this code.
    pub reason: Option<String>,
}

/// One HTTP GET against the asset URL, reporting the status line or a
/// transport error. The poller is generic over this so tests can script
/// response sequences without a network.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedStatus>;
}

// ------------------------------------------------------------
// Production fetcher
// ------------------------------------------------------------

static HTTP: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("media-cdn-bridge/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(10))
        .build()
        .expect("reqwest client")
});

/// Fetcher backed by a process-wide shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher;

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedStatus> {
        let resp = HTTP.get(url).send().await?;
        let status = resp.status();
        Ok(FetchedStatus {
            code: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
        })
    }
}

// ------------------------------------------------------------
// Poller
// ------------------------------------------------------------

/// Polls an asset URL until the CDN stops answering 423.
///
/// 2xx resolves as success; any other status (and any transport error)
/// resolves as failure on the first occurrence. The 423 path retries on a
/// fixed interval with no backoff, unbounded unless [`with_max_attempts`]
/// caps it.
///
/// [`with_max_attempts`]: AssetPoller::with_max_attempts
pub struct AssetPoller<F: AssetFetcher = HttpFetcher> {
    fetcher: F,
    retry_delay: Duration,
    max_attempts: Option<u32>,
}

impl Default for AssetPoller<HttpFetcher> {
    fn default() -> Self {
        Self::with_fetcher(HttpFetcher)
    }
}

impl<F: AssetFetcher> AssetPoller<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            fetcher,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_attempts: None,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Cap the total number of fetch attempts spent on the 423 path.
    /// The upstream contract is unbounded, so no cap is set by default;
    /// exhausting a cap resolves as failure with status 423.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Run one polling session to its terminal outcome.
    ///
    /// Never returns while the asset is still processing, and never
    /// propagates an error: transport failures come back as an outcome
    /// with the 500 sentinel status.
    pub async fn poll(&self, request: &PollRequest) -> PollOutcome {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let fetched = match self.fetcher.fetch(&request.src).await {
                Ok(f) => f,
                Err(e) => {
                    let msg = e.to_string();
                    return PollOutcome {
                        success: false,
                        status: TRANSPORT_FAILURE_STATUS,
                        error: Some(if msg.is_empty() {
                            "Network error".to_string()
                        } else {
                            msg
                        }),
                    };
                }
            };

            if is_success(fetched.code) {
                return PollOutcome {
                    success: true,
                    status: fetched.code,
                    error: None,
                };
            }

            if fetched.code == PROCESSING_STATUS {
                if let Some(max) = self.max_attempts {
                    if attempt >= max {
                        return PollOutcome {
                            success: false,
                            status: PROCESSING_STATUS,
                            error: Some(format!(
                                "Asset still processing after {attempt} attempts"
                            )),
                        };
                    }
                }
                debug!(attempt, src = %request.src, "asset still processing, retrying");
                tokio::time::sleep(self.retry_delay).await;
                continue;
            }

            return PollOutcome {
                success: false,
                status: fetched.code,
                error: Some(terminal_reason(fetched.reason)),
            };
        }
    }
}

/// Poll with the default HTTP fetcher and timing.
pub async fn poll_for_processing_asset(request: &PollRequest) -> PollOutcome {
    AssetPoller::default().poll(request).await
}

fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

fn terminal_reason(reason: Option<String>) -> String {
    reason
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "Failed to fetch the image".to_string())
}
