// tests/poller_retry.rs
//
// Retry-protocol tests for the asset availability poller, driven by a
// scripted fetcher and tokio's paused clock (no sockets, no real sleeps).
//
// Covered:
// - immediate success / terminal failure classification
// - the 423 retry path, including attempt counts and elapsed delay
// - transport errors mapped to the 500 sentinel
// - idempotence and the opt-in attempt cap

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use media_cdn_bridge::{AssetFetcher, AssetPoller, FetchedStatus, PollOutcome, PollRequest};

enum Step {
    Status(u16, Option<&'static str>),
    TransportError(&'static str),
}

fn ok(code: u16) -> Step {
    Step::Status(code, Some("OK"))
}

fn locked() -> Step {
    Step::Status(423, Some("Locked"))
}

/// Pops one scripted response per fetch attempt. Panics if the poller
/// asks for more attempts than the test scripted.
struct ScriptedFetcher {
    script: Mutex<VecDeque<Step>>,
    attempts: Arc<AtomicU32>,
}

fn scripted(steps: Vec<Step>) -> (ScriptedFetcher, Arc<AtomicU32>) {
    let attempts = Arc::new(AtomicU32::new(0));
    let fetcher = ScriptedFetcher {
        script: Mutex::new(VecDeque::from(steps)),
        attempts: attempts.clone(),
    };
    (fetcher, attempts)
}

#[async_trait]
impl AssetFetcher for ScriptedFetcher {
    async fn fetch(&self, _url: &str) -> anyhow::Result<FetchedStatus> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().pop_front().expect("script exhausted") {
            Step::Status(code, reason) => Ok(FetchedStatus {
                code,
                reason: reason.map(str::to_string),
            }),
            Step::TransportError(msg) => Err(anyhow::anyhow!(msg)),
        }
    }
}

fn request() -> PollRequest {
    PollRequest::new("https://res.example-cdn.com/demo-cloud/video.gif")
}

#[tokio::test]
async fn first_success_resolves_immediately() {
    let (fetcher, attempts) = scripted(vec![ok(200)]);
    let outcome = AssetPoller::with_fetcher(fetcher).poll(&request()).await;

    assert_eq!(
        outcome,
        PollOutcome {
            success: true,
            status: 200,
            error: None
        }
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn processing_retries_until_ready() {
    // [423, 423, 200]: two delays, three attempts, then success.
    let (fetcher, attempts) = scripted(vec![locked(), locked(), ok(200)]);
    let started = tokio::time::Instant::now();

    let outcome = AssetPoller::with_fetcher(fetcher).poll(&request()).await;

    assert_eq!(
        outcome,
        PollOutcome {
            success: true,
            status: 200,
            error: None
        }
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert!(
        started.elapsed() >= Duration::from_millis(400),
        "two 200ms pauses expected, elapsed {:?}",
        started.elapsed()
    );
}

#[tokio::test(start_paused = true)]
async fn processing_then_terminal_failure_stops_retrying() {
    let (fetcher, attempts) = scripted(vec![locked(), Step::Status(404, Some("Not Found"))]);
    let outcome = AssetPoller::with_fetcher(fetcher).poll(&request()).await;

    assert!(!outcome.success);
    assert_eq!(outcome.status, 404);
    assert_eq!(outcome.error.as_deref(), Some("Not Found"));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn server_error_is_terminal_with_reason() {
    let (fetcher, attempts) = scripted(vec![Step::Status(500, Some("Server Error"))]);
    let outcome = AssetPoller::with_fetcher(fetcher).poll(&request()).await;

    assert_eq!(
        outcome,
        PollOutcome {
            success: false,
            status: 500,
            error: Some("Server Error".to_string())
        }
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_reason_phrase_gets_fallback() {
    let (fetcher, _) = scripted(vec![Step::Status(404, None)]);
    let outcome = AssetPoller::with_fetcher(fetcher).poll(&request()).await;
    assert_eq!(outcome.error.as_deref(), Some("Failed to fetch the image"));

    let (fetcher, _) = scripted(vec![Step::Status(404, Some(""))]);
    let outcome = AssetPoller::with_fetcher(fetcher).poll(&request()).await;
    assert_eq!(outcome.error.as_deref(), Some("Failed to fetch the image"));
}

#[tokio::test]
async fn transport_error_becomes_sentinel_outcome() {
    let (fetcher, attempts) = scripted(vec![Step::TransportError("DNS lookup failed")]);
    let outcome = AssetPoller::with_fetcher(fetcher).poll(&request()).await;

    assert_eq!(
        outcome,
        PollOutcome {
            success: false,
            status: 500,
            error: Some("DNS lookup failed".to_string())
        }
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn identical_scripts_yield_identical_outcomes() {
    let (first, _) = scripted(vec![locked(), ok(200)]);
    let (second, _) = scripted(vec![locked(), ok(200)]);
    let req = request();

    let a = AssetPoller::with_fetcher(first).poll(&req).await;
    let b = AssetPoller::with_fetcher(second).poll(&req).await;
    assert_eq!(a, b);
}

#[tokio::test(start_paused = true)]
async fn attempt_cap_terminates_endless_processing() {
    let (fetcher, attempts) = scripted(vec![locked(), locked(), locked(), locked(), locked()]);
    let outcome = AssetPoller::with_fetcher(fetcher)
        .with_max_attempts(3)
        .poll(&request())
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.status, 423);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    let msg = outcome.error.expect("cap should carry a message");
    assert!(msg.contains("3 attempts"), "unexpected message: {msg}");
}

#[tokio::test(start_paused = true)]
async fn retry_delay_is_configurable() {
    let (fetcher, _) = scripted(vec![locked(), ok(200)]);
    let started = tokio::time::Instant::now();

    let outcome = AssetPoller::with_fetcher(fetcher)
        .with_retry_delay(Duration::from_millis(50))
        .poll(&request())
        .await;

    assert!(outcome.success);
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(50) && elapsed < Duration::from_millis(200),
        "one 50ms pause expected, elapsed {elapsed:?}"
    );
}
