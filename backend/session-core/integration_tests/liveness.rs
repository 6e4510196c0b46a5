use session_core::config::LivenessConfig;
use session_core::liveness::{check_health, wait_for_service};

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_millis(500);

fn quick_liveness(max_attempts: u32) -> LivenessConfig {
    LivenessConfig {
        interval_ms: 10,
        max_attempts,
        timeout_ms: 500,
    }
}

/// Fails the first `failures` requests, then answers 200.
struct FlakyHealth {
    failures: u32,
    seen: Arc<AtomicU32>,
}

impl Respond for FlakyHealth {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        let seen = self.seen.fetch_add(1, Ordering::SeqCst);
        if seen < self.failures {
            ResponseTemplate::new(503)
        } else {
            ResponseTemplate::new(200)
        }
    }
}

#[tokio::test]
async fn given_healthy_service_when_checked_then_true() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    // WHEN
    let healthy = check_health(&format!("{}/health", server.uri()), TIMEOUT).await;

    // THEN
    assert!(healthy);
}

/// **VALUE**: Verifies non-2xx answers count as not healthy.
///
/// **BUG THIS CATCHES**: Would catch treating any HTTP response as "up", which would
/// open the WebSocket while the service is still loading its models.
#[tokio::test]
async fn given_service_answering_503_when_checked_then_false() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    // WHEN
    let healthy = check_health(&format!("{}/health", server.uri()), TIMEOUT).await;

    // THEN
    assert!(!healthy);
}

#[tokio::test]
async fn given_slow_service_when_checked_then_timeout_counts_as_unhealthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let healthy = check_health(
        &format!("{}/health", server.uri()),
        Duration::from_millis(100),
    )
    .await;

    assert!(!healthy);
}

/// **VALUE**: Verifies polling continues until the service comes up.
///
/// **WHY THIS MATTERS**: The service often starts after the client; the first few
/// probes failing is the normal case, not an error.
///
/// **BUG THIS CATCHES**: Would catch giving up after the first failure, or reporting
/// the wrong attempt count to the status line.
#[tokio::test]
async fn given_service_that_recovers_when_waiting_then_reports_attempts() {
    // GIVEN
    let server = MockServer::start().await;
    let seen = Arc::new(AtomicU32::new(0));
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(FlakyHealth {
            failures: 2,
            seen: seen.clone(),
        })
        .mount(&server)
        .await;
    let mut reported = Vec::new();

    // WHEN
    let attempts = wait_for_service(
        &format!("{}/health", server.uri()),
        &quick_liveness(5),
        |attempt| reported.push(attempt),
    )
    .await
    .unwrap();

    // THEN
    assert_eq!(attempts, 3);
    assert_eq!(reported, vec![1, 2, 3]);
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn given_service_never_up_when_waiting_then_exhausted_after_max_attempts() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    // WHEN
    let error = wait_for_service(
        &format!("{}/health", server.uri()),
        &quick_liveness(3),
        |_| {},
    )
    .await
    .unwrap_err();

    // THEN
    let text = error.to_string();
    assert!(text.starts_with("Service Unreachable Error:"), "{text}");
    assert!(text.contains("after 3 attempts"), "{text}");
}
