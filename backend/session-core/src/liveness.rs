//! HTTP liveness probe run before the first WebSocket connection.

use crate::config::LivenessConfig;
use crate::error::liveness::LivenessError;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use backoff::backoff::{Backoff, Constant};
use log::{debug, info, trace, warn};
use reqwest::Client;
use tokio::time::sleep as TokioSleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessNotice {
    Attempt { attempt: u32, max_attempts: u32 },
    Reachable { attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Check if the service is healthy and responding.
///
/// # Returns
///
/// * `true` - If the service responds with HTTP 2xx within `timeout`
/// * `false` - If the request fails, times out, or returns any other status
pub async fn check_health(health_url: &str, timeout: Duration) -> bool {
    let client = Client::new();

    match client.get(health_url).timeout(timeout).send().await {
        Ok(resp) if resp.status().is_success() => {
            debug!("Health check succeeded for {health_url}");
            true
        }
        Ok(resp) => {
            debug!(
                "Health check failed for {health_url}: status={}",
                resp.status()
            );
            false
        }
        Err(e) => {
            debug!("Health check failed for {health_url}: {e}");
            false
        }
    }
}

/// Poll the health endpoint on a fixed interval until it answers.
///
/// `on_attempt` runs before every probe with the 1-based attempt number.
///
/// # Errors
///
/// Returns [`LivenessError::Exhausted`] after `max_attempts` failed probes.
pub async fn wait_for_service<F>(
    health_url: &str,
    config: &LivenessConfig,
    mut on_attempt: F,
) -> Result<u32, LivenessError>
where
    F: FnMut(u32),
{
    let mut backoff = Constant::new(config.interval());
    let mut attempt = 0;

    loop {
        attempt += 1;
        on_attempt(attempt);

        if check_health(health_url, config.timeout()).await {
            info!("Service reachable at {health_url} after {attempt} attempt(s)");
            return Ok(attempt);
        }

        if attempt >= config.max_attempts {
            break;
        }

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("Service not ready, retrying after {duration:?}");
                TokioSleep(duration).await;
            }
            None => break,
        }
    }

    warn!("Service at {health_url} unreachable after {attempt} attempts");
    Err(LivenessError::Exhausted {
        url: health_url.to_string(),
        attempts: attempt,
        location: ErrorLocation::from(Location::caller()),
    })
}
