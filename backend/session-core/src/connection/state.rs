use crate::config::ReconnectConfig;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Open,
    Closed,
    Failed,
}

/// Phase plus the count of consecutive failed attempts.
///
/// `attempt` resets to 0 only on a successful open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConnectionState {
    pub phase: ConnectionPhase,
    pub attempt: u32,
}

impl ConnectionState {
    /// Delay before the next reconnect, or `None` once attempts are exhausted.
    pub fn next_delay_ms(&self, policy: &ReconnectPolicy) -> Option<u64> {
        policy.delay_ms(self.attempt)
    }
}

/// Capped exponential reconnect schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay_ms: u64,
    pub cap_delay_ms: u64,
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    /// `min(base * 2^(attempt - 1), cap)` for attempts `1..=max_attempts`.
    pub fn delay_ms(&self, attempt: u32) -> Option<u64> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }

        let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
        Some(self.base_delay_ms.saturating_mul(factor).min(self.cap_delay_ms))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&ReconnectConfig::default())
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            base_delay_ms: config.base_delay_ms,
            cap_delay_ms: config.cap_delay_ms,
            max_attempts: config.max_attempts,
        }
    }
}
