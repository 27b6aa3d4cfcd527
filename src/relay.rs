//! Capture relay connection management.
//!
//! The network-capture feed arrives over a message channel that the host
//! environment may tear down at any point (page navigation, extension
//! reload, listener restart). The manager owns the channel state and a
//! bounded reconnect loop; captured-body delivery itself goes straight
//! into a [`crate::capture::CaptureBuffer`].

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Channel lifecycle states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Bounded reconnect schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval_ms: 5_000,
        }
    }
}

/// The message channel a relay connects over.
pub trait RelayTransport {
    /// Open the channel. A returned error is retryable.
    fn open(&mut self) -> Result<()>;

    /// Let the environment run between attempts.
    fn idle(&mut self, _ms: u64) {}
}

/// Tracks channel state and drives the reconnect loop.
#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    policy: RetryPolicy,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            policy,
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Open the channel, retrying per policy. Already-connected calls
    /// are no-ops; exhaustion leaves the manager disconnected.
    pub fn ensure_connected(&mut self, transport: &mut dyn RelayTransport) -> Result<()> {
        if self.state == ConnectionState::Connected {
            return Ok(());
        }
        self.state = ConnectionState::Connecting;
        let mut last_error = None;
        for attempt in 1..=self.policy.max_attempts {
            match transport.open() {
                Ok(()) => {
                    self.state = ConnectionState::Connected;
                    debug!(attempt, "relay channel open");
                    return Ok(());
                }
                Err(err) => {
                    warn!(attempt, error = %err, "relay open failed");
                    last_error = Some(err);
                    if attempt < self.policy.max_attempts {
                        transport.idle(self.policy.interval_ms);
                    }
                }
            }
        }
        self.state = ConnectionState::Disconnected;
        Err(last_error
            .unwrap_or_else(|| Error::ConnectionFailed("no attempts configured".to_string())))
    }

    /// The environment dropped the channel; the next
    /// [`ensure_connected`](Self::ensure_connected) call reopens it.
    pub fn mark_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}
