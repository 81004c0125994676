// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::Deserialize;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
    #[error("poll timeout must be greater than zero")]
    ZeroTimeout,
    #[error("poll timeout {timeout:?} is shorter than the interval {interval:?}")]
    TimeoutShorterThanInterval {
        interval: Duration,
        timeout: Duration,
    },
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
}

/// What the poll loop does when an observation itself fails.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ErrorPolicy {
    /// Treat the error as "not satisfied yet" and keep polling until the timeout.
    #[default]
    Retry,
    /// Stop at the first error and report it.
    Abort,
}

/// Timing and error handling of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSpec {
    interval: Duration,
    timeout: Duration,
    immediate: bool,
    on_error: ErrorPolicy,
}

impl Default for PollSpec {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, DEFAULT_TIMEOUT)
    }
}

impl PollSpec {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            immediate: false,
            on_error: ErrorPolicy::Retry,
        }
    }

    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.on_error
    }

    pub(crate) fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub(crate) fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Checked before the first observation; a poll never starts with a bad spec.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.timeout < self.interval {
            return Err(ConfigError::TimeoutShorterThanInterval {
                interval: self.interval,
                timeout: self.timeout,
            });
        }
        Ok(())
    }
}
