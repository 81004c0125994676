// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

use std::fmt::{Debug, Display};
use std::time::Duration;

use crate::ConfigError;

/// Terminal result of one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, E> {
    Satisfied(T),
    /// The deadline passed. Holds the most recent value and the most recent
    /// error seen since that value, if any.
    TimedOut {
        last_value: Option<T>,
        last_error: Option<E>,
    },
    /// An observation failed while polling with `ErrorPolicy::Abort`.
    Aborted(E),
}

impl<T, E> Outcome<T, E> {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Outcome::Satisfied(_))
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Outcome::TimedOut { .. })
    }

    pub fn satisfied(self) -> Option<T> {
        match self {
            Outcome::Satisfied(value) => Some(value),
            _ => None,
        }
    }

    /// Turns anything but `Satisfied` into a `WaitError` carrying `context`.
    pub fn into_result(self, context: impl Into<String>, timeout: Duration) -> Result<T, WaitError>
    where
        T: Debug,
        E: Display,
    {
        match self {
            Outcome::Satisfied(value) => Ok(value),
            Outcome::TimedOut {
                last_value,
                last_error,
            } => Err(WaitError::TimedOut {
                context: context.into(),
                timeout,
                last_value: last_value.map(|v| format!("{v:?}")),
                last_error: last_error.map(|e| e.to_string()),
            }),
            Outcome::Aborted(error) => Err(WaitError::Aborted {
                context: context.into(),
                error: error.to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum WaitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{context}: timed out after {timeout:?}{}", last_seen(.last_value, .last_error))]
    TimedOut {
        context: String,
        timeout: Duration,
        last_value: Option<String>,
        last_error: Option<String>,
    },
    #[error("{context}: observation failed: {error}")]
    Aborted { context: String, error: String },
}

impl WaitError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::TimedOut { .. })
    }
}

fn last_seen(value: &Option<String>, error: &Option<String>) -> String {
    match (value, error) {
        (None, None) => String::new(),
        (Some(v), None) => format!(" (last value: {v})"),
        (None, Some(e)) => format!(" (last error: {e})"),
        (Some(v), Some(e)) => format!(" (last value: {v}, last error: {e})"),
    }
}
