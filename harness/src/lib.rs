// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

// Building blocks for end-to-end cluster tests: configuration, the cluster
// CLI collaborator, and waits built on the `poller` crate. Observations come
// either from CLI invocations (`wait`, `template`) or from the Kubernetes
// API (`k8s`).

pub mod cli;
pub mod command;
pub mod conditions;
pub mod config;
pub mod k8s;
pub mod template;
pub mod wait;

#[cfg(test)]
mod mock_client;
#[cfg(test)]
mod mock_runner;

pub use cli::{Cli, CliCommand, CliError};
pub use command::{CommandOutput, CommandRunner, Invocation, ProcessRunner};
pub use conditions::{ConditionStatus, PodPhase, Presence, Readiness, WorkloadKind};
pub use config::{HarnessConfig, PollDefaults, parse_duration};

/// Escalates a failed wait to a test failure, the way suites treat a timeout
/// as fatal for the current case.
#[macro_export]
macro_rules! assert_wait_ok {
    ($result:expr, $($msg:tt)+) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {}", format!($($msg)+), e),
        }
    };
}
