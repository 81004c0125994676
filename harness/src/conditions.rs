// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

//! Typed forms of the status strings read back from the cluster.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("unexpected {kind} value {value:?}")]
pub struct ParseValueError {
    kind: &'static str,
    value: String,
}

impl ParseValueError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

pub fn condition_status(status: bool) -> ConditionStatus {
    match status {
        true => ConditionStatus::True,
        false => ConditionStatus::False,
    }
}

impl FromStr for ConditionStatus {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "True" => Ok(ConditionStatus::True),
            "False" => Ok(ConditionStatus::False),
            "Unknown" => Ok(ConditionStatus::Unknown),
            other => Err(ParseValueError::new("condition status", other)),
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl FromStr for PodPhase {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pending" => Ok(PodPhase::Pending),
            "Running" => Ok(PodPhase::Running),
            "Succeeded" => Ok(PodPhase::Succeeded),
            "Failed" => Ok(PodPhase::Failed),
            "Unknown" => Ok(PodPhase::Unknown),
            other => Err(ParseValueError::new("pod phase", other)),
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
}

/// Ready versus desired replicas of a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub ready: i64,
    pub desired: i64,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.desired > 0 && self.ready == self.desired
    }
}

/// Parses `<ready>:<desired>`; the API omits zero counts, so empty means 0.
impl FromStr for Readiness {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseValueError::new("readiness", s);
        let (ready, desired) = s.trim().split_once(':').ok_or_else(err)?;
        let count = |field: &str| -> Result<i64, ParseValueError> {
            match field.trim() {
                "" => Ok(0),
                n => n.parse().map_err(|_| err()),
            }
        };
        Ok(Readiness {
            ready: count(ready)?,
            desired: count(desired)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl WorkloadKind {
    pub fn resource(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "deployment",
            WorkloadKind::StatefulSet => "statefulset",
            WorkloadKind::DaemonSet => "daemonset",
        }
    }

    /// JSONPath template printing the readiness pair.
    pub fn readiness_jsonpath(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment | WorkloadKind::StatefulSet => {
                "{.status.readyReplicas}:{.status.replicas}"
            }
            WorkloadKind::DaemonSet => "{.status.numberReady}:{.status.desiredNumberScheduled}",
        }
    }
}
