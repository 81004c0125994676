// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use log::info;
use poller::{ConfigError, DEFAULT_INTERVAL, DEFAULT_TIMEOUT, ErrorPolicy, PollSpec, Poller};
use serde::{Deserialize, Deserializer};

pub const DEFAULT_CLI: &str = "oc";

/// Everything a test run needs to reach the cluster, passed explicitly to
/// each helper instead of living in process-wide state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub cli: String,
    pub kubeconfig: Option<PathBuf>,
    pub admin_kubeconfig: Option<PathBuf>,
    pub namespace: Option<String>,
    pub artifact_dir: PathBuf,
    pub poll: PollDefaults,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            cli: DEFAULT_CLI.to_string(),
            kubeconfig: None,
            admin_kubeconfig: None,
            namespace: None,
            artifact_dir: std::env::temp_dir(),
            poll: PollDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollDefaults {
    #[serde(deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    pub immediate: bool,
    pub on_error: ErrorPolicy,
}

impl Default for PollDefaults {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            immediate: false,
            on_error: ErrorPolicy::Retry,
        }
    }
}

impl PollDefaults {
    pub fn spec(&self) -> PollSpec {
        PollSpec::new(self.interval, self.timeout)
            .immediate(self.immediate)
            .on_error(self.on_error)
    }

    pub fn poller(&self) -> Poller {
        Poller::from_spec(self.spec())
    }
}

impl HarnessConfig {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.poll.spec().validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read harness config {}", path.display()))?;
        Self::from_yaml_str(&yaml)
            .with_context(|| format!("Invalid harness config {}", path.display()))
    }

    /// Reads `path` when given, then fills `kubeconfig` from `KUBECONFIG`
    /// if the file left it unset.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(p) => {
                info!("Loading harness config from {}", p.display());
                Self::from_file(p)?
            }
            None => Self::default(),
        };
        if config.kubeconfig.is_none() {
            config.kubeconfig = std::env::var_os("KUBECONFIG")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from);
        }
        Ok(config)
    }

    /// The kubeconfig for regular or admin invocations.
    pub fn kubeconfig_for(&self, admin: bool) -> Option<&Path> {
        match (admin, &self.admin_kubeconfig) {
            (true, Some(path)) => Some(path),
            _ => self.kubeconfig.as_deref(),
        }
    }
}

/// Parses `500ms`, `30s`, `5m`, `1h`, or a bare number of seconds.
pub fn parse_duration(text: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(text.to_string());
    let text = text.trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);
    if digits.is_empty() {
        return Err(invalid());
    }
    let value: u64 = digits.parse().map_err(|_| invalid())?;
    let duration = match unit.trim() {
        "ms" => Duration::from_millis(value),
        "" | "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.checked_mul(60).ok_or_else(invalid)?),
        "h" => Duration::from_secs(value.checked_mul(3600).ok_or_else(invalid)?),
        _ => return Err(invalid()),
    };
    Ok(duration)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Secs(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Secs(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}
