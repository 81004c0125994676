// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use crate::command::{CommandRunner, Invocation, ProcessRunner};
use crate::config::HarnessConfig;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{command} exited with {}: {stderr}", exit_code(.status))]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliError {
    pub fn is_not_found(&self) -> bool {
        match self {
            CliError::Failed { stderr, .. } => {
                stderr.contains("NotFound") || stderr.contains("not found")
            }
            _ => false,
        }
    }
}

fn exit_code(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Cluster CLI (`oc`, `kubectl`) bound to a configuration and a runner.
#[derive(Clone)]
pub struct Cli {
    config: Arc<HarnessConfig>,
    runner: Arc<dyn CommandRunner>,
    admin: bool,
    namespaced: bool,
}

impl Cli {
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }

    pub fn with_runner(config: HarnessConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config: Arc::new(config),
            runner,
            admin: false,
            namespaced: true,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn as_admin(&self) -> Self {
        Self {
            admin: true,
            ..self.clone()
        }
    }

    pub fn without_namespace(&self) -> Self {
        Self {
            namespaced: false,
            ..self.clone()
        }
    }

    pub fn run(&self, verb: &str) -> CliCommand<'_> {
        CliCommand {
            cli: self,
            verb: verb.to_string(),
            args: Vec::new(),
        }
    }
}

pub struct CliCommand<'a> {
    cli: &'a Cli,
    verb: String,
    args: Vec<String>,
}

impl CliCommand<'_> {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    /// `<cli> [--kubeconfig=..] [--namespace=..] <verb> <args..>`
    pub fn invocation(&self) -> Invocation {
        let config = &self.cli.config;
        let mut args = Vec::new();
        if let Some(path) = config.kubeconfig_for(self.cli.admin) {
            args.push(format!("--kubeconfig={}", path.display()));
        }
        if self.cli.namespaced
            && let Some(ns) = &config.namespace
        {
            args.push(format!("--namespace={ns}"));
        }
        args.push(self.verb.clone());
        args.extend(self.args.iter().cloned());
        Invocation::new(config.cli.clone(), args)
    }

    /// Trimmed stdout of a successful run.
    pub fn output(&self) -> Result<String, CliError> {
        let invocation = self.invocation();
        let output = self
            .cli
            .runner
            .run(&invocation)
            .map_err(|source| CliError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;
        if !output.success() {
            return Err(CliError::Failed {
                command: invocation.to_string(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        debug!("{invocation}: {}", output.stdout.trim());
        Ok(output.stdout.trim().to_string())
    }

    pub fn execute(&self) -> Result<(), CliError> {
        self.output().map(|_| ())
    }

    /// Writes stdout to `artifact_dir/file_name` and returns the path.
    pub fn output_to_file(&self, file_name: &str) -> Result<PathBuf, CliError> {
        let stdout = self.output()?;
        let path = self.cli.config.artifact_dir.join(file_name);
        std::fs::write(&path, stdout).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
