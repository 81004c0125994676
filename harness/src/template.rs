// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use anyhow::Context;
use log::info;
use poller::{Poller, WaitError};

use crate::cli::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateAction {
    Create,
    Apply,
}

impl TemplateAction {
    fn verb(&self) -> &'static str {
        match self {
            TemplateAction::Create => "create",
            TemplateAction::Apply => "apply",
        }
    }
}

/// Renders a template with `process`, retrying until it succeeds.
///
/// Runs as whichever user `cli` is set up for. Each attempt writes to a
/// fresh file under the artifact directory.
pub fn process_template(cli: &Cli, poller: &Poller, params: &[&str]) -> Result<PathBuf, WaitError> {
    let path = poller.wait(
        || {
            let file_name = format!("{}-config.json", uuid::Uuid::new_v4().simple());
            cli.run("process").args(params).output_to_file(&file_name)
        },
        |_: &PathBuf| true,
    )?;
    info!("the file of resource is {}", path.display());
    Ok(path)
}

pub fn apply_template(
    cli: &Cli,
    poller: &Poller,
    namespace: Option<&str>,
    params: &[&str],
) -> anyhow::Result<()> {
    resource_from_template(cli, poller, TemplateAction::Apply, namespace, params)
}

pub fn create_from_template(
    cli: &Cli,
    poller: &Poller,
    namespace: Option<&str>,
    params: &[&str],
) -> anyhow::Result<()> {
    resource_from_template(cli, poller, TemplateAction::Create, namespace, params)
}

fn resource_from_template(
    cli: &Cli,
    poller: &Poller,
    action: TemplateAction,
    namespace: Option<&str>,
    params: &[&str],
) -> anyhow::Result<()> {
    let admin = cli.as_admin();
    let path = process_template(&admin, poller, params)
        .with_context(|| format!("fail to process {params:?}"))?;
    let path = path.display().to_string();
    let mut args = vec!["-f", path.as_str()];
    if let Some(ns) = namespace {
        args.extend(["-n", ns]);
    }
    admin
        .without_namespace()
        .run(action.verb())
        .args(&args)
        .execute()
        .with_context(|| format!("fail to {} resource from {path}", action.verb()))?;
    Ok(())
}
