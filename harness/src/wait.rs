// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

//! Waits driven by the cluster CLI.

use log::info;
use poller::{Compare, Equals, Matches, Poller, Predicate, WaitError};

use crate::cli::Cli;
use crate::conditions::{ConditionStatus, PodPhase, Presence, Readiness, WorkloadKind};

/// `get` until it succeeds, returning its output.
pub fn get_resource(cli: &Cli, poller: &Poller, args: &[&str]) -> Result<String, WaitError> {
    let result = poller.wait(
        || cli.run("get").args(args).output(),
        |_: &String| true,
    )?;
    info!("The resource returned:\n{result}");
    Ok(result)
}

/// Polls a JSONPath field of `resource` until `predicate` accepts it.
pub fn expect_jsonpath<P>(
    cli: &Cli,
    poller: &Poller,
    resource: &[&str],
    jsonpath: &str,
    predicate: P,
) -> Result<String, WaitError>
where
    P: Predicate<String>,
{
    let output_flag = format!("-o=jsonpath={jsonpath}");
    poller.wait(
        || cli.run("get").args(resource).args([&output_flag]).output(),
        predicate,
    )
}

/// Waits until condition `condition_type` of `resource` reports `expected`.
pub fn wait_for_condition(
    cli: &Cli,
    poller: &Poller,
    resource: &[&str],
    condition_type: &str,
    expected: ConditionStatus,
) -> Result<ConditionStatus, WaitError> {
    let output_flag =
        format!(r#"-o=jsonpath={{.status.conditions[?(@.type=="{condition_type}")].status}}"#);
    info!("Waiting for {resource:?} condition {condition_type} to be {expected}");
    poller.wait(
        || -> anyhow::Result<ConditionStatus> {
            let status = cli.run("get").args(resource).args([&output_flag]).output()?;
            Ok(status.parse()?)
        },
        Equals(expected),
    )
}

pub fn wait_for_pod_phase(
    cli: &Cli,
    poller: &Poller,
    pod: &str,
    expected: PodPhase,
) -> Result<PodPhase, WaitError> {
    poller.wait(
        || -> anyhow::Result<PodPhase> {
            let phase = cli
                .run("get")
                .args(["pod", pod, "-o=jsonpath={.status.phase}"])
                .output()?;
            Ok(phase.parse()?)
        },
        Equals(expected),
    )
}

/// Waits until `get` reports the resource as not found, or lists nothing
/// when `resource` is a selector such as `pods -l app=web`.
pub fn wait_for_deleted(cli: &Cli, poller: &Poller, resource: &[&str]) -> Result<(), WaitError> {
    poller.wait(
        || match cli.run("get").args(resource).args(["-o=name"]).output() {
            Ok(names) if names.is_empty() => Ok(Presence::Absent),
            Ok(_) => Ok(Presence::Present),
            Err(e) if e.is_not_found() => Ok(Presence::Absent),
            Err(e) => Err(e),
        },
        Equals(Presence::Absent),
    )?;
    info!("{resource:?} is deleted");
    Ok(())
}

/// Waits until at least `minimal` lines of the logs of `pod` match `filter`.
/// Returns the number of matching lines.
pub fn wait_for_log_matches(
    cli: &Cli,
    poller: &Poller,
    pod: &str,
    filter: &Matches,
    minimal: usize,
) -> Result<usize, WaitError> {
    let matched = poller.wait(
        || -> anyhow::Result<usize> {
            let logs = cli.run("logs").args([pod]).output()?;
            Ok(logs
                .lines()
                .filter(|line| Predicate::<str>::test(filter, line))
                .count())
        },
        Compare::at_least(minimal),
    )?;
    info!(
        "{matched} line(s) of {pod} logs are {}",
        Predicate::<str>::describe(filter)
    );
    Ok(matched)
}

/// Waits until every desired replica of a workload is ready.
pub fn wait_for_workload_ready(
    cli: &Cli,
    poller: &Poller,
    kind: WorkloadKind,
    name: &str,
) -> Result<Readiness, WaitError> {
    let output_flag = format!("-o=jsonpath={}", kind.readiness_jsonpath());
    let readiness = poller.wait(
        || -> anyhow::Result<Readiness> {
            let pair = cli
                .run("get")
                .args([kind.resource(), name, output_flag.as_str()])
                .output()?;
            Ok(pair.parse()?)
        },
        |r: &Readiness| r.is_ready(),
    )?;
    info!("{} {name} has successfully progressed", kind.resource());
    Ok(readiness)
}
