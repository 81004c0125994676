// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Parser;
use env_logger::Env;
use harness::{CommandRunner, HarnessConfig, Invocation, ProcessRunner, parse_duration};
use log::info;
use poller::{Cmp, Contains, Equals, ErrorPolicy, Matches, Not, Numeric, Poller, Predicate};

/// Run a command until its output satisfies a condition
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Harness configuration file providing poll defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Time between attempts, e.g. 500ms, 5s, 1m
    #[arg(long, value_parser = parse_duration)]
    interval: Option<Duration>,

    /// Give up after this long
    #[arg(long, value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Run the first attempt right away instead of after one interval
    #[arg(long)]
    immediate: bool,

    /// Stop at the first failing run of the command instead of retrying
    #[arg(long)]
    fail_fast: bool,

    #[command(flatten)]
    check: CheckArgs,

    /// Command to observe, after `--`
    #[arg(last = true, required = true)]
    command: Vec<String>,
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct CheckArgs {
    /// Output equals this value
    #[arg(long)]
    equals: Option<String>,
    /// Output contains this substring
    #[arg(long)]
    contains: Option<String>,
    /// Output does not contain this substring
    #[arg(long)]
    not_contains: Option<String>,
    /// Output matches this regular expression
    #[arg(long)]
    matches: Option<String>,
    /// Output is a number greater than or equal to this
    #[arg(long, allow_negative_numbers = true)]
    at_least: Option<f64>,
    /// Output is a number less than or equal to this
    #[arg(long, allow_negative_numbers = true)]
    at_most: Option<f64>,
}

#[derive(Debug)]
enum Check {
    Equals(Equals<String>),
    Contains(Contains),
    NotContains(Not<Contains>),
    Matches(Matches),
    Numeric(Numeric),
}

impl Check {
    fn from_args(args: &CheckArgs) -> Result<Self> {
        let check = if let Some(v) = &args.equals {
            Check::Equals(Equals(v.clone()))
        } else if let Some(v) = &args.contains {
            Check::Contains(Contains::new(v.as_str()))
        } else if let Some(v) = &args.not_contains {
            Check::NotContains(Not(Contains::new(v.as_str())))
        } else if let Some(v) = &args.matches {
            Check::Matches(Matches::new(v)?)
        } else if let Some(n) = args.at_least {
            Check::Numeric(Numeric::new(Cmp::Ge, n))
        } else if let Some(n) = args.at_most {
            Check::Numeric(Numeric::new(Cmp::Le, n))
        } else {
            return Err(anyhow!("no condition given"));
        };
        Ok(check)
    }
}

impl Predicate<String> for Check {
    fn test(&self, value: &String) -> bool {
        match self {
            Check::Equals(p) => p.test(value),
            Check::Contains(p) => p.test(value),
            Check::NotContains(p) => p.test(value),
            Check::Matches(p) => p.test(value),
            Check::Numeric(p) => p.test(value),
        }
    }

    fn describe(&self) -> String {
        match self {
            Check::Equals(p) => Predicate::<String>::describe(p),
            Check::Contains(p) => Predicate::<String>::describe(p),
            Check::NotContains(p) => Predicate::<String>::describe(p),
            Check::Matches(p) => Predicate::<String>::describe(p),
            Check::Numeric(p) => Predicate::<String>::describe(p),
        }
    }
}

fn build_poller(args: &Args, config: &HarnessConfig) -> Poller {
    let mut poller = config.poll.poller();
    if let Some(interval) = args.interval {
        poller = poller.with_interval(interval);
    }
    if let Some(timeout) = args.timeout {
        poller = poller.with_timeout(timeout);
    }
    if args.immediate {
        poller = poller.with_immediate(true);
    }
    if args.fail_fast {
        poller = poller.with_error_policy(ErrorPolicy::Abort);
    }
    poller
}

/// One attempt: trimmed stdout of a successful run, an error otherwise.
fn observe(runner: &dyn CommandRunner, invocation: &Invocation) -> Result<String> {
    let output = runner.run(invocation)?;
    if !output.success() {
        return Err(anyhow!(
            "{invocation} exited with {:?}: {}",
            output.status,
            output.stderr.trim()
        ));
    }
    Ok(output.stdout.trim().to_string())
}

fn run(args: &Args, runner: &dyn CommandRunner) -> Result<String> {
    let config = HarnessConfig::load(args.config.as_deref())?;
    let check = Check::from_args(&args.check)?;
    let (program, rest) = args
        .command
        .split_first()
        .ok_or_else(|| anyhow!("no command given"))?;
    let invocation = Invocation::new(program.as_str(), rest.iter().map(String::as_str));
    let poller = build_poller(args, &config).with_error_message(format!(
        "`{invocation}` output is not {}",
        check.describe()
    ));

    info!("Polling `{invocation}` until its output is {}", check.describe());
    let value = poller.wait(|| observe(runner, &invocation), check)?;
    Ok(value)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let value = run(&args, &ProcessRunner)?;
    println!("{value}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_full_command_line() {
        let args = parse(&[
            "pollctl",
            "--interval",
            "500ms",
            "--timeout",
            "2m",
            "--immediate",
            "--equals",
            "Running",
            "--",
            "oc",
            "get",
            "pod",
            "web-0",
            "-o=jsonpath={.status.phase}",
        ]);
        assert_eq!(args.interval, Some(Duration::from_millis(500)));
        assert_eq!(args.timeout, Some(Duration::from_secs(120)));
        assert!(args.immediate);
        assert_eq!(args.check.equals.as_deref(), Some("Running"));
        assert_eq!(args.command[0], "oc");
        assert_eq!(args.command.len(), 5);
    }

    #[test]
    fn test_condition_required() {
        assert!(Args::try_parse_from(["pollctl", "--", "true"]).is_err());
    }

    #[test]
    fn test_conditions_exclusive() {
        assert!(
            Args::try_parse_from(["pollctl", "--equals", "a", "--contains", "b", "--", "true"])
                .is_err()
        );
    }

    #[test]
    fn test_command_required() {
        assert!(Args::try_parse_from(["pollctl", "--equals", "a"]).is_err());
    }

    #[test]
    fn test_invalid_duration_rejected() {
        assert!(
            Args::try_parse_from(["pollctl", "--interval", "-1s", "--equals", "a", "--", "true"])
                .is_err()
        );
    }

    #[test]
    fn test_negative_threshold() {
        let args = parse(&["pollctl", "--at-least", "-1", "--", "echo", "0"]);
        assert_eq!(args.check.at_least, Some(-1.0));
    }

    #[test]
    fn test_poller_overrides_config() {
        let args = parse(&[
            "pollctl",
            "--timeout",
            "30s",
            "--fail-fast",
            "--contains",
            "x",
            "--",
            "true",
        ]);
        let poller = build_poller(&args, &HarnessConfig::default());
        assert_eq!(poller.spec().timeout(), Duration::from_secs(30));
        assert_eq!(poller.spec().interval(), poller::DEFAULT_INTERVAL);
        assert_eq!(poller.spec().error_policy(), ErrorPolicy::Abort);
        assert!(!poller.spec().is_immediate());
    }

    #[test]
    fn test_check_from_args() {
        let args = parse(&["pollctl", "--matches", "^ip-", "--", "true"]);
        let check = Check::from_args(&args.check).unwrap();
        assert!(check.test(&"ip-10-0-0-1".to_string()));
        assert_eq!(check.describe(), "matching /^ip-/");

        let args = parse(&["pollctl", "--matches", "(", "--", "true"]);
        assert!(Check::from_args(&args.check).is_err());

        let args = parse(&["pollctl", "--not-contains", "NotFound", "--", "true"]);
        let check = Check::from_args(&args.check).unwrap();
        assert!(check.test(&"pod/web-0".to_string()));
    }

    #[test]
    fn test_run_satisfied() {
        let args = parse(&[
            "pollctl",
            "--interval",
            "10ms",
            "--timeout",
            "1s",
            "--immediate",
            "--at-least",
            "2",
            "--",
            "echo",
            "3",
        ]);
        assert_eq!(run(&args, &ProcessRunner).unwrap(), "3");
    }

    #[test]
    fn test_run_times_out() {
        let args = parse(&[
            "pollctl",
            "--interval",
            "10ms",
            "--timeout",
            "50ms",
            "--equals",
            "Running",
            "--",
            "echo",
            "Pending",
        ]);
        let err = run(&args, &ProcessRunner).unwrap_err();
        assert_eq!(
            err.to_string(),
            "`echo Pending` output is not equal to \"Running\": \
             timed out after 50ms (last value: \"Pending\")"
        );
    }

    #[test]
    fn test_run_fail_fast() {
        let args = parse(&[
            "pollctl",
            "--interval",
            "10ms",
            "--timeout",
            "1s",
            "--immediate",
            "--fail-fast",
            "--equals",
            "ok",
            "--",
            "sh",
            "-c",
            "echo boom >&2; exit 2",
        ]);
        let err = run(&args, &ProcessRunner).unwrap_err();
        assert!(err.to_string().contains("observation failed"));
        assert!(err.to_string().contains("boom"));
    }
}
