// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

use std::fmt::{Debug, Display};
use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};

use crate::{ConfigError, ErrorPolicy, Outcome, PollSpec, Predicate, WaitError};

/// Repeats an observation until a predicate holds or the timeout elapses.
///
/// ```
/// use std::time::Duration;
/// use poller::{Equals, Poller};
///
/// let poller = Poller::new()
///     .with_interval(Duration::from_millis(10))
///     .with_timeout(Duration::from_millis(100))
///     .with_immediate(true);
/// let phase = poller
///     .wait(|| Ok::<_, String>("Running".to_string()), Equals("Running"))
///     .unwrap();
/// assert_eq!(phase, "Running");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Poller {
    spec: PollSpec,
    error_message: Option<String>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spec(spec: PollSpec) -> Self {
        Self {
            spec,
            error_message: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.spec.set_interval(interval);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.spec.set_timeout(timeout);
        self
    }

    pub fn with_immediate(mut self, immediate: bool) -> Self {
        self.spec = self.spec.immediate(immediate);
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.spec = self.spec.on_error(policy);
        self
    }

    /// Context for the `WaitError` returned by `wait` and `wait_async`.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn spec(&self) -> &PollSpec {
        &self.spec
    }

    /// Blocks the calling thread until the poll ends.
    pub fn poll<T, E, O, P>(&self, mut observe: O, predicate: P) -> Result<Outcome<T, E>, ConfigError>
    where
        O: FnMut() -> Result<T, E>,
        P: Predicate<T>,
        T: Debug,
        E: Display,
    {
        self.spec.validate()?;
        let mut attempts = Attempts::new(self.spec, &predicate);
        let start = std::time::Instant::now();
        if let Some(delay) = attempts.first_delay() {
            std::thread::sleep(delay);
        }
        loop {
            let result = observe();
            match attempts.record(result, start.elapsed()) {
                Step::Done(outcome) => return Ok(outcome),
                Step::Sleep(delay) => std::thread::sleep(delay),
            }
        }
    }

    /// Same loop as `poll`, sleeping on the tokio timer.
    pub async fn poll_async<T, E, O, F, P>(
        &self,
        mut observe: O,
        predicate: P,
    ) -> Result<Outcome<T, E>, ConfigError>
    where
        O: FnMut() -> F,
        F: Future<Output = Result<T, E>>,
        P: Predicate<T>,
        T: Debug,
        E: Display,
    {
        self.spec.validate()?;
        let mut attempts = Attempts::new(self.spec, &predicate);
        let start = tokio::time::Instant::now();
        if let Some(delay) = attempts.first_delay() {
            tokio::time::sleep(delay).await;
        }
        loop {
            let result = observe().await;
            match attempts.record(result, start.elapsed()) {
                Step::Done(outcome) => return Ok(outcome),
                Step::Sleep(delay) => tokio::time::sleep(delay).await,
            }
        }
    }

    pub fn wait<T, E, O, P>(&self, observe: O, predicate: P) -> Result<T, WaitError>
    where
        O: FnMut() -> Result<T, E>,
        P: Predicate<T>,
        T: Debug,
        E: Display,
    {
        let context = self.context(Predicate::<T>::describe(&predicate));
        self.poll(observe, predicate)?
            .into_result(context, self.spec.timeout())
    }

    pub async fn wait_async<T, E, O, F, P>(&self, observe: O, predicate: P) -> Result<T, WaitError>
    where
        O: FnMut() -> F,
        F: Future<Output = Result<T, E>>,
        P: Predicate<T>,
        T: Debug,
        E: Display,
    {
        let context = self.context(Predicate::<T>::describe(&predicate));
        self.poll_async(observe, predicate)
            .await?
            .into_result(context, self.spec.timeout())
    }

    fn context(&self, expectation: String) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| format!("waiting for a value {expectation}"))
    }
}

enum Step<T, E> {
    Done(Outcome<T, E>),
    Sleep(Duration),
}

/// Bookkeeping shared by the blocking and async loops.
struct Attempts<'p, T, E, P> {
    spec: PollSpec,
    predicate: &'p P,
    count: u32,
    last_value: Option<T>,
    last_error: Option<E>,
}

impl<'p, T, E, P> Attempts<'p, T, E, P>
where
    P: Predicate<T>,
    T: Debug,
    E: Display,
{
    fn new(spec: PollSpec, predicate: &'p P) -> Self {
        Self {
            spec,
            predicate,
            count: 0,
            last_value: None,
            last_error: None,
        }
    }

    fn first_delay(&self) -> Option<Duration> {
        (!self.spec.is_immediate()).then(|| self.spec.interval())
    }

    fn record(&mut self, result: Result<T, E>, elapsed: Duration) -> Step<T, E> {
        self.count += 1;
        match result {
            Ok(value) if self.predicate.test(&value) => {
                info!(
                    "condition {} met after {} attempt(s) in {elapsed:?}",
                    self.predicate.describe(),
                    self.count
                );
                return Step::Done(Outcome::Satisfied(value));
            }
            Ok(value) => {
                debug!(
                    "attempt {}: {value:?} is not {}",
                    self.count,
                    self.predicate.describe()
                );
                self.last_value = Some(value);
                self.last_error = None;
            }
            Err(e) => match self.spec.error_policy() {
                ErrorPolicy::Abort => {
                    warn!("attempt {}: observation failed, aborting: {e}", self.count);
                    return Step::Done(Outcome::Aborted(e));
                }
                ErrorPolicy::Retry => {
                    debug!("attempt {}: {e}, and try next round", self.count);
                    self.last_error = Some(e);
                }
            },
        }

        let timeout = self.spec.timeout();
        if elapsed >= timeout {
            warn!(
                "condition {} not met after {} attempt(s) in {elapsed:?}",
                self.predicate.describe(),
                self.count
            );
            return Step::Done(Outcome::TimedOut {
                last_value: self.last_value.take(),
                last_error: self.last_error.take(),
            });
        }
        Step::Sleep(self.spec.interval().min(timeout - elapsed))
    }
}
