// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

//! Poll an external, possibly flaky condition until it holds or a timeout elapses.
//!
//! A poll is described by a [`PollSpec`], observes its subject through a
//! caller supplied closure and decides success with a [`Predicate`]. The
//! result is an [`Outcome`]; whether a timeout is fatal is left to the caller.

mod outcome;
pub mod predicate;
mod spec;
mod timer;

pub use outcome::{Outcome, WaitError};
pub use predicate::{Cmp, Compare, Contains, Equals, Matches, Not, Numeric, Predicate};
pub use spec::{ConfigError, DEFAULT_INTERVAL, DEFAULT_TIMEOUT, ErrorPolicy, PollSpec};
pub use timer::Poller;
