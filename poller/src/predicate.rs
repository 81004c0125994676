// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

//! Success conditions applied to observed values.

use std::fmt::Debug;

use regex::Regex;

pub trait Predicate<T: ?Sized> {
    fn test(&self, value: &T) -> bool;

    /// Human readable form of the expectation, used in logs and wait errors.
    fn describe(&self) -> String {
        "custom condition".to_string()
    }
}

impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> bool,
{
    fn test(&self, value: &T) -> bool {
        self(value)
    }
}

/// Exact equality against an expected value.
#[derive(Debug, Clone, PartialEq)]
pub struct Equals<V>(pub V);

impl<T, V> Predicate<T> for Equals<V>
where
    T: PartialEq<V> + ?Sized,
    V: Debug,
{
    fn test(&self, value: &T) -> bool {
        *value == self.0
    }

    fn describe(&self) -> String {
        format!("equal to {:?}", self.0)
    }
}

/// Substring containment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contains(pub String);

impl Contains {
    pub fn new(needle: impl Into<String>) -> Self {
        Self(needle.into())
    }
}

impl<T: AsRef<str> + ?Sized> Predicate<T> for Contains {
    fn test(&self, value: &T) -> bool {
        value.as_ref().contains(self.0.as_str())
    }

    fn describe(&self) -> String {
        format!("containing {:?}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Matches(Regex);

impl Matches {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }
}

impl<T: AsRef<str> + ?Sized> Predicate<T> for Matches {
    fn test(&self, value: &T) -> bool {
        self.0.is_match(value.as_ref())
    }

    fn describe(&self) -> String {
        format!("matching /{}/", self.0.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Cmp {
    fn symbol(&self) -> &'static str {
        match self {
            Cmp::Lt => "<",
            Cmp::Le => "<=",
            Cmp::Eq => "==",
            Cmp::Ge => ">=",
            Cmp::Gt => ">",
        }
    }
}

/// Ordering comparison of the observed value against a threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Compare<V> {
    pub op: Cmp,
    pub threshold: V,
}

impl<V> Compare<V> {
    pub fn new(op: Cmp, threshold: V) -> Self {
        Self { op, threshold }
    }

    pub fn at_least(threshold: V) -> Self {
        Self::new(Cmp::Ge, threshold)
    }

    pub fn at_most(threshold: V) -> Self {
        Self::new(Cmp::Le, threshold)
    }
}

impl<T, V> Predicate<T> for Compare<V>
where
    T: PartialOrd<V> + ?Sized,
    V: Debug,
{
    fn test(&self, value: &T) -> bool {
        match self.op {
            Cmp::Lt => *value < self.threshold,
            Cmp::Le => *value <= self.threshold,
            Cmp::Eq => *value == self.threshold,
            Cmp::Ge => *value >= self.threshold,
            Cmp::Gt => *value > self.threshold,
        }
    }

    fn describe(&self) -> String {
        format!("{} {:?}", self.op.symbol(), self.threshold)
    }
}

/// Numeric comparison over textual output such as a replica count.
///
/// Text that does not parse as a number never matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Numeric(pub Compare<f64>);

impl Numeric {
    pub fn new(op: Cmp, threshold: f64) -> Self {
        Self(Compare::new(op, threshold))
    }
}

impl<T: AsRef<str> + ?Sized> Predicate<T> for Numeric {
    fn test(&self, value: &T) -> bool {
        match value.as_ref().trim().parse::<f64>() {
            Ok(n) => self.0.test(&n),
            Err(_) => false,
        }
    }

    fn describe(&self) -> String {
        format!("a number {}", Predicate::<f64>::describe(&self.0))
    }
}

#[derive(Debug, Clone)]
pub struct Not<P>(pub P);

impl<T: ?Sized, P: Predicate<T>> Predicate<T> for Not<P> {
    fn test(&self, value: &T) -> bool {
        !self.0.test(value)
    }

    fn describe(&self) -> String {
        format!("not {}", Predicate::<T>::describe(&self.0))
    }
}
