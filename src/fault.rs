//! Test faults and the failures handed to listeners.
//!
//! A [`Fault`] is whatever escapes a hook, a test body, or a rule. Assumption
//! violations are a distinct variant so reporting can tell "skip" apart from
//! "fail" with a single capability check instead of inspecting payloads.

use std::any::Any;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::Description;

/// A fault raised while executing some part of a test class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// A regular test failure or error.
    #[error("{0}")]
    Error(String),

    /// The test's preconditions do not hold; it should be skipped, not failed.
    #[error("assumption violated: {0}")]
    AssumptionViolated(String),

    /// Several faults collected from one statement (e.g. a body fault followed by teardown faults).
    #[error("{}", join_faults(.0))]
    Multiple(Vec<Fault>),
}

fn join_faults(faults: &[Fault]) -> String {
    let parts: Vec<String> = faults.iter().map(ToString::to_string).collect();
    format!("{} faults: {}", faults.len(), parts.join("; "))
}

impl Fault {
    pub fn error(message: impl Into<String>) -> Self {
        Fault::Error(message.into())
    }

    pub fn assumption(message: impl Into<String>) -> Self {
        Fault::AssumptionViolated(message.into())
    }

    /// True when this fault means "skipped", not "failed".
    pub fn is_assumption(&self) -> bool {
        matches!(self, Fault::AssumptionViolated(_))
    }

    /// Short label of the variant, used by listeners and artifact files.
    pub fn kind(&self) -> FaultKind {
        match self {
            Fault::Error(_) => FaultKind::Error,
            Fault::AssumptionViolated(_) => FaultKind::Assumption,
            Fault::Multiple(_) => FaultKind::Multiple,
        }
    }

    /// Collapse collected faults: none is success, one is itself, more become `Multiple`.
    pub fn assert_empty(mut faults: Vec<Fault>) -> Result<(), Fault> {
        match faults.len() {
            0 => Ok(()),
            1 => Err(faults.remove(0)),
            _ => Err(Fault::Multiple(faults)),
        }
    }

    /// Convert a panic payload caught with `catch_unwind` into a fault.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "test panicked with a non-string payload".to_string()
        };
        Fault::Error(format!("panicked: {}", message))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    Error,
    Assumption,
    Multiple,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaultKind::Error => "error",
            FaultKind::Assumption => "assumption",
            FaultKind::Multiple => "multiple",
        };
        f.write_str(s)
    }
}

/// Fail unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), Fault> {
    if condition { Ok(()) } else { Err(Fault::error(message)) }
}

/// Skip the current test unless `condition` holds.
pub fn assume(condition: bool, message: impl Into<String>) -> Result<(), Fault> {
    if condition { Ok(()) } else { Err(Fault::assumption(message)) }
}

/// A fault attributed to a test (or to a class, for class-level reports).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    description: Description,
    fault: Fault,
}

impl Failure {
    pub fn new(description: Description, fault: Fault) -> Self {
        Self { description, fault }
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn fault(&self) -> &Fault {
        &self.fault
    }

    pub fn message(&self) -> String {
        self.fault.to_string()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.description, self.fault)
    }
}
