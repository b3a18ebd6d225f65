//! Notification channel between runners and result consumers.
//!
//! Runners fire events on a [`RunNotifier`], which tallies them into a
//! [`RunSummary`] and fans them out to every registered [`RunListener`].
//! Listeners customize the output format (console, JSON lines, in-memory).

mod console;
mod json;
mod recording;

pub use console::ConsoleListener;
pub use json::JsonLinesListener;
pub use recording::RecordingListener;

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};

use crate::fault::{Failure, FaultKind};
use crate::model::Description;

/// Receives run events. Every method defaults to a no-op.
pub trait RunListener {
    /// Called when a run starts, before any test.
    fn on_run_started(&mut self, _description: &Description) {}

    /// Called when a test starts.
    fn on_test_started(&mut self, _description: &Description) {}

    /// Called when a test fails, class-level faults included.
    fn on_test_failure(&mut self, _failure: &Failure) {}

    /// Called when a test is skipped by a violated assumption.
    fn on_test_assumption_failure(&mut self, _failure: &Failure) {}

    /// Called when a test finishes, whatever its outcome.
    fn on_test_finished(&mut self, _description: &Description) {}

    /// Called once when the run ends, with the final totals.
    fn on_run_finished(&mut self, _summary: &RunSummary) {}
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Tests that finished (passed, failed or skipped).
    pub run: usize,
    /// Failures, class-level ones included.
    pub failed: usize,
    /// Tests skipped by an assumption violation.
    pub assumption_failed: usize,
    /// Failures attributed to a class rather than a test.
    pub class_failures: usize,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.run
            .saturating_sub(self.failed - self.class_failures)
            .saturating_sub(self.assumption_failed)
    }

    pub fn was_successful(&self) -> bool {
        self.failed == 0
    }
}

/// Fans events out to listeners and keeps the running tally.
#[derive(Default)]
pub struct RunNotifier {
    listeners: Vec<Box<dyn RunListener>>,
    summary: RunSummary,
    started_at: Option<Instant>,
}

impl RunNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: impl RunListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn with_listener(mut self, listener: impl RunListener + 'static) -> Self {
        self.add_listener(listener);
        self
    }

    pub fn fire_test_run_started(&mut self, description: &Description) {
        self.started_at = Some(Instant::now());
        for listener in &mut self.listeners {
            listener.on_run_started(description);
        }
    }

    pub fn fire_test_started(&mut self, description: &Description) {
        for listener in &mut self.listeners {
            listener.on_test_started(description);
        }
    }

    pub fn fire_test_failure(&mut self, failure: Failure) {
        self.summary.failed += 1;
        if !failure.description().is_test() {
            self.summary.class_failures += 1;
        }
        for listener in &mut self.listeners {
            listener.on_test_failure(&failure);
        }
    }

    pub fn fire_test_assumption_failed(&mut self, failure: Failure) {
        self.summary.assumption_failed += 1;
        for listener in &mut self.listeners {
            listener.on_test_assumption_failure(&failure);
        }
    }

    pub fn fire_test_finished(&mut self, description: &Description) {
        self.summary.run += 1;
        for listener in &mut self.listeners {
            listener.on_test_finished(description);
        }
    }

    /// Close the run and hand the final summary to listeners.
    pub fn fire_test_run_finished(&mut self) -> RunSummary {
        if let Some(started_at) = self.started_at.take() {
            self.summary.duration = started_at.elapsed();
        }
        let summary = self.summary.clone();
        for listener in &mut self.listeners {
            listener.on_run_finished(&summary);
        }
        summary
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }
}

/// A recorded or serialized event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    RunStarted {
        description: Description,
    },
    TestStarted {
        description: Description,
    },
    TestFailure {
        description: Description,
        kind: FaultKind,
        message: String,
    },
    TestAssumptionFailed {
        description: Description,
        message: String,
    },
    TestFinished {
        description: Description,
    },
    RunFinished {
        summary: RunSummary,
    },
}

impl Notification {
    fn failure(failure: &Failure) -> Self {
        Notification::TestFailure {
            description: failure.description().clone(),
            kind: failure.fault().kind(),
            message: failure.message(),
        }
    }

    fn assumption_failure(failure: &Failure) -> Self {
        Notification::TestAssumptionFailed {
            description: failure.description().clone(),
            message: failure.message(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::RunStarted { description } => write!(f, "run started: {}", description),
            Notification::TestStarted { description } => write!(f, "started: {}", description),
            Notification::TestFailure {
                description, message, ..
            } => write!(f, "failure: {}: {}", description, message),
            Notification::TestAssumptionFailed { description, message } => {
                write!(f, "assumption failed: {}: {}", description, message)
            }
            Notification::TestFinished { description } => write!(f, "finished: {}", description),
            Notification::RunFinished { summary } => write!(
                f,
                "run finished: {} run, {} failed, {} skipped",
                summary.run, summary.failed, summary.assumption_failed
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::Fault;
    use crate::model::TestMethod;

    fn desc(name: &str) -> Description {
        Description::for_method(&TestMethod::new("C", name))
    }

    #[test]
    fn test_notifier_tallies_events() {
        let mut notifier = RunNotifier::new();
        notifier.fire_test_run_started(&Description::for_class("C"));
        for (name, fault) in [
            ("a", None),
            ("b", Some(Fault::error("boom"))),
            ("c", Some(Fault::assumption("offline"))),
        ] {
            notifier.fire_test_started(&desc(name));
            match fault {
                Some(f) if f.is_assumption() => notifier.fire_test_assumption_failed(Failure::new(desc(name), f)),
                Some(f) => notifier.fire_test_failure(Failure::new(desc(name), f)),
                None => {}
            }
            notifier.fire_test_finished(&desc(name));
        }
        notifier.fire_test_failure(Failure::new(Description::for_class("C"), Fault::error("class")));

        let summary = notifier.fire_test_run_finished();
        assert_eq!(summary.run, 3);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.class_failures, 1);
        assert_eq!(summary.assumption_failed, 1);
        assert_eq!(summary.passed(), 1);
        assert!(!summary.was_successful());
    }

    #[test]
    fn test_notifier_fans_out_to_every_listener() {
        let first = RecordingListener::new();
        let second = RecordingListener::new();
        let mut notifier = RunNotifier::new()
            .with_listener(first.clone())
            .with_listener(second.clone());
        notifier.fire_test_started(&desc("a"));
        notifier.fire_test_finished(&desc("a"));

        assert_eq!(first.transcript(), vec!["started: a(C)", "finished: a(C)"]);
        assert_eq!(first.events(), second.events());
    }

    #[test]
    fn test_empty_summary_is_successful() {
        let summary = RunNotifier::new().fire_test_run_finished();
        assert!(summary.was_successful());
        assert_eq!(summary.passed(), 0);
    }
}
