//! Running several test classes against one notifier.

use crate::error::RunnerError;
use crate::fault::{Failure, Fault};
use crate::filter::Filter;
use crate::model::Description;
use crate::notification::{RunNotifier, RunSummary};
use crate::runner::block::add_failure;
use crate::runner::functional::Functional;

/// A runner for one test class, as seen by a [`Suite`].
pub trait ClassRunner {
    fn description(&self) -> Description;
    fn filter(&mut self, filter: &dyn Filter) -> Result<(), RunnerError>;
    fn run(&self, notifier: &mut RunNotifier) -> Result<(), RunnerError>;
}

impl<F: 'static> ClassRunner for Functional<F> {
    fn description(&self) -> Description {
        Functional::description(self)
    }

    fn filter(&mut self, filter: &dyn Filter) -> Result<(), RunnerError> {
        Functional::filter(self, filter)
    }

    fn run(&self, notifier: &mut RunNotifier) -> Result<(), RunnerError> {
        let saved = Functional::run(self, notifier)?;
        if !saved.is_empty() {
            tracing::info!(class = %self.description(), artifacts = saved.len(), "failure artifacts captured");
        }
        Ok(())
    }
}

pub struct Suite {
    name: String,
    runners: Vec<Box<dyn ClassRunner>>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runners: Vec::new(),
        }
    }

    pub fn add(mut self, runner: impl ClassRunner + 'static) -> Self {
        self.runners.push(Box::new(runner));
        self
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    /// Apply `filter` to every class, dropping the classes it empties.
    /// Fails only when no class has a test left.
    pub fn filter(&mut self, filter: &dyn Filter) -> Result<(), RunnerError> {
        let mut keep = Vec::with_capacity(self.runners.len());
        for runner in &mut self.runners {
            match runner.filter(filter) {
                Ok(()) => keep.push(true),
                Err(RunnerError::NoTestsRemain { .. }) => {
                    tracing::debug!(class = %runner.description(), "class has no tests left after filter");
                    keep.push(false);
                }
                Err(e) => return Err(e),
            }
        }
        if !keep.contains(&true) {
            return Err(RunnerError::NoTestsRemain {
                filter: filter.describe(),
            });
        }
        let mut keep = keep.into_iter();
        self.runners.retain(|_| keep.next().unwrap_or(false));
        Ok(())
    }

    /// Run every class in order and return the final summary.
    pub fn run(&self, notifier: &mut RunNotifier) -> RunSummary {
        notifier.fire_test_run_started(&Description::for_class(self.name.clone()));
        for runner in &self.runners {
            let description = runner.description();
            match runner.run(notifier) {
                Ok(()) => {}
                Err(RunnerError::ClassFault { fault, .. }) => {
                    tracing::warn!(class = %description, %fault, "class fault not attributed to any test");
                    add_failure(notifier, &description, fault);
                }
                Err(e) => {
                    tracing::warn!(class = %description, error = %e, "class could not run");
                    notifier.fire_test_failure(Failure::new(description, Fault::error(e.to_string())));
                }
            }
        }
        let summary = notifier.fire_test_run_finished();
        tracing::info!(
            run = summary.run,
            failed = summary.failed,
            skipped = summary.assumption_failed,
            "suite finished"
        );
        summary
    }
}
