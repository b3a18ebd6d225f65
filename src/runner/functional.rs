//! Functional runner: the base engine plus no-metric hooks, early failure
//! artifacts and per-test reporting of class-level faults.
//!
//! Differences from [`StandardLifecycle`](crate::runner::StandardLifecycle):
//!
//! - `NoMetricBefore` hooks run after the `Before` hooks, right before the
//!   test; `NoMetricAfter` hooks run right after the test, before the
//!   `After` hooks. The base engine never runs them.
//! - Every phase is wrapped in an artifact saver, so the artifact is taken as
//!   soon as a fault is raised, before any teardown changes the state of the
//!   system under test. Each test gets at most one artifact per class run.
//! - A fault escaping the class block (class setup/teardown, class rules) is
//!   reported as a failure of every selected test instead of aborting the
//!   class.

use std::rc::Rc;

use crate::backends::{Backends, SamplingGuard};
use crate::config::RunnerConfig;
use crate::error::RunnerError;
use crate::filter::Filter;
use crate::model::{Annotation, Description, ExecutionPhase, FrameworkMethod, Target, TestClass, TestMethod};
use crate::notification::RunNotifier;
use crate::runner::block::{BlockRunner, RunnerLifecycle};
use crate::runner::decorators::{artifact_saver, with_trace};
use crate::runner::filter_tracker::FilterTracker;
use crate::runner::reporter::report_class_failure;
use crate::statement::{SavedArtifactSet, Statement, run_afters, run_befores};

pub struct Functional<F> {
    base: BlockRunner<F>,
    tracker: FilterTracker,
    backends: Backends,
    trace_prefix: String,
}

impl<F: 'static> Functional<F> {
    pub fn new(class: TestClass<F>, backends: Backends) -> Result<Self, RunnerError> {
        let base = BlockRunner::new(class)?;
        let tracker = FilterTracker::new(base.children());
        Ok(Self {
            base,
            tracker,
            backends,
            trace_prefix: RunnerConfig::default().trace_prefix,
        })
    }

    /// Runner with the default backends selected by `config`.
    pub fn with_config(class: TestClass<F>, config: &RunnerConfig) -> Result<Self, RunnerError> {
        let runner = Self::new(class, Backends::from_config(config))?;
        Ok(runner.with_trace_prefix(config.trace_prefix.clone()))
    }

    pub fn with_trace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.trace_prefix = prefix.into();
        self
    }

    pub fn description(&self) -> Description {
        self.base.description()
    }

    /// Apply `filter` to the base engine and to the tracked selection.
    pub fn filter(&mut self, filter: &dyn Filter) -> Result<(), RunnerError> {
        self.tracker.apply_filter(&mut self.base, filter)
    }

    /// Tests currently selected to run.
    pub fn current_methods(&self) -> &[TestMethod] {
        self.tracker.current_methods()
    }

    /// Run the class. Class-level faults are reported per test; only when no
    /// test is selected does one come back as [`RunnerError::ClassFault`].
    /// Returns the tests an artifact was captured for.
    pub fn run(&self, notifier: &mut RunNotifier) -> Result<SavedArtifactSet, RunnerError> {
        self.base.run(self, notifier)
    }

    fn section(&self, phase: ExecutionPhase) -> String {
        format!("{}#{}", self.trace_prefix, phase.section_name())
    }

    fn selected_targets(&self) -> Vec<(TestMethod, Description)> {
        self.tracker
            .current_methods()
            .iter()
            .map(|m| (m.clone(), self.base.describe_child(m)))
            .collect()
    }

    fn single_target(&self, method: &TestMethod) -> Vec<(TestMethod, Description)> {
        vec![(method.clone(), self.base.describe_child(method))]
    }

    fn traced<'a>(&self, phase: ExecutionPhase, statement: Statement<'a>) -> Statement<'a> {
        with_trace(Rc::clone(&self.backends.trace), self.section(phase), statement)
    }

    fn saving<'a>(&self, targets: Vec<(TestMethod, Description)>, statement: Statement<'a>) -> Statement<'a> {
        artifact_saver(Rc::clone(&self.backends.artifacts), targets, statement)
    }

    pub fn wrap_class_setup<'a>(&self, work: Statement<'a>) -> Statement<'a> {
        self.traced(ExecutionPhase::ClassSetup, self.saving(self.selected_targets(), work))
    }

    /// `work` is the test invocation; the result runs `Before` hooks, then
    /// `NoMetricBefore` hooks, then `work`.
    pub fn wrap_method_setup<'a>(
        &self,
        method: &FrameworkMethod<F>,
        target: &Target<F>,
        work: Statement<'a>,
    ) -> Statement<'a> {
        let no_metric = self.base.test_class().annotated_methods(Annotation::NoMetricBefore);
        let statement = run_befores(work, no_metric, Some(Rc::clone(target)));
        let statement = self.base.with_befores(method, target, statement);
        self.traced(
            ExecutionPhase::MethodSetup,
            self.saving(self.single_target(method.method()), statement),
        )
    }

    /// The result runs `work`, then `NoMetricAfter` hooks, then `After` hooks.
    pub fn wrap_method_teardown<'a>(
        &self,
        method: &FrameworkMethod<F>,
        target: &Target<F>,
        work: Statement<'a>,
    ) -> Statement<'a> {
        let no_metric = self.base.test_class().annotated_methods(Annotation::NoMetricAfter);
        let statement = run_afters(work, no_metric, Some(Rc::clone(target)));
        let statement = self.base.with_afters(method, target, statement);
        self.traced(
            ExecutionPhase::MethodTeardown,
            self.saving(self.single_target(method.method()), statement),
        )
    }

    /// Covers faults raised outside the hooks, e.g. in method rules.
    pub fn wrap_method_body<'a>(&self, method: &TestMethod, work: Statement<'a>) -> Statement<'a> {
        self.saving(self.single_target(method), work)
    }

    pub fn wrap_class_teardown<'a>(&self, work: Statement<'a>) -> Statement<'a> {
        self.traced(ExecutionPhase::ClassTeardown, self.saving(self.selected_targets(), work))
    }

    pub fn wrap_class_execution<'a>(&self, work: Statement<'a>) -> Statement<'a> {
        let targets = self.selected_targets();
        let descriptions: Vec<Description> = targets.iter().map(|(_, d)| d.clone()).collect();
        let inner = self.traced(ExecutionPhase::ClassBlock, self.saving(targets, work));
        let sampler = Rc::clone(&self.backends.sampler);
        let class = self.base.test_class().name().to_string();

        Statement::new(move |ctx| {
            ctx.saved_artifacts_mut().clear();
            let outcome = {
                let _sampling = SamplingGuard::enable(sampler.as_ref());
                inner.evaluate(ctx)
            };
            match outcome {
                Ok(()) => Ok(()),
                Err(fault) => {
                    tracing::warn!(%class, %fault, tests = descriptions.len(), "class-level fault; reporting it for every selected test");
                    report_class_failure(ctx.notifier(), fault, &descriptions)
                }
            }
        })
    }
}

impl<F: 'static> RunnerLifecycle<F> for Functional<F> {
    fn with_befores<'a>(
        &'a self,
        _base: &'a BlockRunner<F>,
        method: &FrameworkMethod<F>,
        target: &Target<F>,
        statement: Statement<'a>,
    ) -> Statement<'a> {
        self.wrap_method_setup(method, target, statement)
    }

    fn with_afters<'a>(
        &'a self,
        _base: &'a BlockRunner<F>,
        method: &FrameworkMethod<F>,
        target: &Target<F>,
        statement: Statement<'a>,
    ) -> Statement<'a> {
        self.wrap_method_teardown(method, target, statement)
    }

    fn method_block<'a>(&'a self, method: &FrameworkMethod<F>, statement: Statement<'a>) -> Statement<'a> {
        self.wrap_method_body(method.method(), statement)
    }

    fn with_before_classes<'a>(&'a self, statement: Statement<'a>) -> Statement<'a> {
        self.wrap_class_setup(statement)
    }

    fn with_after_classes<'a>(&'a self, statement: Statement<'a>) -> Statement<'a> {
        self.wrap_class_teardown(statement)
    }

    fn class_block<'a>(&'a self, statement: Statement<'a>) -> Statement<'a> {
        self.wrap_class_execution(statement)
    }
}
