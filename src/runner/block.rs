//! Base execution engine.
//!
//! [`BlockRunner`] builds the standard statement tree for a test class:
//!
//! ```text
//! class rules( after_classes( before_classes( for each child:
//!     rules( afters( befores( invoke test ) ) )
//! ) ) )
//! ```
//!
//! Every layer is routed through a [`RunnerLifecycle`], whose provided
//! methods are the standard behavior. A lifecycle overrides only the layers
//! it augments.

use std::rc::Rc;

use crate::error::RunnerError;
use crate::fault::{Failure, Fault};
use crate::filter::Filter;
use crate::model::{Annotation, Description, FrameworkMethod, Target, TestClass, TestMethod};
use crate::notification::RunNotifier;
use crate::statement::{ExecutionContext, SavedArtifactSet, Statement, run_afters, run_befores};

/// Hooks into each layer of the statement tree.
///
/// `with_befores`/`with_afters` receive the statement *before* the standard
/// hooks are applied, so an implementation can place extra hooks inside or
/// outside them; the defaults just apply the standard hooks. The remaining
/// methods receive the fully built standard statement for their layer.
pub trait RunnerLifecycle<F: 'static> {
    fn with_befores<'a>(
        &'a self,
        base: &'a BlockRunner<F>,
        method: &FrameworkMethod<F>,
        target: &Target<F>,
        statement: Statement<'a>,
    ) -> Statement<'a> {
        base.with_befores(method, target, statement)
    }

    fn with_afters<'a>(
        &'a self,
        base: &'a BlockRunner<F>,
        method: &FrameworkMethod<F>,
        target: &Target<F>,
        statement: Statement<'a>,
    ) -> Statement<'a> {
        base.with_afters(method, target, statement)
    }

    /// Wraps the complete block of one method, method rules included.
    fn method_block<'a>(&'a self, _method: &FrameworkMethod<F>, statement: Statement<'a>) -> Statement<'a> {
        statement
    }

    fn with_before_classes<'a>(&'a self, statement: Statement<'a>) -> Statement<'a> {
        statement
    }

    fn with_after_classes<'a>(&'a self, statement: Statement<'a>) -> Statement<'a> {
        statement
    }

    /// Wraps the complete class block, class rules included.
    fn class_block<'a>(&'a self, statement: Statement<'a>) -> Statement<'a> {
        statement
    }
}

/// The unmodified engine: no extra hooks, class faults escape `run`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLifecycle;

impl<F: 'static> RunnerLifecycle<F> for StandardLifecycle {}

pub struct BlockRunner<F> {
    class: TestClass<F>,
    children: Vec<FrameworkMethod<F>>,
    selected: Vec<FrameworkMethod<F>>,
}

impl<F: 'static> BlockRunner<F> {
    pub fn new(class: TestClass<F>) -> Result<Self, RunnerError> {
        let errors = class.validate();
        if !errors.is_empty() {
            return Err(RunnerError::Initialization { errors });
        }
        let children = class.annotated_methods(Annotation::Test);
        Ok(Self {
            selected: children.clone(),
            children,
            class,
        })
    }

    pub fn test_class(&self) -> &TestClass<F> {
        &self.class
    }

    pub fn description(&self) -> Description {
        self.class.describe()
    }

    /// Every discovered test, regardless of filtering.
    pub fn children(&self) -> Vec<TestMethod> {
        self.children.iter().map(|m| m.method().clone()).collect()
    }

    /// Tests still selected after every filter applied so far.
    pub fn selected(&self) -> Vec<TestMethod> {
        self.selected.iter().map(|m| m.method().clone()).collect()
    }

    pub fn describe_child(&self, method: &TestMethod) -> Description {
        self.class.describe_method(method)
    }

    /// Narrow the selected tests. Filters accumulate across calls.
    pub fn filter(&mut self, filter: &dyn Filter) -> Result<(), RunnerError> {
        let kept: Vec<FrameworkMethod<F>> = self
            .selected
            .iter()
            .filter(|m| filter.should_run(&self.describe_child(m.method())))
            .cloned()
            .collect();
        if kept.is_empty() {
            return Err(RunnerError::NoTestsRemain {
                filter: filter.describe(),
            });
        }
        tracing::debug!(class = self.class.name(), kept = kept.len(), "filter applied");
        self.selected = kept;
        Ok(())
    }

    /// Standard `Before` hooks around `statement`.
    pub fn with_befores<'a>(
        &self,
        _method: &FrameworkMethod<F>,
        target: &Target<F>,
        statement: Statement<'a>,
    ) -> Statement<'a> {
        run_befores(
            statement,
            self.class.annotated_methods(Annotation::Before),
            Some(Rc::clone(target)),
        )
    }

    /// Standard `After` hooks around `statement`.
    pub fn with_afters<'a>(
        &self,
        _method: &FrameworkMethod<F>,
        target: &Target<F>,
        statement: Statement<'a>,
    ) -> Statement<'a> {
        run_afters(
            statement,
            self.class.annotated_methods(Annotation::After),
            Some(Rc::clone(target)),
        )
    }

    fn method_invoker<'a>(&self, method: &FrameworkMethod<F>, target: &Target<F>) -> Statement<'a> {
        let method = method.clone();
        let target = Rc::clone(target);
        Statement::new(move |_| method.invoke(Some(&target)))
    }

    fn with_rules<'a>(&self, method: &FrameworkMethod<F>, mut statement: Statement<'a>) -> Statement<'a> {
        let description = self.describe_child(method.method());
        for rule in self.class.rules() {
            statement = rule.apply(statement, &description);
        }
        statement
    }

    pub fn method_block<'a>(
        &'a self,
        lifecycle: &'a dyn RunnerLifecycle<F>,
        method: &FrameworkMethod<F>,
    ) -> Statement<'a> {
        let target = match self.class.create_fixture() {
            Ok(target) => target,
            Err(fault) => return lifecycle.method_block(method, Statement::fail(fault)),
        };

        let statement = self.method_invoker(method, &target);
        let statement = lifecycle.with_befores(self, method, &target, statement);
        let statement = lifecycle.with_afters(self, method, &target, statement);
        let statement = self.with_rules(method, statement);
        lifecycle.method_block(method, statement)
    }

    /// Run one test and report it: started, then failure or assumption failure, then finished.
    pub fn run_child(
        &self,
        lifecycle: &dyn RunnerLifecycle<F>,
        method: &FrameworkMethod<F>,
        ctx: &mut ExecutionContext<'_>,
    ) {
        let description = self.describe_child(method.method());
        ctx.notifier().fire_test_started(&description);

        let statement = self.method_block(lifecycle, method);
        match statement.evaluate(ctx) {
            Ok(()) => {}
            Err(fault) => {
                tracing::debug!(test = %description, %fault, "test failed");
                add_failure(ctx.notifier(), &description, fault);
            }
        }

        ctx.notifier().fire_test_finished(&description);
    }

    fn children_invoker<'a>(&'a self, lifecycle: &'a dyn RunnerLifecycle<F>) -> Statement<'a> {
        Statement::new(move |ctx| {
            for child in &self.selected {
                self.run_child(lifecycle, child, ctx);
            }
            Ok(())
        })
    }

    fn with_class_rules<'a>(&self, mut statement: Statement<'a>) -> Statement<'a> {
        let description = self.description();
        for rule in self.class.class_rules() {
            statement = rule.apply(statement, &description);
        }
        statement
    }

    pub fn class_block<'a>(&'a self, lifecycle: &'a dyn RunnerLifecycle<F>) -> Statement<'a> {
        let mut statement = self.children_invoker(lifecycle);
        if !self.selected.is_empty() {
            statement = lifecycle.with_before_classes(run_befores(
                statement,
                self.class.annotated_methods(Annotation::BeforeClass),
                None,
            ));
            statement = lifecycle.with_after_classes(run_afters(
                statement,
                self.class.annotated_methods(Annotation::AfterClass),
                None,
            ));
            statement = self.with_class_rules(statement);
        }
        lifecycle.class_block(statement)
    }

    /// Execute the class. A fault escaping the class block is returned as
    /// [`RunnerError::ClassFault`]; the captured artifact set is returned otherwise.
    pub fn run(
        &self,
        lifecycle: &dyn RunnerLifecycle<F>,
        notifier: &mut RunNotifier,
    ) -> Result<SavedArtifactSet, RunnerError> {
        tracing::info!(class = self.class.name(), tests = self.selected.len(), "running test class");
        let mut ctx = ExecutionContext::new(notifier);
        let statement = self.class_block(lifecycle);
        match statement.evaluate(&mut ctx) {
            Ok(()) => Ok(ctx.into_saved_artifacts()),
            Err(fault) => Err(RunnerError::ClassFault {
                class: self.class.name().to_string(),
                fault,
            }),
        }
    }
}

/// Fire the notification matching the fault's kind.
pub(crate) fn add_failure(notifier: &mut RunNotifier, description: &Description, fault: Fault) {
    let failure = Failure::new(description.clone(), fault);
    if failure.fault().is_assumption() {
        notifier.fire_test_assumption_failed(failure);
    } else {
        notifier.fire_test_failure(failure);
    }
}
