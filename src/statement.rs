//! Units of work and the per-class execution context.
//!
//! A [`Statement`] is one deferred piece of test execution. Runners build a
//! statement per phase and wrap it in further statements (hooks, rules, trace
//! sections, failure interceptors); nothing runs until the outermost statement
//! is evaluated against an [`ExecutionContext`].

use std::collections::HashSet;

use crate::fault::Fault;
use crate::model::{Description, FrameworkMethod, Target, TestMethod};
use crate::notification::RunNotifier;

type Work<'a> = Box<dyn FnOnce(&mut ExecutionContext<'_>) -> Result<(), Fault> + 'a>;

pub struct Statement<'a> {
    work: Work<'a>,
}

impl<'a> Statement<'a> {
    pub fn new(work: impl FnOnce(&mut ExecutionContext<'_>) -> Result<(), Fault> + 'a) -> Self {
        Self { work: Box::new(work) }
    }

    /// A statement that does nothing and succeeds.
    pub fn noop() -> Self {
        Self::new(|_| Ok(()))
    }

    /// A statement that raises `fault` when evaluated.
    pub fn fail(fault: Fault) -> Self {
        Self::new(move |_| Err(fault))
    }

    pub fn evaluate(self, ctx: &mut ExecutionContext<'_>) -> Result<(), Fault> {
        (self.work)(ctx)
    }
}

/// A rule wraps a statement with extra behavior (class rules wrap the class,
/// method rules wrap each method block).
pub trait TestRule {
    fn apply<'a>(&self, base: Statement<'a>, description: &Description) -> Statement<'a>;
}

/// Run `befores` in order, then `next`. The first fault aborts.
pub fn run_befores<'a, F: 'static>(
    next: Statement<'a>,
    befores: Vec<FrameworkMethod<F>>,
    target: Option<Target<F>>,
) -> Statement<'a> {
    if befores.is_empty() {
        return next;
    }
    Statement::new(move |ctx| {
        for before in &befores {
            before.invoke(target.as_ref())?;
        }
        next.evaluate(ctx)
    })
}

/// Run `next`, then every one of `afters` even if something failed. All
/// faults are collected in order.
pub fn run_afters<'a, F: 'static>(
    next: Statement<'a>,
    afters: Vec<FrameworkMethod<F>>,
    target: Option<Target<F>>,
) -> Statement<'a> {
    if afters.is_empty() {
        return next;
    }
    Statement::new(move |ctx| {
        let mut faults = Vec::new();
        if let Err(fault) = next.evaluate(ctx) {
            faults.push(fault);
        }
        for after in &afters {
            if let Err(fault) = after.invoke(target.as_ref()) {
                faults.push(fault);
            }
        }
        Fault::assert_empty(faults)
    })
}

/// Methods that already had an artifact captured during the current class execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedArtifactSet {
    methods: HashSet<TestMethod>,
}

impl SavedArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `method`; returns `false` if it was already recorded.
    pub fn mark_saved(&mut self, method: &TestMethod) -> bool {
        self.methods.insert(method.clone())
    }

    pub fn contains(&self, method: &TestMethod) -> bool {
        self.methods.contains(method)
    }

    pub fn clear(&mut self) {
        self.methods.clear();
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestMethod> {
        self.methods.iter()
    }
}

/// State scoped to one class execution, handed to every statement.
pub struct ExecutionContext<'n> {
    notifier: &'n mut RunNotifier,
    saved_artifacts: SavedArtifactSet,
}

impl<'n> ExecutionContext<'n> {
    pub fn new(notifier: &'n mut RunNotifier) -> Self {
        Self {
            notifier,
            saved_artifacts: SavedArtifactSet::new(),
        }
    }

    pub fn notifier(&mut self) -> &mut RunNotifier {
        &mut *self.notifier
    }

    pub fn saved_artifacts(&self) -> &SavedArtifactSet {
        &self.saved_artifacts
    }

    pub fn saved_artifacts_mut(&mut self) -> &mut SavedArtifactSet {
        &mut self.saved_artifacts
    }

    pub fn into_saved_artifacts(self) -> SavedArtifactSet {
        self.saved_artifacts
    }
}
