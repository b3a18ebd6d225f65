//! Test class registry: the discovery surface the runners read.
//!
//! Rust has no runtime reflection, so a class is assembled explicitly with a
//! builder. Each registered method carries an [`Annotation`] and the runners
//! query methods by annotation in declaration order, the same way an
//! annotation scanner would.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use crate::fault::Fault;
use crate::model::{Description, TestMethod};
use crate::statement::TestRule;

/// Per-test fixture instance shared by the hooks of one method execution.
pub type Target<F> = Rc<RefCell<F>>;

type InstanceFn<F> = Rc<dyn Fn(&mut F) -> Result<(), Fault>>;
type StaticFn = Rc<dyn Fn() -> Result<(), Fault>>;
type Factory<F> = Rc<dyn Fn() -> Result<F, Fault>>;

/// Role of a registered method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotation {
    Test,
    Before,
    After,
    BeforeClass,
    AfterClass,
    /// Setup hook the base engine ignores; run by the functional runner after `Before`.
    NoMetricBefore,
    /// Teardown hook the base engine ignores; run by the functional runner before `After`.
    NoMetricAfter,
}

enum Callable<F> {
    Instance(InstanceFn<F>),
    Static(StaticFn),
}

impl<F> Clone for Callable<F> {
    fn clone(&self) -> Self {
        match self {
            Callable::Instance(f) => Callable::Instance(Rc::clone(f)),
            Callable::Static(f) => Callable::Static(Rc::clone(f)),
        }
    }
}

/// A registered method together with its role and body.
pub struct FrameworkMethod<F> {
    method: TestMethod,
    annotation: Annotation,
    callable: Callable<F>,
}

impl<F> Clone for FrameworkMethod<F> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            annotation: self.annotation,
            callable: self.callable.clone(),
        }
    }
}

impl<F> fmt::Debug for FrameworkMethod<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameworkMethod")
            .field("method", &self.method)
            .field("annotation", &self.annotation)
            .finish()
    }
}

impl<F> FrameworkMethod<F> {
    pub fn method(&self) -> &TestMethod {
        &self.method
    }

    pub fn name(&self) -> &str {
        self.method.name()
    }

    pub fn annotation(&self) -> Annotation {
        self.annotation
    }

    /// Invoke the method, turning a panic into a [`Fault::Error`].
    ///
    /// Class-level methods ignore `target`; instance methods require one.
    pub fn invoke(&self, target: Option<&Target<F>>) -> Result<(), Fault> {
        let outcome = catch_unwind(AssertUnwindSafe(|| match (&self.callable, target) {
            (Callable::Static(f), _) => f(),
            (Callable::Instance(f), Some(target)) => {
                let mut fixture = target.borrow_mut();
                f(&mut *fixture)
            }
            (Callable::Instance(_), None) => Err(Fault::error(format!(
                "{} is an instance method but no test instance was provided",
                self.method
            ))),
        }));
        outcome.unwrap_or_else(|payload| Err(Fault::from_panic(payload)))
    }
}

/// A test class: a fixture factory, annotated methods and rules.
pub struct TestClass<F> {
    name: String,
    factory: Factory<F>,
    methods: Vec<FrameworkMethod<F>>,
    class_rules: Vec<Rc<dyn TestRule>>,
    rules: Vec<Rc<dyn TestRule>>,
}

impl<F: Default + 'static> TestClass<F> {
    /// A class whose fixture is `F::default()`.
    pub fn with_default(name: impl Into<String>) -> Self {
        Self::new(name, || Ok(F::default()))
    }
}

impl<F: 'static> TestClass<F> {
    pub fn new(name: impl Into<String>, factory: impl Fn() -> Result<F, Fault> + 'static) -> Self {
        Self {
            name: name.into(),
            factory: Rc::new(factory),
            methods: Vec::new(),
            class_rules: Vec::new(),
            rules: Vec::new(),
        }
    }

    fn instance(
        mut self,
        annotation: Annotation,
        name: &str,
        f: impl Fn(&mut F) -> Result<(), Fault> + 'static,
    ) -> Self {
        self.methods.push(FrameworkMethod {
            method: TestMethod::new(self.name.clone(), name),
            annotation,
            callable: Callable::Instance(Rc::new(f)),
        });
        self
    }

    fn class_level(
        mut self,
        annotation: Annotation,
        name: &str,
        f: impl Fn() -> Result<(), Fault> + 'static,
    ) -> Self {
        self.methods.push(FrameworkMethod {
            method: TestMethod::new(self.name.clone(), name),
            annotation,
            callable: Callable::Static(Rc::new(f)),
        });
        self
    }

    pub fn test(self, name: &str, f: impl Fn(&mut F) -> Result<(), Fault> + 'static) -> Self {
        self.instance(Annotation::Test, name, f)
    }

    pub fn before(self, name: &str, f: impl Fn(&mut F) -> Result<(), Fault> + 'static) -> Self {
        self.instance(Annotation::Before, name, f)
    }

    pub fn after(self, name: &str, f: impl Fn(&mut F) -> Result<(), Fault> + 'static) -> Self {
        self.instance(Annotation::After, name, f)
    }

    pub fn no_metric_before(self, name: &str, f: impl Fn(&mut F) -> Result<(), Fault> + 'static) -> Self {
        self.instance(Annotation::NoMetricBefore, name, f)
    }

    pub fn no_metric_after(self, name: &str, f: impl Fn(&mut F) -> Result<(), Fault> + 'static) -> Self {
        self.instance(Annotation::NoMetricAfter, name, f)
    }

    pub fn before_class(self, name: &str, f: impl Fn() -> Result<(), Fault> + 'static) -> Self {
        self.class_level(Annotation::BeforeClass, name, f)
    }

    pub fn after_class(self, name: &str, f: impl Fn() -> Result<(), Fault> + 'static) -> Self {
        self.class_level(Annotation::AfterClass, name, f)
    }

    /// Rule wrapped around the whole class execution.
    pub fn class_rule(mut self, rule: impl TestRule + 'static) -> Self {
        self.class_rules.push(Rc::new(rule));
        self
    }

    /// Rule wrapped around every method execution.
    pub fn rule(mut self, rule: impl TestRule + 'static) -> Self {
        self.rules.push(Rc::new(rule));
        self
    }
}

impl<F> TestClass<F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Methods carrying `annotation`, in declaration order.
    pub fn annotated_methods(&self, annotation: Annotation) -> Vec<FrameworkMethod<F>> {
        self.methods
            .iter()
            .filter(|m| m.annotation == annotation)
            .cloned()
            .collect()
    }

    pub fn describe(&self) -> Description {
        Description::for_class(self.name.clone())
    }

    pub fn describe_method(&self, method: &TestMethod) -> Description {
        Description::for_method(method)
    }

    pub fn class_rules(&self) -> &[Rc<dyn TestRule>] {
        &self.class_rules
    }

    pub fn rules(&self) -> &[Rc<dyn TestRule>] {
        &self.rules
    }

    /// Build a fresh fixture instance.
    pub fn create_fixture(&self) -> Result<Target<F>, Fault> {
        let outcome = catch_unwind(AssertUnwindSafe(|| (self.factory)()));
        match outcome {
            Ok(Ok(fixture)) => Ok(Rc::new(RefCell::new(fixture))),
            Ok(Err(fault)) => Err(fault),
            Err(payload) => Err(Fault::from_panic(payload)),
        }
    }

    /// Structural problems that make the class unrunnable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let tests = self.annotated_methods(Annotation::Test);
        if tests.is_empty() {
            errors.push(format!("{}: no runnable methods", self.name));
        }

        let mut seen = HashSet::new();
        for test in &tests {
            if !seen.insert(test.name()) {
                errors.push(format!("{}: duplicate test method '{}'", self.name, test.name()));
            }
        }
        errors
    }
}
