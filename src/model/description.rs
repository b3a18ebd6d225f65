//! Identity handles for tests and test classes.

use std::fmt;

use serde::Serialize;

/// One executable test: owning class plus method name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestMethod {
    class_name: String,
    name: String,
}

impl TestMethod {
    pub fn new(class_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            name: name.into(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class_name, self.name)
    }
}

/// Display/identity handle the notification channel is keyed by.
///
/// Renders as `method(Class)` for a test and `Class` for a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Description {
    class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    method_name: Option<String>,
}

impl Description {
    pub fn for_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: None,
        }
    }

    pub fn for_method(method: &TestMethod) -> Self {
        Self {
            class_name: method.class_name.clone(),
            method_name: Some(method.name.clone()),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    pub fn is_test(&self) -> bool {
        self.method_name.is_some()
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method_name {
            Some(method) => write!(f, "{}({})", method, self.class_name),
            None => f.write_str(&self.class_name),
        }
    }
}

/// Phases of a class execution, used to name trace sections. The method
/// body is untraced and has no phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionPhase {
    ClassSetup,
    MethodSetup,
    MethodTeardown,
    ClassTeardown,
    ClassBlock,
}

impl ExecutionPhase {
    pub fn section_name(self) -> &'static str {
        match self {
            ExecutionPhase::ClassSetup => "BeforeClass",
            ExecutionPhase::MethodSetup => "Befores",
            ExecutionPhase::MethodTeardown => "Afters",
            ExecutionPhase::ClassTeardown => "AfterClass",
            ExecutionPhase::ClassBlock => "classBlock",
        }
    }
}
