//! Selection criteria applied to test descriptions before a run.

use crate::model::Description;

pub trait Filter {
    /// Whether the test (or class) described by `description` should run.
    fn should_run(&self, description: &Description) -> bool;

    /// Human-readable form, used in "no tests remain" errors.
    fn describe(&self) -> String;
}

/// Keyword match on the method name, like `-k`.
#[derive(Debug, Clone)]
pub struct NameFilter {
    keyword: String,
}

impl NameFilter {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self { keyword: keyword.into() }
    }
}

impl Filter for NameFilter {
    fn should_run(&self, description: &Description) -> bool {
        match description.method_name() {
            Some(name) => name.contains(&self.keyword),
            None => true,
        }
    }

    fn describe(&self) -> String {
        format!("method name contains '{}'", self.keyword)
    }
}

/// Keeps exactly one test.
#[derive(Debug, Clone)]
pub struct MethodFilter {
    description: Description,
}

impl MethodFilter {
    pub fn new(description: Description) -> Self {
        Self { description }
    }
}

impl Filter for MethodFilter {
    fn should_run(&self, description: &Description) -> bool {
        !description.is_test() || *description == self.description
    }

    fn describe(&self) -> String {
        format!("Method {}", self.description)
    }
}
