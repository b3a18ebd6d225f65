//! Local copy of the methods selected after filtering.
//!
//! Filters accumulate in the base engine, so the tracker copies the engine's
//! post-filter view every time a filter is applied.

use crate::error::RunnerError;
use crate::filter::Filter;
use crate::model::TestMethod;
use crate::runner::block::BlockRunner;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterTracker {
    methods: Vec<TestMethod>,
}

impl FilterTracker {
    pub fn new(methods: Vec<TestMethod>) -> Self {
        Self { methods }
    }

    /// Filter `base`, then recompute the tracked selection from the
    /// discovered tests the engine still selects. A `NoTestsRemain` from the
    /// base engine propagates and leaves the tracked selection untouched.
    pub fn apply_filter<F: 'static>(
        &mut self,
        base: &mut BlockRunner<F>,
        filter: &dyn Filter,
    ) -> Result<(), RunnerError> {
        base.filter(filter)?;
        let selected = base.selected();
        self.methods = base.children().into_iter().filter(|m| selected.contains(m)).collect();
        Ok(())
    }

    pub fn current_methods(&self) -> &[TestMethod] {
        &self.methods
    }
}
