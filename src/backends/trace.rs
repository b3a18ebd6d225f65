//! Trace backends.

use std::cell::RefCell;

use tracing::span::EnteredSpan;

use super::TraceBackend;
use crate::error::BackendError;

/// Maps trace sections onto `tracing` spans, nested in begin order.
#[derive(Default)]
pub struct TracingSections {
    open: RefCell<Vec<EnteredSpan>>,
}

impl TracingSections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.open.borrow().len()
    }
}

impl TraceBackend for TracingSections {
    fn begin_section(&self, name: &str) -> Result<(), BackendError> {
        let span = tracing::info_span!("section", name = %name).entered();
        self.open.borrow_mut().push(span);
        Ok(())
    }

    fn end_section(&self) -> Result<(), BackendError> {
        match self.open.borrow_mut().pop() {
            Some(span) => {
                drop(span);
                Ok(())
            }
            None => Err(BackendError::Unavailable("end_section without an open section".into())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTrace;

impl TraceBackend for NoopTrace {
    fn begin_section(&self, _name: &str) -> Result<(), BackendError> {
        Ok(())
    }

    fn end_section(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_nest_and_unwind() {
        let trace = TracingSections::new();
        trace.begin_section("Functional#classBlock").unwrap();
        trace.begin_section("Functional#BeforeClass").unwrap();
        assert_eq!(trace.depth(), 2);
        trace.end_section().unwrap();
        trace.end_section().unwrap();
        assert_eq!(trace.depth(), 0);
    }

    #[test]
    fn test_unbalanced_end_is_an_error() {
        let trace = TracingSections::new();
        assert!(matches!(trace.end_section(), Err(BackendError::Unavailable(_))));
    }
}
