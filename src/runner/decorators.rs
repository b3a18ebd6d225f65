//! Statement decorators composed by the functional runner.
//!
//! Each decorator takes a statement and returns one with the same outcome
//! plus a side effect. None of them alters or swallows a fault.

use std::rc::Rc;

use crate::backends::{ArtifactSaver, TraceBackend, TraceSection};
use crate::model::{Description, TestMethod};
use crate::statement::Statement;

/// Evaluate `statement` inside the trace section `name`.
pub fn with_trace<'a>(trace: Rc<dyn TraceBackend>, name: String, statement: Statement<'a>) -> Statement<'a> {
    Statement::new(move |ctx| {
        let _section = TraceSection::begin(trace.as_ref(), &name);
        statement.evaluate(ctx)
    })
}

/// On a fault, capture an artifact for each of `methods` that has none yet
/// in this class execution, then re-raise the fault unchanged.
pub fn artifact_saver<'a>(
    saver: Rc<dyn ArtifactSaver>,
    methods: Vec<(TestMethod, Description)>,
    statement: Statement<'a>,
) -> Statement<'a> {
    Statement::new(move |ctx| {
        let result = statement.evaluate(ctx);
        if let Err(fault) = &result {
            for (method, description) in &methods {
                if !ctx.saved_artifacts_mut().mark_saved(method) {
                    continue;
                }
                tracing::debug!(test = %description, %fault, "capturing failure artifact");
                if let Err(e) = saver.on_error(description, fault) {
                    tracing::warn!(test = %description, error = %e, "artifact capture failed");
                }
            }
        }
        result
    })
}
