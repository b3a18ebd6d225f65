//! Collaborators the runner calls into: artifact capture, trace sections and sampling.
//!
//! Backend failures never replace a test fault. Callers log them at `warn`
//! and carry on with the original outcome.

mod artifacts;
mod sampler;
mod trace;

pub use artifacts::{FileArtifactSaver, NoopArtifactSaver};
pub use sampler::{NoopSampler, ProcessSampler, is_sampling_enabled};
pub use trace::{NoopTrace, TracingSections};

use std::rc::Rc;

use crate::config::RunnerConfig;
use crate::error::BackendError;
use crate::fault::Fault;
use crate::model::Description;

/// Captures diagnostic artifacts (screenshots, dumps, logs) at failure time.
pub trait ArtifactSaver {
    fn on_error(&self, description: &Description, fault: &Fault) -> Result<(), BackendError>;
}

/// Named, nested trace sections. Every `begin_section` is paired with one `end_section`.
pub trait TraceBackend {
    fn begin_section(&self, name: &str) -> Result<(), BackendError>;
    fn end_section(&self) -> Result<(), BackendError>;
}

/// Process-wide sampling/profiling switch.
pub trait Sampler {
    fn set_enabled(&self, enabled: bool) -> Result<(), BackendError>;
}

/// Open trace section; ends it on drop, including on fault paths.
pub struct TraceSection<'t> {
    trace: Option<&'t dyn TraceBackend>,
}

impl<'t> TraceSection<'t> {
    pub fn begin(trace: &'t dyn TraceBackend, name: &str) -> Self {
        match trace.begin_section(name) {
            Ok(()) => Self { trace: Some(trace) },
            Err(e) => {
                tracing::warn!(section = name, error = %e, "failed to begin trace section");
                Self { trace: None }
            }
        }
    }
}

impl Drop for TraceSection<'_> {
    fn drop(&mut self) {
        if let Some(trace) = self.trace.take() {
            if let Err(e) = trace.end_section() {
                tracing::warn!(error = %e, "failed to end trace section");
            }
        }
    }
}

/// Sampling enabled for the guard's lifetime; disabled on drop.
pub struct SamplingGuard<'s> {
    sampler: &'s dyn Sampler,
}

impl<'s> SamplingGuard<'s> {
    pub fn enable(sampler: &'s dyn Sampler) -> Self {
        if let Err(e) = sampler.set_enabled(true) {
            tracing::warn!(error = %e, "failed to enable sampling");
        }
        Self { sampler }
    }
}

impl Drop for SamplingGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.sampler.set_enabled(false) {
            tracing::warn!(error = %e, "failed to disable sampling");
        }
    }
}

/// The collaborator set one runner works with.
#[derive(Clone)]
pub struct Backends {
    pub artifacts: Rc<dyn ArtifactSaver>,
    pub trace: Rc<dyn TraceBackend>,
    pub sampler: Rc<dyn Sampler>,
}

impl Backends {
    pub fn new(
        artifacts: impl ArtifactSaver + 'static,
        trace: impl TraceBackend + 'static,
        sampler: impl Sampler + 'static,
    ) -> Self {
        Self {
            artifacts: Rc::new(artifacts),
            trace: Rc::new(trace),
            sampler: Rc::new(sampler),
        }
    }

    /// Backends that do nothing.
    pub fn noop() -> Self {
        Self::new(NoopArtifactSaver, NoopTrace, NoopSampler)
    }

    /// Default collaborators selected by `config`.
    pub fn from_config(config: &RunnerConfig) -> Self {
        let artifacts: Rc<dyn ArtifactSaver> = if config.capture_artifacts {
            Rc::new(FileArtifactSaver::new(config.artifact_dir.clone()))
        } else {
            Rc::new(NoopArtifactSaver)
        };
        let sampler: Rc<dyn Sampler> = if config.sampling {
            Rc::new(ProcessSampler)
        } else {
            Rc::new(NoopSampler)
        };
        Self {
            artifacts,
            trace: Rc::new(TracingSections::new()),
            sampler,
        }
    }
}
