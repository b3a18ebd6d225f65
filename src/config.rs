//! Runner configuration.

use std::path::PathBuf;

/// Settings for the functional runner and its default backends.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Directory failure artifacts are written to
    pub artifact_dir: PathBuf,
    /// Prefix of trace section names (`<prefix>#BeforeClass`, ...)
    pub trace_prefix: String,
    /// Whether failures trigger artifact capture at all
    pub capture_artifacts: bool,
    /// Whether the process sampler is switched on around class execution
    pub sampling: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("target/functional-artifacts"),
            trace_prefix: "Functional".to_string(),
            capture_artifacts: true,
            sampling: true,
        }
    }
}

impl RunnerConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    pub fn with_trace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.trace_prefix = prefix.into();
        self
    }

    pub fn with_capture_artifacts(mut self, enabled: bool) -> Self {
        self.capture_artifacts = enabled;
        self
    }

    pub fn with_sampling(mut self, enabled: bool) -> Self {
        self.sampling = enabled;
        self
    }
}
