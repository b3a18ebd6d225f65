//! Sampling backends.

use std::sync::atomic::{AtomicBool, Ordering};

use super::Sampler;
use crate::error::BackendError;

static SAMPLING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Whether the process-wide sampler is currently on.
pub fn is_sampling_enabled() -> bool {
    SAMPLING_ENABLED.load(Ordering::SeqCst)
}

/// Toggles the process-wide sampling flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSampler;

impl Sampler for ProcessSampler {
    fn set_enabled(&self, enabled: bool) -> Result<(), BackendError> {
        let was = SAMPLING_ENABLED.swap(enabled, Ordering::SeqCst);
        if was != enabled {
            tracing::debug!(enabled, "sampling toggled");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSampler;

impl Sampler for NoopSampler {
    fn set_enabled(&self, _enabled: bool) -> Result<(), BackendError> {
        Ok(())
    }
}
