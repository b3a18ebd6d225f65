//! Artifact capture backends.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use super::ArtifactSaver;
use crate::error::BackendError;
use crate::fault::Fault;
use crate::model::Description;

/// Writes one text artifact per failing test under `<dir>/<Class>/<method>.txt`.
///
/// Class descriptions land in `<dir>/<Class>/class.txt`.
#[derive(Debug, Clone)]
pub struct FileArtifactSaver {
    dir: PathBuf,
}

impl FileArtifactSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn artifact_path(&self, description: &Description) -> PathBuf {
        let file = description.method_name().unwrap_or("class");
        self.dir
            .join(sanitize(description.class_name()))
            .join(format!("{}.txt", sanitize(file)))
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}

impl ArtifactSaver for FileArtifactSaver {
    fn on_error(&self, description: &Description, fault: &Fault) -> Result<(), BackendError> {
        let path = self.artifact_path(description);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let captured_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let contents = format!(
            "test: {}\nkind: {}\ncaptured_at_ms: {}\n\n{}\n",
            description,
            fault.kind(),
            captured_at,
            fault
        );
        fs::write(&path, contents)?;
        tracing::info!(test = %description, path = %path.display(), "saved failure artifact");
        Ok(())
    }
}

/// Discards every capture request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopArtifactSaver;

impl ArtifactSaver for NoopArtifactSaver {
    fn on_error(&self, _description: &Description, _fault: &Fault) -> Result<(), BackendError> {
        Ok(())
    }
}
