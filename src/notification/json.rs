//! JSON-lines listener: one serialized [`Notification`] per line.

use std::io::Write;

use super::{Notification, RunListener, RunSummary};
use crate::fault::Failure;
use crate::model::Description;

pub struct JsonLinesListener<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesListener<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, notification: &Notification) {
        let line = match serde_json::to_string(notification) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize notification");
                return;
            }
        };
        if let Err(e) = writeln!(self.out, "{}", line) {
            tracing::warn!(error = %e, "failed to write notification");
        }
    }
}

impl<W: Write> RunListener for JsonLinesListener<W> {
    fn on_run_started(&mut self, description: &Description) {
        self.write(&Notification::RunStarted {
            description: description.clone(),
        });
    }

    fn on_test_started(&mut self, description: &Description) {
        self.write(&Notification::TestStarted {
            description: description.clone(),
        });
    }

    fn on_test_failure(&mut self, failure: &Failure) {
        self.write(&Notification::failure(failure));
    }

    fn on_test_assumption_failure(&mut self, failure: &Failure) {
        self.write(&Notification::assumption_failure(failure));
    }

    fn on_test_finished(&mut self, description: &Description) {
        self.write(&Notification::TestFinished {
            description: description.clone(),
        });
    }

    fn on_run_finished(&mut self, summary: &RunSummary) {
        let _ = self.out.flush();
        self.write(&Notification::RunFinished {
            summary: summary.clone(),
        });
    }
}
