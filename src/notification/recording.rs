//! In-memory listener; clones share one transcript.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Notification, RunListener, RunSummary};
use crate::fault::Failure;
use crate::model::Description;

#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.borrow().clone()
    }

    /// Events rendered one per line, e.g. `failure: testA(LoginTest): boom`.
    pub fn transcript(&self) -> Vec<String> {
        self.events.borrow().iter().map(ToString::to_string).collect()
    }

    fn push(&self, notification: Notification) {
        self.events.borrow_mut().push(notification);
    }
}

impl RunListener for RecordingListener {
    fn on_run_started(&mut self, description: &Description) {
        self.push(Notification::RunStarted {
            description: description.clone(),
        });
    }

    fn on_test_started(&mut self, description: &Description) {
        self.push(Notification::TestStarted {
            description: description.clone(),
        });
    }

    fn on_test_failure(&mut self, failure: &Failure) {
        self.push(Notification::failure(failure));
    }

    fn on_test_assumption_failure(&mut self, failure: &Failure) {
        self.push(Notification::assumption_failure(failure));
    }

    fn on_test_finished(&mut self, description: &Description) {
        self.push(Notification::TestFinished {
            description: description.clone(),
        });
    }

    fn on_run_finished(&mut self, summary: &RunSummary) {
        self.push(Notification::RunFinished {
            summary: summary.clone(),
        });
    }
}
