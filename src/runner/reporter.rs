//! Per-test reporting of class-level faults.

use crate::fault::Fault;
use crate::model::Description;
use crate::notification::RunNotifier;
use crate::runner::block::add_failure;

/// Report `fault` against every test in `methods`, in order: started, then
/// failure (or assumption failure), then finished.
///
/// With no tests to attribute the fault to, nothing is fired and the fault
/// is returned as-is.
pub fn report_class_failure(notifier: &mut RunNotifier, fault: Fault, methods: &[Description]) -> Result<(), Fault> {
    if methods.is_empty() {
        return Err(fault);
    }
    for description in methods {
        notifier.fire_test_started(description);
        add_failure(notifier, description, fault.clone());
        notifier.fire_test_finished(description);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::TestMethod;
    use crate::notification::RecordingListener;

    fn descriptions(names: &[&str]) -> Vec<Description> {
        names
            .iter()
            .map(|n| Description::for_method(&TestMethod::new("C", *n)))
            .collect()
    }

    #[test]
    fn test_reports_every_method() {
        let recorder = RecordingListener::new();
        let mut notifier = RunNotifier::new().with_listener(recorder.clone());
        report_class_failure(&mut notifier, Fault::error("F"), &descriptions(&["A", "B"])).unwrap();

        assert_eq!(
            recorder.transcript(),
            vec![
                "started: A(C)",
                "failure: A(C): F",
                "finished: A(C)",
                "started: B(C)",
                "failure: B(C): F",
                "finished: B(C)",
            ]
        );
    }

    #[test]
    fn test_assumption_is_reported_as_assumption() {
        let recorder = RecordingListener::new();
        let mut notifier = RunNotifier::new().with_listener(recorder.clone());
        report_class_failure(&mut notifier, Fault::assumption("offline"), &descriptions(&["A"])).unwrap();

        assert_eq!(recorder.transcript()[1], "assumption failed: A(C): assumption violated: offline");
        assert_eq!(notifier.summary().failed, 0);
        assert_eq!(notifier.summary().assumption_failed, 1);
    }

    #[test]
    fn test_no_methods_reraises() {
        let recorder = RecordingListener::new();
        let mut notifier = RunNotifier::new().with_listener(recorder.clone());
        let result = report_class_failure(&mut notifier, Fault::error("F"), &[]);

        assert_eq!(result, Err(Fault::error("F")));
        assert!(recorder.events().is_empty());
    }
}
