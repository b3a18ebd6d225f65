//! End-to-end lifecycle tests for the functional runner

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use functional_runner::backends::NoopTrace;
use functional_runner::notification::RecordingListener;
use functional_runner::{
    ArtifactSaver, BackendError, Backends, Description, Fault, Functional, NameFilter, RunNotifier, RunnerConfig,
    RunnerError, Sampler, Statement, TestClass, TestMethod, TestRule, TraceBackend,
};

type Journal = Rc<RefCell<Vec<String>>>;

/// Records every backend call into a shared journal.
#[derive(Clone, Default)]
struct Probe {
    journal: Journal,
}

impl Probe {
    fn backends(&self) -> Backends {
        Backends::new(self.clone(), self.clone(), self.clone())
    }

    fn entries(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    fn captures(&self) -> Vec<String> {
        self.entries().into_iter().filter(|e| e.starts_with("capture")).collect()
    }
}

impl ArtifactSaver for Probe {
    fn on_error(&self, description: &Description, fault: &Fault) -> Result<(), BackendError> {
        self.journal.borrow_mut().push(format!("capture {} [{}]", description, fault));
        Ok(())
    }
}

impl TraceBackend for Probe {
    fn begin_section(&self, name: &str) -> Result<(), BackendError> {
        self.journal.borrow_mut().push(format!("begin {}", name));
        Ok(())
    }

    fn end_section(&self) -> Result<(), BackendError> {
        self.journal.borrow_mut().push("end".to_string());
        Ok(())
    }
}

impl Sampler for Probe {
    fn set_enabled(&self, enabled: bool) -> Result<(), BackendError> {
        self.journal.borrow_mut().push(format!("sampling {}", enabled));
        Ok(())
    }
}

fn two_tests() -> TestClass<()> {
    TestClass::new("C", || Ok(()))
        .test("A", |_| Ok(()))
        .test("B", |_| Ok(()))
}

fn run(runner: &Functional<()>) -> (RecordingListener, RunNotifier) {
    let recorder = RecordingListener::new();
    let mut notifier = RunNotifier::new().with_listener(recorder.clone());
    runner.run(&mut notifier).unwrap();
    (recorder, notifier)
}

#[test]
fn test_class_setup_fault_is_reported_for_every_test() {
    let probe = Probe::default();
    let class = two_tests().before_class("setUpClass", || Err(Fault::error("F")));
    let runner = Functional::new(class, probe.backends()).unwrap();

    let recorder = RecordingListener::new();
    let mut notifier = RunNotifier::new().with_listener(recorder.clone());
    let saved = runner.run(&mut notifier).unwrap();

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
    assert_eq!(probe.captures(), vec!["capture A(C) [F]", "capture B(C) [F]"]);
    assert!(saved.contains(&TestMethod::new("C", "A")));
    assert!(saved.contains(&TestMethod::new("C", "B")));
}

#[test]
fn test_sampling_is_disabled_when_class_setup_fails() {
    let probe = Probe::default();
    let class = two_tests().before_class("setUpClass", || Err(Fault::error("F")));
    let runner = Functional::new(class, probe.backends()).unwrap();
    run(&runner);

    let sampling: Vec<String> = probe
        .entries()
        .into_iter()
        .filter(|e| e.starts_with("sampling"))
        .collect();
    assert_eq!(sampling, vec!["sampling true", "sampling false"]);
}

#[test]
fn test_trace_sections_are_balanced_on_failure() {
    let probe = Probe::default();
    let class = two_tests()
        .before("setUp", |_| Err(Fault::error("no session")))
        .after_class("tearDownClass", || Err(Fault::error("still connected")));
    let runner = Functional::new(class, probe.backends()).unwrap();
    run(&runner);

    let entries = probe.entries();
    let begins = entries.iter().filter(|e| e.starts_with("begin")).count();
    let ends = entries.iter().filter(|e| *e == "end").count();
    assert_eq!(begins, ends);
    assert_eq!(entries.first().map(String::as_str), Some("sampling true"));
    assert_eq!(entries.get(1).map(String::as_str), Some("begin Functional#classBlock"));
}

#[test]
fn test_body_fault_is_captured_once_and_reported_normally() {
    let probe = Probe::default();
    let class = TestClass::new("C", || Ok(()))
        .test("A", |_| Err(Fault::error("G")))
        .test("B", |_| Ok(()));
    let runner = Functional::new(class, probe.backends()).unwrap();

    let recorder = RecordingListener::new();
    let mut notifier = RunNotifier::new().with_listener(recorder.clone());
    let saved = runner.run(&mut notifier).unwrap();

    assert_eq!(probe.captures(), vec!["capture A(C) [G]"]);
    assert_eq!(saved.iter().cloned().collect::<Vec<_>>(), vec![TestMethod::new("C", "A")]);
    assert_eq!(
        recorder.transcript(),
        vec![
            "started: A(C)",
            "failure: A(C): G",
            "finished: A(C)",
            "started: B(C)",
            "finished: B(C)",
        ]
    );
}

#[test]
fn test_body_and_teardown_faults_capture_once() {
    let probe = Probe::default();
    let class = TestClass::new("C", || Ok(()))
        .after("tearDown", |_| Err(Fault::error("H")))
        .test("A", |_| Err(Fault::error("G")));
    let runner = Functional::new(class, probe.backends()).unwrap();
    let (recorder, notifier) = run(&runner);

    assert_eq!(probe.captures(), vec!["capture A(C) [G]"]);
    assert_eq!(notifier.summary().failed, 1);
    assert_eq!(recorder.transcript()[1], "failure: A(C): 2 faults: G; H");
}

#[test]
fn test_capture_happens_before_teardown() {
    let probe = Probe::default();
    let journal = Rc::clone(&probe.journal);
    let class = TestClass::new("C", || Ok(()))
        .no_metric_after("settle", move |_| {
            journal.borrow_mut().push("noMetricAfter".to_string());
            Ok(())
        })
        .test("A", |_| Err(Fault::error("G")));
    let runner = Functional::new(class, Backends { trace: Rc::new(NoopTrace), ..probe.backends() }).unwrap();
    run(&runner);

    assert_eq!(
        probe.entries(),
        vec!["sampling true", "capture A(C) [G]", "noMetricAfter", "sampling false"]
    );
}

#[test]
fn test_class_teardown_fault_after_tests_ran() {
    let probe = Probe::default();
    let class = two_tests().after_class("tearDownClass", || Err(Fault::error("T")));
    let runner = Functional::new(class, probe.backends()).unwrap();
    let (recorder, notifier) = run(&runner);

    assert_eq!(
        recorder.transcript(),
        vec![
            "started: A(C)",
            "finished: A(C)",
            "started: B(C)",
            "finished: B(C)",
            "started: A(C)",
            "failure: A(C): T",
            "finished: A(C)",
            "started: B(C)",
            "failure: B(C): T",
            "finished: B(C)",
        ]
    );
    assert_eq!(notifier.summary().failed, 2);
    assert_eq!(probe.captures().len(), 2);
}

#[test]
fn test_class_assumption_marks_every_test_skipped() {
    let class = two_tests().before_class("setUpClass", || Err(Fault::assumption("no device")));
    let runner = Functional::new(class, Backends::noop()).unwrap();
    let (recorder, notifier) = run(&runner);

    assert_eq!(notifier.summary().failed, 0);
    assert_eq!(notifier.summary().assumption_failed, 2);
    assert_eq!(
        recorder.transcript()[1],
        "assumption failed: A(C): assumption violated: no device"
    );
}

#[test]
fn test_filter_excluding_everything_prevents_execution() {
    let probe = Probe::default();
    let mut runner = Functional::new(two_tests(), probe.backends()).unwrap();

    let err = runner.filter(&NameFilter::new("Z")).unwrap_err();
    assert!(matches!(err, RunnerError::NoTestsRemain { .. }));
    assert!(probe.entries().is_empty());
}

#[test]
fn test_filtered_class_setup_fault_reports_selection_only() {
    let class = two_tests().before_class("setUpClass", || Err(Fault::error("F")));
    let mut runner = Functional::new(class, Backends::noop()).unwrap();
    runner.filter(&NameFilter::new("B")).unwrap();
    let (recorder, _) = run(&runner);

    assert_eq!(
        recorder.transcript(),
        vec!["started: B(C)", "failure: B(C): F", "finished: B(C)"]
    );
}

#[test]
fn test_successive_filters_limit_class_fault_report() {
    let class = TestClass::new("C", || Ok(()))
        .test("test_a1", |_| Ok(()))
        .test("test_b1", |_| Ok(()))
        .test("test_b2", |_| Ok(()))
        .before_class("setUpClass", || Err(Fault::error("F")));
    let mut runner = Functional::new(class, Backends::noop()).unwrap();
    runner.filter(&NameFilter::new("b")).unwrap();
    runner.filter(&NameFilter::new("1")).unwrap();
    assert_eq!(runner.current_methods(), &[TestMethod::new("C", "test_b1")]);

    let (recorder, _) = run(&runner);
    assert_eq!(
        recorder.transcript(),
        vec!["started: test_b1(C)", "failure: test_b1(C): F", "finished: test_b1(C)"]
    );
}

/// Lets the wrapped statement run, then fails.
struct FailAfter(&'static str);

impl TestRule for FailAfter {
    fn apply<'a>(&self, base: Statement<'a>, _description: &Description) -> Statement<'a> {
        let message = self.0;
        Statement::new(move |ctx| {
            base.evaluate(ctx)?;
            Err(Fault::error(message))
        })
    }
}

#[test]
fn test_method_rule_fault_is_captured_and_reported() {
    let probe = Probe::default();
    let class = TestClass::new("C", || Ok(()))
        .rule(FailAfter("rule"))
        .test("A", |_| Ok(()));
    let runner = Functional::new(class, probe.backends()).unwrap();
    let (recorder, notifier) = run(&runner);

    assert_eq!(probe.captures(), vec!["capture A(C) [rule]"]);
    assert_eq!(notifier.summary().failed, 1);
    assert_eq!(
        recorder.transcript(),
        vec!["started: A(C)", "failure: A(C): rule", "finished: A(C)"]
    );
}

#[test]
fn test_class_rule_fault_is_reported_for_every_test() {
    let probe = Probe::default();
    let class = two_tests().class_rule(FailAfter("class rule"));
    let runner = Functional::new(class, probe.backends()).unwrap();
    let (recorder, notifier) = run(&runner);

    assert_eq!(
        recorder.transcript(),
        vec![
            "started: A(C)",
            "finished: A(C)",
            "started: B(C)",
            "finished: B(C)",
            "started: A(C)",
            "failure: A(C): class rule",
            "finished: A(C)",
            "started: B(C)",
            "failure: B(C): class rule",
            "finished: B(C)",
        ]
    );
    assert_eq!(notifier.summary().failed, 2);
    assert_eq!(probe.captures(), vec!["capture A(C) [class rule]", "capture B(C) [class rule]"]);
    let entries = probe.entries();
    assert_eq!(entries.first().map(String::as_str), Some("sampling true"));
    assert_eq!(entries.last().map(String::as_str), Some("sampling false"));
}

#[test]
fn test_panicking_test_is_a_failure() {
    let probe = Probe::default();
    let class: TestClass<()> = TestClass::new("C", || Ok(())).test("A", |_| panic!("kaboom"));
    let runner = Functional::new(class, probe.backends()).unwrap();
    let (recorder, _) = run(&runner);

    assert_eq!(recorder.transcript()[1], "failure: A(C): panicked: kaboom");
    assert_eq!(probe.captures(), vec!["capture A(C) [panicked: kaboom]"]);
}

struct BrokenSaver;

impl ArtifactSaver for BrokenSaver {
    fn on_error(&self, _description: &Description, _fault: &Fault) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("camera busy".into()))
    }
}

#[test]
fn test_artifact_backend_failure_keeps_test_fault() {
    let class = TestClass::new("C", || Ok(())).test("A", |_| Err(Fault::error("G")));
    let backends = Backends {
        artifacts: Rc::new(BrokenSaver),
        ..Backends::noop()
    };
    let runner = Functional::new(class, backends).unwrap();
    let (recorder, _) = run(&runner);

    assert_eq!(recorder.transcript()[1], "failure: A(C): G");
}

#[test]
fn test_file_artifacts_are_written_per_test() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunnerConfig::new()
        .with_artifact_dir(dir.path())
        .with_sampling(false);
    let class = TestClass::new("LoginTest", || Ok(()))
        .test("testValid", |_| Ok(()))
        .test("testInvalid", |_| Err(Fault::error("wrong password")));
    let runner = Functional::with_config(class, &config).unwrap();
    run(&runner);

    let artifact = dir.path().join("LoginTest").join("testInvalid.txt");
    let contents = fs::read_to_string(&artifact).unwrap();
    assert!(contents.starts_with("test: testInvalid(LoginTest)\nkind: error\n"));
    assert!(contents.ends_with("\nwrong password\n"));
    assert!(!dir.path().join("LoginTest").join("testValid.txt").exists());
}
