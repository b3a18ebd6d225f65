//! Console listener (pytest-style progress and summary).

use std::io::{self, Write};

use super::{RunListener, RunSummary};
use crate::fault::Failure;
use crate::model::Description;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD_RED: &str = "\x1b[1;31m";
const BOLD_GREEN: &str = "\x1b[1;32m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Passed,
    Failed,
    Skipped,
}

pub struct ConsoleListener<W: Write> {
    out: W,
    verbose: bool,
    colors: bool,
    current: Option<Outcome>,
    failures: Vec<Failure>,
}

impl ConsoleListener<io::Stderr> {
    pub fn stderr(verbose: bool) -> Self {
        Self::new(io::stderr(), verbose)
    }
}

impl<W: Write> ConsoleListener<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            colors: true,
            current: None,
            failures: Vec::new(),
        }
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.colors {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }

    // Console output is best-effort: a closed stderr must not abort the run.
    fn emit(&mut self, text: &str, newline: bool) {
        let _ = if newline {
            writeln!(self.out, "{}", text)
        } else {
            write!(self.out, "{}", text)
        };
    }
}

impl<W: Write> RunListener for ConsoleListener<W> {
    fn on_run_started(&mut self, description: &Description) {
        let banner = format!("=================== {} ===================", description);
        self.emit(&banner, true);
    }

    fn on_test_started(&mut self, description: &Description) {
        self.current = Some(Outcome::Passed);
        if self.verbose {
            self.emit(&format!("{} ... ", description), false);
        }
    }

    fn on_test_failure(&mut self, failure: &Failure) {
        if failure.description().is_test() {
            self.current = Some(Outcome::Failed);
        } else {
            let line = format!("{} {}: {}", self.paint(RED, "ERROR"), failure.description(), failure.fault());
            self.emit(&line, true);
        }
        self.failures.push(failure.clone());
    }

    fn on_test_assumption_failure(&mut self, failure: &Failure) {
        self.current = Some(Outcome::Skipped);
        if self.verbose {
            let reason = failure.message();
            self.emit(&format!("({}) ", reason), false);
        }
    }

    fn on_test_finished(&mut self, _description: &Description) {
        let outcome = self.current.take().unwrap_or(Outcome::Passed);
        let status = match (outcome, self.verbose) {
            (Outcome::Passed, true) => self.paint(GREEN, "PASSED"),
            (Outcome::Passed, false) => self.paint(GREEN, "."),
            (Outcome::Failed, true) => self.paint(RED, "FAILED"),
            (Outcome::Failed, false) => self.paint(RED, "F"),
            (Outcome::Skipped, true) => self.paint(YELLOW, "SKIPPED"),
            (Outcome::Skipped, false) => self.paint(YELLOW, "s"),
        };
        let verbose = self.verbose;
        self.emit(&status, verbose);
    }

    fn on_run_finished(&mut self, summary: &RunSummary) {
        if !self.verbose {
            self.emit("", true);
        }

        if !self.failures.is_empty() {
            self.emit("", true);
            let header = self.paint(BOLD_RED, "=================== FAILURES ===================");
            self.emit(&header, true);
            let failures = std::mem::take(&mut self.failures);
            for failure in &failures {
                self.emit(&format!("___________ {} ___________", failure.description()), true);
                self.emit(&format!("    {}", failure.fault()), true);
            }
        }

        let mut parts = Vec::new();
        if summary.passed() > 0 {
            parts.push(format!("{} passed", summary.passed()));
        }
        if summary.failed > 0 {
            parts.push(format!("{} failed", summary.failed));
        }
        if summary.assumption_failed > 0 {
            parts.push(format!("{} skipped", summary.assumption_failed));
        }
        if parts.is_empty() {
            parts.push("no tests ran".to_string());
        }

        let color = if summary.was_successful() { BOLD_GREEN } else { BOLD_RED };
        let line = format!(
            "====== {} in {:.2}s ======",
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
        let line = self.paint(color, &line);
        self.emit(&line, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::Fault;
    use crate::model::TestMethod;
    use crate::notification::RunNotifier;

    fn desc(name: &str) -> Description {
        Description::for_method(&TestMethod::new("LoginTest", name))
    }

    fn drive(listener: &mut ConsoleListener<Vec<u8>>) {
        listener.on_run_started(&Description::for_class("LoginTest"));
        listener.on_test_started(&desc("testA"));
        listener.on_test_finished(&desc("testA"));
        listener.on_test_started(&desc("testB"));
        listener.on_test_failure(&Failure::new(desc("testB"), Fault::error("wrong password")));
        listener.on_test_finished(&desc("testB"));
        listener.on_test_started(&desc("testC"));
        listener.on_test_assumption_failure(&Failure::new(desc("testC"), Fault::assumption("offline")));
        listener.on_test_finished(&desc("testC"));
        listener.on_run_finished(&RunSummary {
            run: 3,
            failed: 1,
            assumption_failed: 1,
            class_failures: 0,
            duration: Default::default(),
        });
    }

    #[test]
    fn test_console_progress_line() {
        let mut listener = ConsoleListener::new(Vec::new(), false).with_colors(false);
        drive(&mut listener);
        let output = String::from_utf8(listener.into_inner()).unwrap();
        assert!(output.contains(".Fs\n"));
        assert!(output.contains("___________ testB(LoginTest) ___________"));
        assert!(output.contains("    wrong password"));
        assert!(output.contains("====== 1 passed, 1 failed, 1 skipped in 0.00s ======"));
    }

    #[test]
    fn test_console_verbose_lines() {
        let mut listener = ConsoleListener::new(Vec::new(), true).with_colors(false);
        drive(&mut listener);
        let output = String::from_utf8(listener.into_inner()).unwrap();
        assert!(output.contains("testA(LoginTest) ... PASSED\n"));
        assert!(output.contains("testB(LoginTest) ... FAILED\n"));
        assert!(output.contains("testC(LoginTest) ... (assumption violated: offline) SKIPPED\n"));
    }

    #[test]
    fn test_console_class_failure_is_printed_immediately() {
        let mut listener = ConsoleListener::new(Vec::new(), false).with_colors(false);
        listener.on_test_failure(&Failure::new(Description::for_class("LoginTest"), Fault::error("no device")));
        let output = String::from_utf8(listener.into_inner()).unwrap();
        assert_eq!(output, "ERROR LoginTest: no device\n");
    }

    #[test]
    fn test_console_listener_plugs_into_notifier() {
        let mut notifier = RunNotifier::new().with_listener(ConsoleListener::new(Vec::new(), false));
        notifier.fire_test_started(&desc("testA"));
        notifier.fire_test_finished(&desc("testA"));
        assert_eq!(notifier.summary().run, 1);
    }
}
