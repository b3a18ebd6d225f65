//! Built-in demo class with a hook of every kind and optional fault injection.

use clap::ValueEnum;

use crate::fault::{Fault, ensure};
use crate::model::TestClass;

pub const DEMO_CLASS: &str = "DemoTest";

/// Where `--fail-at` injects a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailAt {
    /// `BeforeClass` hook
    ClassSetup,
    /// `Before` hook of every test
    MethodSetup,
    /// `NoMetricBefore` hook of every test
    NoMetricBefore,
    /// Body of `testLogin` only
    Body,
    /// `NoMetricAfter` hook of every test
    NoMetricAfter,
    /// `After` hook of every test
    MethodTeardown,
    /// `AfterClass` hook
    ClassTeardown,
    /// Fixture construction
    Fixture,
}

/// A fault to raise at one phase of the demo class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Injection {
    pub phase: FailAt,
    /// Raise an assumption violation instead of an error.
    pub assumption: bool,
}

impl Injection {
    pub fn new(phase: FailAt, assumption: bool) -> Self {
        Self { phase, assumption }
    }

    fn at(&self, phase: FailAt, hook: &str) -> Result<(), Fault> {
        if self.phase != phase {
            return Ok(());
        }
        let message = format!("injected fault in {}", hook);
        Err(if self.assumption {
            Fault::assumption(message)
        } else {
            Fault::error(message)
        })
    }
}

fn inject(injection: Option<Injection>, phase: FailAt, hook: &str) -> Result<(), Fault> {
    match injection {
        Some(injection) => injection.at(phase, hook),
        None => Ok(()),
    }
}

/// Simulated app session driven by the demo hooks.
#[derive(Debug, Default)]
pub struct DemoSession {
    launched: bool,
    user: Option<String>,
    screen: String,
}

pub fn demo_class(injection: Option<Injection>) -> TestClass<DemoSession> {
    TestClass::new(DEMO_CLASS, move || {
        inject(injection, FailAt::Fixture, "fixture")?;
        Ok(DemoSession::default())
    })
    .before_class("connectDevice", move || inject(injection, FailAt::ClassSetup, "connectDevice"))
    .after_class("disconnectDevice", move || {
        inject(injection, FailAt::ClassTeardown, "disconnectDevice")
    })
    .before("launchApp", move |session| {
        session.launched = true;
        session.screen = "home".to_string();
        inject(injection, FailAt::MethodSetup, "launchApp")
    })
    .no_metric_before("warmUpCaches", move |_| {
        inject(injection, FailAt::NoMetricBefore, "warmUpCaches")
    })
    .test("testLogin", move |session| {
        ensure(session.launched, "app is not running")?;
        session.user = Some("demo".to_string());
        inject(injection, FailAt::Body, "testLogin")
    })
    .test("testLogout", |session| {
        session.user = None;
        ensure(session.launched, "app is not running")
    })
    .test("testSettings", |session| {
        session.screen = "settings".to_string();
        ensure(session.screen == "settings", "settings screen did not open")
    })
    .no_metric_after("flushLogs", move |_| inject(injection, FailAt::NoMetricAfter, "flushLogs"))
    .after("closeApp", move |session| {
        session.launched = false;
        inject(injection, FailAt::MethodTeardown, "closeApp")
    })
}
