#![forbid(unsafe_code)]
//! Functional test runner.
//!
//! A JUnit-style class runner that augments the standard lifecycle:
//!
//! - `NoMetricBefore` / `NoMetricAfter` hooks run next to the test body,
//!   inside the standard `Before` / `After` hooks.
//! - Failure artifacts are captured the moment a fault is raised, before any
//!   teardown runs, and at most once per test per class execution.
//! - Faults from class setup or teardown are reported as failures of every
//!   selected test rather than as one anonymous class failure.
//! - Every phase runs inside a named trace section, and sampling is switched
//!   on for the duration of the class.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` with `?`. The `cli` and `runner` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//! - **Test bodies and hooks**: a panic is caught and turned into a [`Fault`].
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod backends;
pub mod cli;
pub mod config;
pub mod error;
pub mod fault;
pub mod filter;
pub mod model;
pub mod notification;
pub mod runner;
pub mod statement;

pub use backends::{ArtifactSaver, Backends, Sampler, TraceBackend};
pub use config::RunnerConfig;
pub use error::{BackendError, RunnerError};
pub use fault::{Failure, Fault, FaultKind, assume, ensure};
pub use filter::{Filter, MethodFilter, NameFilter};
pub use model::{Annotation, Description, ExecutionPhase, TestClass, TestMethod};
pub use notification::{RunListener, RunNotifier, RunSummary};
pub use runner::{Functional, Suite};
pub use statement::{SavedArtifactSet, Statement, TestRule};
