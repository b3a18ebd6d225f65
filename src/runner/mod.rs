//! Test class runners.
//!
//! [`BlockRunner`] is the base engine; [`Functional`] drives it with the
//! functional lifecycle; [`Suite`] runs several classes under one run.

#![deny(clippy::unwrap_used)]

pub mod block;
pub mod decorators;
pub mod filter_tracker;
pub mod functional;
pub mod reporter;
pub mod suite;

pub use block::{BlockRunner, RunnerLifecycle, StandardLifecycle};
pub use filter_tracker::FilterTracker;
pub use functional::Functional;
pub use reporter::report_class_failure;
pub use suite::{ClassRunner, Suite};
