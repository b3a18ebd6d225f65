//! Test model: method identities, descriptions and the test class registry.

pub mod description;
pub mod test_class;

pub use description::{Description, ExecutionPhase, TestMethod};
pub use test_class::{Annotation, FrameworkMethod, Target, TestClass};
