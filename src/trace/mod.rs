//! Trace data model
//!
//! This module defines the vocabulary shared by every other component:
//! - [`step`]: the fixed step schema ([`step::ExecutionStep`]) — one atomic
//!   transition of the modeled runtime
//! - [`example`]: a named snippet paired with its full step sequence
//!
//! A trace is nothing more than `Vec<ExecutionStep>`. Producers (the example
//! library, the trace compiler) build one; the replay engine consumes one.
//! Steps are plain data with no behavior of their own; all semantics live
//! in the replay transition table.

pub mod example;
pub mod step;

pub use example::Example;
pub use step::{ExecutionStep, StepKind};
