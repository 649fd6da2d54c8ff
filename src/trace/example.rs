//! A snippet paired with its trace

use super::step::ExecutionStep;
use serde::{Deserialize, Serialize};

/// A named source snippet together with the full ordered step sequence
/// describing its execution.
///
/// Library examples are authored constants and never change after startup.
/// The one mutable case, the custom example produced by the trace compiler,
/// is represented by building a brand-new `Example` and swapping it in
/// wholesale, which keeps replay idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    /// Short identifier, e.g. `basic-timeout`. Doubles as the shareable
    /// example name.
    pub name: String,
    /// One-line human description shown in listings.
    pub description: String,
    /// The snippet the steps were derived from.
    pub source_code: String,
    /// The trace. Read-only once constructed.
    pub steps: Vec<ExecutionStep>,
}

impl Example {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        source_code: impl Into<String>,
        steps: Vec<ExecutionStep>,
    ) -> Self {
        Example {
            name: name.into(),
            description: description.into(),
            source_code: source_code.into(),
            steps,
        }
    }

    /// Number of steps in the trace.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
