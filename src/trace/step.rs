//! The fixed step schema
//!
//! Every observable state transition of the modeled runtime is one
//! [`ExecutionStep`]: a [`StepKind`] discriminant plus optional display
//! fields. The set of kinds is closed: the replay engine matches on it
//! exhaustively, so adding a variant is a compile-time event everywhere.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight atomic transitions of the modeled runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// A frame begins executing on the call stack.
    PushStack,
    /// The top call-stack frame finishes.
    PopStack,
    /// A deferred callback (timer, network call) is handed to the runtime.
    RegisterDeferred,
    /// A ready deferred registration moves to the macrotask queue.
    PromoteToMacrotask,
    /// A promise continuation is appended to the microtask queue.
    EnqueueMicrotask,
    /// The event loop takes one microtask off its queue.
    DrainOneMicrotask,
    /// The event loop takes one macrotask (if any) and completes a cycle.
    DrainOneMacrotaskAndCycle,
    /// A line of console output is produced.
    EmitLog,
}

impl StepKind {
    /// Short human-readable name, used in error messages and exports.
    pub fn name(self) -> &'static str {
        match self {
            StepKind::PushStack => "push stack",
            StepKind::PopStack => "pop stack",
            StepKind::RegisterDeferred => "register deferred",
            StepKind::PromoteToMacrotask => "promote to macrotask",
            StepKind::EnqueueMicrotask => "enqueue microtask",
            StepKind::DrainOneMicrotask => "drain microtask",
            StepKind::DrainOneMacrotaskAndCycle => "drain macrotask + cycle",
            StepKind::EmitLog => "emit log",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One atomic transition.
///
/// All fields except `kind` are optional. `label` is free text, meaningful
/// only for display; the replay engine treats it as opaque. `source_line`
/// is 1-based into the owning example's snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    pub kind: StepKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub narrative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub log_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deferred_callback_name: Option<String>,
}

impl ExecutionStep {
    fn new(kind: StepKind) -> Self {
        ExecutionStep {
            kind,
            label: None,
            source_line: None,
            narrative: None,
            log_message: None,
            deferred_callback_name: None,
        }
    }

    /// A frame with the given label starts executing.
    pub fn push(label: impl Into<String>) -> Self {
        let mut step = ExecutionStep::new(StepKind::PushStack);
        step.label = Some(label.into());
        step
    }

    /// The current top frame finishes.
    pub fn pop() -> Self {
        ExecutionStep::new(StepKind::PopStack)
    }

    /// A deferred item is registered; `callback` names what will eventually
    /// run when the registration is promoted.
    pub fn register_deferred(label: impl Into<String>, callback: impl Into<String>) -> Self {
        let mut step = ExecutionStep::new(StepKind::RegisterDeferred);
        step.label = Some(label.into());
        step.deferred_callback_name = Some(callback.into());
        step
    }

    /// The front deferred registration becomes a macrotask.
    pub fn promote(callback: impl Into<String>) -> Self {
        let mut step = ExecutionStep::new(StepKind::PromoteToMacrotask);
        step.deferred_callback_name = Some(callback.into());
        step
    }

    /// A continuation joins the microtask queue.
    pub fn enqueue_microtask(label: impl Into<String>) -> Self {
        let mut step = ExecutionStep::new(StepKind::EnqueueMicrotask);
        step.label = Some(label.into());
        step
    }

    /// One microtask is taken off the queue (no-op when empty).
    pub fn drain_microtask() -> Self {
        ExecutionStep::new(StepKind::DrainOneMicrotask)
    }

    /// One macrotask is taken off the queue (if any); the loop cycles.
    pub fn cycle() -> Self {
        ExecutionStep::new(StepKind::DrainOneMacrotaskAndCycle)
    }

    /// A console line is emitted.
    pub fn emit_log(message: impl Into<String>) -> Self {
        let mut step = ExecutionStep::new(StepKind::EmitLog);
        step.log_message = Some(message.into());
        step
    }

    /// Attach the 1-based source line to highlight for this step.
    pub fn at_line(mut self, line: usize) -> Self {
        self.source_line = Some(line);
        self
    }

    /// Attach the prose explanation for this step.
    pub fn narrated(mut self, text: impl Into<String>) -> Self {
        self.narrative = Some(text.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_set_only_their_fields() {
        let step = ExecutionStep::emit_log("Start").at_line(1).narrated("logs Start");
        assert_eq!(step.kind, StepKind::EmitLog);
        assert_eq!(step.log_message.as_deref(), Some("Start"));
        assert_eq!(step.source_line, Some(1));
        assert!(step.label.is_none());
        assert!(step.deferred_callback_name.is_none());
    }

    #[test]
    fn test_serde_omits_absent_fields() {
        let json = serde_json::to_string(&ExecutionStep::pop()).unwrap();
        assert_eq!(json, r#"{"kind":"PopStack"}"#);

        let step = ExecutionStep::register_deferred("setTimeout (0ms)", "timeout callback");
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("deferredCallbackName"));
        assert!(!json.contains("sourceLine"));
    }

    #[test]
    fn test_serde_round_trip() {
        let step = ExecutionStep::promote("timeout callback")
            .at_line(2)
            .narrated("the timer is ready");
        let json = serde_json::to_string(&step).unwrap();
        let back: ExecutionStep = serde_json::from_str(&json).unwrap();
        assert_eq!(step, back);
    }
}
