//! Replay engine for trace step sequences
//!
//! This module reconstructs the modeled runtime's state at any point in a
//! trace:
//! - [`replay`]: pure function from `(steps, target_index)` to
//!   [`RuntimeModelState`]
//! - [`RuntimeModelState`]: everything the UI renders (call stack, deferred
//!   registry, both task queues, console output, highlight line, narrative)
//! - [`ReplayError`]: contract violations in a malformed step sequence
//!
//! # Execution Model
//!
//! State is always rebuilt from step 0; there is no incremental undo.
//! Stepping backward is therefore observably identical to never having
//! taken the later steps, which rules out forward/backward drift by
//! construction. The engine makes no scheduling decisions of its own; the
//! queue-priority order was already baked into the step sequence by
//! whichever component produced it.

use crate::trace::{ExecutionStep, StepKind};
use std::fmt;

/// A pending deferred item: what the registry displays, and what will be
/// appended to the macrotask queue when the registration is promoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredEntry {
    pub label: String,
    pub resume_target: String,
}

/// Fully reconstructed model state after replaying a step prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeModelState {
    pub stack: Vec<String>,
    pub deferred_registry: Vec<DeferredEntry>,
    pub microtask_queue: Vec<String>,
    pub macrotask_queue: Vec<String>,
    pub console_log: Vec<String>,
    pub highlighted_line: Option<usize>,
    pub narrative: String,
    pub cycle_count: usize,
}

impl RuntimeModelState {
    /// The empty state at step 0.
    pub fn empty() -> Self {
        RuntimeModelState::default()
    }
}

/// A malformed step sequence, detected during replay.
///
/// These indicate an authoring bug in the example library or a compiler
/// defect. They are fatal for the replay call: tolerating them would hide
/// exactly the class of ordering bug this tool exists to teach. Draining an
/// empty queue is deliberately *not* here: sequences may include a "check
/// the queue, find nothing" beat for narrative purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// A PopStack step was applied while the modeled stack was empty.
    StackUnderflow { step_index: usize },

    /// A PromoteToMacrotask step was applied with no pending registration.
    EmptyDeferredRegistry { step_index: usize },

    /// The requested target index is outside `[0, len]`.
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::StackUnderflow { step_index } => {
                write!(
                    f,
                    "step {}: pop from an empty call stack (unbalanced trace)",
                    step_index
                )
            }
            ReplayError::EmptyDeferredRegistry { step_index } => {
                write!(
                    f,
                    "step {}: promotion with an empty deferred registry",
                    step_index
                )
            }
            ReplayError::IndexOutOfRange { index, len } => {
                write!(f, "target index {} out of range (trace has {} steps)", index, len)
            }
        }
    }
}

impl std::error::Error for ReplayError {}

/// Clamp an externally supplied step index to `[0, len(steps)]`.
///
/// Share links and other outside callers go through this; [`replay`] itself
/// stays strict about its contract.
pub fn clamp_index(steps: &[ExecutionStep], requested: usize) -> usize {
    requested.min(steps.len())
}

/// Reconstruct model state by applying `steps[0..target_index]` to the
/// empty state.
///
/// Pure function of its inputs: no hidden state, identical arguments yield
/// field-by-field identical results.
pub fn replay(steps: &[ExecutionStep], target_index: usize) -> Result<RuntimeModelState, ReplayError> {
    if target_index > steps.len() {
        return Err(ReplayError::IndexOutOfRange {
            index: target_index,
            len: steps.len(),
        });
    }

    let mut state = RuntimeModelState::empty();

    for (step_index, step) in steps[..target_index].iter().enumerate() {
        apply(&mut state, step, step_index)?;
    }

    Ok(state)
}

/// Apply one step to the accumulator. The transition table from the step
/// schema; the match is exhaustive so a new `StepKind` cannot be forgotten.
fn apply(
    state: &mut RuntimeModelState,
    step: &ExecutionStep,
    step_index: usize,
) -> Result<(), ReplayError> {
    match step.kind {
        StepKind::PushStack => {
            state.stack.push(step.label.clone().unwrap_or_default());
        }
        StepKind::PopStack => {
            if state.stack.pop().is_none() {
                return Err(ReplayError::StackUnderflow { step_index });
            }
        }
        StepKind::RegisterDeferred => {
            let label = step.label.clone().unwrap_or_default();
            let resume_target = step
                .deferred_callback_name
                .clone()
                .unwrap_or_else(|| label.clone());
            state.deferred_registry.push(DeferredEntry { label, resume_target });
        }
        StepKind::PromoteToMacrotask => {
            if state.deferred_registry.is_empty() {
                return Err(ReplayError::EmptyDeferredRegistry { step_index });
            }
            // FIFO by contract: the producer ordered registrations so that
            // the front entry is always the earliest-ready one.
            let entry = state.deferred_registry.remove(0);
            state.macrotask_queue.push(entry.resume_target);
        }
        StepKind::EnqueueMicrotask => {
            state
                .microtask_queue
                .push(step.label.clone().unwrap_or_default());
        }
        StepKind::DrainOneMicrotask => {
            if !state.microtask_queue.is_empty() {
                state.microtask_queue.remove(0);
            }
        }
        StepKind::DrainOneMacrotaskAndCycle => {
            if !state.macrotask_queue.is_empty() {
                state.macrotask_queue.remove(0);
            }
            state.cycle_count += 1;
        }
        StepKind::EmitLog => {
            state
                .console_log
                .push(step.log_message.clone().unwrap_or_default());
        }
    }

    if let Some(line) = step.source_line {
        state.highlighted_line = Some(line);
    }
    if let Some(narrative) = &step.narrative {
        state.narrative = narrative.clone();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::ExecutionStep;

    fn push_log_pop(message: &str, line: usize) -> Vec<ExecutionStep> {
        vec![
            ExecutionStep::push(format!("console.log(\"{}\")", message)).at_line(line),
            ExecutionStep::emit_log(message).at_line(line),
            ExecutionStep::pop(),
        ]
    }

    #[test]
    fn test_empty_prefix_is_empty_state() {
        let steps = push_log_pop("Start", 1);
        let state = replay(&steps, 0).unwrap();
        assert_eq!(state, RuntimeModelState::empty());
    }

    #[test]
    fn test_push_and_pop_balance() {
        let steps = push_log_pop("Start", 1);
        let mid = replay(&steps, 1).unwrap();
        assert_eq!(mid.stack, vec![r#"console.log("Start")"#.to_string()]);

        let done = replay(&steps, 3).unwrap();
        assert!(done.stack.is_empty());
        assert_eq!(done.console_log, vec!["Start".to_string()]);
        assert_eq!(done.highlighted_line, Some(1));
    }

    #[test]
    fn test_pop_on_empty_stack_is_fatal() {
        let steps = vec![ExecutionStep::pop()];
        assert_eq!(
            replay(&steps, 1),
            Err(ReplayError::StackUnderflow { step_index: 0 })
        );
    }

    #[test]
    fn test_promotion_moves_front_registration() {
        let steps = vec![
            ExecutionStep::register_deferred("setTimeout (0ms)", "fast callback"),
            ExecutionStep::register_deferred("setTimeout (100ms)", "slow callback"),
            ExecutionStep::promote("fast callback"),
        ];
        let state = replay(&steps, 3).unwrap();
        assert_eq!(state.macrotask_queue, vec!["fast callback".to_string()]);
        assert_eq!(state.deferred_registry.len(), 1);
        assert_eq!(state.deferred_registry[0].resume_target, "slow callback");
    }

    #[test]
    fn test_promotion_on_empty_registry_is_fatal() {
        let steps = vec![ExecutionStep::promote("nothing")];
        assert_eq!(
            replay(&steps, 1),
            Err(ReplayError::EmptyDeferredRegistry { step_index: 0 })
        );
    }

    #[test]
    fn test_empty_queue_drains_are_noops() {
        let steps = vec![ExecutionStep::drain_microtask(), ExecutionStep::cycle()];
        let state = replay(&steps, 2).unwrap();
        assert!(state.microtask_queue.is_empty());
        assert!(state.macrotask_queue.is_empty());
        // The cycle still counts even when there was nothing to take.
        assert_eq!(state.cycle_count, 1);
    }

    #[test]
    fn test_index_out_of_range_is_fatal() {
        let steps = push_log_pop("x", 1);
        assert_eq!(
            replay(&steps, 4),
            Err(ReplayError::IndexOutOfRange { index: 4, len: 3 })
        );
    }

    #[test]
    fn test_clamp_index() {
        let steps = push_log_pop("x", 1);
        assert_eq!(clamp_index(&steps, 0), 0);
        assert_eq!(clamp_index(&steps, 3), 3);
        assert_eq!(clamp_index(&steps, 4000), 3);
    }

    #[test]
    fn test_narrative_and_highlight_carry_forward() {
        let steps = vec![
            ExecutionStep::push("a").at_line(3).narrated("first"),
            ExecutionStep::pop(),
        ];
        // Step 2 has no line or narrative; both persist from step 1.
        let state = replay(&steps, 2).unwrap();
        assert_eq!(state.highlighted_line, Some(3));
        assert_eq!(state.narrative, "first");
    }
}
