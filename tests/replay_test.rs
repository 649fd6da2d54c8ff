// Integration tests for the replay engine, using the example library as
// the authoritative fixture set.

use looptty::library::Library;
use looptty::replay::{replay, ReplayError, RuntimeModelState};
use looptty::trace::{ExecutionStep, StepKind};
use pretty_assertions::assert_eq;

/// Documented expected console output for every built-in example.
fn expected_console(name: &str) -> Vec<&'static str> {
    match name {
        "basic-timeout" => vec!["Start", "End", "Timeout"],
        "microtask-priority" => vec!["Start", "End", "Promise", "Timeout"],
        "timer-race" => vec!["First", "Last", "Fast", "Slow"],
        "fetch-chain" => vec!["Sending request", "Request sent", "Got users"],
        other => panic!("no expected output recorded for example '{}'", other),
    }
}

#[test]
fn test_library_console_order() {
    let library = Library::builtin();
    for example in library.examples() {
        let state = replay(&example.steps, example.steps.len()).expect("full replay failed");
        assert_eq!(
            state.console_log,
            expected_console(&example.name),
            "console order mismatch in '{}'",
            example.name
        );
    }
}

#[test]
fn test_library_stack_balance() {
    let library = Library::builtin();
    for example in library.examples() {
        let pushes = example
            .steps
            .iter()
            .filter(|s| s.kind == StepKind::PushStack)
            .count();
        let pops = example
            .steps
            .iter()
            .filter(|s| s.kind == StepKind::PopStack)
            .count();
        assert_eq!(pushes, pops, "unbalanced stack in '{}'", example.name);

        // Every prefix must replay cleanly: a pop exceeding the pushes at
        // any point would surface as StackUnderflow.
        for k in 0..=example.steps.len() {
            replay(&example.steps, k)
                .unwrap_or_else(|e| panic!("'{}' failed at prefix {}: {}", example.name, k, e));
        }

        let final_state = replay(&example.steps, example.steps.len()).unwrap();
        assert!(
            final_state.stack.is_empty(),
            "'{}' ends with a non-empty stack",
            example.name
        );
    }
}

#[test]
fn test_library_promotions_follow_registrations() {
    // Every promotion names a callback some earlier registration introduced.
    let library = Library::builtin();
    for example in library.examples() {
        let mut registered: Vec<&str> = Vec::new();
        for step in &example.steps {
            match step.kind {
                StepKind::RegisterDeferred => {
                    registered.push(step.deferred_callback_name.as_deref().unwrap_or(""));
                }
                StepKind::PromoteToMacrotask => {
                    let name = step.deferred_callback_name.as_deref().unwrap_or("");
                    assert!(
                        registered.contains(&name),
                        "'{}' promotes unregistered '{}'",
                        example.name,
                        name
                    );
                }
                _ => {}
            }
        }
    }
}

#[test]
fn test_replay_idempotence() {
    let library = Library::builtin();
    let example = library.get("microtask-priority").unwrap();
    for k in 0..=example.steps.len() {
        let a = replay(&example.steps, k).unwrap();
        let b = replay(&example.steps, k).unwrap();
        assert_eq!(a, b, "replay not idempotent at index {}", k);
    }
}

/// Clear the fields `kind` is allowed to touch on both states, then demand
/// everything left over is identical. `highlighted_line` and `narrative`
/// may change on any step, so they are always masked.
fn assert_untouched_fields_equal(kind: StepKind, mut before: RuntimeModelState, mut after: RuntimeModelState, k: usize) {
    before.highlighted_line = None;
    after.highlighted_line = None;
    before.narrative.clear();
    after.narrative.clear();

    match kind {
        StepKind::PushStack | StepKind::PopStack => {
            before.stack.clear();
            after.stack.clear();
        }
        StepKind::RegisterDeferred => {
            before.deferred_registry.clear();
            after.deferred_registry.clear();
        }
        StepKind::PromoteToMacrotask => {
            before.deferred_registry.clear();
            after.deferred_registry.clear();
            before.macrotask_queue.clear();
            after.macrotask_queue.clear();
        }
        StepKind::EnqueueMicrotask | StepKind::DrainOneMicrotask => {
            before.microtask_queue.clear();
            after.microtask_queue.clear();
        }
        StepKind::DrainOneMacrotaskAndCycle => {
            before.macrotask_queue.clear();
            after.macrotask_queue.clear();
            before.cycle_count = 0;
            after.cycle_count = 0;
        }
        StepKind::EmitLog => {
            before.console_log.clear();
            after.console_log.clear();
        }
    }

    assert_eq!(before, after, "step {} changed fields outside its contract", k);
}

#[test]
fn test_monotonic_reconstruction() {
    let library = Library::builtin();
    for example in library.examples() {
        for k in 0..example.steps.len() {
            let before = replay(&example.steps, k).unwrap();
            let after = replay(&example.steps, k + 1).unwrap();
            assert_untouched_fields_equal(example.steps[k].kind, before, after, k);
        }
    }
}

#[test]
fn test_microtasks_beat_macrotasks() {
    let library = Library::builtin();
    let example = library.get("microtask-priority").unwrap();
    let state = replay(&example.steps, example.steps.len()).unwrap();
    let promise = state.console_log.iter().position(|l| l == "Promise");
    let timeout = state.console_log.iter().position(|l| l == "Timeout");
    assert!(promise.unwrap() < timeout.unwrap());
}

#[test]
fn test_malformed_sequences_are_fatal_through_public_api() {
    let unbalanced = vec![
        ExecutionStep::push("frame"),
        ExecutionStep::pop(),
        ExecutionStep::pop(),
    ];
    assert_eq!(
        replay(&unbalanced, 3),
        Err(ReplayError::StackUnderflow { step_index: 2 })
    );
    // The violating step is past the prefix: this replay is fine.
    assert!(replay(&unbalanced, 2).is_ok());

    assert_eq!(
        replay(&unbalanced, 99),
        Err(ReplayError::IndexOutOfRange { index: 99, len: 3 })
    );
}

#[test]
fn test_replay_at_zero_is_the_empty_state() {
    let library = Library::builtin();
    for example in library.examples() {
        let state = replay(&example.steps, 0).unwrap();
        assert_eq!(state, RuntimeModelState::empty());
    }
}
