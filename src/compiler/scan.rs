//! Line-scan compilation mode
//!
//! The default mode: walk the source line by line, recognize the supported
//! top-level forms, and bucket deferred work for the drain phase. A
//! brace-depth cursor collects multi-line callback bodies; logging calls
//! inside a body become deferred log messages attached to the registration
//! that opened it.
//!
//! Emission happens in three phases once the scan is complete:
//!
//! 1. the synchronous phase, in source order (logging triples and
//!    registration triples);
//! 2. the microtask drain, in registration order, opened by a queue-check
//!    cycle marker;
//! 3. the macrotask drain, in readiness order (delay ascending, source line
//!    breaking ties).
//!
//! Registry ordering: the replay engine promotes deferred registrations
//! FIFO, so the `RegisterDeferred` payloads are assigned to the
//! registration slots in readiness order. Slots keep their own source line
//! and push label; with delays in source order the assignment is the
//! identity.

use super::patterns;
use crate::trace::ExecutionStep;

/// A logging call captured inside a callback body.
struct DeferredLog {
    message: String,
    line: usize,
}

/// One `setTimeout` registration and everything its callback will do.
struct TimerReg {
    binding: Option<String>,
    delay: u64,
    line: usize,
    callback: String,
    logs: Vec<DeferredLog>,
    canceled: bool,
}

/// One resolved-promise `.then` registration. No delay: microtasks are
/// purely ordinal.
struct MicroReg {
    line: usize,
    callback: String,
    logs: Vec<DeferredLog>,
}

/// The synchronous phase, in source order.
enum SyncEvent {
    Log { message: String, line: usize },
    Timer(usize),
    Micro(usize),
}

/// Which bucket the body-collection cursor is feeding.
#[derive(Clone, Copy)]
enum Collecting {
    Timer(usize),
    Micro(usize),
}

pub(super) fn compile_line_scan(source: &str) -> Vec<ExecutionStep> {
    let mut timers: Vec<TimerReg> = Vec::new();
    let mut micros: Vec<MicroReg> = Vec::new();
    let mut events: Vec<SyncEvent> = Vec::new();
    let mut cursor: Option<(Collecting, i32)> = None;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        // Inside a callback body: collect logs until the braces close.
        if let Some((target, depth)) = cursor.take() {
            let depth = depth + patterns::brace_delta(line);
            if let Some(message) = patterns::log_call_argument(line) {
                let log = DeferredLog { message, line: line_no };
                match target {
                    Collecting::Timer(i) => timers[i].logs.push(log),
                    Collecting::Micro(i) => micros[i].logs.push(log),
                }
            }
            if depth <= 0 {
                // A block's delay rides on its closing line: `}, 500);`
                if let Collecting::Timer(i) = target {
                    if let Some(delay) = patterns::trailing_delay(line) {
                        timers[i].delay = delay;
                    }
                }
            } else {
                cursor = Some((target, depth));
            }
            continue;
        }

        if line.is_empty() || patterns::is_comment_line(line) {
            continue;
        }

        if line.contains("clearTimeout(") {
            if let Some(name) = patterns::clear_timeout_target(line) {
                cancel_binding(&mut timers, &name);
            }
            continue;
        }

        if line.contains("setTimeout(") {
            let binding = patterns::binding_target(line);
            if let Some(name) = &binding {
                // Re-registration to the same binding supersedes the
                // earlier timer: it must never reach a promotion step.
                cancel_binding(&mut timers, name);
            }

            let mut reg = TimerReg {
                binding,
                delay: patterns::trailing_delay(line).unwrap_or(0),
                line: line_no,
                callback: format!("timeout callback (line {})", line_no),
                logs: Vec::new(),
                canceled: false,
            };
            if let Some(message) = patterns::log_call_argument(line) {
                reg.logs.push(DeferredLog { message, line: line_no });
            }

            let depth = patterns::brace_delta(line);
            timers.push(reg);
            events.push(SyncEvent::Timer(timers.len() - 1));
            if depth > 0 {
                cursor = Some((Collecting::Timer(timers.len() - 1), depth));
            }
            continue;
        }

        if line.contains("Promise.resolve") && line.contains(".then(") {
            let mut reg = MicroReg {
                line: line_no,
                callback: format!("promise callback (line {})", line_no),
                logs: Vec::new(),
            };
            if let Some(message) = patterns::log_call_argument(line) {
                reg.logs.push(DeferredLog { message, line: line_no });
            }

            let depth = patterns::brace_delta(line);
            micros.push(reg);
            events.push(SyncEvent::Micro(micros.len() - 1));
            if depth > 0 {
                cursor = Some((Collecting::Micro(micros.len() - 1), depth));
            }
            continue;
        }

        if let Some(message) = patterns::log_call_argument(line) {
            events.push(SyncEvent::Log { message, line: line_no });
            continue;
        }

        // Anything else is outside the supported vocabulary: skipped.
    }

    emit(&timers, &micros, &events)
}

/// Cancel the most recent surviving registration bound to `name`.
fn cancel_binding(timers: &mut [TimerReg], name: &str) {
    if let Some(reg) = timers
        .iter_mut()
        .rev()
        .find(|t| !t.canceled && t.binding.as_deref() == Some(name))
    {
        reg.canceled = true;
    }
}

fn emit(timers: &[TimerReg], micros: &[MicroReg], events: &[SyncEvent]) -> Vec<ExecutionStep> {
    // Readiness order over surviving timers: delay ascending, source line
    // breaking ties. This is both the promotion order and the order the
    // registry slots are filled in, so FIFO promotion stays exact.
    let mut ready: Vec<usize> = (0..timers.len()).filter(|&i| !timers[i].canceled).collect();
    ready.sort_by_key(|&i| (timers[i].delay, timers[i].line));

    let mut steps = Vec::new();
    let mut slot = 0usize;

    for event in events {
        match event {
            SyncEvent::Log { message, line } => {
                steps.push(
                    ExecutionStep::push(format!("console.log(\"{}\")", message))
                        .at_line(*line)
                        .narrated(
                            "A plain synchronous call: it runs to completion on the call \
                             stack before anything else can happen.",
                        ),
                );
                steps.push(
                    ExecutionStep::emit_log(message.clone())
                        .at_line(*line)
                        .narrated(format!("\"{}\" is appended to the console.", message)),
                );
                steps.push(ExecutionStep::pop().narrated("The call finishes and its frame leaves the stack."));
            }
            SyncEvent::Timer(i) => {
                let here = &timers[*i];
                if here.canceled {
                    continue;
                }
                let entry = &timers[ready[slot]];
                slot += 1;
                steps.push(
                    ExecutionStep::push(format!("setTimeout(callback, {}ms)", here.delay))
                        .at_line(here.line)
                        .narrated(
                            "setTimeout itself is synchronous: it only hands the callback \
                             and its delay over to the runtime.",
                        ),
                );
                steps.push(
                    ExecutionStep::register_deferred(
                        format!("setTimeout ({}ms)", entry.delay),
                        entry.callback.clone(),
                    )
                    .at_line(here.line)
                    .narrated(format!(
                        "The runtime now tracks a {}ms timer. Pending timers live outside \
                         the call stack, kept in the order they will become ready.",
                        entry.delay
                    )),
                );
                steps.push(
                    ExecutionStep::pop()
                        .narrated("setTimeout returns immediately; execution moves on."),
                );
            }
            SyncEvent::Micro(i) => {
                let reg = &micros[*i];
                steps.push(
                    ExecutionStep::push("Promise.resolve().then(callback)")
                        .at_line(reg.line)
                        .narrated(
                            "The promise is already settled, but .then() never runs its \
                             callback synchronously.",
                        ),
                );
                steps.push(
                    ExecutionStep::enqueue_microtask(reg.callback.clone())
                        .at_line(reg.line)
                        .narrated(
                            "The continuation joins the microtask queue, which drains \
                             ahead of any timer.",
                        ),
                );
                steps.push(
                    ExecutionStep::pop()
                        .narrated(".then() returns; the callback waits its turn in the queue."),
                );
            }
        }
    }

    if !micros.is_empty() {
        steps.push(ExecutionStep::cycle().narrated(
            "The call stack is empty, so the event loop looks for queued work. \
             Microtasks always drain before the next macrotask.",
        ));
        for reg in micros {
            steps.push(
                ExecutionStep::drain_microtask().narrated(format!(
                    "The {} is taken from the front of the microtask queue.",
                    reg.callback
                )),
            );
            steps.push(
                ExecutionStep::push(reg.callback.clone())
                    .at_line(reg.line)
                    .narrated("The promise continuation runs on the now-empty call stack."),
            );
            for log in &reg.logs {
                steps.push(
                    ExecutionStep::emit_log(log.message.clone())
                        .at_line(log.line)
                        .narrated(format!("\"{}\" is appended to the console.", log.message)),
                );
            }
            steps.push(ExecutionStep::pop().narrated("The continuation finishes."));
        }
    }

    for &i in &ready {
        let reg = &timers[i];
        steps.push(ExecutionStep::promote(reg.callback.clone()).narrated(format!(
            "The {}ms delay has elapsed: the earliest-ready timer moves from the \
             pending registrations to the macrotask queue.",
            reg.delay
        )));
        steps.push(ExecutionStep::cycle().narrated(
            "With the stack empty and no microtasks pending, the event loop takes \
             the next macrotask and begins a new cycle.",
        ));
        steps.push(
            ExecutionStep::push(reg.callback.clone())
                .at_line(reg.line)
                .narrated("The timer callback finally runs."),
        );
        for log in &reg.logs {
            steps.push(
                ExecutionStep::emit_log(log.message.clone())
                    .at_line(log.line)
                    .narrated(format!("\"{}\" is appended to the console.", log.message)),
            );
        }
        steps.push(ExecutionStep::pop().narrated("The timer callback finishes."));
    }

    steps
}
