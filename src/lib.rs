//! # Introduction
//!
//! looptty models the execution of a single-threaded asynchronous runtime
//! (call stack, deferred-callback registry, microtask and macrotask queues)
//! as an ordered sequence of discrete steps, then lets you walk that
//! sequence forward and backward through a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Trace Compiler → ExecutionSteps → Replay → TUI
//! ```
//!
//! 1. [`trace`] — the step schema ([`trace::ExecutionStep`]) and the
//!    [`trace::Example`] value tying a snippet to its trace.
//! 2. [`compiler`] — lexical pattern matching over a small vocabulary of
//!    async idioms; emits a causally-correct, priority-ordered trace.
//! 3. [`library`] — built-in examples with hand-authored, narrated traces.
//! 4. [`replay`] — pure reconstruction of model state from a step prefix;
//!    stepping backward replays from zero, so it can never drift.
//! 5. [`share`] — the `(example, step)` pair as shareable text.
//! 6. [`ui`] — ratatui-based TUI; not part of the stable library API.
//!
//! ## Supported source vocabulary
//!
//! `console.log("...")`, `setTimeout` with inline or brace-delimited
//! callbacks and a numeric delay, `Promise.resolve().then(...)`,
//! `fetch("...")` with `.then` chains, and `clearTimeout`/rebinding as
//! cancellation. Everything else is skipped: the compiler is a deliberate
//! approximation over teaching idioms, not a language implementation.

pub mod compiler;
pub mod library;
pub mod replay;
pub mod share;
pub mod trace;
pub mod ui;
