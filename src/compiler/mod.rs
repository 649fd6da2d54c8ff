//! Source-to-steps trace compiler
//!
//! This module turns a snippet of asynchronous source code into an ordered
//! step sequence reproducing the true scheduling order of a single-threaded
//! runtime:
//! - [`patterns`]: shallow lexical helpers (string literals, delays,
//!   bindings, brace depth)
//! - [`scan`]: the default line-scan mode (logging calls, timers, resolved
//!   promises, cancellation)
//! - fetch mode: a fixed two-stage network-fetch chain, selected when the
//!   text contains a `fetch(` call anywhere
//!
//! # Supported vocabulary
//!
//! `console.log("...")` with a string-literal argument; `setTimeout` with a
//! numeric delay and an inline arrow callback or a brace-delimited block;
//! `Promise.resolve().then(...)`; `fetch("...")` followed by `.then`
//! chains; `clearTimeout(binding)` / re-assignment of a timer binding as
//! cancellation. Everything else is silently skipped: this is intentional
//! pattern matching over a closed set of teaching idioms, not a parser.
//! Feeding it branches or loops yields a plausible-looking but approximate
//! trace.

mod fetch;
pub mod patterns;
mod scan;

use crate::trace::Example;
use std::fmt;

/// Name given to every compiler-produced example. The caller replaces the
/// previous custom example wholesale with the new value.
pub const CUSTOM_EXAMPLE_NAME: &str = "custom";

/// Compilation failed: nothing in the input matched the supported
/// vocabulary. Recoverable; surfaced verbatim, mutates nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub reason: String,
}

impl CompileError {
    fn new(reason: impl Into<String>) -> Self {
        CompileError { reason: reason.into() }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for CompileError {}

/// Compile source text into a custom [`Example`].
///
/// Mode selection is all-or-nothing: a `fetch(` call anywhere switches the
/// whole input to fetch mode; otherwise the line scanner runs. An input
/// that produces zero steps fails rather than yielding an empty trace.
pub fn compile(source: &str) -> Result<Example, CompileError> {
    let steps = if source.contains("fetch(") {
        fetch::compile_fetch(source)
    } else {
        scan::compile_line_scan(source)
    };

    if steps.is_empty() {
        return Err(CompileError::new("no supported pattern found"));
    }

    Ok(Example::new(
        CUSTOM_EXAMPLE_NAME,
        "Compiled from custom source",
        source,
        steps,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::StepKind;

    #[test]
    fn test_unrecognized_input_fails() {
        let err = compile("// nothing here\n").unwrap_err();
        assert_eq!(err.reason, "no supported pattern found");
        assert_eq!(err.to_string(), "no supported pattern found");
    }

    #[test]
    fn test_fetch_call_selects_fetch_mode() {
        let example = compile("fetch(\"https://example.com/a\");\n").unwrap();
        assert!(example
            .steps
            .iter()
            .any(|s| s.kind == StepKind::RegisterDeferred
                && s.label.as_deref() == Some("fetch \"https://example.com/a\"")));
    }

    #[test]
    fn test_custom_example_carries_source() {
        let source = "console.log(\"hi\");\n";
        let example = compile(source).unwrap();
        assert_eq!(example.name, CUSTOM_EXAMPLE_NAME);
        assert_eq!(example.source_code, source);
    }
}
