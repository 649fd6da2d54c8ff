//! Fetch compilation mode
//!
//! Triggered when the text contains a `fetch(` call anywhere. This mode is
//! not a chain interpreter: however many `.then` stages the source has,
//! the emitted trace models a fixed two-stage chain (response parse, data
//! handler), which is the shape every teaching snippet in the supported
//! vocabulary takes. `.then` bodies contribute stage positions only; the
//! data handler logs a synthetic placeholder naming the fetched resource.

use super::patterns;
use crate::trace::ExecutionStep;

const CHAIN: &str = "fetch response chain";
const PARSE: &str = "response parser (.then)";
const HANDLER: &str = "data handler (.then)";

pub(super) fn compile_fetch(source: &str) -> Vec<ExecutionStep> {
    let mut fetch_line = 1;
    let mut target: Option<String> = None;
    let mut then_lines: Vec<usize> = Vec::new();
    let mut sync_logs: Vec<(String, usize)> = Vec::new();
    // Depth over the whole text: a logging call on a line inside an open
    // callback body is not synchronous, even though the line itself
    // contains neither `.then` nor an arrow.
    let mut depth = 0i32;
    let mut seen_fetch = false;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || patterns::is_comment_line(line) {
            continue;
        }

        if !seen_fetch {
            if let Some(pos) = line.find("fetch(") {
                seen_fetch = true;
                fetch_line = line_no;
                target = patterns::first_string_literal(&line[pos..]);
            }
        }

        if line.contains(".then(") {
            then_lines.push(line_no);
        } else if depth == 0 && !line.contains("=>") {
            if let Some(message) = patterns::log_call_argument(line) {
                sync_logs.push((message, line_no));
            }
        }

        depth += patterns::brace_delta(line);
    }

    let target = target.unwrap_or_else(|| "(unknown resource)".to_string());
    let parse_line = then_lines.first().copied().unwrap_or(fetch_line);
    let handler_line = then_lines.get(1).copied().unwrap_or(parse_line);

    let mut steps = Vec::new();

    steps.push(
        ExecutionStep::push(format!("fetch(\"{}\")", target))
            .at_line(fetch_line)
            .narrated(
                "fetch() starts a network request and immediately returns a \
                 pending promise; it never blocks the call stack.",
            ),
    );
    steps.push(
        ExecutionStep::register_deferred(format!("fetch \"{}\"", target), CHAIN)
            .at_line(fetch_line)
            .narrated(
                "The request is handed to the runtime. The .then chain will \
                 run once a response arrives.",
            ),
    );
    steps.push(
        ExecutionStep::pop()
            .narrated("fetch() has returned; the request is in flight, off the stack."),
    );

    for (message, line) in &sync_logs {
        steps.push(
            ExecutionStep::push(format!("console.log(\"{}\")", message))
                .at_line(*line)
                .narrated("Still synchronous: this runs long before any response arrives."),
        );
        steps.push(
            ExecutionStep::emit_log(message.clone())
                .at_line(*line)
                .narrated(format!("\"{}\" is appended to the console.", message)),
        );
        steps.push(ExecutionStep::pop().narrated("The call finishes and its frame leaves the stack."));
    }

    steps.push(ExecutionStep::promote(CHAIN).narrated(
        "The response has arrived: the completed request moves to the \
         macrotask queue.",
    ));
    steps.push(
        ExecutionStep::enqueue_microtask(PARSE).narrated(
            "The fetch promise settles, scheduling its first .then callback \
             as a microtask.",
        ),
    );
    steps.push(ExecutionStep::cycle().narrated(
        "The event loop takes the completed fetch off the macrotask queue \
         and begins a new cycle.",
    ));
    steps.push(
        ExecutionStep::drain_microtask()
            .narrated("The response parser is taken from the microtask queue."),
    );
    steps.push(
        ExecutionStep::push(PARSE)
            .at_line(parse_line)
            .narrated("The first .then callback runs; parsing the body returns another promise."),
    );
    steps.push(
        ExecutionStep::pop()
            .narrated("Parsing is under way; the second .then waits on its promise."),
    );
    steps.push(
        ExecutionStep::enqueue_microtask(HANDLER).narrated(
            "The parsed data is ready, so the second .then callback becomes \
             a microtask.",
        ),
    );
    steps.push(
        ExecutionStep::drain_microtask()
            .narrated("The data handler is taken from the microtask queue."),
    );
    steps.push(
        ExecutionStep::push(HANDLER)
            .at_line(handler_line)
            .narrated("The data handler runs with the parsed response."),
    );
    steps.push(
        ExecutionStep::emit_log(format!("(data from \"{}\")", target))
            .at_line(handler_line)
            .narrated("The handler logs the fetched data, shown here as a placeholder."),
    );
    steps.push(ExecutionStep::pop().narrated("The handler finishes; the chain is complete."));

    steps
}
