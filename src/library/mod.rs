//! The built-in example library
//!
//! A fixed catalog of (snippet, authored step sequence) pairs. The library
//! is process-wide read-only reference data: constructed once at startup,
//! indexed by name, never mutated. The authored sequences double as the
//! regression fixtures for the replay engine and as informal ground truth
//! for what the trace compiler should produce on equivalent snippets.
//!
//! Every authored step carries a narrative; the narratives are the teaching
//! content, so they get written with more care than brevity.

use crate::trace::{Example, ExecutionStep};
use rustc_hash::FxHashMap;

/// Immutable example registry with name lookup.
#[derive(Debug)]
pub struct Library {
    examples: Vec<Example>,
    index: FxHashMap<String, usize>,
}

impl Library {
    /// Build the full built-in catalog.
    pub fn builtin() -> Self {
        let examples = vec![
            basic_timeout(),
            microtask_priority(),
            timer_race(),
            fetch_chain(),
        ];
        let index = examples
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        Library { examples, index }
    }

    /// Look an example up by name.
    pub fn get(&self, name: &str) -> Option<&Example> {
        self.index.get(name).map(|&i| &self.examples[i])
    }

    /// All examples, in catalog order.
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// The example shown when nothing else was asked for.
    pub fn default_example(&self) -> &Example {
        &self.examples[0]
    }
}

fn basic_timeout() -> Example {
    let source = r#"console.log("Start");
setTimeout(() => {
  console.log("Timeout");
}, 0);
console.log("End");"#;

    let steps = vec![
        ExecutionStep::push(r#"console.log("Start")"#)
            .at_line(1)
            .narrated("Execution begins at the top. console.log is a plain synchronous call, so it goes straight onto the call stack."),
        ExecutionStep::emit_log("Start")
            .at_line(1)
            .narrated("\"Start\" is written to the console."),
        ExecutionStep::pop()
            .narrated("The call returns and its frame leaves the stack."),
        ExecutionStep::push("setTimeout(callback, 0ms)")
            .at_line(2)
            .narrated("setTimeout is also a synchronous call. The asynchrony is in what it sets up, not in the call itself."),
        ExecutionStep::register_deferred("setTimeout (0ms)", "timeout callback")
            .at_line(2)
            .narrated("The callback and its 0ms delay are handed to the runtime. Even a zero delay means not now: the callback cannot run before the stack is empty."),
        ExecutionStep::pop()
            .narrated("setTimeout returns immediately; the script keeps going."),
        ExecutionStep::push(r#"console.log("End")"#)
            .at_line(5)
            .narrated("The last synchronous statement runs while the timer waits outside the stack."),
        ExecutionStep::emit_log("End")
            .at_line(5)
            .narrated("\"End\" is written to the console before \"Timeout\", despite the 0ms delay."),
        ExecutionStep::pop()
            .narrated("The synchronous script is finished; the call stack is empty."),
        ExecutionStep::promote("timeout callback")
            .narrated("The 0ms delay elapsed long ago. Now that the script is done, the registration moves to the macrotask queue."),
        ExecutionStep::cycle()
            .narrated("The event loop finds the stack empty, takes the waiting macrotask, and starts a new cycle."),
        ExecutionStep::push("timeout callback")
            .at_line(3)
            .narrated("Only now does the timer callback actually run."),
        ExecutionStep::emit_log("Timeout")
            .at_line(3)
            .narrated("\"Timeout\" is written to the console, last of the three."),
        ExecutionStep::pop()
            .at_line(4)
            .narrated("The callback finishes; the stack is empty again and the program is done."),
    ];

    Example::new(
        "basic-timeout",
        "A zero-delay timer still waits for the synchronous script to finish",
        source,
        steps,
    )
}

fn microtask_priority() -> Example {
    let source = r#"console.log("Start");
setTimeout(() => {
  console.log("Timeout");
}, 0);
Promise.resolve().then(() => {
  console.log("Promise");
});
console.log("End");"#;

    let steps = vec![
        ExecutionStep::push(r#"console.log("Start")"#)
            .at_line(1)
            .narrated("The synchronous script starts running, one statement at a time."),
        ExecutionStep::emit_log("Start")
            .at_line(1)
            .narrated("\"Start\" is written to the console."),
        ExecutionStep::pop()
            .narrated("The call returns."),
        ExecutionStep::push("setTimeout(callback, 0ms)")
            .at_line(2)
            .narrated("The timer is set up synchronously."),
        ExecutionStep::register_deferred("setTimeout (0ms)", "timeout callback")
            .at_line(2)
            .narrated("A 0ms timer is registered with the runtime. It will become a macrotask, the lower-priority kind of work."),
        ExecutionStep::pop()
            .narrated("setTimeout returns."),
        ExecutionStep::push("Promise.resolve().then(callback)")
            .at_line(5)
            .narrated("Promise.resolve() produces an already-settled promise, but .then() never runs its callback synchronously."),
        ExecutionStep::enqueue_microtask("promise callback")
            .at_line(5)
            .narrated("The continuation goes into the microtask queue, which is drained completely before the next macrotask."),
        ExecutionStep::pop()
            .narrated(".then() returns; the continuation waits."),
        ExecutionStep::push(r#"console.log("End")"#)
            .at_line(8)
            .narrated("Still synchronous: both queued callbacks keep waiting for the stack to empty."),
        ExecutionStep::emit_log("End")
            .at_line(8)
            .narrated("\"End\" is written to the console."),
        ExecutionStep::pop()
            .narrated("The synchronous script is done; the interesting part begins."),
        ExecutionStep::cycle()
            .narrated("The event loop looks for work. Two callbacks are pending, and the microtask queue always wins."),
        ExecutionStep::drain_microtask()
            .narrated("The promise continuation is taken from the microtask queue, ahead of the earlier-registered timer."),
        ExecutionStep::push("promise callback")
            .at_line(6)
            .narrated("The promise continuation runs first."),
        ExecutionStep::emit_log("Promise")
            .at_line(6)
            .narrated("\"Promise\" beats \"Timeout\" to the console: microtasks outrank macrotasks, registration order notwithstanding."),
        ExecutionStep::pop()
            .narrated("The continuation finishes; the microtask queue is empty."),
        ExecutionStep::promote("timeout callback")
            .narrated("Only now does the ready timer move to the macrotask queue."),
        ExecutionStep::cycle()
            .narrated("With no microtasks left, the event loop takes the macrotask and starts a new cycle."),
        ExecutionStep::push("timeout callback")
            .at_line(3)
            .narrated("The timer callback runs last."),
        ExecutionStep::emit_log("Timeout")
            .at_line(3)
            .narrated("\"Timeout\" is written to the console."),
        ExecutionStep::pop()
            .at_line(4)
            .narrated("Final order: Start, End, Promise, Timeout."),
    ];

    Example::new(
        "microtask-priority",
        "A resolved promise's callback outruns an earlier zero-delay timer",
        source,
        steps,
    )
}

fn timer_race() -> Example {
    let source = r#"console.log("First");
setTimeout(() => {
  console.log("Slow");
}, 100);
setTimeout(() => {
  console.log("Fast");
}, 0);
console.log("Last");"#;

    let steps = vec![
        ExecutionStep::push(r#"console.log("First")"#)
            .at_line(1)
            .narrated("The synchronous script runs top to bottom."),
        ExecutionStep::emit_log("First")
            .at_line(1)
            .narrated("\"First\" is written to the console."),
        ExecutionStep::pop()
            .narrated("The call returns."),
        ExecutionStep::push("setTimeout(callback, 100ms)")
            .at_line(2)
            .narrated("The 100ms timer is set up first in source order."),
        ExecutionStep::register_deferred("setTimeout (0ms)", "fast callback (0ms)")
            .at_line(2)
            .narrated("The runtime keeps pending timers in readiness order, not registration order: the 0ms timer set up two lines below will be ready first, so it sits at the front."),
        ExecutionStep::pop()
            .narrated("setTimeout returns."),
        ExecutionStep::push("setTimeout(callback, 0ms)")
            .at_line(5)
            .narrated("The 0ms timer is set up second in source order."),
        ExecutionStep::register_deferred("setTimeout (100ms)", "slow callback (100ms)")
            .at_line(5)
            .narrated("The 100ms timer takes the back of the readiness order: it fires only after the 0ms one, whatever order the source declared them in."),
        ExecutionStep::pop()
            .narrated("setTimeout returns."),
        ExecutionStep::push(r#"console.log("Last")"#)
            .at_line(8)
            .narrated("The rest of the script runs while both timers wait."),
        ExecutionStep::emit_log("Last")
            .at_line(8)
            .narrated("\"Last\" is written to the console."),
        ExecutionStep::pop()
            .narrated("The stack is empty; the race is decided by delay, not by source order."),
        ExecutionStep::promote("fast callback (0ms)")
            .narrated("The 0ms timer is ready first and moves to the macrotask queue."),
        ExecutionStep::cycle()
            .narrated("The event loop takes the fast timer's callback."),
        ExecutionStep::push("fast callback (0ms)")
            .at_line(6)
            .narrated("The later-registered but shorter timer runs first."),
        ExecutionStep::emit_log("Fast")
            .at_line(6)
            .narrated("\"Fast\" is written to the console before \"Slow\"."),
        ExecutionStep::pop()
            .narrated("The fast callback finishes."),
        ExecutionStep::promote("slow callback (100ms)")
            .narrated("After its 100ms, the slow timer is ready too."),
        ExecutionStep::cycle()
            .narrated("A new cycle takes the slow timer's callback."),
        ExecutionStep::push("slow callback (100ms)")
            .at_line(3)
            .narrated("The earlier-registered but longer timer runs last."),
        ExecutionStep::emit_log("Slow")
            .at_line(3)
            .narrated("Final order: First, Last, Fast, Slow."),
        ExecutionStep::pop()
            .at_line(4)
            .narrated("Both timers have fired; the program is done."),
    ];

    Example::new(
        "timer-race",
        "Two timers with different delays fire in readiness order, not source order",
        source,
        steps,
    )
}

fn fetch_chain() -> Example {
    let source = r#"console.log("Sending request");
fetch("https://api.example.com/users")
  .then((response) => response.json())
  .then((data) => {
    console.log("Got users");
  });
console.log("Request sent");"#;

    let steps = vec![
        ExecutionStep::push(r#"console.log("Sending request")"#)
            .at_line(1)
            .narrated("The script starts synchronously, as always."),
        ExecutionStep::emit_log("Sending request")
            .at_line(1)
            .narrated("\"Sending request\" is written to the console."),
        ExecutionStep::pop()
            .narrated("The call returns."),
        ExecutionStep::push(r#"fetch("https://api.example.com/users")"#)
            .at_line(2)
            .narrated("fetch() starts the network request and immediately returns a pending promise. Nothing waits here."),
        ExecutionStep::register_deferred(
            r#"fetch "https://api.example.com/users""#,
            "fetch response chain",
        )
            .at_line(2)
            .narrated("The request is now the runtime's problem. The .then chain hangs off the pending promise, waiting for a response."),
        ExecutionStep::pop()
            .narrated("fetch() has returned; the request is in flight, off the stack."),
        ExecutionStep::push(r#"console.log("Request sent")"#)
            .at_line(7)
            .narrated("Proof that fetch didn't block: this line runs long before any response exists."),
        ExecutionStep::emit_log("Request sent")
            .at_line(7)
            .narrated("\"Request sent\" is written to the console."),
        ExecutionStep::pop()
            .narrated("The synchronous script is finished. Now we wait."),
        ExecutionStep::promote("fetch response chain")
            .narrated("The response has arrived: the completed request moves to the macrotask queue."),
        ExecutionStep::enqueue_microtask("response parser (.then)")
            .narrated("The fetch promise settles, scheduling the first .then callback as a microtask."),
        ExecutionStep::cycle()
            .narrated("The event loop takes the completed fetch off the macrotask queue and begins a new cycle."),
        ExecutionStep::drain_microtask()
            .narrated("The response parser is taken from the microtask queue."),
        ExecutionStep::push("response parser (.then)")
            .at_line(3)
            .narrated("The first .then callback runs. response.json() returns yet another promise: parsing is asynchronous too."),
        ExecutionStep::pop()
            .narrated("The parser callback finishes; the second .then waits on the json() promise."),
        ExecutionStep::enqueue_microtask("data handler (.then)")
            .narrated("The body is parsed, so the second .then callback becomes a microtask."),
        ExecutionStep::drain_microtask()
            .narrated("The data handler is taken from the microtask queue."),
        ExecutionStep::push("data handler (.then)")
            .at_line(4)
            .narrated("The data handler finally runs with the parsed users."),
        ExecutionStep::emit_log("Got users")
            .at_line(5)
            .narrated("\"Got users\" is written to the console, two promise hops after the response arrived."),
        ExecutionStep::pop()
            .at_line(6)
            .narrated("The chain is complete."),
    ];

    Example::new(
        "fetch-chain",
        "A network request resolves through a two-stage .then chain",
        source,
        steps,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let library = Library::builtin();
        assert!(library.get("basic-timeout").is_some());
        assert!(library.get("microtask-priority").is_some());
        assert!(library.get("no-such-example").is_none());
        assert_eq!(library.default_example().name, "basic-timeout");
    }

    #[test]
    fn test_every_example_is_narrated() {
        let library = Library::builtin();
        for example in library.examples() {
            for (i, step) in example.steps.iter().enumerate() {
                assert!(
                    step.narrative.is_some(),
                    "{} step {} has no narrative",
                    example.name,
                    i
                );
            }
        }
    }
}
