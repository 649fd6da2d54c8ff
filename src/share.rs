//! Shareable playback state
//!
//! The entire externally shareable state is an `(example name, step index)`
//! pair, carried as a query-string-shaped text: `example=<name>&step=<n>`.
//! Example names are slug identifiers, so nothing needs escaping. Decoding
//! is forgiving: pair order and unknown keys don't matter, and a missing
//! or malformed step number means step 0. The index is clamped against the
//! actual trace when applied, never rejected.

use crate::trace::Example;

/// A decoded share state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareState {
    pub example: String,
    pub step: usize,
}

impl ShareState {
    pub fn new(example: impl Into<String>, step: usize) -> Self {
        ShareState { example: example.into(), step }
    }

    /// Encode as `example=<name>&step=<n>`.
    pub fn encode(&self) -> String {
        format!("example={}&step={}", self.example, self.step)
    }

    /// Decode from the encoded form. `None` when no example name is
    /// present; there is nothing to share without one.
    pub fn decode(text: &str) -> Option<ShareState> {
        let mut example = None;
        let mut step = 0;

        for pair in text.trim().trim_start_matches('?').split('&') {
            let (key, value) = match pair.split_once('=') {
                Some(kv) => kv,
                None => continue,
            };
            match key {
                "example" if !value.is_empty() => example = Some(value.to_string()),
                "step" => step = value.parse().unwrap_or(0),
                _ => {}
            }
        }

        example.map(|example| ShareState { example, step })
    }

    /// The step index this state points at within `example`, clamped to
    /// the trace's bounds.
    pub fn step_within(&self, example: &Example) -> usize {
        crate::replay::clamp_index(&example.steps, self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::ExecutionStep;

    #[test]
    fn test_round_trip() {
        let state = ShareState::new("timer-race", 12);
        assert_eq!(state.encode(), "example=timer-race&step=12");
        assert_eq!(ShareState::decode(&state.encode()), Some(state));
    }

    #[test]
    fn test_decode_is_order_insensitive() {
        assert_eq!(
            ShareState::decode("step=3&example=basic-timeout"),
            Some(ShareState::new("basic-timeout", 3))
        );
    }

    #[test]
    fn test_decode_tolerates_junk() {
        assert_eq!(
            ShareState::decode("?theme=dark&example=basic-timeout&step=oops"),
            Some(ShareState::new("basic-timeout", 0))
        );
        assert_eq!(ShareState::decode("step=3"), None);
        assert_eq!(ShareState::decode(""), None);
    }

    #[test]
    fn test_step_is_clamped_not_rejected() {
        let example = Example::new(
            "tiny",
            "",
            "",
            vec![ExecutionStep::push("a"), ExecutionStep::pop()],
        );
        assert_eq!(ShareState::new("tiny", 9999).step_within(&example), 2);
        assert_eq!(ShareState::new("tiny", 1).step_within(&example), 1);
    }
}
