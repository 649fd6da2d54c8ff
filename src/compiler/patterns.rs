//! Lexical helpers for the trace compiler
//!
//! Everything here is deliberately shallow: single-line string scanning
//! with just enough state to respect quotes and escapes. The compiler works
//! over an enumerated vocabulary of teaching idioms, not a grammar, so
//! these helpers answer questions like "what string does this logging call
//! print" and "does this line open a callback body" without building any
//! syntax tree.

/// Extract the contents of the first string literal in `text` (single or
/// double quoted). Common escapes are translated; an unterminated literal
/// yields `None` and the line is treated as unrecognized.
pub fn first_string_literal(text: &str) -> Option<String> {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '"' && c != '\'' {
            continue;
        }
        let quote = c;
        let mut out = String::new();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == quote {
                return Some(out);
            } else {
                out.push(c);
            }
        }
        return None;
    }
    None
}

/// The string-literal argument of a `console.log(...)` call on this line,
/// if any. Logging calls without a string literal are unsupported and
/// silently skipped by the caller.
pub fn log_call_argument(line: &str) -> Option<String> {
    let pos = line.find("console.log(")?;
    let rest = &line[pos + "console.log(".len()..];
    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                let quote = c;
                let mut out = String::new();
                while let Some(c) = chars.next() {
                    if c == '\\' {
                        match chars.next() {
                            Some('n') => out.push('\n'),
                            Some('t') => out.push('\t'),
                            Some(other) => out.push(other),
                            None => return None,
                        }
                    } else if c == quote {
                        return Some(out);
                    } else {
                        out.push(c);
                    }
                }
                return None;
            }
            ' ' => continue,
            // First argument is not a string literal.
            _ => return None,
        }
    }
    None
}

/// Parse the numeric delay from the tail of a timer line, e.g.
/// `setTimeout(() => console.log("x"), 500);` or a block's closing
/// `}, 500);`. `None` when the tail carries no number (callers default
/// to 0; a malformed delay is never fatal).
pub fn trailing_delay(line: &str) -> Option<u64> {
    let trimmed = line
        .trim_end()
        .trim_end_matches(';')
        .trim_end()
        .trim_end_matches(')')
        .trim_end();

    let bytes = trimmed.as_bytes();
    let mut start = bytes.len();
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    if start == bytes.len() {
        return None;
    }
    // The number must be an argument, i.e. preceded by a comma.
    if !trimmed[..start].trim_end().ends_with(',') {
        return None;
    }
    trimmed[start..].parse().ok()
}

/// The binding a timer is assigned to, for cancellation tracking:
/// `let t = setTimeout(...)` / `t = setTimeout(...)` → `t`.
pub fn binding_target(line: &str) -> Option<String> {
    let bytes = line.as_bytes();
    let mut eq = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'=' {
            continue;
        }
        // Skip `=>`, comparisons, and compound assignment.
        let next = bytes.get(i + 1).copied();
        let prev = if i > 0 { Some(bytes[i - 1]) } else { None };
        if matches!(next, Some(b'=') | Some(b'>')) {
            continue;
        }
        if matches!(prev, Some(b'=') | Some(b'!') | Some(b'<') | Some(b'>')) {
            continue;
        }
        eq = Some(i);
        break;
    }

    let lhs = line[..eq?].trim();
    let lhs = lhs
        .strip_prefix("let ")
        .or_else(|| lhs.strip_prefix("var "))
        .or_else(|| lhs.strip_prefix("const "))
        .unwrap_or(lhs)
        .trim();

    if is_identifier(lhs) {
        Some(lhs.to_string())
    } else {
        None
    }
}

/// The binding named by a `clearTimeout(...)` call on this line.
pub fn clear_timeout_target(line: &str) -> Option<String> {
    let pos = line.find("clearTimeout(")?;
    let rest = &line[pos + "clearTimeout(".len()..];
    let ident: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    if ident.is_empty() { None } else { Some(ident) }
}

/// Net brace depth change contributed by this line, ignoring braces inside
/// string literals. Used to find where a multi-line callback body ends.
pub fn brace_delta(line: &str) -> i32 {
    let mut delta = 0;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' | '`' => quote = Some(c),
                '{' => delta += 1,
                '}' => delta -= 1,
                _ => {}
            },
        }
    }
    delta
}

/// Lines the scanner skips wholesale. Block comments are recognized only in
/// the common leading-`*` layout; anything stranger just falls through to
/// "no recognized pattern".
pub fn is_comment_line(line: &str) -> bool {
    line.starts_with("//") || line.starts_with("/*") || line.starts_with('*')
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_call_argument() {
        assert_eq!(
            log_call_argument(r#"console.log("Start");"#),
            Some("Start".to_string())
        );
        assert_eq!(
            log_call_argument("console.log('single');"),
            Some("single".to_string())
        );
        // Inline callback: the log sits after other text on the line.
        assert_eq!(
            log_call_argument(r#"setTimeout(() => console.log("Timeout"), 0);"#),
            Some("Timeout".to_string())
        );
        // Non-string argument is unsupported.
        assert_eq!(log_call_argument("console.log(total);"), None);
        assert_eq!(log_call_argument("notalog('x');"), None);
    }

    #[test]
    fn test_log_call_escapes() {
        assert_eq!(
            log_call_argument(r#"console.log("a\"b\n");"#),
            Some("a\"b\n".to_string())
        );
    }

    #[test]
    fn test_trailing_delay() {
        assert_eq!(trailing_delay("setTimeout(cb, 500);"), Some(500));
        assert_eq!(trailing_delay("}, 0);"), Some(0));
        assert_eq!(
            trailing_delay(r#"setTimeout(() => console.log("x"), 1000);"#),
            Some(1000)
        );
        // Opening line of a block form carries no delay yet.
        assert_eq!(trailing_delay("setTimeout(() => {"), None);
        // Malformed delay: caller defaults to 0.
        assert_eq!(trailing_delay(r#"setTimeout(cb, "soon");"#), None);
        assert_eq!(trailing_delay("console.log(42);"), None);
    }

    #[test]
    fn test_binding_target() {
        assert_eq!(
            binding_target("let t = setTimeout(() => {"),
            Some("t".to_string())
        );
        assert_eq!(
            binding_target("timer = setTimeout(cb, 0);"),
            Some("timer".to_string())
        );
        assert_eq!(
            binding_target("const handle = setTimeout(cb, 10);"),
            Some("handle".to_string())
        );
        // The arrow's `=` is not an assignment.
        assert_eq!(binding_target("setTimeout(() => {"), None);
        assert_eq!(binding_target(r#"console.log("a = b");"#), None);
    }

    #[test]
    fn test_clear_timeout_target() {
        assert_eq!(
            clear_timeout_target("clearTimeout(timer);"),
            Some("timer".to_string())
        );
        assert_eq!(clear_timeout_target("cleartimeout(timer);"), None);
    }

    #[test]
    fn test_brace_delta_ignores_strings() {
        assert_eq!(brace_delta("setTimeout(() => {"), 1);
        assert_eq!(brace_delta("}, 0);"), -1);
        assert_eq!(brace_delta(r#"console.log("{not a brace}");"#), 0);
        assert_eq!(brace_delta("setTimeout(() => { console.log('x'); }, 0);"), 0);
    }

    #[test]
    fn test_comment_lines() {
        assert!(is_comment_line("// just a comment"));
        assert!(is_comment_line("/* block"));
        assert!(is_comment_line("* continued"));
        assert!(!is_comment_line(r#"console.log("// not a comment");"#));
    }
}
