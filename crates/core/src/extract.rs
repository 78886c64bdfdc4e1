//! Decision extraction — recover a JSON object from free-form LLM output.
//!
//! Models do not reliably emit pure JSON: they wrap it in fenced code
//! blocks, prepend prose, or "think out loud" with several partial blobs
//! before concluding. The heuristics here are tried in order; the first
//! success wins:
//!
//! 1. A fenced ```json code block.
//! 2. The entire text parsed directly.
//! 3. Brace-delimited `{...}` candidates (one nesting level allowed),
//!    tried from the *last* match backward — the final blob is typically
//!    the most complete.
//!
//! Returns `None` when nothing parses. Callers must treat that as a hard
//! failure of their stage and report it rather than guessing a decision.

/// Extract the first recoverable JSON object from `text`.
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    if let Some(block) = fenced_json_block(text) {
        if let Ok(value) = serde_json::from_str(block.trim()) {
            return Some(value);
        }
    }

    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Some(value);
    }

    for candidate in brace_candidates(text).iter().rev() {
        if let Ok(value) = serde_json::from_str(candidate) {
            return Some(value);
        }
    }

    None
}

/// The contents of the first ```json fenced block, if any.
fn fenced_json_block(text: &str) -> Option<&str> {
    let start = text.find("```json")?;
    let body = &text[start + "```json".len()..];
    let end = body.find("```")?;
    Some(&body[..end])
}

/// All `{...}` substrings with at most one level of nested braces,
/// scanned left to right without overlap.
fn brace_candidates(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut candidates = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }

        match match_braces(bytes, i) {
            Some(end) => {
                candidates.push(&text[i..=end]);
                i = end + 1;
            }
            None => i += 1,
        }
    }

    candidates
}

/// Walk from an opening brace to its match, rejecting depth > 2.
fn match_braces(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match b {
            b'{' => {
                depth += 1;
                if depth > 2 {
                    return None;
                }
            }
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}
