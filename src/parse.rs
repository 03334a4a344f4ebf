//! Turns raw completion text into an ordered list of candidate post strings.
//!
//! Model responses arrive with preambles ("Here are 3 tweets:"), numbered
//! lists, and quoted lines. This pass only cleans; length and hashtag
//! filtering belong to the validator. Re-parsing already-clean text is a
//! no-op.

/// Case-insensitive substrings that mark a line as model preamble or
/// acknowledgment rather than content.
const PREAMBLE_DENYLIST: &[&str] = &[
    "here are 3",
    "here are 4",
    "here are the",
    "here's 3",
    "here's 4",
    "understood",
    "sure, here",
    "sure! here",
    "i'll generate",
    "i have generated",
    "as requested",
];

const QUOTE_CHARS: &[char] = &['"', '\'', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}'];

/// Parse a raw completion into cleaned candidate strings, order preserved.
pub fn parse_completion(raw: &str) -> Vec<String> {
    raw.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .filter(|line| !is_preamble(line))
        .collect()
}

fn is_preamble(line: &str) -> bool {
    let lower = line.to_lowercase();
    PREAMBLE_DENYLIST
        .iter()
        .any(|phrase| lower.contains(phrase))
}

/// Strip wrapping quotes and enumeration markers until the line is stable.
/// Running to a fixpoint is what makes the whole parse idempotent: a line
/// like `1. "First"` unwraps to `First` in one parse instead of two.
fn clean_line(line: &str) -> String {
    let mut current = line.trim();
    loop {
        let next = strip_enumeration_marker(strip_one_quote(current)).trim();
        if next == current {
            return current.to_string();
        }
        current = next;
    }
}

/// Strip at most one leading and one trailing quote character (ASCII or
/// Unicode smart quotes), independently.
fn strip_one_quote(text: &str) -> &str {
    let mut out = text;
    if let Some(rest) = out.strip_prefix(QUOTE_CHARS) {
        out = rest;
    }
    if let Some(rest) = out.strip_suffix(QUOTE_CHARS) {
        out = rest;
    }
    out
}

/// Strip a leading `\d+[.)]\s*` enumeration marker.
fn strip_enumeration_marker(text: &str) -> &str {
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return text;
    }
    match text[digits..].strip_prefix(['.', ')']) {
        Some(after) => after.trim_start(),
        None => text,
    }
}
