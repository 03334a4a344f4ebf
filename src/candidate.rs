/// One parsed, not-yet-validated post string with its derived metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub char_len: usize,
    pub hashtags: Vec<String>,
    pub token_estimate: u32,
}

impl Candidate {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        let hashtags = extract_hashtags(&text);
        // ceil(len / 4), the service's rough chars-per-token ratio
        let token_estimate = (char_len as u32).div_ceil(4);
        Self {
            text,
            char_len,
            hashtags,
            token_estimate,
        }
    }
}

/// Tokens of the form `#` followed by word characters. `is_alphanumeric`
/// covers the extended Unicode letter ranges, so `#caf\u{e9}` and CJK tags
/// count the same as ASCII ones.
fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '#' {
            continue;
        }
        let mut end = start + c.len_utf8();
        while let Some(&(idx, next)) = chars.peek() {
            if next.is_alphanumeric() || next == '_' {
                end = idx + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        if end > start + c.len_utf8() {
            tags.push(text[start..end].to_string());
        }
    }

    tags
}
