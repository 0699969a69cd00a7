use once_cell::sync::Lazy;
use regex::Regex;

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*").expect("opening fence pattern is valid"));

/// Strips a leading ```` ``` ```` / ```` ```json ```` marker and a trailing ```` ``` ````,
/// along with surrounding whitespace. Unfenced text is only trimmed.
///
/// Either marker may be missing; models sometimes stop before closing the fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(m) = OPENING_FENCE.find(text) {
        text = text[m.end()..].trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfenced_text_is_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn json_fence_is_removed() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn bare_fence_with_crlf_is_removed() {
        assert_eq!(strip_code_fence("\r\n```\r\n{\"a\":1}\r\n```\r\n"), "{\"a\":1}");
    }

    #[test]
    fn unclosed_fence_is_removed() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn inline_fence_is_removed() {
        assert_eq!(strip_code_fence("```json {\"a\":1}```"), "{\"a\":1}");
    }
}
