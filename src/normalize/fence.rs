use regex::Regex;
use std::sync::OnceLock;

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Opening fence with an optional language tag, then everything up to
        // the closing fence at the very end.
        Regex::new(r"(?s)\A```[A-Za-z0-9_+.-]*[ \t]*\r?\n(.*?)```\z")
            .expect("fence pattern is a valid regex")
    })
}

/// Removes a surrounding markdown code fence, if any, and trims the result.
///
/// Text without a complete leading and trailing fence is returned trimmed but
/// otherwise untouched. Never fails.
pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    match fence_pattern().captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}
