//! Utility functions.

/// Returns the slice of `text` spanning `lines` lines before and after the
/// line containing `cursor`.
///
/// `cursor` is clamped to the text length and must sit on a char boundary.
pub fn context_window(text: &str, cursor: usize, lines: usize) -> &str {
    let bytes = text.as_bytes();
    let cursor = cursor.min(bytes.len());

    let mut start = cursor;
    let mut seen = 0;
    while start > 0 {
        if bytes[start - 1] == b'\n' {
            if seen == lines {
                break;
            }
            seen += 1;
        }
        start -= 1;
    }

    let mut end = cursor;
    seen = 0;
    while end < bytes.len() {
        if bytes[end] == b'\n' {
            if seen == lines {
                break;
            }
            seen += 1;
        }
        end += 1;
    }

    &text[start..end]
}
