//! Title → filename sanitizer.
//!
//! Steps, in order:
//! 1. drop the characters `<>:"/\|?*` (forbidden on at least one major OS)
//! 2. drop control characters below U+0020
//! 3. trim whitespace and dots at both ends
//! 4. remove every `..` and keep only the last path component
//! 5. cut to the byte budget, backing off to a word boundary when possible
//!
//! Lengths are counted in UTF-8 bytes since that is what filesystems limit.

use crate::report::SkipReason;

/// Typical POSIX/NTFS single component limit, in bytes.
pub const MAX_FILENAME_LEN: usize = 255;
pub const PDF_EXTENSION: &str = ".pdf";
/// Budget for a sanitized base name: room is left for the extension only; a
/// duplicate counter re-truncates when it is appended.
pub const MAX_BASE_LEN: usize = MAX_FILENAME_LEN - PDF_EXTENSION.len();
/// Titles longer than this (in characters) are treated as corrupt metadata.
pub const MAX_TITLE_CHARS: usize = 1000;

const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

fn trim_name(s: &str) -> &str {
    s.trim_matches(|c: char| c == '.' || c.is_whitespace())
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
pub(crate) fn truncate_to_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Cut `s` to `max` bytes, preferring to end on a whole word.
fn truncate_at_word(s: &str, max: usize) -> &str {
    let cut = truncate_to_bytes(s, max);
    if cut.len() == s.len() {
        return cut;
    }
    let next_is_space = s[cut.len()..].starts_with(char::is_whitespace);
    if next_is_space {
        return cut;
    }
    match cut.rfind(char::is_whitespace) {
        Some(i) if i > 0 => &cut[..i],
        _ => cut,
    }
}

/// Turn a document title into a safe base file name (no extension).
///
/// Returns the reason to skip the file when the title is implausibly long or
/// nothing usable is left after cleaning.
pub fn sanitize_title(title: &str, max_len: usize) -> Result<String, SkipReason> {
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(SkipReason::TitleTooLong);
    }

    let cleaned: String = title
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c) && (*c as u32) >= 0x20)
        .collect();

    let mut name = trim_name(&cleaned).to_string();
    while name.contains("..") {
        name = name.replace("..", "");
    }
    // Separators are already gone; keep the last component regardless.
    let name = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let name = trim_name(truncate_at_word(trim_name(name), max_len));
    if name.is_empty() {
        return Err(SkipReason::EmptyAfterSanitize);
    }
    Ok(name.to_string())
}
