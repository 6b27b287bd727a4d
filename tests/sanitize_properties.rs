use pdf_tidy::SkipReason;
use pdf_tidy::fs_ops::{MAX_BASE_LEN, sanitize_title};

const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

fn nasty_titles() -> Vec<String> {
    let mut v: Vec<String> = [
        "../../etc/passwd",
        "..\\..\\windows\\system32",
        "  .hidden. ",
        "CON: <the> \"best\" | report?",
        "tab\tnew\nline\r\u{0}nul",
        "....",
        "a..b...c....d",
        "日本語のタイトル",
        "emoji 📄 report",
        ". . . x . . .",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    v.push("ä".repeat(400));
    v.push("long words ".repeat(60));
    v.push(format!("{}{}", "x".repeat(250), " tail"));
    v
}

#[test]
fn sanitized_names_are_always_safe() {
    for title in nasty_titles() {
        match sanitize_title(&title, MAX_BASE_LEN) {
            Ok(name) => {
                assert!(!name.is_empty());
                assert!(!name.contains(FORBIDDEN), "forbidden char in {name:?}");
                assert!(!name.chars().any(|c| (c as u32) < 0x20), "control char in {name:?}");
                assert!(!name.contains(".."), "traversal in {name:?}");
                assert_eq!(name.trim_matches(|c: char| c == '.' || c.is_whitespace()), name);
                assert!(name.len() <= MAX_BASE_LEN, "{} bytes", name.len());
            }
            Err(reason) => assert_eq!(reason, SkipReason::EmptyAfterSanitize, "title {title:?}"),
        }
    }
}

#[test]
fn oversized_titles_are_rejected_before_cleaning() {
    let title = "a".repeat(1001);
    assert_eq!(sanitize_title(&title, MAX_BASE_LEN), Err(SkipReason::TitleTooLong));
    assert!(sanitize_title(&"a".repeat(1000), MAX_BASE_LEN).is_ok());
}
