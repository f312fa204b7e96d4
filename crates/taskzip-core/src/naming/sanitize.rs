//! Filesystem-safe directory names.

/// Characters reserved on at least one desktop filesystem.
const RESERVED: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replaces every reserved character (`< > : " / \ | ? *`) with `_` and trims
/// surrounding whitespace.
///
/// Total and idempotent. Whitespace-only input yields an empty string; callers
/// that need a directory name must supply their own fallback.
pub fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect();
    replaced.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_reserved_characters() {
        assert_eq!(sanitize("a:b"), "a_b");
        assert_eq!(sanitize(r#"<>:"/\|?*"#), "_________");
        assert_eq!(sanitize("Q3 report: final?"), "Q3 report_ final_");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(sanitize("  x  "), "x");
        assert_eq!(sanitize("\tTask A\n"), "Task A");
    }

    #[test]
    fn blank_input_yields_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \t"), "");
    }

    #[test]
    fn keeps_unicode_and_inner_spaces() {
        assert_eq!(sanitize("Café  déjà vu"), "Café  déjà vu");
    }

    #[test]
    fn output_never_contains_reserved_and_is_idempotent() {
        let inputs = [
            "plain",
            " a/b ",
            "C:\\Users\\me",
            "what?*",
            "<tag>|pipe",
            "\"quoted\"",
            "  ",
            "mixed /\\ end  ",
            "_already_safe_",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert!(
                !once.chars().any(|c| RESERVED.contains(&c)),
                "reserved char left in {:?}",
                once
            );
            assert_eq!(sanitize(&once), once, "not idempotent for {:?}", input);
        }
    }
}
