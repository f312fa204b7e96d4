//! Filename extraction from URL path.

use percent_encoding::percent_decode_str;

/// Extracts the last path segment from a URL for use as a filename hint.
///
/// Percent-escapes are decoded. Returns `None` if the URL cannot be parsed or
/// the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = percent_decode(segment);
    if decoded.is_empty() || decoded == "." || decoded == ".." || decoded.contains('/') {
        return None;
    }
    Some(decoded)
}

fn percent_decode(segment: &str) -> String {
    // Invalid UTF-8 becomes U+FFFD rather than dropping the name.
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        assert_eq!(
            filename_from_url_path("https://example.com/a/b/file.pdf").as_deref(),
            Some("file.pdf")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/single").as_deref(),
            Some("single")
        );
    }

    #[test]
    fn root_or_empty() {
        assert_eq!(filename_from_url_path("https://example.com/"), None);
        assert_eq!(filename_from_url_path("https://example.com"), None);
        assert_eq!(filename_from_url_path("not a url"), None);
    }

    #[test]
    fn with_query_and_escapes() {
        assert_eq!(
            filename_from_url_path("https://s3.example.com/x/my%20scan.png?X-Amz=abc").as_deref(),
            Some("my scan.png")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/a+b.txt").as_deref(),
            Some("a+b.txt")
        );
    }

    #[test]
    fn reserved_characters_survive_decoding() {
        assert_eq!(
            filename_from_url_path("https://cdn.example.com/x/Q1%20P&L.xlsx").as_deref(),
            Some("Q1 P&L.xlsx")
        );
        assert_eq!(
            filename_from_url_path("https://cdn.example.com/a=b;c%3Dd.txt").as_deref(),
            Some("a=b;c=d.txt")
        );
        assert_eq!(
            filename_from_url_path("https://cdn.example.com/caf%C3%A9%2Fmenu.pdf"),
            None
        );
    }
}
