//! Front matter detection.
//!
//! A document has front matter when its first line is `---` (optionally
//! followed by a language tag such as `---yaml`). The block runs to the next
//! line starting with `---`. Anything after those dashes on the closing line
//! belongs to the body. A block that is never closed takes the whole file.

use std::sync::LazyLock;

use regex::Regex;

static OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A\x{FEFF}?---(?:[^-\r\n][^\r\n]*)?(?:\r?\n|\z)").expect("valid regex")
});

static CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^---").expect("valid regex"));

/// Split `text` into raw metadata and body.
fn split(text: &str) -> Option<(&str, &str)> {
    let open = OPEN_RE.find(text)?;
    let rest = &text[open.end()..];

    let Some(close) = CLOSE_RE.find(rest) else {
        return Some((rest, ""));
    };

    let body = &rest[close.end()..];
    let body = body.strip_prefix('\r').unwrap_or(body);
    let body = body.strip_prefix('\n').unwrap_or(body);
    Some((&rest[..close.start()], body))
}

/// Return the document body with any leading front matter block removed.
///
/// Text that does not open with a delimiter is returned unchanged. An
/// unterminated block leaves an empty body.
pub fn strip_front_matter(text: &str) -> &str {
    split(text).map_or(text, |(_, body)| body)
}

/// Return the raw metadata between the delimiters, if the text has front matter.
pub fn front_matter(text: &str) -> Option<&str> {
    split(text).map(|(matter, _)| matter.trim_end_matches(['\r', '\n']))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_block() {
        let text = "---\ntitle: Hello\nslug: /hello\n---\n# Hello\n";
        assert_eq!(strip_front_matter(text), "# Hello\n");
        assert_eq!(front_matter(text), Some("title: Hello\nslug: /hello"));
    }

    #[test]
    fn no_front_matter_is_unchanged() {
        let text = "# Hello\n\n---\n\nbody\n";
        assert_eq!(strip_front_matter(text), text);
        assert_eq!(front_matter(text), None);
    }

    #[test]
    fn unterminated_block_takes_whole_file() {
        let text = "---\ntitle: Hello\n# Hello\n";
        assert_eq!(strip_front_matter(text), "");
        assert_eq!(front_matter(text), Some("title: Hello\n# Hello"));
    }

    #[test]
    fn closing_line_may_carry_text() {
        let text = "---\ntitle: x\n--- trailing\n# X\n";
        assert_eq!(strip_front_matter(text), " trailing\n# X\n");
        assert_eq!(front_matter(text), Some("title: x"));
    }

    #[test]
    fn language_tag_and_longer_rule() {
        assert_eq!(strip_front_matter("---yaml\ntitle: x\n---\nbody"), "body");

        let rule = "----\n# Heading\n";
        assert_eq!(strip_front_matter(rule), rule);
        assert_eq!(front_matter(rule), None);
    }

    #[test]
    fn empty_block() {
        assert_eq!(strip_front_matter("---\n---\nbody"), "body");
        assert_eq!(front_matter("---\n---\nbody"), Some(""));
    }

    #[test]
    fn crlf_and_bom() {
        let text = "\u{FEFF}---\r\ntitle: x\r\n---\r\n# X\r\n";
        assert_eq!(strip_front_matter(text), "# X\r\n");
        assert_eq!(front_matter(text), Some("title: x"));
    }

    #[test]
    fn block_at_end_of_file() {
        assert_eq!(strip_front_matter("---\ntitle: x\n---"), "");
    }

    #[test]
    fn only_first_block_is_removed() {
        let text = "---\na: 1\n---\nbody\n---\nb: 2\n---\n";
        assert_eq!(strip_front_matter(text), "body\n---\nb: 2\n---\n");
    }
}
