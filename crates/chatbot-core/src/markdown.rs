use std::sync::OnceLock;

use regex::Regex;

struct Patterns {
    syntax_chars: Regex,
    image: Regex,
    link: Regex,
    blank_lines: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        syntax_chars: Regex::new(r"[*_`#>-]").expect("valid regex"),
        image: Regex::new(r"!\[.*?\]\(.*?\)").expect("valid regex"),
        link: Regex::new(r"\[(.*?)\]\(.*?\)").expect("valid regex"),
        blank_lines: Regex::new(r"\n{2,}").expect("valid regex"),
    })
}

/// Strip Markdown syntax from a model reply so it reads as plain text.
///
/// Emphasis, code, heading, quote and list markers are dropped, images are
/// removed, links keep only their label, blank-line runs collapse to a single
/// newline and the result is trimmed. Single pass only: a label that itself
/// looks like a link is left as is.
pub fn clean_markdown(text: &str) -> String {
    let p = patterns();

    let text = p.syntax_chars.replace_all(text, "");
    // Images first, otherwise the link pattern eats `[alt](url)` and leaves a stray `!alt`
    let text = p.image.replace_all(&text, "");
    let text = p.link.replace_all(&text, "$1");
    let text = p.blank_lines.replace_all(&text, "\n");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_emphasis() {
        assert_eq!(clean_markdown("**bold** and _italic_"), "bold and italic");
    }

    #[test]
    fn test_link_keeps_label() {
        assert_eq!(clean_markdown("[site](http://x)"), "site");
        assert_eq!(
            clean_markdown("see [the docs](https://example.com/a_b-c) now"),
            "see the docs now"
        );
    }

    #[test]
    fn test_image_removed_entirely() {
        assert_eq!(clean_markdown("![alt](http://x)"), "");
        assert_eq!(clean_markdown("before ![logo](img.png) after"), "before  after");
    }

    #[test]
    fn test_collapses_blank_lines() {
        assert_eq!(clean_markdown("a\n\n\n\nb"), "a\nb");
        assert_eq!(clean_markdown("a\nb"), "a\nb");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(clean_markdown("  trim me  "), "trim me");
    }

    #[test]
    fn test_headings_quotes_and_lists() {
        let raw = "# Title\n\n> quoted\n\n- one\n- two\n\n`code`";
        assert_eq!(clean_markdown(raw), "Title\n quoted\n one\n two\ncode");
    }

    #[test]
    fn test_plain_text_unchanged() {
        let plain = "Nothing to strip here.\nSecond line.";
        assert_eq!(clean_markdown(plain), plain);
        assert_eq!(clean_markdown(&clean_markdown(plain)), plain);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_markdown(""), "");
        assert_eq!(clean_markdown("**"), "");
    }

    #[test]
    fn test_link_does_not_span_lines() {
        assert_eq!(clean_markdown("[a\nb](x)"), "[a\nb](x)");
    }
}
