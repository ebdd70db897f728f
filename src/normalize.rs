#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Turns HTML that slipped into a model's review back into Markdown-ish text.

use std::sync::LazyLock;

use regex::Regex;

/// Any tag-like `<...>` run.
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"<[^>]+>"));

/// Ordered rewrite rules; later rules assume earlier ones already ran.
static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (compile(r"<h1>(.*?)</h1>"), "# ${1}\n"),
        (compile(r"<h2>(.*?)</h2>"), "## ${1}\n"),
        (compile(r"<h3>(.*?)</h3>"), "### ${1}\n"),
        (compile(r"<p>(.*?)</p>"), "${1}\n\n"),
        (compile(r"(?s)<ul>(.*?)</ul>"), "${1}\n"),
        (compile(r"<li>(.*?)</li>"), "* ${1}\n"),
        // Fenced blocks first, or the inline rule eats their inner <code>.
        (compile(r"(?s)<pre><code>(.*?)</code></pre>"), "```\n${1}\n```"),
        (compile(r"(?s)<code>(.*?)</code>"), "`${1}`"),
    ]
});

/// Three or more consecutive newlines.
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| compile(r"\n{3,}"));

/// Compiles one of the fixed patterns above.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("normalizer patterns are valid")
}

/// Converts HTML-formatted review text to plain text with Markdown markers.
///
/// Text without anything that looks like a tag is returned untouched.
/// Otherwise headings, paragraphs, lists and code are rewritten to their
/// Markdown equivalents, leftover tags are dropped, entities are decoded and
/// runs of blank lines are collapsed to a single blank line.
pub fn html_to_text(text: &str) -> String {
    if !ANY_TAG.is_match(text) {
        return text.to_string();
    }

    let mut text = text.to_string();
    for (pattern, replacement) in RULES.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }

    let text = ANY_TAG.replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text);
    BLANK_RUNS.replace_all(&text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_returned_unchanged() {
        let text = "Looks good.\n\n\n\nFinal Grade: 9/10 &amp; done";
        assert_eq!(html_to_text(text), text);
        assert_eq!(html_to_text(&html_to_text(text)), text);
    }

    #[test]
    fn headings_and_paragraphs_become_markdown() {
        let out = html_to_text("<h2>Title</h2><p>Body</p>");

        assert!(out.contains("## Title"));
        assert!(out.contains("Body"));
        assert!(!out.contains("\n\n\n"));
        assert!(!ANY_TAG.is_match(&out));
    }

    #[test]
    fn every_heading_level_is_mapped() {
        let out = html_to_text("<h1>A</h1><h3>C</h3>");
        assert_eq!(out, "# A\n### C\n");
    }

    #[test]
    fn lists_become_bullets() {
        let out = html_to_text("<ul>\n<li>One</li>\n<li>Two</li>\n</ul>");

        assert!(out.contains("* One\n"));
        assert!(out.contains("* Two\n"));
        assert!(!out.contains("\n\n\n"));
        assert!(!out.contains('<'));
    }

    #[test]
    fn fenced_block_wins_over_inline_code() {
        let out = html_to_text("<pre><code>let x = 1;\nlet y = 2;</code></pre>");
        assert_eq!(out, "```\nlet x = 1;\nlet y = 2;\n```");
    }

    #[test]
    fn inline_code_gets_backticks_and_entities_decode() {
        let out = html_to_text("Prefer <code>Vec&lt;T&gt;</code> &amp; slices.");
        assert_eq!(out, "Prefer `Vec<T>` & slices.");
    }

    #[test]
    fn unknown_tags_are_stripped() {
        let out = html_to_text(r#"<div class="note"><strong>Hi</strong> there</div>"#);
        assert_eq!(out, "Hi there");
    }
}
