//! Markdown post-processing for assistant output
//!
//! Converts assistant text to HTML with smart punctuation, bare-URL
//! auto-linking, and highlight-ready code blocks, and special-cases the
//! `<think>…</think>` marker the assistant embeds around its internal
//! reasoning. The think tag is a fixed content convention of the
//! upstream service, not a general markdown feature.

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag};
use regex::Regex;
use std::sync::OnceLock;

/// Compiled renderer configuration, built once and read-only after
struct RendererConfig {
    think: Regex,
    bare_url: Regex,
    options: Options,
}

/// Fenced-block language tags that get a `language-*` class
///
/// Recognized tags are emitted as `<code class="language-X">` for a
/// client-side highlighter; anything else falls back to a plain
/// escaped block.
const KNOWN_LANGUAGES: &[&str] = &[
    "bash", "c", "cpp", "css", "go", "html", "java", "javascript", "js", "json", "markdown", "md",
    "python", "py", "rust", "sh", "shell", "sql", "toml", "ts", "typescript", "xml", "yaml",
];

fn config() -> &'static RendererConfig {
    static CONFIG: OnceLock<RendererConfig> = OnceLock::new();
    CONFIG.get_or_init(|| {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        RendererConfig {
            think: Regex::new(r"(?s)<think>(.*?)</think>").expect("valid think regex"),
            bare_url: Regex::new(r"(^|\s)(https?://[^\s<>]+)").expect("valid url regex"),
            options,
        }
    })
}

/// Render assistant text to HTML
///
/// Empty input yields an empty string. `<think>…</think>` spans are
/// rewritten into a styled container before parsing; the remaining text
/// gets bare URLs wrapped into links and is rendered as markdown with
/// smart punctuation, tables, and strikethrough enabled.
///
/// # Examples
///
/// ```
/// use medquiry::markdown::render;
///
/// let html = render("**Take rest** and drink water");
/// assert!(html.contains("<strong>Take rest</strong>"));
/// assert_eq!(render(""), "");
/// ```
pub fn render(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cfg = config();
    let prepared = rewrite_think_blocks(text);

    let parser = Parser::new_ext(&prepared, cfg.options);
    let events = parser.map(|event| match event {
        Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
            // Info strings can carry extra flags ("rust,no_run")
            let lang = info
                .split(|c: char| c == ',' || c.is_whitespace())
                .next()
                .unwrap_or("");
            if KNOWN_LANGUAGES.contains(&lang) {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(
                    lang.to_string().into(),
                )))
            } else {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced("".into())))
            }
        }
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

/// Extract the trimmed inner content of the first think span
///
/// # Examples
///
/// ```
/// use medquiry::markdown::extract_think;
///
/// let text = "<think> weighing symptoms </think>Take rest.";
/// assert_eq!(extract_think(text).as_deref(), Some("weighing symptoms"));
/// assert_eq!(extract_think("no reasoning here"), None);
/// ```
pub fn extract_think(text: &str) -> Option<String> {
    config()
        .think
        .captures(text)
        .map(|captures| captures[1].trim().to_string())
}

/// Remove all think spans (including their content), trimmed
///
/// # Examples
///
/// ```
/// use medquiry::markdown::strip_think;
///
/// let text = "<think>weighing symptoms</think>Take rest.";
/// assert_eq!(strip_think(text), "Take rest.");
/// ```
pub fn strip_think(text: &str) -> String {
    config().think.replace_all(text, "").trim().to_string()
}

/// Rewrite think spans into styled containers and linkify the rest
///
/// Bare URLs inside think content are left alone; the container's inner
/// text is passed through raw, matching how the upstream renderer
/// treated the span.
fn rewrite_think_blocks(text: &str) -> String {
    let cfg = config();
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;

    for captures in cfg.think.captures_iter(text) {
        let span = captures.get(0).expect("whole match");
        out.push_str(&linkify(&text[last_end..span.start()]));
        out.push_str("\n\n<div class=\"think-block\"><div class=\"think-header\">\u{1F914} Reasoning</div><div class=\"think-content\">");
        out.push_str(&captures[1]);
        out.push_str("</div></div>\n\n");
        last_end = span.end();
    }
    out.push_str(&linkify(&text[last_end..]));

    out
}

/// Wrap bare URLs in angle brackets so the parser emits autolinks
fn linkify(text: &str) -> String {
    config().bare_url.replace_all(text, "$1<$2>").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_basic_markdown_rendered() {
        let out = render("# Diagnosis\n\nTake **rest** and drink water.");
        assert!(out.contains("<h1>Diagnosis</h1>"));
        assert!(out.contains("<strong>rest</strong>"));
    }

    #[test]
    fn test_bare_url_autolinked() {
        let out = render("See https://example.com/advice for details");
        assert!(out.contains("<a href=\"https://example.com/advice\">https://example.com/advice</a>"));
    }

    #[test]
    fn test_explicit_link_untouched() {
        let out = render("See [advice](https://example.com/advice) here");
        assert!(out.contains("<a href=\"https://example.com/advice\">advice</a>"));
    }

    #[test]
    fn test_smart_punctuation_applied() {
        let out = render("It's \"mild\"");
        assert!(out.contains("\u{2019}")); // curly apostrophe
        assert!(out.contains("\u{201C}")); // opening curly quote
    }

    #[test]
    fn test_recognized_language_gets_class() {
        let out = render("```rust\nfn main() {}\n```");
        assert!(out.contains("<code class=\"language-rust\">"));
        assert!(out.contains("fn main() {}"));
    }

    #[test]
    fn test_unrecognized_language_falls_back_to_plain() {
        let out = render("```klingon\nqapla'\n```");
        assert!(!out.contains("language-"));
        assert!(out.contains("<pre><code>"));
    }

    #[test]
    fn test_code_block_content_escaped() {
        let out = render("```\n<script>alert(1)</script>\n```");
        assert!(out.contains("&lt;script&gt;"));
        assert!(!out.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn test_think_block_rewritten_to_container() {
        let out = render("<think>patient reports fever</think>\n\nTake rest.");
        assert!(out.contains("<div class=\"think-block\">"));
        assert!(out.contains("<div class=\"think-header\">\u{1F914} Reasoning</div>"));
        assert!(out.contains("<div class=\"think-content\">patient reports fever</div>"));
        assert!(out.contains("Take rest."));
    }

    #[test]
    fn test_extract_think_returns_trimmed_inner() {
        let text = "<think>\n  weighing symptoms\n</think>Take rest.";
        assert_eq!(extract_think(text).as_deref(), Some("weighing symptoms"));
    }

    #[test]
    fn test_extract_think_first_occurrence_only() {
        let text = "<think>first</think> middle <think>second</think>";
        assert_eq!(extract_think(text).as_deref(), Some("first"));
    }

    #[test]
    fn test_extract_think_none_without_marker() {
        assert_eq!(extract_think("plain advice"), None);
    }

    #[test]
    fn test_strip_think_removes_all_spans() {
        let text = "<think>first</think>Take rest.<think>second</think>";
        assert_eq!(strip_think(text), "Take rest.");
    }

    #[test]
    fn test_strip_think_spans_newlines() {
        let text = "<think>line one\nline two</think>Take rest.";
        assert_eq!(strip_think(text), "Take rest.");
    }

    #[test]
    fn test_strip_think_without_marker_trims_only() {
        assert_eq!(strip_think("  Take rest.  "), "Take rest.");
    }

    #[test]
    fn test_think_algebra_single_span() {
        // For text with exactly one span, extract yields its trimmed
        // inner text and strip removes exactly that span
        let text = "prefix <think> inner </think> suffix";
        assert_eq!(extract_think(text).as_deref(), Some("inner"));
        assert_eq!(strip_think(text), "prefix  suffix");
    }
}
