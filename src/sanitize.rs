//! Sanitization and terminal rendering of assistant-authored HTML
//!
//! Backend answers and guided-flow messages may carry constrained HTML
//! (anchors, line breaks, basic formatting). Everything assistant-authored
//! passes through an allowlist sanitizer before it is shown; the sanitized
//! fragment is then flattened into plain terminal text with anchor targets
//! preserved.

use ammonia::Builder;
use std::collections::{HashMap, HashSet};

/// Sanitize an HTML fragment with the allowlist policy
///
/// Dangerous elements (script, style, iframe, object, embed, svg, video,
/// audio, form, input, button, and anything else outside the allowlist)
/// are dropped; script and style lose their contents entirely. All
/// attributes are stripped except `href` on anchors, and hrefs must use an
/// http(s) or mailto scheme, so `javascript:` URIs never survive.
pub fn clean(html: &str) -> String {
    builder().clean(html).to_string()
}

/// Sanitize and flatten a fragment for terminal output
pub fn render(html: &str) -> String {
    to_terminal_text(&clean(html))
}

/// Basic formatting tags the backend is allowed to emit
const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "i", "em", "strong", "u", "p", "br", "ul", "ol", "li",
];

fn builder() -> Builder<'static> {
    let mut builder = Builder::default();
    builder.tags(ALLOWED_TAGS.iter().copied().collect());
    builder.tag_attributes(HashMap::from([("a", HashSet::from(["href"]))]));
    builder.url_schemes(["http", "https", "mailto"].into_iter().collect());
    builder.link_rel(None);
    builder
}

/// Flatten a sanitized fragment into plain text
///
/// `<br>` becomes a newline, `<a href="u">text</a>` becomes `text (u)`,
/// every other tag is dropped and only its text content is kept. Entities
/// produced by the sanitizer are unescaped. Input is expected to already be
/// sanitized; this is a formatting step, not a security boundary.
pub fn to_terminal_text(sanitized: &str) -> String {
    let mut out = String::with_capacity(sanitized.len());
    let mut chars = sanitized.char_indices().peekable();
    let mut link_stack: Vec<Option<String>> = Vec::new();

    while let Some((start, c)) = chars.next() {
        if c != '<' {
            // Fast path: copy text runs verbatim, entities handled below
            let end = sanitized[start..]
                .find('<')
                .map(|off| start + off)
                .unwrap_or(sanitized.len());
            out.push_str(&unescape_entities(&sanitized[start..end]));
            while chars.peek().map(|(i, _)| *i < end).unwrap_or(false) {
                chars.next();
            }
            continue;
        }

        let end = match sanitized[start..].find('>') {
            Some(off) => start + off,
            // Unterminated tag; emit the rest as text and stop
            None => {
                out.push_str(&unescape_entities(&sanitized[start..]));
                break;
            }
        };
        let tag = &sanitized[start + 1..end];
        while chars.peek().map(|(i, _)| *i <= end).unwrap_or(false) {
            chars.next();
        }

        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        match (tag.starts_with('/'), name.as_str()) {
            (false, "br") => out.push('\n'),
            (false, "a") => link_stack.push(extract_href(tag)),
            (true, "a") => {
                if let Some(Some(href)) = link_stack.pop() {
                    // Avoid "url (url)" when the anchor text is the target itself
                    if !out.ends_with(&href) {
                        out.push_str(&format!(" ({})", href));
                    }
                }
            }
            _ => {}
        }
    }

    out
}

/// Pull the href value out of an opening anchor tag
fn extract_href(tag: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let at = lower.find("href=")?;
    let rest = &tag[at + 5..];
    let mut rest_chars = rest.chars();
    let quote = rest_chars.next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let value: String = rest_chars.take_while(|&c| c != quote).collect();
    if value.is_empty() {
        None
    } else {
        Some(unescape_entities(&value))
    }
}

fn unescape_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_script_and_event_handlers() {
        let input = r#"<script>alert(1)</script><b onclick="x()">hi</b>"#;
        assert_eq!(clean(input), "<b>hi</b>");
    }

    #[test]
    fn test_clean_strips_style_attribute() {
        let input = r#"<p style="color:white;background:black">text</p>"#;
        assert_eq!(clean(input), "<p>text</p>");
    }

    #[test]
    fn test_clean_drops_style_contents() {
        let input = "<style>body { display: none }</style>ok";
        assert_eq!(clean(input), "ok");
    }

    #[test]
    fn test_clean_rejects_javascript_uri() {
        let input = "<a href='javascript:alert(1)'>x</a>";
        let cleaned = clean(input);
        assert!(!cleaned.contains("javascript"));
        assert!(cleaned.contains("x"));
    }

    #[test]
    fn test_clean_keeps_http_href() {
        let input = "<a href='https://example.test/page'>go</a>";
        let cleaned = clean(input);
        assert!(cleaned.contains(r#"href="https://example.test/page""#));
    }

    #[test]
    fn test_clean_unwraps_unknown_tags_keeping_text() {
        let input = "<form><input>note</form><iframe>framed</iframe>";
        let cleaned = clean(input);
        assert!(!cleaned.contains('<'));
        assert!(cleaned.contains("note"));
        assert!(cleaned.contains("framed"));
    }

    #[test]
    fn test_clean_is_recursive() {
        let input = "<b><script>bad()</script>ok</b>";
        assert_eq!(clean(input), "<b>ok</b>");
    }

    #[test]
    fn test_render_anchor_with_target() {
        let input =
            "👉 <a href='https://trust.example/select-will' target='_blank'>Click here to start writing your will</a>";
        let rendered = render(input);
        assert_eq!(
            rendered,
            "👉 Click here to start writing your will (https://trust.example/select-will)"
        );
    }

    #[test]
    fn test_render_br_becomes_newline() {
        let rendered = render("line one<br><br>line two");
        assert_eq!(rendered, "line one\n\nline two");
    }

    #[test]
    fn test_render_plain_text_passthrough() {
        assert_eq!(render("no markup at all"), "no markup at all");
    }

    #[test]
    fn test_render_unescapes_entities() {
        assert_eq!(render("Wills &amp; Trusts"), "Wills & Trusts");
    }

    #[test]
    fn test_render_anchor_without_surviving_href() {
        // javascript: href is stripped by the sanitizer; only the text remains
        let rendered = render("<a href='javascript:x()'>do not click</a>");
        assert_eq!(rendered, "do not click");
    }

    #[test]
    fn test_to_terminal_text_skips_duplicate_url() {
        let rendered =
            to_terminal_text(r#"<a href="https://example.test">https://example.test</a>"#);
        assert_eq!(rendered, "https://example.test");
    }

    #[test]
    fn test_to_terminal_text_bold_dropped() {
        assert_eq!(to_terminal_text("<b>hi</b>"), "hi");
    }
}
