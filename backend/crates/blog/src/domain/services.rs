//! Domain Services
//!
//! Pure text processing on the write path: HTML sanitization, reading time
//! and slug derivation.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use ammonia::Builder;
use unicode_normalization::UnicodeNormalization;

/// Reading speed used for `reading_time_minutes`
pub const WORDS_PER_MINUTE: usize = 200;

const POST_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "blockquote", "code", "em", "i", "li", "ol", "strong", "ul",
    "p", "br", "pre", "h2", "h3", "h4", "h5", "h6", "img", "figure", "figcaption",
];

const COMMENT_TAGS: &[&str] = &["strong", "em", "code", "br", "p"];

/// Tags whose content is dropped along with the tag
const DROPPED_CONTENT: &[&str] = &["script", "style"];

static POST_CLEANER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", HashSet::from(["href", "title", "rel", "target"]));
    tag_attributes.insert("img", HashSet::from(["src", "alt", "width", "height", "loading"]));

    let mut builder = Builder::empty();
    builder
        .tags(POST_TAGS.iter().copied().collect())
        .clean_content_tags(DROPPED_CONTENT.iter().copied().collect())
        .generic_attributes(HashSet::from(["class", "id"]))
        .tag_attributes(tag_attributes)
        .url_schemes(HashSet::from(["http", "https", "mailto"]))
        // `rel` is an allowed attribute, so ammonia must not manage it
        .link_rel(None);
    builder
});

static COMMENT_CLEANER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::empty();
    builder
        .tags(COMMENT_TAGS.iter().copied().collect())
        .clean_content_tags(DROPPED_CONTENT.iter().copied().collect());
    builder
});

static TEXT_ONLY: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::empty();
    builder.clean_content_tags(DROPPED_CONTENT.iter().copied().collect());
    builder
});

/// Clean post HTML down to the editorial allow-list.
pub fn sanitize_post_html(html: &str) -> String {
    POST_CLEANER.clean(html).to_string()
}

/// Clean comment HTML down to inline emphasis and paragraphs, no attributes.
pub fn sanitize_comment_html(html: &str) -> String {
    COMMENT_CLEANER.clean(html).to_string()
}

/// Minutes to read at [`WORDS_PER_MINUTE`], never less than one.
pub fn reading_time_minutes(html: &str) -> i32 {
    let text = TEXT_ONLY.clean(html).to_string();
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i32
}

/// Derive a URL slug from free text.
///
/// NFKD-decompose and keep ASCII, lowercase, drop anything that is not a word
/// character, whitespace or hyphen, collapse whitespace/hyphen runs into one
/// `-` and trim leading and trailing `-`/`_`.
pub fn slugify(value: &str) -> String {
    let ascii: String = value.nfkd().filter(char::is_ascii).collect();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    slug.trim_matches(['-', '_']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_script_is_removed() {
        let clean = sanitize_post_html("<p>Safe <script>alert(1)</script> content</p>");
        assert!(clean.contains("<p>"));
        assert!(!clean.contains("<script"));
        assert!(!clean.contains("alert(1)"));
    }

    #[test]
    fn test_post_keeps_allowed_attributes() {
        let clean = sanitize_post_html(
            r#"<a href="https://example.com" rel="nofollow" onclick="x()">link</a><img src="https://cdn.example.com/a.png" alt="a" style="x">"#,
        );
        assert!(clean.contains(r#"href="https://example.com""#));
        assert!(clean.contains(r#"rel="nofollow""#));
        assert!(!clean.contains("onclick"));
        assert!(clean.contains(r#"alt="a""#));
        assert!(!clean.contains("style"));
    }

    #[test]
    fn test_post_strips_unknown_tags_keeps_text() {
        let clean = sanitize_post_html("<h1 class=\"x\">Title</h1><div id=\"d\">Body</div>");
        assert!(!clean.contains("<h1"));
        assert!(!clean.contains("<div"));
        assert!(clean.contains("Title"));
        assert!(clean.contains("Body"));
    }

    #[test]
    fn test_comment_allows_no_attributes() {
        let clean = sanitize_comment_html(
            r#"<p class="x"><strong>hi</strong> <a href="https://spam.example">buy</a></p>"#,
        );
        assert_eq!(clean, "<p><strong>hi</strong> buy</p>");
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes("<p>three short words</p>"), 1);

        let long = format!("<p>{}</p>", "word ".repeat(401));
        assert_eq!(reading_time_minutes(&long), 3);

        let scripted = format!("<p>hi</p><script>{}</script>", "x ".repeat(1000));
        assert_eq!(reading_time_minutes(&scripted), 1);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Crème Brûlée  "), "creme-brulee");
        assert_eq!(slugify("a -- b__c"), "a-b__c");
        assert_eq!(slugify("-_edge_-"), "edge");
        assert_eq!(slugify("C++ & Rust!"), "c-rust");
        assert_eq!(slugify("日本語"), "");
    }
}
