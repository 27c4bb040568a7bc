//! HTML allow-list filter.
//!
//! Raw HTML from markup (`{{{#!html ...}}}` blocks) is cleaned with
//! [`ammonia`]. Tags and attributes outside the allow-list are removed, not
//! escaped, and every surviving `style` attribute is passed through
//! [`filter_declarations`].

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::css::{Scope, filter_declarations, filter_stylesheet};

static STYLE_ELEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style\s*>").unwrap());

const ALLOWED_TAGS: &[&str] = &[
    "a",
    "abbr",
    "b",
    "big",
    "blockquote",
    "br",
    "caption",
    "code",
    "col",
    "colgroup",
    "dd",
    "del",
    "details",
    "div",
    "dl",
    "dt",
    "em",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "i",
    "img",
    "ins",
    "kbd",
    "li",
    "mark",
    "ol",
    "p",
    "pre",
    "q",
    "rp",
    "rt",
    "ruby",
    "s",
    "samp",
    "small",
    "span",
    "strike",
    "strong",
    "sub",
    "summary",
    "sup",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "u",
    "ul",
    "var",
];

const GENERIC_ATTRIBUTES: &[&str] = &["class", "style", "title"];

const TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href"]),
    ("img", &["src", "alt", "width", "height"]),
    ("ol", &["start", "type"]),
    ("td", &["colspan", "rowspan"]),
    ("th", &["colspan", "rowspan"]),
    ("col", &["span"]),
    ("colgroup", &["span"]),
    ("details", &["open"]),
];

const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto"];

/// Tags dropped together with their content. Raw text elements belong here so
/// their content does not resurface as text.
const CLEAN_CONTENT_TAGS: &[&str] = &[
    "script", "style", "iframe", "noembed", "noframes", "noscript", "textarea", "title", "xmp",
];

const EXTERNAL_LINK_REL: &str = "nofollow noopener ugc";

/// Which allow-list to clean with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HtmlPolicy {
    /// Restrictive baseline.
    #[default]
    Baseline,
    /// Baseline plus anchors rewritten as external links
    /// (`rel="nofollow noopener ugc"`, `target="_blank"`).
    ExternalLinks,
}

/// Clean an HTML fragment against the allow-list.
///
/// # Example
///
/// ```
/// use namu_sanitize::{HtmlPolicy, sanitize_html};
///
/// let html = sanitize_html(r#"<b onclick="x()">hi</b><script>x()</script>"#, HtmlPolicy::Baseline);
/// assert_eq!(html, "<b>hi</b>");
/// ```
pub fn sanitize_html(html: &str, policy: HtmlPolicy) -> String {
    let tag_attributes: HashMap<&str, HashSet<&str>> = TAG_ATTRIBUTES
        .iter()
        .map(|(tag, attributes)| (*tag, attributes.iter().copied().collect()))
        .collect();

    let mut builder = ammonia::Builder::empty();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .clean_content_tags(CLEAN_CONTENT_TAGS.iter().copied().collect())
        .generic_attributes(GENERIC_ATTRIBUTES.iter().copied().collect())
        .tag_attributes(tag_attributes)
        .url_schemes(URL_SCHEMES.iter().copied().collect())
        .strip_comments(true)
        .attribute_filter(filter_attribute);

    match policy {
        HtmlPolicy::Baseline => {
            builder.link_rel(None);
        }
        HtmlPolicy::ExternalLinks => {
            builder
                .link_rel(Some(EXTERNAL_LINK_REL))
                .set_tag_attribute_value("a", "target", "_blank");
        }
    }

    builder.clean(html).to_string()
}

/// Clean a raw HTML block.
///
/// `<style>` elements are lifted out, filtered as stylesheets scoped to the
/// document content and re-emitted in front of the cleaned markup. Style
/// elements that filter to nothing disappear.
pub fn sanitize_html_block(html: &str, policy: HtmlPolicy) -> String {
    let mut css = String::new();
    for caps in STYLE_ELEMENT_RE.captures_iter(html) {
        let filtered = filter_stylesheet(&caps[1], Scope::Document);
        if filtered.is_empty() {
            continue;
        }
        if !css.is_empty() {
            css.push('\n');
        }
        css.push_str(&filtered);
    }

    let body = sanitize_html(&STYLE_ELEMENT_RE.replace_all(html, ""), policy);
    if css.is_empty() {
        body
    } else {
        format!("<style>{css}</style>{body}")
    }
}

fn filter_attribute<'u>(_element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    if attribute != "style" {
        return Some(Cow::Borrowed(value));
    }
    let filtered = filter_declarations(value);
    if filtered.is_empty() {
        None
    } else {
        Some(Cow::Owned(filtered))
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
