//! `[[target|text]]` links.

use namu_sanitize::escape_html;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::rule::{Delimiters, Matched, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

const EXTERNAL_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Document names keep their path separators readable.
const DOCUMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b':');

pub(super) struct Link;

impl SyntaxRule for Link {
    fn name(&self) -> &str {
        "link"
    }

    fn shape(&self) -> RuleShape {
        RuleShape::Delimited(Delimiters::new("[[", "]]").nested("[", "]"))
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let (target, text) = match matched.raw.split_once('|') {
            Some((target, text)) => (target.trim(), Some(text)),
            None => (matched.raw.trim(), None),
        };
        if target.is_empty() {
            return Ok(Output::Skip);
        }

        if let Ok(url) = Url::parse(target)
            && EXTERNAL_SCHEMES.contains(&url.scheme())
        {
            let display = display_text(pass, text, target)?;
            return Ok(Output::Html(format!(
                "<a class=\"wiki-link-external\" href=\"{}\" rel=\"nofollow noopener ugc\" target=\"_blank\">{display}</a>",
                escape_html(target)
            )));
        }

        let target = target.strip_prefix(':').unwrap_or(target);
        let (name, fragment) = match target.split_once('#') {
            Some((name, fragment)) => (name.trim(), Some(fragment)),
            None => (target, None),
        };

        let document = resolve_document(name, pass.context().document_title.as_deref());
        let mut href = String::new();
        if !document.is_empty() {
            href.push_str(&pass.config().document_path);
            href.push_str(&utf8_percent_encode(&document, DOCUMENT_ENCODE_SET).to_string());
        }
        if let Some(fragment) = fragment {
            href.push('#');
            href.push_str(&utf8_percent_encode(fragment, DOCUMENT_ENCODE_SET).to_string());
        }
        if href.is_empty() {
            return Ok(Output::Skip);
        }

        let fallback = match fragment {
            Some(_) if !name.is_empty() => name,
            _ => target,
        };
        let display = display_text(pass, text, fallback)?;
        Ok(Output::Html(format!(
            "<a class=\"wiki-link-internal\" href=\"{}\">{display}</a>",
            escape_html(&href)
        )))
    }
}

fn display_text(
    pass: &mut RenderPass<'_>,
    text: Option<&str>,
    fallback: &str,
) -> Result<String, RenderError> {
    match text {
        Some(text) => pass.render_inline(text),
        None => Ok(escape_html(fallback)),
    }
}

/// Resolve `../` and `/sub` names against the current document title.
fn resolve_document(name: &str, current: Option<&str>) -> String {
    let Some(current) = current else {
        return name.to_owned();
    };

    if name.starts_with("../") || name == ".." {
        let mut base = current;
        let mut rest = name;
        while let Some(stripped) = rest
            .strip_prefix("../")
            .or_else(|| (rest == "..").then_some(""))
        {
            base = base.rsplit_once('/').map_or("", |(parent, _)| parent);
            rest = stripped;
        }
        return match (base.is_empty(), rest.is_empty()) {
            (_, true) => base.to_owned(),
            (true, false) => rest.to_owned(),
            (false, false) => format!("{base}/{rest}"),
        };
    }

    if name.starts_with('/') {
        return format!("{current}{name}");
    }

    name.to_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{NoHost, RenderOptions, Renderer};

    fn render(source: &str) -> String {
        render_in(source, None)
    }

    fn render_in(source: &str, title: Option<&str>) -> String {
        let options = RenderOptions {
            document_title: title.map(str::to_owned),
            ..RenderOptions::default()
        };
        Renderer::new().render(source, &options, &NoHost).unwrap().html
    }

    #[test]
    fn test_internal_link() {
        assert_eq!(
            render("[[Front Page]]"),
            "<a class=\"wiki-link-internal\" href=\"/w/Front%20Page\">Front Page</a>"
        );
    }

    #[test]
    fn test_display_text_is_rendered() {
        assert_eq!(
            render("[[A|''b'' c]]"),
            "<a class=\"wiki-link-internal\" href=\"/w/A\"><em>b</em> c</a>"
        );
    }

    #[test]
    fn test_split_on_first_pipe() {
        assert_eq!(
            render("[[A|b|c]]"),
            "<a class=\"wiki-link-internal\" href=\"/w/A\">b|c</a>"
        );
    }

    #[test]
    fn test_fragment() {
        assert_eq!(
            render("[[Doc#s-1]]"),
            "<a class=\"wiki-link-internal\" href=\"/w/Doc#s-1\">Doc</a>"
        );
        assert_eq!(
            render("[[#s-1]]"),
            "<a class=\"wiki-link-internal\" href=\"#s-1\">#s-1</a>"
        );
    }

    #[test]
    fn test_external_schemes() {
        assert_eq!(
            render("[[https://example.com/?a=1&b=2|site]]"),
            "<a class=\"wiki-link-external\" href=\"https://example.com/?a=1&amp;b=2\" \
             rel=\"nofollow noopener ugc\" target=\"_blank\">site</a>"
        );
        assert!(render("[[ftp://x]]").contains("href=\"ftp://x\""));
    }

    #[test]
    fn test_other_schemes_are_documents() {
        assert_eq!(
            render("[[javascript:alert(1)]]"),
            "<a class=\"wiki-link-internal\" href=\"/w/javascript:alert%281%29\">javascript:alert(1)</a>"
        );
    }

    #[test]
    fn test_leading_colon_is_stripped() {
        assert_eq!(
            render("[[:Category:X]]"),
            "<a class=\"wiki-link-internal\" href=\"/w/Category:X\">Category:X</a>"
        );
    }

    #[test]
    fn test_relative_links() {
        assert!(render_in("[[/Sub]]", Some("A/B")).contains("href=\"/w/A/B/Sub\""));
        assert!(render_in("[[../]]", Some("A/B")).contains("href=\"/w/A\""));
        assert!(render_in("[[../C]]", Some("A/B")).contains("href=\"/w/A/C\""));
        assert!(render("[[/Sub]]").contains("href=\"/w//Sub\""));
    }

    #[test]
    fn test_resolve_document() {
        assert_eq!(resolve_document("../..", Some("a/b/c")), "a");
        assert_eq!(resolve_document("../x", Some("top")), "x");
        assert_eq!(resolve_document("plain", Some("a/b")), "plain");
    }

    #[test]
    fn test_empty_target_is_text() {
        assert_eq!(render("[[|x]]"), "[[|x]]");
    }
}
