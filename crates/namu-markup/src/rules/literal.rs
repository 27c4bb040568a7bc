//! `{{{ ... }}}` blocks.
//!
//! Content between triple braces is never interpreted by the other rules.
//! The `#!html`, `#!wiki` and `#!folding` forms open raw HTML, styled and
//! collapsible blocks; the plain form is code, a size span or a color span.

use std::fmt::Write;
use std::sync::LazyLock;

use namu_sanitize::{HtmlPolicy, escape_html, filter_declarations, sanitize_html_block};
use regex::Regex;

use super::parse_color;
use crate::rule::{Delimiters, Matched, Priority, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([+-])([1-5]) (.*)$").unwrap());

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#[^\s,]+)(?:,(#[^\s,]+))? (.*)$").unwrap());

static WIKI_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(dark-style|style)\s*=\s*"([^"]*)""#).unwrap());

fn braces(open: &'static str) -> RuleShape {
    RuleShape::Delimited(Delimiters::new(open, "}}}").nested("{{{", "}}}").multiline())
}

/// Content after a `{{{#!name` marker, or `None` when the marker only
/// prefixes a longer word.
fn after_marker(raw: &str) -> Option<&str> {
    match raw.chars().next() {
        None => Some(raw),
        Some(c) if c.is_whitespace() => Some(raw),
        Some(_) => None,
    }
}

/// Split block content into its parameter line and body.
fn split_first_line(raw: &str) -> (&str, &str) {
    raw.split_once('\n').unwrap_or((raw, ""))
}

/// `{{{#!html ...}}}`: sanitized raw HTML.
pub(super) struct HtmlBlock;

impl SyntaxRule for HtmlBlock {
    fn name(&self) -> &str {
        "html"
    }

    fn priority(&self) -> Priority {
        Priority::Literal
    }

    fn shape(&self) -> RuleShape {
        braces("{{{#!html")
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let Some(html) = after_marker(matched.raw) else {
            return Ok(Output::Skip);
        };
        let policy = if pass.context().is_thread {
            HtmlPolicy::ExternalLinks
        } else {
            HtmlPolicy::Baseline
        };
        Ok(Output::html(sanitize_html_block(html.trim(), policy)))
    }
}

/// `{{{#!wiki style="..." dark-style="..."` block with rendered content.
pub(super) struct WikiBlock;

impl SyntaxRule for WikiBlock {
    fn name(&self) -> &str {
        "wiki"
    }

    fn priority(&self) -> Priority {
        Priority::Literal
    }

    fn shape(&self) -> RuleShape {
        braces("{{{#!wiki")
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let Some(raw) = after_marker(matched.raw) else {
            return Ok(Output::Skip);
        };
        let (params, body) = split_first_line(raw);

        let mut html = String::from("<div class=\"wiki-block\"");
        for caps in WIKI_ATTR_RE.captures_iter(params) {
            let style = filter_declarations(&caps[2]);
            if style.is_empty() {
                continue;
            }
            let attribute = if &caps[1] == "style" {
                "style"
            } else {
                "data-dark-style"
            };
            let _ = write!(html, " {attribute}=\"{}\"", escape_html(&style));
        }
        html.push('>');
        html.push_str(&pass.render_block(body)?);
        html.push_str("</div>");
        Ok(Output::Html(html))
    }
}

/// `{{{#!folding title` collapsible block.
pub(super) struct FoldingBlock;

impl SyntaxRule for FoldingBlock {
    fn name(&self) -> &str {
        "folding"
    }

    fn priority(&self) -> Priority {
        Priority::Literal
    }

    fn shape(&self) -> RuleShape {
        braces("{{{#!folding")
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let Some(raw) = after_marker(matched.raw) else {
            return Ok(Output::Skip);
        };
        let (title, body) = split_first_line(raw);
        let title = match title.trim() {
            "" => "More".to_owned(),
            title => pass.render_inline(title)?,
        };
        let body = pass.render_block(body)?;
        Ok(Output::Html(format!(
            "<details class=\"wiki-folding\"><summary>{title}</summary><div class=\"wiki-folding-content\">{body}</div></details>"
        )))
    }
}

/// Plain `{{{...}}}`.
pub(super) struct Literal;

impl SyntaxRule for Literal {
    fn name(&self) -> &str {
        "literal"
    }

    fn priority(&self) -> Priority {
        Priority::Literal
    }

    fn shape(&self) -> RuleShape {
        braces("{{{")
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let raw = matched.raw;

        if raw.contains('\n') {
            let code = raw.strip_prefix('\n').unwrap_or(raw);
            return Ok(Output::Html(format!(
                "<pre><code>{}</code></pre>",
                escape_html(code)
            )));
        }

        if let Some(caps) = SIZE_RE.captures(raw) {
            let direction = if &caps[1] == "+" { "up" } else { "down" };
            let content = pass.render_inline(&caps[3])?;
            return Ok(Output::Html(format!(
                "<span class=\"wiki-size size-{direction}-{}\">{content}</span>",
                &caps[2]
            )));
        }

        if let Some(caps) = COLOR_RE.captures(raw) {
            let light = parse_color(&caps[1]);
            let dark = caps.get(2).map(|dark| parse_color(dark.as_str()));
            if let Some(light) = light
                && dark.as_ref().is_none_or(Option::is_some)
            {
                let mut html = format!(
                    "<span style=\"{}\"",
                    escape_html(&filter_declarations(&format!("color: {light}")))
                );
                if let Some(Some(dark)) = dark {
                    let _ = write!(
                        html,
                        " data-dark-style=\"{}\"",
                        escape_html(&filter_declarations(&format!("color: {dark}")))
                    );
                }
                html.push('>');
                html.push_str(&pass.render_inline(&caps[3])?);
                html.push_str("</span>");
                return Ok(Output::Html(html));
            }
        }

        Ok(Output::Html(format!("<code>{}</code>", matched.escaped())))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{NoHost, RenderOptions, Renderer};

    fn render(source: &str) -> String {
        Renderer::new()
            .render(source, &RenderOptions::default(), &NoHost)
            .unwrap()
            .html
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(render("{{{''not bold''}}}"), "<code>&#x27;&#x27;not bold&#x27;&#x27;</code>");
    }

    #[test]
    fn test_code_keeps_backslashes() {
        assert_eq!(render("{{{C:\\dir}}}"), "<code>C:\\dir</code>");
    }

    #[test]
    fn test_multiline_is_preformatted() {
        assert_eq!(
            render("{{{\n+3 x\n<b>}}}"),
            "<pre><code>+3 x\n&lt;b&gt;</code></pre>"
        );
    }

    #[test]
    fn test_nested_braces() {
        assert_eq!(render("{{{a {{{b}}} c}}}"), "<code>a {{{b}}} c</code>");
    }

    #[test]
    fn test_size() {
        assert_eq!(
            render("{{{+3 ''big''}}}"),
            "<span class=\"wiki-size size-up-3\"><em>big</em></span>"
        );
        assert_eq!(
            render("{{{-1 small}}}"),
            "<span class=\"wiki-size size-down-1\">small</span>"
        );
        assert_eq!(render("{{{+9 text}}}"), "<code>+9 text</code>");
    }

    #[test]
    fn test_color() {
        assert_eq!(
            render("{{{#f00 red}}}"),
            "<span style=\"color: #f00\">red</span>"
        );
        assert_eq!(
            render("{{{#red,#white text}}}"),
            "<span style=\"color: red\" data-dark-style=\"color: white\">text</span>"
        );
        assert_eq!(render("{{{#red;x text}}}"), "<code>#red;x text</code>");
    }

    #[test]
    fn test_html_block_is_sanitized() {
        assert_eq!(
            render("{{{#!html <b onclick=\"x()\">hi</b><script>x()</script>}}}"),
            "<b>hi</b>"
        );
    }

    #[test]
    fn test_deeply_nested_style_in_html_block() {
        let depth = 50_000;
        let source = format!(
            "{{{{{{#!html <style>{}.a{{color:red}}{}</style>x}}}}}}",
            "@theseed-dark-mode{".repeat(depth),
            "} ".repeat(depth)
        );
        assert_eq!(render(&source), "x");
    }

    #[test]
    fn test_html_marker_must_end_word() {
        assert_eq!(render("{{{#!htmlx}}}"), "<code>#!htmlx</code>");
    }

    #[test]
    fn test_wiki_block() {
        assert_eq!(
            render("{{{#!wiki style=\"color: red; position: fixed\" dark-style=\"color: white\"\n'''x'''}}}"),
            "<div class=\"wiki-block\" style=\"color: red\" data-dark-style=\"color: white\"><strong>x</strong></div>"
        );
    }

    #[test]
    fn test_folding_block() {
        assert_eq!(
            render("{{{#!folding ''Details''\nbody}}}"),
            "<details class=\"wiki-folding\"><summary><em>Details</em></summary>\
             <div class=\"wiki-folding-content\">body</div></details>"
        );
    }
}
