//! `[* content]` and `[*name content]` footnote references.

use namu_sanitize::escape_html;

use crate::rule::{Delimiters, Matched, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

pub(super) struct FootnoteRef;

impl SyntaxRule for FootnoteRef {
    fn name(&self) -> &str {
        "footnote"
    }

    fn shape(&self) -> RuleShape {
        RuleShape::Delimited(Delimiters::new("[*", "]").nested("[", "]").multiline())
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let (name, content) = split_name(matched.raw);

        let footnote = pass.context_mut().add_footnote(name);
        pass.context_mut().enter_footnote();
        let content = pass.render_inline(content);
        pass.context_mut().leave_footnote();
        let content = content?;
        pass.context_mut().define_footnote(&footnote.name, content);

        let context = pass.context();
        Ok(Output::Html(format!(
            "<a class=\"wiki-fn-content\" href=\"#{}\"><span id=\"{}\"></span>[{}]</a>",
            context.anchor_id(&format!("fn-{}", footnote.name)),
            context.anchor_id(&format!("rfn-{}", footnote.index)),
            escape_html(&footnote.name)
        )))
    }
}

/// `name content` or ` content`.
fn split_name(raw: &str) -> (Option<&str>, &str) {
    if raw.is_empty() || raw.starts_with(char::is_whitespace) {
        return (None, raw.trim_start());
    }
    match raw.split_once(char::is_whitespace) {
        Some((name, content)) => (Some(name), content.trim_start()),
        None => (Some(raw), ""),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{NoHost, RenderOptions, Renderer};

    fn render(source: &str) -> String {
        Renderer::new()
            .render(source, &RenderOptions::default(), &NoHost)
            .unwrap()
            .html
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name(" text"), (None, "text"));
        assert_eq!(split_name("n text here"), (Some("n"), "text here"));
        assert_eq!(split_name("n"), (Some("n"), ""));
        assert_eq!(split_name(""), (None, ""));
    }

    #[test]
    fn test_reference_and_trailing_block() {
        assert_eq!(
            render("a[* note]"),
            "a<a class=\"wiki-fn-content\" href=\"#fn-1\"><span id=\"rfn-1\"></span>[1]</a>\
             <div class=\"wiki-macro-footnote\"><span class=\"footnote-list\"><span id=\"fn-1\"></span>\
             <a href=\"#rfn-1\">[1]</a> note</span></div>"
        );
    }

    #[test]
    fn test_comment_prefix() {
        let options = RenderOptions {
            comment_prefix: "c3-".to_owned(),
            ..RenderOptions::default()
        };
        let html = Renderer::new().render("[*x y]", &options, &NoHost).unwrap().html;
        assert!(html.starts_with(
            "<a class=\"wiki-fn-content\" href=\"#c3-fn-x\"><span id=\"c3-rfn-1\"></span>[x]</a>"
        ));
    }

    #[test]
    fn test_nested_footnote_gets_later_index() {
        let html = render("[*a outer[* inner]]");
        assert!(html.contains("<span id=\"rfn-1\"></span>[a]"));
        assert!(html.contains("<span id=\"rfn-2\"></span>[2]"));
    }

    #[test]
    fn test_footnote_macro_inside_footnote_is_ignored() {
        let html = render("[* x [footnote]]");
        assert_eq!(html.matches("wiki-macro-footnote").count(), 1);
        assert!(html.contains("<a href=\"#rfn-1\">[1]</a> x"));
    }
}
