//! `== heading ==` lines, and the folded form `==# heading #==`.

use std::sync::LazyLock;

use regex::Regex;

use crate::rule::{Matched, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(={1,6})(#?) (.+?) (#?)(={1,6})\s*$").unwrap());

pub(super) struct Heading;

impl SyntaxRule for Heading {
    fn name(&self) -> &str {
        "heading"
    }

    fn shape(&self) -> RuleShape {
        RuleShape::FullLine { marker: "=" }
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let Some(caps) = HEADING_RE.captures(matched.raw) else {
            return Ok(Output::Skip);
        };
        if caps[1].len() != caps[5].len() || caps[2] != caps[4] {
            return Ok(Output::Skip);
        }

        let level = caps[1].len();
        let folded = !caps[2].is_empty();
        let text = pass.render_inline(caps[3].trim())?;

        let heading = pass.context_mut().add_heading(level, text, folded).clone();
        let context = pass.context();
        let tag = (heading.actual_level + 1).min(6);
        let class = if folded {
            "wiki-heading wiki-heading-folded"
        } else {
            "wiki-heading"
        };
        Ok(Output::Html(format!(
            "<h{tag} class=\"{class}\" id=\"{}\"><a href=\"#{}\">{}.</a> {}</h{tag}>",
            context.anchor_id(&format!("s-{}", heading.num_text)),
            context.anchor_id("toc"),
            heading.num_text,
            heading.text
        )))
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
    fn test_heading() {
        assert_eq!(
            render("== ''Intro'' ==\ntext"),
            "<h2 class=\"wiki-heading\" id=\"s-1\"><a href=\"#toc\">1.</a> <em>Intro</em></h2>text"
        );
    }

    #[test]
    fn test_folded_heading() {
        assert_eq!(
            render("=# A #="),
            "<h2 class=\"wiki-heading wiki-heading-folded\" id=\"s-1\"><a href=\"#toc\">1.</a> A</h2>"
        );
    }

    #[test]
    fn test_nested_numbers() {
        let html = render("= A =\n== B ==\n=== C ===");
        assert!(html.contains("<h3 class=\"wiki-heading\" id=\"s-1.1\">"));
        assert!(html.contains("<h4 class=\"wiki-heading\" id=\"s-1.1.1\">"));
    }

    #[test]
    fn test_unbalanced_markers_are_text() {
        assert_eq!(render("== A ="), "== A =");
        assert_eq!(render("=# A ="), "=# A =");
        assert_eq!(render("==A=="), "==A==");
    }

    #[test]
    fn test_headings_are_returned() {
        let rendered = Renderer::new()
            .render("== A ==\n=== B ===", &RenderOptions::default(), &NoHost)
            .unwrap();
        let numbers: Vec<_> = rendered.headings.iter().map(|h| h.num_text.as_str()).collect();
        assert_eq!(numbers, vec!["1", "1.1"]);
        assert_eq!(rendered.headings[1].level, 3);
        assert_eq!(rendered.headings[1].actual_level, 2);
    }
}
