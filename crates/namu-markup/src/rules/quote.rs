//! `>` blockquotes. Nested quotes repeat the marker: `>>`.

use super::lines;
use crate::rule::{Matched, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

pub(super) struct Quote;

impl SyntaxRule for Quote {
    fn name(&self) -> &str {
        "quote"
    }

    fn shape(&self) -> RuleShape {
        RuleShape::FullContent
    }

    fn extent(&self, rest: &str) -> Option<usize> {
        let len: usize = lines(rest)
            .take_while(|(line, _)| line.starts_with('>'))
            .map(|(_, len)| len)
            .sum();
        (len > 0).then_some(len)
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let inner: Vec<&str> = lines(matched.raw)
            .map(|(line, _)| line.strip_prefix('>').unwrap_or(line))
            .collect();
        let content = pass.render_block(&inner.join("\n"))?;
        Ok(Output::Html(format!(
            "<blockquote class=\"wiki-quote\">{content}</blockquote>"
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
    fn test_quote() {
        assert_eq!(
            render(">a\n>''b''\nc"),
            "<blockquote class=\"wiki-quote\">a<br><em>b</em></blockquote>c"
        );
    }

    #[test]
    fn test_nested_quote() {
        assert_eq!(
            render(">a\n>>b"),
            "<blockquote class=\"wiki-quote\">a<br><blockquote class=\"wiki-quote\">b</blockquote></blockquote>"
        );
    }

    #[test]
    fn test_quote_only_at_line_start() {
        assert_eq!(render("a > b"), "a &gt; b");
    }
}
