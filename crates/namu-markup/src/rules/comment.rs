//! `##` comment lines, which render to nothing.

use crate::rule::{Matched, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

pub(super) struct CommentLine;

impl SyntaxRule for CommentLine {
    fn name(&self) -> &str {
        "comment"
    }

    fn shape(&self) -> RuleShape {
        RuleShape::FullLine { marker: "##" }
    }

    fn format(&self, _matched: &Matched<'_>, _pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        Ok(Output::empty())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{NoHost, RenderOptions, Renderer};

    #[test]
    fn test_comment_line_is_dropped() {
        let html = Renderer::new()
            .render("a\n## hidden '''x'''\nb", &RenderOptions::default(), &NoHost)
            .unwrap()
            .html;
        assert_eq!(html, "a<br>b");
    }
}
