//! Horizontal rules: a line of 4 to 9 dashes.

use crate::rule::{Matched, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

pub(super) struct HorizontalRule;

impl SyntaxRule for HorizontalRule {
    fn name(&self) -> &str {
        "hr"
    }

    fn shape(&self) -> RuleShape {
        RuleShape::FullLine { marker: "----" }
    }

    fn format(&self, matched: &Matched<'_>, _pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let line = matched.raw.trim_end();
        if (4..=9).contains(&line.len()) && line.bytes().all(|b| b == b'-') {
            Ok(Output::html("<hr>"))
        } else {
            Ok(Output::Skip)
        }
    }
}
