//! `#redirect Target` documents.

use std::sync::LazyLock;

use regex::Regex;

use crate::rule::{Matched, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

static REDIRECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:redirect|넘겨주기) (.+)$").unwrap());

pub(super) struct Redirect;

impl SyntaxRule for Redirect {
    fn name(&self) -> &str {
        "redirect"
    }

    fn shape(&self) -> RuleShape {
        RuleShape::FullLine { marker: "#" }
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        if !matched.sole_line {
            return Ok(Output::Skip);
        }
        let Some(caps) = REDIRECT_RE.captures(matched.raw) else {
            return Ok(Output::Skip);
        };
        let target = caps[1].trim();
        if target.is_empty() {
            return Ok(Output::Skip);
        }
        pass.context_mut().redirect_target = Some(target.to_owned());
        Ok(Output::markup(format!("[[{target}]]")))
    }
}
