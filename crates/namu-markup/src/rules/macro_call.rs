//! `[name]` and `[name(params)]` macro calls.

use std::sync::LazyLock;

use regex::Regex;

use crate::macros::MacroParams;
use crate::rule::{Delimiters, Matched, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

static CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^([^\s()\[\]]+)(?:\((.*)\))?$").unwrap());

pub(super) struct MacroCall;

impl SyntaxRule for MacroCall {
    fn name(&self) -> &str {
        "macro"
    }

    fn shape(&self) -> RuleShape {
        RuleShape::Delimited(Delimiters::new("[", "]").nested("[", "]"))
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let Some(caps) = CALL_RE.captures(matched.raw) else {
            return Ok(Output::Skip);
        };
        let name = &caps[1];
        let Some(handler) = pass.macros().get(name) else {
            return Ok(Output::Skip);
        };

        if pass.context().is_thread && !handler.allow_thread() {
            tracing::debug!(name, "Macro not allowed in threads");
            return Ok(Output::empty());
        }

        let mut params = MacroParams::parse(caps.get(2).map_or("", |params| params.as_str()));
        if handler.renders_params() {
            params.render_with(pass)?;
        }
        handler.format(&params, pass)
    }
}
