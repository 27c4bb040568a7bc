use crate::context::footnote_placeholder;
use crate::{Macro, MacroParams, Output, RenderError, RenderPass};

/// Shows the footnotes referenced since the previous block.
///
/// The block itself is built after the pass, once every footnote's content
/// is known.
pub(super) struct FootnoteList;

impl Macro for FootnoteList {
    fn name(&self) -> &str {
        "footnote"
    }

    fn aliases(&self) -> &[&str] {
        &["각주"]
    }

    fn format(&self, _params: &MacroParams, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        if pass.context().in_footnote() {
            return Ok(Output::empty());
        }
        Ok(match pass.context_mut().take_footnote_block() {
            Some(block) => Output::html(footnote_placeholder(block)),
            None => Output::empty(),
        })
    }
}
