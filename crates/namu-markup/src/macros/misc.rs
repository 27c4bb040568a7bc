//! Small built-ins: `[br]`, `[clearfix]`, `[anchor(name)]`, `[pagecount]`.

use crate::host::count_documents;
use crate::{Macro, MacroParams, Output, RenderError, RenderPass};

pub(super) struct LineBreak;

impl Macro for LineBreak {
    fn name(&self) -> &str {
        "br"
    }

    fn format(&self, _params: &MacroParams, _pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        Ok(Output::html("<br>"))
    }
}

pub(super) struct Clearfix;

impl Macro for Clearfix {
    fn name(&self) -> &str {
        "clearfix"
    }

    fn format(&self, _params: &MacroParams, _pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        Ok(Output::html("<div style=\"clear: both\"></div>"))
    }
}

pub(super) struct Anchor;

impl Macro for Anchor {
    fn name(&self) -> &str {
        "anchor"
    }

    fn format(&self, params: &MacroParams, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        match params.positional(0).filter(|name| !name.is_empty()) {
            Some(name) => Ok(Output::html(format!(
                "<a id=\"{}\"></a>",
                pass.context().anchor_id(name)
            ))),
            None => Ok(Output::empty()),
        }
    }
}

/// Number of documents, optionally in one namespace.
pub(super) struct PageCount;

impl Macro for PageCount {
    fn name(&self) -> &str {
        "pagecount"
    }

    fn format(&self, params: &MacroParams, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let namespace = params.positional(0).filter(|namespace| !namespace.is_empty());
        let count = count_documents(pass.host(), namespace)?;
        Ok(Output::html(count.to_string()))
    }
}
