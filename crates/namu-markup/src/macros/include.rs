//! `[include(Document, key=value, ...)]`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::host::find_document;
use crate::renderer::normalize_source;
use crate::{Macro, MacroParams, Output, RenderError, RenderPass};

/// `@key@` or `@key=default@`.
static PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([^@=\n]+)(?:=([^@\n]*))?@").unwrap());

/// Renders another document in place.
///
/// Parameters other than the title are substituted into the document's
/// `@key@` slots before it is rendered. Includes nest only up to the
/// configured depth.
pub(super) struct Include;

impl Macro for Include {
    fn name(&self) -> &str {
        "include"
    }

    fn allow_thread(&self) -> bool {
        false
    }

    fn format(&self, params: &MacroParams, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let Some(title) = params.positional(0).filter(|title| !title.is_empty()) else {
            return Ok(Output::empty());
        };

        let depth = pass.context().include_depth();
        let max_depth = pass.config().max_include_depth;
        if depth >= max_depth {
            tracing::debug!(title, depth, max_depth, "Include depth exhausted");
            return Ok(Output::empty());
        }

        let Some(source) = find_document(pass.host(), title)? else {
            tracing::debug!(title, "Included document not found");
            return Ok(Output::empty());
        };
        let source = substitute_params(&normalize_source(&source), params);

        pass.context_mut().enter_include();
        let rendered = pass.render_block(&source);
        pass.context_mut().leave_include();

        Ok(Output::Html(format!(
            "<div class=\"wiki-include\">{}</div>",
            rendered?
        )))
    }
}

/// Fill `@key@` slots. A slot with neither a value nor a default stays as
/// written.
fn substitute_params(source: &str, params: &MacroParams) -> String {
    PARAM_RE
        .replace_all(source, |caps: &Captures<'_>| {
            match params.named(caps[1].trim()) {
                Some(value) => value.to_owned(),
                None => caps
                    .get(2)
                    .map_or_else(|| caps[0].to_owned(), |default| default.as_str().to_owned()),
            }
        })
        .into_owned()
}
