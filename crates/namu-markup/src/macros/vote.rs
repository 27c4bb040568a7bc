use std::fmt::Write;

use crate::host::vote_status;
use crate::{Macro, MacroParams, Output, RenderError, RenderPass};

/// `[vote(question, option, ...)]` in discussion threads.
///
/// Votes are numbered in source order; the host supplies the tallies and
/// the viewer's earlier choice.
pub(super) struct Vote;

impl Macro for Vote {
    fn name(&self) -> &str {
        "vote"
    }

    fn format(&self, params: &MacroParams, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        if !pass.context().is_thread || params.len() < 2 {
            return Ok(Output::empty());
        }
        // Rendered only past the gate: a dropped vote must leave no footnotes.
        let mut params = params.clone();
        params.render_with(pass)?;

        let index = pass.context().vote_counter;
        pass.context_mut().vote_counter += 1;

        let options = params.len() - 1;
        let tally = vote_status(pass.host(), index, options)?;

        let mut html = format!(
            "<div class=\"wiki-macro-vote\" data-vote-index=\"{index}\">\
             <div class=\"vote-question\">{}</div><ul class=\"vote-options\">",
            params.rendered(0).unwrap_or_default()
        );
        for option in 0..options {
            let selected = if tally.selected == Some(option) {
                " selected"
            } else {
                ""
            };
            let _ = write!(
                html,
                "<li class=\"vote-option{selected}\" data-option-index=\"{option}\">\
                 <span class=\"vote-option-text\">{}</span>\
                 <span class=\"vote-option-count\">{}</span></li>",
                params.rendered(option + 1).unwrap_or_default(),
                tally.counts.get(option).copied().unwrap_or(0)
            );
        }
        html.push_str("</ul></div>");

        Ok(Output::Html(html))
    }
}
