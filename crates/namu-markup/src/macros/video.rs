//! Video embeds.

use std::sync::LazyLock;

use regex::Regex;

use crate::rules::parse_size;
use crate::{Macro, MacroParams, Output, RenderError, RenderPass};

static NICO_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:sm|nm|so)?\d+$").unwrap());

static YOUTUBE_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

const DEFAULT_WIDTH: &str = "640px";
const DEFAULT_HEIGHT: &str = "360px";

/// `[nicovideo(sm9)]`, with optional `width` and `height`.
pub(super) struct NicoVideo;

impl Macro for NicoVideo {
    fn name(&self) -> &str {
        "nicovideo"
    }

    fn format(&self, params: &MacroParams, _pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let Some(id) = params.positional(0).filter(|id| NICO_ID_RE.is_match(id)) else {
            tracing::debug!(params = params.raw(), "Invalid nicovideo id");
            return Ok(Output::empty());
        };
        Ok(Output::Html(iframe(
            &format!("https://embed.nicovideo.jp/watch/{id}"),
            params,
        )))
    }
}

/// `[youtube(id)]`, with optional `width`, `height`, `start` and `end`
/// (whole seconds).
pub(super) struct YouTube;

impl Macro for YouTube {
    fn name(&self) -> &str {
        "youtube"
    }

    fn format(&self, params: &MacroParams, _pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let Some(id) = params.positional(0).filter(|id| YOUTUBE_ID_RE.is_match(id)) else {
            tracing::debug!(params = params.raw(), "Invalid youtube id");
            return Ok(Output::empty());
        };

        let query: Vec<String> = ["start", "end"]
            .into_iter()
            .filter_map(|key| {
                let seconds = params.named(key)?.parse::<u32>().ok()?;
                Some(format!("{key}={seconds}"))
            })
            .collect();

        let mut src = format!("https://www.youtube.com/embed/{id}");
        if !query.is_empty() {
            src.push('?');
            src.push_str(&query.join("&amp;"));
        }
        Ok(Output::Html(iframe(&src, params)))
    }
}

/// `src` must already be attribute-safe.
fn iframe(src: &str, params: &MacroParams) -> String {
    let width = params
        .named("width")
        .and_then(parse_size)
        .unwrap_or_else(|| DEFAULT_WIDTH.to_owned());
    let height = params
        .named("height")
        .and_then(parse_size)
        .unwrap_or_else(|| DEFAULT_HEIGHT.to_owned());
    format!(
        "<iframe class=\"wiki-macro-video\" src=\"{src}\" style=\"width: {width}; height: {height}\" \
         allowfullscreen loading=\"lazy\" frameborder=\"0\"></iframe>"
    )
}
