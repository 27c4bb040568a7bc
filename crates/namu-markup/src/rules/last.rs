//! Post-processing over the rendered output.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::context::{TOC_PLACEHOLDER, footnote_placeholder};
use crate::rule::{Matched, Priority, RuleShape};
use crate::{Output, RenderError, RenderPass, Replacements, SyntaxRule};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static COMMENT_REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\d+)").unwrap());

/// Elements whose text is never auto-linked.
const NO_LINK_ELEMENTS: &[&str] = &["a", "code", "pre"];

/// Swap deferred placeholders for the footnote blocks and the table of
/// contents, now that every footnote and heading is known.
pub(super) struct Placeholders;

impl SyntaxRule for Placeholders {
    fn name(&self) -> &str {
        "placeholders"
    }

    fn priority(&self) -> Priority {
        Priority::Last
    }

    fn shape(&self) -> RuleShape {
        RuleShape::FullContent
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        if !matched.raw.contains('\u{E000}') {
            return Ok(Output::Skip);
        }

        let context = pass.context_mut();
        let blocks = context.footnote_block_count();
        let mut html = matched.raw.to_owned();

        let mut footnotes = Replacements::with_capacity(blocks);
        for block in 0..blocks {
            footnotes.add(footnote_placeholder(block), context.footnote_block_html(block));
        }
        footnotes.apply(&mut html);

        // After footnotes, which may themselves hold the table of contents.
        if html.contains(TOC_PLACEHOLDER) {
            let mut toc = Replacements::new();
            toc.add(TOC_PLACEHOLDER, context.table_of_contents());
            toc.apply(&mut html);
        }

        Ok(Output::Html(html))
    }
}

/// Link `#123` comment references in thread renders.
pub(super) struct CommentRefs;

impl SyntaxRule for CommentRefs {
    fn name(&self) -> &str {
        "comment-refs"
    }

    fn priority(&self) -> Priority {
        Priority::Last
    }

    fn shape(&self) -> RuleShape {
        RuleShape::FullContent
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        if !pass.context().is_thread || !matched.raw.contains('#') {
            return Ok(Output::Skip);
        }

        let html = matched.raw;
        let mut out = String::with_capacity(html.len());
        let mut last = 0;
        let mut suppressed = 0usize;

        for tag in TAG_RE.find_iter(html) {
            link_comment_refs(&html[last..tag.start()], suppressed == 0, &mut out);

            let tag_text = tag.as_str();
            if NO_LINK_ELEMENTS.iter().any(|name| is_open_tag(tag_text, name)) {
                suppressed += 1;
            } else if NO_LINK_ELEMENTS.iter().any(|name| is_close_tag(tag_text, name)) {
                suppressed = suppressed.saturating_sub(1);
            }
            out.push_str(tag_text);
            last = tag.end();
        }
        link_comment_refs(&html[last..], suppressed == 0, &mut out);

        Ok(Output::Html(out))
    }
}

fn link_comment_refs(text: &str, active: bool, out: &mut String) {
    if !active {
        out.push_str(text);
        return;
    }

    let mut last = 0;
    for caps in COMMENT_REF_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        // `&#39;` and friends are character references, not comment numbers
        if text[..whole.start()].ends_with('&') {
            continue;
        }
        out.push_str(&text[last..whole.start()]);
        let _ = write!(
            out,
            "<a class=\"wiki-comment-ref\" href=\"#{0}\">#{0}</a>",
            &caps[1]
        );
        last = whole.end();
    }
    out.push_str(&text[last..]);
}

fn is_open_tag(tag: &str, name: &str) -> bool {
    tag.strip_prefix('<')
        .and_then(|rest| rest.strip_prefix(name))
        .is_some_and(|rest| rest.starts_with('>') || rest.starts_with(' '))
}

fn is_close_tag(tag: &str, name: &str) -> bool {
    tag.strip_prefix("</")
        .and_then(|rest| rest.strip_prefix(name))
        .is_some_and(|rest| rest.starts_with('>'))
}
