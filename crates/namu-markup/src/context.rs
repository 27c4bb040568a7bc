//! Per-render mutable state.
//!
//! A [`RenderContext`] is created fresh for every render call and threaded
//! explicitly through rules and macros. It collects footnotes and headings
//! as the pass walks the source, and builds the deferred footnote blocks
//! and table of contents once the pass is over.

use std::collections::HashMap;
use std::fmt::Write;
use std::ops::Range;

use namu_sanitize::escape_html;

use crate::RenderOptions;

/// Stand-in for the table of contents until all headings are known.
pub(crate) const TOC_PLACEHOLDER: &str = "\u{E000}toc\u{E001}";

/// Stand-in for footnote block `block` until all footnotes are defined.
pub(crate) fn footnote_placeholder(block: usize) -> String {
    format!("\u{E000}fn:{block}\u{E001}")
}

/// A footnote reference in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Footnote {
    /// 1-based position among all footnotes of the render.
    pub index: usize,
    /// User-supplied name, or the index when none was given.
    pub name: String,
}

/// A heading as numbered by the pass.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heading {
    /// Dotted number, e.g. `"2.1"`.
    pub num_text: String,
    /// Number of components in `num_text`.
    pub actual_level: usize,
    /// Level written in the source (count of `=`).
    pub level: usize,
    /// Rendered heading text (HTML).
    pub text: String,
    /// Whether the heading was written in the folded `=# h #=` form.
    pub folded: bool,
}

/// Mutable state of one render pass.
#[derive(Debug, Default)]
pub struct RenderContext {
    /// Rendering a discussion thread rather than a document.
    pub is_thread: bool,
    /// Prefix for every generated element id.
    pub comment_prefix: String,
    /// Title of the document being rendered, for relative links.
    pub document_title: Option<String>,
    /// Footnotes in order of appearance.
    pub footnote_list: Vec<Footnote>,
    /// Rendered content by footnote name.
    pub footnote_values: HashMap<String, String>,
    /// Headings in order of appearance.
    pub headings: Vec<Heading>,
    /// Memoized table of contents.
    pub toc_html: Option<String>,
    /// Target of a `#redirect` line.
    pub redirect_target: Option<String>,
    /// Number of vote macros seen so far.
    pub vote_counter: usize,
    include_depth: usize,
    footnote_depth: usize,
    heading_counters: [usize; 6],
    footnote_blocks: Vec<Range<usize>>,
    footnote_consumed: usize,
    toc_label: Option<String>,
}

impl RenderContext {
    /// Fresh state for a render with `options`.
    #[must_use]
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            is_thread: options.is_thread,
            comment_prefix: options.comment_prefix.clone(),
            document_title: options.document_title.clone(),
            ..Self::default()
        }
    }

    /// Escaped element id for `id`, carrying the comment prefix.
    #[must_use]
    pub fn anchor_id(&self, id: &str) -> String {
        escape_html(&format!("{}{id}", self.comment_prefix))
    }

    /// How many includes deep the pass currently is.
    #[must_use]
    pub fn include_depth(&self) -> usize {
        self.include_depth
    }

    pub(crate) fn enter_include(&mut self) {
        self.include_depth += 1;
    }

    pub(crate) fn leave_include(&mut self) {
        self.include_depth = self.include_depth.saturating_sub(1);
    }

    /// Register a footnote reference. The index is assigned here, before
    /// the footnote's own content is rendered.
    pub fn add_footnote(&mut self, name: Option<&str>) -> Footnote {
        let index = self.footnote_list.len() + 1;
        let footnote = Footnote {
            index,
            name: name.map_or_else(|| index.to_string(), str::to_owned),
        };
        self.footnote_list.push(footnote.clone());
        footnote
    }

    /// Record rendered content for a footnote name. The first non-empty
    /// definition of a name wins.
    pub fn define_footnote(&mut self, name: &str, content: String) {
        match self.footnote_values.get_mut(name) {
            Some(existing) if existing.is_empty() => *existing = content,
            Some(_) => {}
            None => {
                self.footnote_values.insert(name.to_owned(), content);
            }
        }
    }

    /// Whether a footnote's content is being rendered. Footnote blocks are
    /// not placed there.
    #[must_use]
    pub fn in_footnote(&self) -> bool {
        self.footnote_depth > 0
    }

    pub(crate) fn enter_footnote(&mut self) {
        self.footnote_depth += 1;
    }

    pub(crate) fn leave_footnote(&mut self) {
        self.footnote_depth = self.footnote_depth.saturating_sub(1);
    }

    /// Claim every footnote not yet shown as a new block.
    ///
    /// Returns the block number, or `None` when nothing is pending.
    pub fn take_footnote_block(&mut self) -> Option<usize> {
        let end = self.footnote_list.len();
        if self.footnote_consumed == end {
            return None;
        }
        self.footnote_blocks.push(self.footnote_consumed..end);
        self.footnote_consumed = end;
        Some(self.footnote_blocks.len() - 1)
    }

    pub(crate) fn footnote_block_count(&self) -> usize {
        self.footnote_blocks.len()
    }

    /// HTML of a footnote block, with footnotes grouped by name in order of
    /// first occurrence.
    pub(crate) fn footnote_block_html(&self, block: usize) -> String {
        let Some(range) = self.footnote_blocks.get(block) else {
            return String::new();
        };

        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
        for footnote in &self.footnote_list[range.clone()] {
            match groups.iter_mut().find(|(name, _)| *name == footnote.name) {
                Some((_, indices)) => indices.push(footnote.index),
                None => groups.push((footnote.name.as_str(), vec![footnote.index])),
            }
        }

        let mut html = String::from("<div class=\"wiki-macro-footnote\">");
        for (name, indices) in groups {
            let content = self.footnote_values.get(name).map_or("", String::as_str);
            let _ = write!(
                html,
                "<span class=\"footnote-list\"><span id=\"{}\"></span>",
                self.anchor_id(&format!("fn-{name}"))
            );
            match indices.as_slice() {
                [index] => {
                    let _ = write!(
                        html,
                        "<a href=\"#{}\">[{}]</a>",
                        self.anchor_id(&format!("rfn-{index}")),
                        escape_html(name)
                    );
                }
                [first, ..] => {
                    let _ = write!(html, "[{}]", escape_html(name));
                    for (k, index) in indices.iter().enumerate() {
                        let _ = write!(
                            html,
                            " <a href=\"#{}\"><sup>{first}.{}</sup></a>",
                            self.anchor_id(&format!("rfn-{index}")),
                            k + 1
                        );
                    }
                }
                [] => {}
            }
            let _ = write!(html, " {content}</span>");
        }
        html.push_str("</div>");
        html
    }

    /// Number a heading written at `level` (1 to 6).
    ///
    /// Levels are counted independently; the number text leaves out the
    /// unused levels in front of the first one in use.
    pub fn add_heading(&mut self, level: usize, text: String, folded: bool) -> &Heading {
        let slot = level.clamp(1, 6) - 1;
        self.heading_counters[slot] += 1;
        for counter in &mut self.heading_counters[slot + 1..] {
            *counter = 0;
        }

        let parts: Vec<String> = self.heading_counters[..=slot]
            .iter()
            .skip_while(|counter| **counter == 0)
            .map(ToString::to_string)
            .collect();

        self.headings.push(Heading {
            num_text: parts.join("."),
            actual_level: parts.len(),
            level,
            text,
            folded,
        });
        &self.headings[self.headings.len() - 1]
    }

    /// Label shown above the table of contents, once fetched.
    #[must_use]
    pub fn toc_label(&self) -> Option<&str> {
        self.toc_label.as_deref()
    }

    pub fn set_toc_label(&mut self, label: String) {
        self.toc_label = Some(label);
    }

    /// Table of contents for every heading of the pass, built on first use.
    pub fn table_of_contents(&mut self) -> String {
        if let Some(html) = &self.toc_html {
            return html.clone();
        }
        let html = self.build_table_of_contents();
        self.toc_html = Some(html.clone());
        html
    }

    fn build_table_of_contents(&self) -> String {
        let mut html = format!(
            "<div class=\"wiki-macro-toc\" id=\"{}\">",
            self.anchor_id("toc")
        );
        if let Some(label) = &self.toc_label {
            let _ = write!(html, "<div class=\"toc-label\">{}</div>", escape_html(label));
        }

        let mut depth = 0;
        for heading in &self.headings {
            while depth < heading.actual_level {
                html.push_str("<div class=\"toc-indent\">");
                depth += 1;
            }
            while depth > heading.actual_level {
                html.push_str("</div>");
                depth -= 1;
            }
            let _ = write!(
                html,
                "<span class=\"toc-item\"><a href=\"#{}\">{}</a>. {}</span>",
                self.anchor_id(&format!("s-{}", heading.num_text)),
                heading.num_text,
                heading.text
            );
        }
        for _ in 0..depth {
            html.push_str("</div>");
        }

        html.push_str("</div>");
        html
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn context() -> RenderContext {
        RenderContext::new(&RenderOptions::default())
    }

    fn numbers(levels: &[usize]) -> Vec<String> {
        let mut ctx = context();
        for level in levels {
            ctx.add_heading(*level, String::new(), false);
        }
        ctx.headings.into_iter().map(|h| h.num_text).collect()
    }

    #[test]
    fn test_heading_numbers() {
        assert_eq!(numbers(&[1, 2, 2, 1, 2]), vec!["1", "1.1", "1.2", "2", "2.1"]);
    }

    #[test]
    fn test_unused_leading_levels_are_dropped() {
        assert_eq!(numbers(&[2, 3, 2]), vec!["1", "1.1", "2"]);
    }

    #[test]
    fn test_actual_level_counts_components() {
        let mut ctx = context();
        ctx.add_heading(2, String::new(), false);
        let heading = ctx.add_heading(4, String::new(), false).clone();
        assert_eq!(heading.num_text, "1.0.1");
        assert_eq!(heading.actual_level, 3);
        assert_eq!(heading.level, 4);
    }

    #[test]
    fn test_footnote_indices_and_default_names() {
        let mut ctx = context();
        assert_eq!(ctx.add_footnote(None).name, "1");
        assert_eq!(ctx.add_footnote(Some("a")).index, 2);
        assert_eq!(ctx.add_footnote(None).name, "3");
    }

    #[test]
    fn test_first_non_empty_definition_wins() {
        let mut ctx = context();
        ctx.define_footnote("a", String::new());
        ctx.define_footnote("a", "first".to_owned());
        ctx.define_footnote("a", "second".to_owned());
        assert_eq!(ctx.footnote_values["a"], "first");
    }

    #[test]
    fn test_footnote_blocks_consume_pending() {
        let mut ctx = context();
        assert_eq!(ctx.take_footnote_block(), None);
        ctx.add_footnote(None);
        assert_eq!(ctx.take_footnote_block(), Some(0));
        assert_eq!(ctx.take_footnote_block(), None);
        ctx.add_footnote(None);
        assert_eq!(ctx.take_footnote_block(), Some(1));
        assert_eq!(ctx.footnote_block_count(), 2);
    }

    #[test]
    fn test_shared_names_are_grouped() {
        let mut ctx = context();
        ctx.add_footnote(Some("a"));
        ctx.add_footnote(None);
        ctx.add_footnote(Some("a"));
        ctx.define_footnote("a", "A".to_owned());
        ctx.define_footnote("2", "B".to_owned());
        let block = ctx.take_footnote_block().unwrap();
        assert_eq!(
            ctx.footnote_block_html(block),
            "<div class=\"wiki-macro-footnote\">\
             <span class=\"footnote-list\"><span id=\"fn-a\"></span>[a] \
             <a href=\"#rfn-1\"><sup>1.1</sup></a> <a href=\"#rfn-3\"><sup>1.2</sup></a> A</span>\
             <span class=\"footnote-list\"><span id=\"fn-2\"></span><a href=\"#rfn-2\">[2]</a> B</span>\
             </div>"
        );
    }

    #[test]
    fn test_toc_nesting() {
        let mut ctx = context();
        ctx.comment_prefix = "c1-".to_owned();
        ctx.add_heading(1, "A".to_owned(), false);
        ctx.add_heading(2, "B".to_owned(), false);
        ctx.add_heading(1, "C".to_owned(), false);
        assert_eq!(
            ctx.table_of_contents(),
            "<div class=\"wiki-macro-toc\" id=\"c1-toc\">\
             <div class=\"toc-indent\"><span class=\"toc-item\"><a href=\"#c1-s-1\">1</a>. A</span>\
             <div class=\"toc-indent\"><span class=\"toc-item\"><a href=\"#c1-s-1.1\">1.1</a>. B</span>\
             </div><span class=\"toc-item\"><a href=\"#c1-s-2\">2</a>. C</span></div></div>"
        );
    }

    #[test]
    fn test_toc_is_memoized() {
        let mut ctx = context();
        ctx.add_heading(1, "A".to_owned(), false);
        let first = ctx.table_of_contents();
        ctx.add_heading(1, "B".to_owned(), false);
        assert_eq!(ctx.table_of_contents(), first);
    }

    #[test]
    fn test_anchor_id_is_escaped() {
        let mut ctx = context();
        ctx.comment_prefix = "\"x".to_owned();
        assert_eq!(ctx.anchor_id("toc"), "&quot;xtoc");
    }
}
