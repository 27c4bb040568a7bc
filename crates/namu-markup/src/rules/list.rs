//! Indented lists: ` * item`, ` 1. item`, ` a.`, ` A.`, ` i.`, ` I.`.
//!
//! Deeper indentation nests a list inside the previous item. An ordered
//! marker may set its start number with `#N` (` 1.#5 item`). Indented lines
//! that are not items continue the previous item.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use super::lines;
use crate::rule::{Matched, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( +)(\*|1\.|a\.|A\.|i\.|I\.)(?:#(\d+))?(?: (.*))?$").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

impl ListKind {
    fn from_marker(marker: &str) -> Self {
        match marker {
            "1." => Self::Decimal,
            "a." => Self::LowerAlpha,
            "A." => Self::UpperAlpha,
            "i." => Self::LowerRoman,
            "I." => Self::UpperRoman,
            _ => Self::Bullet,
        }
    }

    fn open(self, start: Option<usize>) -> String {
        let class = match self {
            Self::Bullet => return "<ul class=\"wiki-list\">".to_owned(),
            Self::Decimal => "wiki-list-decimal",
            Self::LowerAlpha => "wiki-list-alpha",
            Self::UpperAlpha => "wiki-list-upper-alpha",
            Self::LowerRoman => "wiki-list-roman",
            Self::UpperRoman => "wiki-list-upper-roman",
        };
        match start {
            Some(start) => format!("<ol class=\"wiki-list {class}\" start=\"{start}\">"),
            None => format!("<ol class=\"wiki-list {class}\">"),
        }
    }

    fn close(self) -> &'static str {
        match self {
            Self::Bullet => "</ul>",
            _ => "</ol>",
        }
    }
}

#[derive(Debug)]
struct Item {
    indent: usize,
    kind: ListKind,
    start: Option<usize>,
    text: String,
}

pub(super) struct List;

impl SyntaxRule for List {
    fn name(&self) -> &str {
        "list"
    }

    fn shape(&self) -> RuleShape {
        RuleShape::FullContent
    }

    fn extent(&self, rest: &str) -> Option<usize> {
        let mut lines = lines(rest);
        let (first, first_len) = lines.next()?;
        if !ITEM_RE.is_match(first) {
            return None;
        }
        let more: usize = lines
            .take_while(|(line, _)| line.starts_with(' ') && !line.trim().is_empty())
            .map(|(_, len)| len)
            .sum();
        Some(first_len + more)
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let items = parse_items(matched.raw);
        Ok(Output::Html(render_items(&items, pass)?))
    }
}

fn parse_items(raw: &str) -> Vec<Item> {
    let mut items: Vec<Item> = Vec::new();
    for (line, _) in lines(raw) {
        if let Some(caps) = ITEM_RE.captures(line) {
            items.push(Item {
                indent: caps[1].len(),
                kind: ListKind::from_marker(&caps[2]),
                start: caps.get(3).and_then(|start| start.as_str().parse().ok()),
                text: caps.get(4).map_or("", |text| text.as_str()).to_owned(),
            });
        } else if let Some(item) = items.last_mut() {
            item.text.push('\n');
            item.text.push_str(line.trim_start());
        }
    }
    items
}

/// Render items as lists, nesting deeper-indented runs inside the item
/// before them.
fn render_items(items: &[Item], pass: &mut RenderPass<'_>) -> Result<String, RenderError> {
    let mut html = String::new();
    let mut i = 0;

    while let Some(first) = items.get(i) {
        let (indent, kind) = (first.indent, first.kind);
        html.push_str(&kind.open(first.start));

        while let Some(item) = items.get(i)
            && item.indent == indent
            && item.kind == kind
        {
            i += 1;
            let children_start = i;
            while items.get(i).is_some_and(|child| child.indent > indent) {
                i += 1;
            }

            let content = pass.render_block(&item.text)?;
            let children = render_items(&items[children_start..i], pass)?;
            let _ = write!(html, "<li>{content}{children}</li>");
        }

        html.push_str(kind.close());
    }

    Ok(html)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{NoHost, RenderOptions, Renderer};

    fn render(source: &str) -> String {
        Renderer::new()
            .render(source, &RenderOptions::default(), &NoHost)
            .unwrap()
            .html
    }

    #[test]
    fn test_extent() {
        assert_eq!(List.extent(" * a\n  cont\n * b\nafter"), Some(17));
        assert_eq!(List.extent(" *a"), None);
        assert_eq!(List.extent("* a"), None);
    }

    #[test]
    fn test_bullets() {
        assert_eq!(
            render(" * a\n * ''b''\nafter"),
            "<ul class=\"wiki-list\"><li>a</li><li><em>b</em></li></ul>after"
        );
    }

    #[test]
    fn test_nesting() {
        assert_eq!(
            render(" * a\n  * b\n  * c\n * d"),
            "<ul class=\"wiki-list\"><li>a<ul class=\"wiki-list\"><li>b</li><li>c</li></ul></li><li>d</li></ul>"
        );
    }

    #[test]
    fn test_ordered_with_start() {
        assert_eq!(
            render(" 1.#3 x\n 1. y"),
            "<ol class=\"wiki-list wiki-list-decimal\" start=\"3\"><li>x</li><li>y</li></ol>"
        );
    }

    #[test]
    fn test_kind_change_starts_new_list() {
        assert_eq!(
            render(" * a\n a. b"),
            "<ul class=\"wiki-list\"><li>a</li></ul><ol class=\"wiki-list wiki-list-alpha\"><li>b</li></ol>"
        );
    }

    #[test]
    fn test_continuation_line() {
        assert_eq!(
            render(" * a\n   more"),
            "<ul class=\"wiki-list\"><li>a<br>more</li></ul>"
        );
    }
}
