//! `||cell||cell||` tables.
//!
//! A row runs from a line starting with `||` to the next line ending with
//! `||`, so cells may span lines. Empty cells merge into the next cell as a
//! column span. Cells may start with attributes in angle brackets:
//!
//! - `<-N>` column span, `<|N>` row span (`<^|N>` / `<v|N>` also align
//!   vertically)
//! - `<(>`, `<:>`, `<)>` left, center and right alignment
//! - `<bgcolor=..>`, `<color=..>`, `<width=..>`, `<height=..>`, or a bare
//!   `<#color>` background
//! - `<rowbgcolor=..>`, `<rowcolor=..>` for the row
//! - `<tablewidth=..>`, `<tablebgcolor=..>`, `<tablecolor=..>`,
//!   `<tablebordercolor=..>`, `<tablealign=left|center|right>` for the table

use std::fmt::Write;
use std::sync::LazyLock;

use namu_sanitize::{escape_html, filter_declarations};
use regex::Regex;

use super::{lines, parse_color, parse_size};
use crate::rule::{Matched, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<([^<>]*)>").unwrap());

static SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-(\d+)|([\^v]?)\|(\d+))$").unwrap());

pub(super) struct Table;

impl SyntaxRule for Table {
    fn name(&self) -> &str {
        "table"
    }

    fn shape(&self) -> RuleShape {
        RuleShape::FullContent
    }

    fn extent(&self, rest: &str) -> Option<usize> {
        if !rest.starts_with("||") {
            return None;
        }

        let mut consumed = 0;
        let mut complete = 0;
        let mut in_row = false;
        for (line, len) in lines(rest) {
            if !in_row && !line.starts_with("||") {
                break;
            }
            consumed += len;
            let trimmed = line.trim_end();
            if trimmed.ends_with("||") && (in_row || trimmed.len() >= 4) {
                in_row = false;
                complete = consumed;
            } else {
                in_row = true;
            }
        }
        (complete > 0).then_some(complete)
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        let mut table = Styles::default();
        let mut body = String::new();

        for row in rows(matched.raw) {
            let mut row_styles = Styles::default();
            let mut cells_html = String::new();
            let cells: Vec<&str> = row.split("||").collect();

            let mut merged = 1;
            for (i, cell) in cells.iter().enumerate() {
                if cell.is_empty() && i + 1 < cells.len() {
                    merged += 1;
                    continue;
                }
                let mut attrs = CellAttrs {
                    colspan: merged,
                    ..CellAttrs::default()
                };
                merged = 1;
                let content = attrs.parse(cell, &mut table, &mut row_styles);
                cells_html.push_str(&attrs.render(content, pass)?);
            }

            let _ = write!(body, "<tr{}>{cells_html}</tr>", row_styles.attribute());
        }

        let wrap_class = match table.align {
            Some(align) => format!("wiki-table-wrap table-{align}"),
            None => "wiki-table-wrap".to_owned(),
        };
        Ok(Output::Html(format!(
            "<div class=\"{wrap_class}\"><table class=\"wiki-table\"{}><tbody>{body}</tbody></table></div>",
            table.attribute()
        )))
    }
}

/// Inner text of each row, without the outer `||` markers.
fn rows(raw: &str) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current: Option<String> = None;

    for (line, _) in lines(raw) {
        let text = match current.take() {
            Some(mut row) => {
                row.push('\n');
                row.push_str(line);
                row
            }
            None => line.to_owned(),
        };
        let trimmed = text.trim_end();
        if trimmed.len() >= 4 && trimmed.ends_with("||") {
            rows.push(trimmed[2..trimmed.len() - 2].to_owned());
        } else {
            current = Some(text);
        }
    }

    rows
}

/// Collected CSS declarations for one element.
#[derive(Debug, Default)]
struct Styles {
    declarations: Vec<String>,
    align: Option<&'static str>,
}

impl Styles {
    fn push(&mut self, property: &str, value: String) {
        self.declarations.push(format!("{property}: {value}"));
    }

    fn color(&mut self, property: &str, value: &str) {
        if let Some(color) = parse_color(value) {
            self.push(property, color);
        }
    }

    fn size(&mut self, property: &str, value: &str) {
        if let Some(size) = parse_size(value) {
            self.push(property, size);
        }
    }

    fn attribute(&self) -> String {
        let style = filter_declarations(&self.declarations.join("; "));
        if style.is_empty() {
            String::new()
        } else {
            format!(" style=\"{}\"", escape_html(&style))
        }
    }
}

#[derive(Debug, Default)]
struct CellAttrs {
    colspan: usize,
    rowspan: Option<usize>,
    align: Option<&'static str>,
    styles: Styles,
}

impl CellAttrs {
    /// Consume leading `<...>` attributes, returning the rest of the cell.
    fn parse<'a>(&mut self, mut cell: &'a str, table: &mut Styles, row: &mut Styles) -> &'a str {
        while let Some(caps) = ATTR_RE.captures(cell) {
            if !self.apply(caps[1].trim(), table, row) {
                break;
            }
            cell = &cell[caps[0].len()..];
        }
        cell
    }

    /// Apply one attribute; `false` when it is not an attribute at all.
    fn apply(&mut self, attr: &str, table: &mut Styles, row: &mut Styles) -> bool {
        match attr {
            "(" => self.align = Some("left"),
            ":" => self.align = Some("center"),
            ")" => self.align = Some("right"),
            _ => {
                if let Some(caps) = SPAN_RE.captures(attr) {
                    if let Some(colspan) = caps.get(1) {
                        self.colspan = colspan.as_str().parse().unwrap_or(1);
                    } else {
                        self.rowspan = caps[3].parse().ok();
                        match &caps[2] {
                            "^" => self.styles.push("vertical-align", "top".to_owned()),
                            "v" => self.styles.push("vertical-align", "bottom".to_owned()),
                            _ => {}
                        }
                    }
                    return true;
                }
                if attr.starts_with('#') {
                    let Some(color) = parse_color(attr) else {
                        return false;
                    };
                    self.styles.push("background-color", color);
                    return true;
                }
                let Some((key, value)) = attr.split_once('=') else {
                    return false;
                };
                let value = value.trim();
                // A known key with a bad value is dropped without ending the attributes.
                match key.trim().to_ascii_lowercase().as_str() {
                    "bgcolor" => self.styles.color("background-color", value),
                    "color" => self.styles.color("color", value),
                    "width" => self.styles.size("width", value),
                    "height" => self.styles.size("height", value),
                    "rowbgcolor" => row.color("background-color", value),
                    "rowcolor" => row.color("color", value),
                    "tablewidth" => table.size("width", value),
                    "tablebgcolor" => table.color("background-color", value),
                    "tablecolor" => table.color("color", value),
                    "tablebordercolor" => {
                        if let Some(color) = parse_color(value) {
                            table.push("border", format!("2px solid {color}"));
                        }
                    }
                    "tablealign" => {
                        table.align = match value {
                            "left" => Some("left"),
                            "center" => Some("center"),
                            "right" => Some("right"),
                            _ => table.align,
                        };
                    }
                    _ => return false,
                }
            }
        }
        true
    }

    fn render(mut self, content: &str, pass: &mut RenderPass<'_>) -> Result<String, RenderError> {
        let align = self.align.or_else(|| {
            match (content.starts_with(' '), content.ends_with(' ')) {
                (true, true) => Some("center"),
                (true, false) => Some("right"),
                (false, true) => Some("left"),
                (false, false) => None,
            }
        });
        if let Some(align) = align {
            self.styles.push("text-align", align.to_owned());
        }

        let mut html = String::from("<td");
        if self.colspan > 1 {
            let _ = write!(html, " colspan=\"{}\"", self.colspan);
        }
        if let Some(rowspan) = self.rowspan.filter(|rowspan| *rowspan > 1) {
            let _ = write!(html, " rowspan=\"{rowspan}\"");
        }
        html.push_str(&self.styles.attribute());
        html.push('>');
        html.push_str(&pass.render_block(content.trim())?);
        html.push_str("</td>");
        Ok(html)
    }
}
