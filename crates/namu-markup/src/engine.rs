//! The render pass: one left-to-right walk over markup source.
//!
//! At every cursor position the pass tries the registered rules in priority
//! order. A backslash escapes the next character, which is emitted as a
//! numeric character reference and never interpreted. When no rule claims
//! the cursor one character is emitted as text.

use std::fmt::Write;

use crate::rule::{Delimiters, Matched, Priority, RuleShape};
use crate::{Host, MacroRegistry, Output, RenderContext, RenderError, Renderer, RendererConfig};

/// Nesting beyond this renders the remaining span as plain text.
const MAX_NESTING: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// All rule shapes.
    Block,
    /// Delimited rules only.
    Inline,
}

/// State of one render call, handed to rules and macros.
pub struct RenderPass<'r> {
    renderer: &'r Renderer,
    host: &'r dyn Host,
    context: RenderContext,
    nesting: usize,
}

impl<'r> RenderPass<'r> {
    pub(crate) fn new(renderer: &'r Renderer, host: &'r dyn Host, context: RenderContext) -> Self {
        Self {
            renderer,
            host,
            context,
            nesting: 0,
        }
    }

    pub(crate) fn into_context(self) -> RenderContext {
        self.context
    }

    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RenderContext {
        &mut self.context
    }

    /// Host services for this render.
    #[must_use]
    pub fn host(&self) -> &'r dyn Host {
        self.host
    }

    #[must_use]
    pub fn config(&self) -> &'r RendererConfig {
        self.renderer.config()
    }

    #[must_use]
    pub fn macros(&self) -> &'r MacroRegistry {
        self.renderer.macros()
    }

    /// Render `src` trying every rule shape.
    ///
    /// # Errors
    ///
    /// Returns an error when a host request fails.
    pub fn render_block(&mut self, src: &str) -> Result<String, RenderError> {
        self.render(src, Mode::Block)
    }

    /// Render `src` trying delimited rules only.
    ///
    /// # Errors
    ///
    /// Returns an error when a host request fails.
    pub fn render_inline(&mut self, src: &str) -> Result<String, RenderError> {
        self.render(src, Mode::Inline)
    }

    fn render(&mut self, src: &str, mode: Mode) -> Result<String, RenderError> {
        if self.nesting >= MAX_NESTING {
            tracing::debug!(nesting = self.nesting, "Markup nested too deeply, rendering as text");
            let mut out = String::with_capacity(src.len());
            for c in src.chars() {
                push_text(&mut out, c);
            }
            return Ok(out);
        }

        self.nesting += 1;
        let result = self.walk(src, mode);
        self.nesting -= 1;
        result
    }

    fn walk(&mut self, src: &str, mode: Mode) -> Result<String, RenderError> {
        let mut out = String::with_capacity(src.len());
        let mut closes = CloseIndex::default();
        let mut pos = 0;

        while let Some(c) = src[pos..].chars().next() {
            if c == '\\'
                && let Some(escaped) = src[pos + 1..].chars().next()
            {
                let _ = write!(out, "&#{};", u32::from(escaped));
                pos += 1 + escaped.len_utf8();
                continue;
            }

            if let Some(consumed) = self.apply_rules(src, pos, mode, &mut closes, &mut out)? {
                pos += consumed;
                continue;
            }

            push_text(&mut out, c);
            pos += c.len_utf8();
        }

        Ok(out)
    }

    /// Try every non-`Last` rule at `pos`. Returns the number of source
    /// bytes the winning rule consumed.
    fn apply_rules(
        &mut self,
        src: &str,
        pos: usize,
        mode: Mode,
        closes: &mut CloseIndex,
        out: &mut String,
    ) -> Result<Option<usize>, RenderError> {
        let rest = &src[pos..];
        let line_start = pos == 0 || src[..pos].ends_with('\n');
        let renderer = self.renderer;

        for rule in renderer.rules() {
            let priority = rule.priority();
            if priority == Priority::Last {
                continue;
            }

            let (matched, consumed) = match rule.shape() {
                RuleShape::Delimited(delimiters) => {
                    if !rest.starts_with(delimiters.open)
                        || (delimiters.escape_sensitive && ends_with_escaped_quote(out))
                        || !closes.any_from(src, delimiters.close, pos + delimiters.open.len())
                    {
                        continue;
                    }
                    let body = &rest[delimiters.open.len()..];
                    let honor_escapes = priority != Priority::Literal;
                    let Some(end) = find_close(body, &delimiters, honor_escapes) else {
                        continue;
                    };
                    let matched = Matched {
                        raw: &body[..end],
                        sole_line: false,
                    };
                    (matched, delimiters.open.len() + end + delimiters.close.len())
                }
                RuleShape::FullLine { marker } => {
                    if mode != Mode::Block || !line_start || !rest.starts_with(marker) {
                        continue;
                    }
                    let line = rest.find('\n').map_or(rest, |end| &rest[..end]);
                    let matched = Matched {
                        raw: line,
                        sole_line: self.nesting == 1 && pos == 0 && rest[line.len()..].trim().is_empty(),
                    };
                    (matched, (line.len() + 1).min(rest.len()))
                }
                RuleShape::FullContent => {
                    if mode != Mode::Block || !line_start {
                        continue;
                    }
                    let Some(raw) = rule
                        .extent(rest)
                        .filter(|len| *len > 0)
                        .and_then(|len| rest.get(..len))
                    else {
                        continue;
                    };
                    let matched = Matched {
                        raw,
                        sole_line: false,
                    };
                    (matched, raw.len())
                }
            };

            match rule.format(&matched, self)? {
                Output::Html(html) => out.push_str(&html),
                Output::Markup(markup) => {
                    let html = self.render(&markup, mode)?;
                    out.push_str(&html);
                }
                Output::Skip => continue,
            }
            return Ok(Some(consumed));
        }

        Ok(None)
    }
}

/// Last offset of each close marker in the source of one walk, found on
/// first use. Lets unclosed open markers fail without scanning to the end.
#[derive(Default)]
struct CloseIndex {
    last: Vec<(&'static str, Option<usize>)>,
}

impl CloseIndex {
    /// Whether `close` occurs in `src` at or after `from`.
    fn any_from(&mut self, src: &str, close: &'static str, from: usize) -> bool {
        let last = match self.last.iter().find(|(marker, _)| *marker == close) {
            Some((_, last)) => *last,
            None => {
                let last = src.rfind(close);
                self.last.push((close, last));
                last
            }
        };
        last.is_some_and(|last| last >= from)
    }
}

/// Byte offset of the close marker in `body`, skipping nested levels.
///
/// `None` when there is no close marker, or when a newline comes first and
/// the delimiters are single-line.
fn find_close(body: &str, delimiters: &Delimiters, honor_escapes: bool) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(c) = body[pos..].chars().next() {
        let rest = &body[pos..];

        if honor_escapes && c == '\\' {
            pos += 1;
            if let Some(escaped) = body[pos..].chars().next() {
                if escaped == '\n' && !delimiters.allow_multiline {
                    return None;
                }
                pos += escaped.len_utf8();
            }
            continue;
        }

        if depth == 0
            && rest.starts_with(delimiters.close)
            && !(delimiters.escape_sensitive && follows_escaped_quote(&body[..pos]))
        {
            return Some(pos);
        }

        if let Some((open, close)) = delimiters.nest {
            if depth > 0 && rest.starts_with(close) {
                depth -= 1;
                pos += close.len();
                continue;
            }
            if rest.starts_with(open) {
                depth += 1;
                pos += open.len();
                continue;
            }
        }

        if c == '\n' && !delimiters.allow_multiline {
            return None;
        }
        pos += c.len_utf8();
    }

    None
}

fn follows_escaped_quote(before: &str) -> bool {
    before.ends_with("\\'") || before.ends_with("\\\"")
}

fn ends_with_escaped_quote(out: &str) -> bool {
    out.ends_with("&#39;") || out.ends_with("&#34;")
}

/// Emit one unclaimed source character.
fn push_text(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("<br>"),
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#x27;"),
        _ => out.push(c),
    }
}
