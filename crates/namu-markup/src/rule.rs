//! Syntax rule trait and rule shapes.

use namu_sanitize::escape_html;

use crate::{Output, RenderError, RenderPass};

/// Ordering class of a rule.
///
/// Rules are tried `Literal` first, then `Normal`; within a class they keep
/// registration order. `Last` rules never see the source: they run once
/// over the rendered output of the whole pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Raw blocks whose content is not interpreted as markup.
    Literal,
    /// Ordinary markup.
    Normal,
    /// Post-processing over the rendered HTML.
    Last,
}

/// Markers of a delimited rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delimiters {
    /// Open marker, matched at the cursor.
    pub open: &'static str,
    /// Close marker.
    pub close: &'static str,
    /// Markers of a nested level whose close is skipped while searching for
    /// the close marker.
    pub nest: Option<(&'static str, &'static str)>,
    /// Whether the content may span lines.
    pub allow_multiline: bool,
    /// Whether backslash-escaped quotes suppress the markers.
    pub escape_sensitive: bool,
}

impl Delimiters {
    /// Single-line, non-nesting delimiters.
    #[must_use]
    pub const fn new(open: &'static str, close: &'static str) -> Self {
        Self {
            open,
            close,
            nest: None,
            allow_multiline: false,
            escape_sensitive: false,
        }
    }

    #[must_use]
    pub const fn nested(mut self, open: &'static str, close: &'static str) -> Self {
        self.nest = Some((open, close));
        self
    }

    #[must_use]
    pub const fn multiline(mut self) -> Self {
        self.allow_multiline = true;
        self
    }

    #[must_use]
    pub const fn escape_sensitive(mut self) -> Self {
        self.escape_sensitive = true;
        self
    }
}

/// How a rule finds its span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleShape {
    /// Content between an open and a close marker.
    Delimited(Delimiters),
    /// A whole line starting with `marker`. Block mode only.
    FullLine {
        /// Text the line must start with.
        marker: &'static str,
    },
    /// At `Normal` priority: a block starting at a line start whose length
    /// the rule reports through [`SyntaxRule::extent`]. At `Last` priority:
    /// the rendered output of the whole pass.
    FullContent,
}

/// The span handed to a rule's formatter.
#[derive(Clone, Copy, Debug)]
pub struct Matched<'a> {
    /// Content between the markers, the line, or the block; not escaped.
    pub raw: &'a str,
    /// The match is the only line of the top-level source.
    pub sole_line: bool,
}

impl Matched<'_> {
    /// HTML-escaped content.
    #[must_use]
    pub fn escaped(&self) -> String {
        escape_html(self.raw)
    }
}

/// A syntax rule.
///
/// # Example
///
/// ```
/// use namu_markup::{
///     Delimiters, Matched, NoHost, Output, RenderError, RenderOptions, RenderPass, Renderer,
///     RuleShape, SyntaxRule,
/// };
///
/// struct Kbd;
///
/// impl SyntaxRule for Kbd {
///     fn name(&self) -> &str {
///         "kbd"
///     }
///
///     fn shape(&self) -> RuleShape {
///         RuleShape::Delimited(Delimiters::new("<<", ">>"))
///     }
///
///     fn format(&self, matched: &Matched<'_>, _pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
///         Ok(Output::html(format!("<kbd>{}</kbd>", matched.escaped())))
///     }
/// }
///
/// let renderer = Renderer::new().with_rule(Kbd);
/// let rendered = renderer.render("<<Ctrl>>", &RenderOptions::default(), &NoHost).unwrap();
/// assert_eq!(rendered.html, "<kbd>Ctrl</kbd>");
/// ```
pub trait SyntaxRule: Send + Sync {
    /// Rule name, used in logs.
    fn name(&self) -> &str;

    fn priority(&self) -> Priority {
        Priority::Normal
    }

    fn shape(&self) -> RuleShape;

    /// Byte length of the block a `Normal` full-content rule claims at the
    /// start of `rest`, or `None` when the block does not start here.
    fn extent(&self, _rest: &str) -> Option<usize> {
        None
    }

    /// Turn a match into output.
    ///
    /// # Errors
    ///
    /// Returns an error only when a host request fails.
    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError>;
}
