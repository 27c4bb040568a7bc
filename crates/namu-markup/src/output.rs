//! Rule and macro output types.

/// Output of a syntax rule or macro.
///
/// - [`Html`](Self::Html): final HTML, emitted as is
/// - [`Markup`](Self::Markup): markup rendered again in place (used by
///   redirects, which turn into links)
/// - [`Skip`](Self::Skip): the rule declines; the engine tries the next one
///
/// # Example
///
/// ```
/// use namu_markup::Output;
///
/// let output = Output::html("<br>");
/// assert_eq!(output, Output::Html("<br>".to_owned()));
///
/// let output = Output::markup("[[Target]]");
/// assert!(matches!(output, Output::Markup(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// HTML that is emitted unchanged.
    Html(String),
    /// Markup that is rendered again in the current mode.
    Markup(String),
    /// Don't handle this span.
    Skip,
}

impl Output {
    /// Create an HTML output.
    #[must_use]
    pub fn html(s: impl Into<String>) -> Self {
        Self::Html(s.into())
    }

    /// Create a markup output.
    #[must_use]
    pub fn markup(s: impl Into<String>) -> Self {
        Self::Markup(s.into())
    }

    /// Empty HTML. Used when a construct renders to nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::Html(String::new())
    }
}
