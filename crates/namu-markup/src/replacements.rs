//! Single-pass placeholder substitution for the final output.

/// Collects string replacements and applies them together.
///
/// Deferred constructs (table of contents, footnote blocks) emit a
/// placeholder during the main pass; once the pass is over their HTML is
/// known and the placeholders are swapped out here.
///
/// # Example
///
/// ```
/// use namu_markup::Replacements;
///
/// let mut html = "<p>\u{E000}toc\u{E001}</p>".to_owned();
/// let mut replacements = Replacements::new();
/// replacements.add("\u{E000}toc\u{E001}", "<div>toc</div>");
/// replacements.apply(&mut html);
///
/// assert_eq!(html, "<p><div>toc</div></p>");
/// ```
#[derive(Debug, Default)]
pub struct Replacements {
    items: Vec<(String, String)>,
}

impl Replacements {
    /// Create a new empty replacements collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new replacements collector with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Register a replacement: all occurrences of `from` will be replaced with `to`.
    ///
    /// Replacements are applied in the order they are added.
    pub fn add(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.items.push((from.into(), to.into()));
    }

    /// Apply all registered replacements, consuming the collector.
    pub fn apply(self, html: &mut String) {
        for (from, to) in self.items {
            if html.contains(&from) {
                *html = html.replace(&from, &to);
            }
        }
    }

    /// Check if there are any replacements registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of registered replacements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_replacements() {
        let mut html = "unchanged".to_owned();
        Replacements::new().apply(&mut html);
        assert_eq!(html, "unchanged");
    }

    #[test]
    fn test_every_occurrence_is_replaced() {
        let mut html = "\u{E000}toc\u{E001} and \u{E000}toc\u{E001}".to_owned();
        let mut replacements = Replacements::new();
        replacements.add("\u{E000}toc\u{E001}", "[toc]");
        replacements.apply(&mut html);
        assert_eq!(html, "[toc] and [toc]");
    }

    #[test]
    fn test_missing_placeholder_is_ignored() {
        let mut html = "text".to_owned();
        let mut replacements = Replacements::with_capacity(1);
        replacements.add("\u{E000}fn:0\u{E001}", "<div></div>");
        assert_eq!(replacements.len(), 1);
        assert!(!replacements.is_empty());
        replacements.apply(&mut html);
        assert_eq!(html, "text");
    }
}
