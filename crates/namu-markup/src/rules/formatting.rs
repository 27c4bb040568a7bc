//! Inline text formatting: `'''bold'''`, `''italic''`, `__underline__`,
//! `~~strike~~`, `--strike--`, `^^sup^^` and `,,sub,,`.

use crate::rule::{Delimiters, Matched, RuleShape};
use crate::{Output, RenderError, RenderPass, SyntaxRule};

#[derive(Clone, Copy, Debug)]
pub(super) struct Formatting {
    name: &'static str,
    delimiters: Delimiters,
    tag: &'static str,
}

impl Formatting {
    const fn new(name: &'static str, marker: &'static str, tag: &'static str) -> Self {
        Self {
            name,
            delimiters: Delimiters::new(marker, marker),
            tag,
        }
    }

    const fn quoted(name: &'static str, marker: &'static str, tag: &'static str) -> Self {
        Self {
            name,
            delimiters: Delimiters::new(marker, marker).escape_sensitive(),
            tag,
        }
    }
}

/// Bold before italic: `'''` must win over `''`.
pub(super) const FORMATTING: [Formatting; 7] = [
    Formatting::quoted("bold", "'''", "strong"),
    Formatting::quoted("italic", "''", "em"),
    Formatting::new("underline", "__", "u"),
    Formatting::new("strike", "~~", "del"),
    Formatting::new("strike-dash", "--", "del"),
    Formatting::new("superscript", "^^", "sup"),
    Formatting::new("subscript", ",,", "sub"),
];

impl SyntaxRule for Formatting {
    fn name(&self) -> &str {
        self.name
    }

    fn shape(&self) -> RuleShape {
        RuleShape::Delimited(self.delimiters)
    }

    fn format(&self, matched: &Matched<'_>, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        if matched.raw.is_empty() {
            return Ok(Output::Skip);
        }
        let content = pass.render_inline(matched.raw)?;
        Ok(Output::Html(format!("<{tag}>{content}</{tag}>", tag = self.tag)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{NoHost, RenderOptions, Renderer};

    fn render(source: &str) -> String {
        Renderer::new()
            .render(source, &RenderOptions::default(), &NoHost)
            .unwrap()
            .html
    }

    #[test]
    fn test_each_format() {
        assert_eq!(render("'''b'''"), "<strong>b</strong>");
        assert_eq!(render("''i''"), "<em>i</em>");
        assert_eq!(render("__u__"), "<u>u</u>");
        assert_eq!(render("~~s~~ --d--"), "<del>s</del> <del>d</del>");
        assert_eq!(render("x^^2^^ H,,2,,O"), "x<sup>2</sup> H<sub>2</sub>O");
    }

    #[test]
    fn test_nesting() {
        assert_eq!(render("'''a ''b'' c'''"), "<strong>a <em>b</em> c</strong>");
    }

    #[test]
    fn test_empty_content_declines() {
        assert_eq!(render("____"), "____");
    }

    #[test]
    fn test_escaped_quote_does_not_open() {
        assert_eq!(render("\\'''a''"), "&#39;&#x27;&#x27;a&#x27;&#x27;");
    }

    #[test]
    fn test_formatting_is_single_line() {
        assert_eq!(render("__a\nb__"), "__a<br>b__");
    }
}
