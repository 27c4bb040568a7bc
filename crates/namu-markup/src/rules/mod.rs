//! Built-in syntax rules.

mod comment;
mod footnote;
mod formatting;
mod heading;
mod hr;
mod last;
mod link;
mod list;
mod literal;
mod macro_call;
mod quote;
mod redirect;
mod table;

use crate::SyntaxRule;

/// Built-in rules in registration order.
pub(crate) fn builtin() -> Vec<Box<dyn SyntaxRule>> {
    let mut rules: Vec<Box<dyn SyntaxRule>> = vec![
        Box::new(literal::HtmlBlock),
        Box::new(literal::WikiBlock),
        Box::new(literal::FoldingBlock),
        Box::new(literal::Literal),
        Box::new(link::Link),
        Box::new(footnote::FootnoteRef),
        Box::new(macro_call::MacroCall),
    ];
    rules.extend(
        formatting::FORMATTING
            .iter()
            .map(|rule| Box::new(*rule) as Box<dyn SyntaxRule>),
    );
    rules.extend([
        Box::new(redirect::Redirect) as Box<dyn SyntaxRule>,
        Box::new(heading::Heading),
        Box::new(hr::HorizontalRule),
        Box::new(comment::CommentLine),
        Box::new(table::Table),
        Box::new(quote::Quote),
        Box::new(list::List),
        Box::new(last::Placeholders),
        Box::new(last::CommentRefs),
    ]);
    rules
}

/// Lines of `rest` as `(line, consumed)` pairs, where `consumed` counts the
/// line and its newline.
fn lines(rest: &str) -> impl Iterator<Item = (&str, usize)> {
    rest.split_inclusive('\n')
        .map(|line| (line.strip_suffix('\n').unwrap_or(line), line.len()))
}

/// `#rgb`, `#rrggbb` or a color keyword.
fn parse_color(value: &str) -> Option<String> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        let valid = matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
        if valid {
            return Some(format!("#{hex}"));
        }
        // `#red` is the usual way to write a keyword
        if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_alphabetic()) {
            return Some(hex.to_ascii_lowercase());
        }
        return None;
    }
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(value.to_ascii_lowercase());
    }
    None
}

/// Digits with an optional `px` or `%` unit. Bare digits mean pixels.
pub(crate) fn parse_size(value: &str) -> Option<String> {
    let value = value.trim();
    let (digits, unit) = if let Some(digits) = value.strip_suffix("px") {
        (digits, "px")
    } else if let Some(digits) = value.strip_suffix('%') {
        (digits, "%")
    } else {
        (value, "px")
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{digits}{unit}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines() {
        let lines: Vec<_> = lines("a\nbc\n\nd").collect();
        assert_eq!(lines, vec![("a", 2), ("bc", 3), ("", 1), ("d", 1)]);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#F00").as_deref(), Some("#F00"));
        assert_eq!(parse_color("#red").as_deref(), Some("red"));
        assert_eq!(parse_color("Blue").as_deref(), Some("blue"));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("red;x"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("100").as_deref(), Some("100px"));
        assert_eq!(parse_size("50%").as_deref(), Some("50%"));
        assert_eq!(parse_size("20px").as_deref(), Some("20px"));
        assert_eq!(parse_size("1e3"), None);
        assert_eq!(parse_size("px"), None);
    }

    #[test]
    fn test_builtin_rules_are_sorted() {
        let rules = builtin();
        assert!(rules.windows(2).all(|pair| pair[0].priority() <= pair[1].priority()));
    }
}
