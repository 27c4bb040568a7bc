//! Style text parser.
//!
//! Builds the [`ast`](super::ast) for a stylesheet or a bare declaration
//! list. Structural damage (unbalanced braces, unterminated strings or
//! comments) is a hard error; a selector that cannot be understood is just
//! left out of its rule.

use super::ast::{AtRule, Combinator, Declaration, Node, Selector, Simple, StyleRule};
use super::DARK_MODE_AT_RULE;

/// Hard parse error. Callers of the public filters never see it; the filter
/// degrades to an empty result instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum CssError {
    /// `/*` without a closing `*/`.
    #[error("unterminated comment")]
    UnterminatedComment,
    /// Quote without its closing quote.
    #[error("unterminated string")]
    UnterminatedString,
    /// Input ended inside a block or before a rule body.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// A character that cannot appear at this position.
    #[error("unexpected `{found}` at byte {offset}")]
    Unexpected {
        /// Offending character.
        found: char,
        /// Byte offset in the comment-stripped input.
        offset: usize,
    },
}

/// Parse a stylesheet into nodes.
pub(crate) fn parse_stylesheet(src: &str) -> Result<Vec<Node>, CssError> {
    let stripped = strip_comments(src)?;
    parse_nodes(&stripped, false)
}

/// Parse a declaration list such as the value of a `style` attribute.
pub(crate) fn parse_declaration_list(src: &str) -> Result<Vec<Declaration>, CssError> {
    let stripped = strip_comments(src)?;
    parse_declarations(&stripped)
}

/// Replace comments with a single space, leaving strings untouched.
fn strip_comments(src: &str) -> Result<String, CssError> {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                let mut closed = false;
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        closed = true;
                        break;
                    }
                    prev = n;
                }
                if !closed {
                    return Err(CssError::UnterminatedComment);
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    if quote.is_some() {
        return Err(CssError::UnterminatedString);
    }
    Ok(out)
}

/// Parse top-level nodes. Inside a dark-mode body (`nested`), at-rule
/// bodies are skipped rather than parsed, so nesting costs one scan.
fn parse_nodes(src: &str, nested: bool) -> Result<Vec<Node>, CssError> {
    let mut cursor = Cursor::new(src);
    cursor.nested = nested;
    let mut nodes = Vec::new();

    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => break,
            Some(';') => {
                cursor.bump();
            }
            Some('}') => {
                return Err(CssError::Unexpected {
                    found: '}',
                    offset: cursor.pos,
                });
            }
            Some('@') => nodes.push(cursor.parse_at_rule()?),
            Some(_) => nodes.push(cursor.parse_rule()?),
        }
    }

    Ok(nodes)
}

fn parse_declarations(src: &str) -> Result<Vec<Declaration>, CssError> {
    let mut cursor = Cursor::new(src);
    let mut declarations = Vec::new();

    loop {
        cursor.skip_whitespace();
        if cursor.peek().is_none() {
            break;
        }
        let (piece, stop) = cursor.read_until(&[';'])?;
        if stop.is_some() {
            cursor.bump();
        }
        if let Some(declaration) = parse_declaration(piece) {
            declarations.push(declaration);
        }
    }

    Ok(declarations)
}

fn parse_declaration(piece: &str) -> Option<Declaration> {
    let (property, value) = piece.split_once(':')?;
    let property = property.trim().to_ascii_lowercase();
    if property.is_empty()
        || !property
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return None;
    }

    let mut value = value.trim();
    let mut important = false;
    let lower = value.to_ascii_lowercase();
    if let Some(idx) = lower.rfind("!important")
        && lower[idx + "!important".len()..].trim().is_empty()
    {
        value = value[..idx].trim_end();
        important = true;
    }

    if value.is_empty() {
        return None;
    }

    Some(Declaration {
        property,
        value: value.to_owned(),
        important,
    })
}

/// Split a selector list on top-level commas and parse each selector.
fn parse_selector_list(src: &str) -> Vec<Selector> {
    split_top_level(src, ',')
        .into_iter()
        .filter_map(parse_selector)
        .collect()
}

fn parse_selector(src: &str) -> Option<Selector> {
    let mut cursor = Cursor::new(src);
    let mut parts = Vec::new();
    let mut current: Vec<Simple> = Vec::new();
    let mut current_combinator = None;
    let mut pending = None;

    loop {
        let had_space = cursor.skip_whitespace();
        let Some(c) = cursor.peek() else { break };

        if let Some(combinator) = combinator_for(c) {
            if current.is_empty() {
                return None;
            }
            parts.push((current_combinator.take(), std::mem::take(&mut current)));
            pending = Some(combinator);
            cursor.bump();
            continue;
        }

        if had_space && !current.is_empty() {
            parts.push((current_combinator.take(), std::mem::take(&mut current)));
            pending = Some(Combinator::Descendant);
        }
        if current.is_empty() && !parts.is_empty() {
            current_combinator = Some(pending.take()?);
        }
        current.push(cursor.parse_simple()?);
    }

    if current.is_empty() {
        return None;
    }
    parts.push((current_combinator, current));
    Some(Selector { parts })
}

fn combinator_for(c: char) -> Option<Combinator> {
    match c {
        '>' => Some(Combinator::Child),
        '+' => Some(Combinator::NextSibling),
        '~' => Some(Combinator::SubsequentSibling),
        _ => None,
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Split on `sep` outside of strings, parentheses and brackets.
fn split_top_level(src: &str, sep: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in src.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                pieces.push(&src[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&src[start..]);
    pieces
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    nested: bool,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            nested: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Returns whether anything was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        (self.pos > start).then(|| &self.src[start..self.pos])
    }

    fn skip_string(&mut self, quote: char) -> Result<(), CssError> {
        while let Some(c) = self.bump() {
            if c == '\\' {
                self.bump();
            } else if c == quote {
                return Ok(());
            }
        }
        Err(CssError::UnterminatedString)
    }

    /// Read up to the first top-level character in `stops` without consuming
    /// it. Braces that are not stop characters are structural errors.
    fn read_until(&mut self, stops: &[char]) -> Result<(&'a str, Option<char>), CssError> {
        let start = self.pos;
        let mut depth = 0usize;

        while let Some(c) = self.peek() {
            if depth == 0 && stops.contains(&c) {
                return Ok((&self.src[start..self.pos], Some(c)));
            }
            match c {
                '"' | '\'' => {
                    self.bump();
                    self.skip_string(c)?;
                    continue;
                }
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                '{' | '}' => {
                    return Err(CssError::Unexpected {
                        found: c,
                        offset: self.pos,
                    });
                }
                _ => {}
            }
            self.bump();
        }

        Ok((&self.src[start..self.pos], None))
    }

    /// Read a block body. The opening brace must already be consumed; the
    /// closing brace is consumed and not included.
    fn read_block(&mut self) -> Result<&'a str, CssError> {
        let start = self.pos;
        let mut depth = 1usize;

        while let Some(c) = self.bump() {
            match c {
                '"' | '\'' => self.skip_string(c)?,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&self.src[start..self.pos - 1]);
                    }
                }
                _ => {}
            }
        }

        Err(CssError::UnexpectedEof)
    }

    fn parse_at_rule(&mut self) -> Result<Node, CssError> {
        self.bump();
        let name = self.ident().unwrap_or_default().to_ascii_lowercase();

        match self.read_until(&['{', ';'])? {
            (_, Some(';')) => {
                self.bump();
                Ok(Node::AtRule(AtRule {
                    name,
                    rules: Vec::new(),
                }))
            }
            (_, Some(_)) => {
                self.bump();
                let body = self.read_block()?;
                let rules = if name == DARK_MODE_AT_RULE && !self.nested {
                    parse_nodes(body, true)?
                } else {
                    Vec::new()
                };
                Ok(Node::AtRule(AtRule { name, rules }))
            }
            (_, None) => Err(CssError::UnexpectedEof),
        }
    }

    fn parse_rule(&mut self) -> Result<Node, CssError> {
        let (selector_text, stop) = self.read_until(&['{', ';'])?;
        match stop {
            Some('{') => {}
            Some(found) => {
                return Err(CssError::Unexpected {
                    found,
                    offset: self.pos,
                });
            }
            None => return Err(CssError::UnexpectedEof),
        }
        self.bump();
        let body = self.read_block()?;

        Ok(Node::Rule(StyleRule {
            selectors: parse_selector_list(selector_text),
            declarations: parse_declarations(body)?,
        }))
    }

    fn parse_simple(&mut self) -> Option<Simple> {
        match self.peek()? {
            '*' => {
                self.bump();
                Some(Simple::Universal)
            }
            '#' => {
                self.bump();
                self.ident().map(|name| Simple::Id(name.to_owned()))
            }
            '.' => {
                self.bump();
                self.ident().map(|name| Simple::Class(name.to_owned()))
            }
            '[' => {
                self.bump();
                let (raw, stop) = self.read_until(&[']']).ok()?;
                stop?;
                self.bump();
                Some(Simple::Attribute(raw.to_owned()))
            }
            ':' => {
                self.bump();
                if self.peek() == Some(':') {
                    self.bump();
                    return self
                        .ident()
                        .map(|name| Simple::PseudoElement(name.to_ascii_lowercase()));
                }
                let name = self.ident()?.to_ascii_lowercase();
                let args = if self.peek() == Some('(') {
                    self.bump();
                    let (raw, stop) = self.read_until(&[')']).ok()?;
                    stop?;
                    self.bump();
                    Some(raw.trim().to_owned())
                } else {
                    None
                };
                Some(Simple::PseudoClass { name, args })
            }
            c if is_ident_char(c) => self
                .ident()
                .map(|name| Simple::Type(name.to_ascii_lowercase())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decl(property: &str, value: &str) -> Declaration {
        Declaration {
            property: property.to_owned(),
            value: value.to_owned(),
            important: false,
        }
    }

    #[test]
    fn test_parse_declaration_list() {
        let decls = parse_declaration_list("color: red; font-weight:bold ;").unwrap();
        assert_eq!(decls, vec![decl("color", "red"), decl("font-weight", "bold")]);
    }

    #[test]
    fn test_parse_important() {
        let decls = parse_declaration_list("color: red !IMPORTANT").unwrap();
        assert_eq!(decls.len(), 1);
        assert!(decls[0].important);
        assert_eq!(decls[0].value, "red");
    }

    #[test]
    fn test_semicolon_inside_string_is_not_a_separator() {
        let decls = parse_declaration_list(r#"font-family: "a;b", serif"#).unwrap();
        assert_eq!(decls, vec![decl("font-family", r#""a;b", serif"#)]);
    }

    #[test]
    fn test_declaration_without_colon_is_skipped() {
        let decls = parse_declaration_list("garbage; color: blue").unwrap();
        assert_eq!(decls, vec![decl("color", "blue")]);
    }

    #[test]
    fn test_comments_are_stripped() {
        let decls = parse_declaration_list("color: /* x */ red").unwrap();
        assert_eq!(decls[0].value, "red");
    }

    #[test]
    fn test_unterminated_comment() {
        assert_eq!(
            parse_declaration_list("color: red /* oops"),
            Err(CssError::UnterminatedComment)
        );
    }

    #[test]
    fn test_unterminated_block() {
        assert_eq!(
            parse_stylesheet(".a { color: red"),
            Err(CssError::UnexpectedEof)
        );
    }

    #[test]
    fn test_stray_close_brace() {
        assert!(matches!(
            parse_stylesheet("}"),
            Err(CssError::Unexpected { found: '}', .. })
        ));
    }

    #[test]
    fn test_parse_rule_with_selector_list() {
        let nodes = parse_stylesheet(".a, #b > td { color: red }").unwrap();
        let Node::Rule(rule) = &nodes[0] else {
            panic!("expected a rule");
        };
        assert_eq!(rule.selectors.len(), 2);
        assert_eq!(rule.selectors[0].to_string(), ".a");
        assert_eq!(rule.selectors[1].to_string(), "#b > td");
        assert_eq!(rule.declarations, vec![decl("color", "red")]);
    }

    #[test]
    fn test_descendant_combinator() {
        let selector = parse_selector(".a   p.b").unwrap();
        assert_eq!(selector.parts.len(), 2);
        assert_eq!(selector.parts[1].0, Some(Combinator::Descendant));
        assert_eq!(selector.to_string(), ".a p.b");
    }

    #[test]
    fn test_invalid_selectors_are_dropped() {
        assert!(parse_selector("> .a").is_none());
        assert!(parse_selector(".a >").is_none());
        assert!(parse_selector(".a > > .b").is_none());
        assert!(parse_selector("!x").is_none());
    }

    #[test]
    fn test_pseudo_selectors() {
        let selector = parse_selector("a:hover::before").unwrap();
        assert_eq!(
            selector.parts[0].1,
            vec![
                Simple::Type("a".to_owned()),
                Simple::PseudoClass {
                    name: "hover".to_owned(),
                    args: None
                },
                Simple::PseudoElement("before".to_owned()),
            ]
        );
    }

    #[test]
    fn test_dark_mode_at_rule_body_is_parsed() {
        let nodes = parse_stylesheet("@theseed-dark-mode { .a { color: white } }").unwrap();
        let Node::AtRule(at_rule) = &nodes[0] else {
            panic!("expected an at-rule");
        };
        assert_eq!(at_rule.name, "theseed-dark-mode");
        assert_eq!(at_rule.rules.len(), 1);
    }

    #[test]
    fn test_nested_dark_mode_body_is_not_parsed() {
        let nodes =
            parse_stylesheet("@theseed-dark-mode { @theseed-dark-mode { .a { color: red } } }")
                .unwrap();
        let Node::AtRule(outer) = &nodes[0] else {
            panic!("expected an at-rule");
        };
        let Node::AtRule(inner) = &outer.rules[0] else {
            panic!("expected an at-rule");
        };
        assert!(inner.rules.is_empty());
    }

    #[test]
    fn test_deeply_nested_dark_mode() {
        let depth = 50_000;
        let css = format!(
            "{}.a {{ color: red }}{}",
            "@theseed-dark-mode {".repeat(depth),
            "} ".repeat(depth)
        );
        let nodes = parse_stylesheet(&css).unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_other_at_rule_bodies_are_skipped() {
        let nodes = parse_stylesheet("@media print { .a { color: red } } @import 'x';").unwrap();
        assert_eq!(nodes.len(), 2);
        for node in nodes {
            let Node::AtRule(at_rule) = node else {
                panic!("expected an at-rule");
            };
            assert!(at_rule.rules.is_empty());
        }
    }
}
