//! Tokenizer for the script subset.

use crate::ExprError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    /// Identifier or keyword. Private names keep their leading `#`.
    Ident(String),
    Number,
    String,
    Regex,
    /// Template literal; one token list per `${...}` substitution.
    Template(Vec<Vec<Token>>),
    Punct(&'static str),
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
    /// A line terminator separates this token from the previous one.
    pub newline_before: bool,
}

/// Longest first.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==", "!=",
    "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=",
    "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-", "*", "/", "%",
    "&", "|", "^", "!", "~", "?", ":", "=", ".", "@",
];

/// Keywords after which a `/` starts a regular expression.
const KEYWORDS_BEFORE_EXPRESSION: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "await",
    "yield",
];

/// Split a snippet into tokens, ending with [`TokenKind::Eof`].
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let mut lexer = Lexer {
        src,
        pos: 0,
        templates: 0,
    };
    let mut tokens = lexer.run(false)?;
    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: src.len(),
        newline_before: true,
    });
    Ok(tokens)
}

/// Deepest nesting of template literals inside substitutions.
const MAX_TEMPLATE_DEPTH: usize = 64;

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    templates: usize,
}

impl Lexer<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: &str) -> ExprError {
        ExprError::syntax(self.pos, message)
    }

    /// Lex until end of input, or until the `}` closing a template
    /// substitution when `in_substitution` is set.
    fn run(&mut self, in_substitution: bool) -> Result<Vec<Token>, ExprError> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut depth = 0usize;

        loop {
            let newline_before = self.skip_trivia()?;
            let offset = self.pos;
            let Some(c) = self.peek() else {
                if in_substitution {
                    return Err(self.error("unterminated template substitution"));
                }
                return Ok(tokens);
            };

            let kind = if in_substitution && c == '}' && depth == 0 {
                self.bump();
                return Ok(tokens);
            } else if is_ident_start(c) || (c == '#' && self.peek_second().is_some_and(is_ident_start)) {
                self.bump();
                while self.peek().is_some_and(is_ident_part) {
                    self.bump();
                }
                TokenKind::Ident(self.src[offset..self.pos].to_owned())
            } else if c.is_ascii_digit() || (c == '.' && self.peek_second().is_some_and(|n| n.is_ascii_digit())) {
                self.number()?;
                TokenKind::Number
            } else if c == '"' || c == '\'' {
                self.string(c)?;
                TokenKind::String
            } else if c == '`' {
                self.bump();
                TokenKind::Template(self.template()?)
            } else if c == '/' && regex_allowed(tokens.last()) {
                self.regex()?;
                TokenKind::Regex
            } else {
                let punct = self.punct()?;
                match punct {
                    "{" => depth += 1,
                    "}" => depth = depth.saturating_sub(1),
                    _ => {}
                }
                TokenKind::Punct(punct)
            };

            tokens.push(Token {
                kind,
                offset,
                newline_before,
            });
        }
    }

    /// Skip whitespace and comments. Returns whether a line terminator was
    /// crossed.
    fn skip_trivia(&mut self) -> Result<bool, ExprError> {
        let mut newline = false;
        loop {
            match self.peek() {
                Some('\n' | '\r' | '\u{2028}' | '\u{2029}') => {
                    newline = true;
                    self.bump();
                }
                Some(c) if c.is_whitespace() || c == '\u{feff}' => {
                    self.bump();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                Some('/') if self.peek_second() == Some('*') => {
                    let start = self.pos;
                    let Some(end) = self.src[start + 2..].find("*/") else {
                        return Err(self.error("unterminated comment"));
                    };
                    if self.src[start..start + 2 + end].contains('\n') {
                        newline = true;
                    }
                    self.pos = start + 2 + end + 2;
                }
                _ => return Ok(newline),
            }
        }
    }

    fn number(&mut self) -> Result<(), ExprError> {
        let radix_prefix = self.peek() == Some('0')
            && matches!(self.peek_second(), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'));
        if radix_prefix {
            self.bump();
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
                self.bump();
            }
        } else {
            while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                self.bump();
            }
            if self.peek() == Some('.') {
                self.bump();
                while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                    self.bump();
                }
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    return Err(self.error("missing exponent"));
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }
        if self.peek() == Some('n') {
            self.bump();
        }
        if self.peek().is_some_and(is_ident_start) {
            return Err(self.error("identifier starts immediately after number"));
        }
        Ok(())
    }

    fn string(&mut self, quote: char) -> Result<(), ExprError> {
        self.bump();
        loop {
            match self.bump() {
                None | Some('\n' | '\r') => return Err(self.error("unterminated string")),
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    /// Called after the opening backquote.
    fn template(&mut self) -> Result<Vec<Vec<Token>>, ExprError> {
        if self.templates >= MAX_TEMPLATE_DEPTH {
            return Err(self.error("template literals nested too deep"));
        }
        self.templates += 1;
        let result = self.template_body();
        self.templates -= 1;
        result
    }

    fn template_body(&mut self) -> Result<Vec<Vec<Token>>, ExprError> {
        let mut substitutions = Vec::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated template")),
                Some('\\') => {
                    self.bump();
                }
                Some('`') => return Ok(substitutions),
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    let mut tokens = self.run(true)?;
                    tokens.push(Token {
                        kind: TokenKind::Eof,
                        offset: self.pos,
                        newline_before: true,
                    });
                    substitutions.push(tokens);
                }
                Some(_) => {}
            }
        }
    }

    fn regex(&mut self) -> Result<(), ExprError> {
        self.bump();
        let mut in_class = false;
        loop {
            match self.bump() {
                None | Some('\n' | '\r') => return Err(self.error("unterminated regular expression")),
                Some('\\') => {
                    self.bump();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some(_) => {}
            }
        }
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        Ok(())
    }

    fn punct(&mut self) -> Result<&'static str, ExprError> {
        let rest = self.rest();
        let Some(&punct) = PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) else {
            return Err(self.error("unexpected character"));
        };
        // `a?.5:b` is a conditional, not optional chaining.
        if punct == "?." && rest[2..].starts_with(|c: char| c.is_ascii_digit()) {
            self.pos += 1;
            return Ok("?");
        }
        self.pos += punct.len();
        Ok(punct)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\u{200c}' || c == '\u{200d}'
}

fn regex_allowed(previous: Option<&Token>) -> bool {
    match previous.map(|token| &token.kind) {
        None => true,
        Some(TokenKind::Punct(p)) => !matches!(*p, ")" | "]" | "}" | "++" | "--"),
        Some(TokenKind::Ident(name)) => KEYWORDS_BEFORE_EXPRESSION.contains(&name.as_str()),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_template_nesting_limit() {
        let nested = |depth: usize| format!("{}1{}", "`${".repeat(depth), "}`".repeat(depth));
        assert!(tokenize(&nested(MAX_TEMPLATE_DEPTH)).is_ok());
        let err = tokenize(&nested(10_000)).unwrap_err();
        assert!(matches!(err, ExprError::Syntax { .. }));
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_expression() {
        assert_eq!(
            kinds("a && b.includes(c)"),
            vec![
                TokenKind::Ident("a".to_owned()),
                TokenKind::Punct("&&"),
                TokenKind::Ident("b".to_owned()),
                TokenKind::Punct("."),
                TokenKind::Ident("includes".to_owned()),
                TokenKind::Punct("("),
                TokenKind::Ident("c".to_owned()),
                TokenKind::Punct(")"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_longest_punctuator_wins() {
        assert_eq!(
            kinds("a >>>= 1"),
            vec![
                TokenKind::Ident("a".to_owned()),
                TokenKind::Punct(">>>="),
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_division_versus_regex() {
        assert_eq!(
            kinds("a / b"),
            vec![
                TokenKind::Ident("a".to_owned()),
                TokenKind::Punct("/"),
                TokenKind::Ident("b".to_owned()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("/a[/]b/gi.test(x)")[0],
            TokenKind::Regex
        );
    }

    #[test]
    fn test_template_substitutions() {
        let tokens = kinds("`a${b + `c${d}`}e`");
        let TokenKind::Template(subs) = &tokens[0] else {
            panic!("expected template, got {tokens:?}");
        };
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0][0].kind, TokenKind::Ident("b".to_owned()));
        assert!(matches!(subs[0][2].kind, TokenKind::Template(_)));
    }

    #[test]
    fn test_object_in_template_substitution() {
        let tokens = kinds("`${ {a: 1}.a }`");
        let TokenKind::Template(subs) = &tokens[0] else {
            panic!("expected template");
        };
        assert_eq!(subs[0].last().unwrap().kind, TokenKind::Eof);
        assert_eq!(subs[0].len(), 8);
    }

    #[test]
    fn test_newline_flag() {
        let tokens = tokenize("a\nb /* x */ c").unwrap();
        assert!(!tokens[0].newline_before);
        assert!(tokens[1].newline_before);
        assert!(!tokens[2].newline_before);
    }

    #[test]
    fn test_optional_chain_versus_conditional() {
        assert_eq!(kinds("a?.b")[1], TokenKind::Punct("?."));
        assert_eq!(kinds("a?.5:1")[1], TokenKind::Punct("?"));
    }

    #[test]
    fn test_lex_errors() {
        assert!(tokenize("'abc").is_err());
        assert!(tokenize("/* open").is_err());
        assert!(tokenize("`${a`").is_err());
        assert!(tokenize("3in x").is_err());
        assert!(tokenize("a \u{1} b").is_err());
    }
}
