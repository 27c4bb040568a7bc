//! Recursive-descent statement parser with a Pratt expression parser.
//!
//! The accepted language is the everyday script subset: statements,
//! expressions, object and array literals, template literals, functions and
//! classes. Modules, generators' `yield` and `with` are not supported and
//! fail to parse.

mod expression;
mod statement;

use crate::ExprError;
use crate::ast::{Node, NodeKind};
use crate::lexer::{Token, TokenKind, tokenize};

/// Deepest nesting of statements and expressions the parser accepts.
const MAX_DEPTH: usize = 256;

/// Keywords that can never start an expression.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "const", "continue", "debugger", "default", "do", "else", "enum",
    "export", "extends", "finally", "for", "if", "import", "in", "instanceof", "let", "return",
    "switch", "throw", "try", "var", "while", "with",
];

/// Parse a snippet into a [`NodeKind::Program`] node.
pub(crate) fn parse(src: &str) -> Result<Node, ExprError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser::new(tokens);
    let mut body = Vec::new();
    while !parser.at_end() {
        body.push(parser.parse_statement()?);
    }
    Ok(Node::new(NodeKind::Program, 0, body))
}

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Set while parsing a `for` head, where `in` ends the initializer.
    no_in: bool,
    depth: usize,
}

impl Parser {
    /// `tokens` must end with [`TokenKind::Eof`].
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            no_in: false,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn offset(&self) -> usize {
        self.peek().offset
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn error(&self, message: impl Into<String>) -> ExprError {
        ExprError::syntax(self.offset(), message)
    }

    fn is_punct(&self, punct: &str) -> bool {
        self.is_punct_at(0, punct)
    }

    fn is_punct_at(&self, n: usize, punct: &str) -> bool {
        matches!(self.peek_at(n).kind, TokenKind::Punct(p) if p == punct)
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        if self.is_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: &str) -> Result<usize, ExprError> {
        if self.is_punct(punct) {
            Ok(self.advance().offset)
        } else {
            Err(self.error(format!("expected `{punct}`")))
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        self.is_keyword_at(0, keyword)
    }

    fn is_keyword_at(&self, n: usize, keyword: &str) -> bool {
        matches!(&self.peek_at(n).kind, TokenKind::Ident(name) if name == keyword)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<usize, ExprError> {
        if self.is_keyword(keyword) {
            Ok(self.advance().offset)
        } else {
            Err(self.error(format!("expected `{keyword}`")))
        }
    }

    /// Identifier that is not a reserved word.
    fn is_binding_ident(&self) -> bool {
        self.is_binding_ident_at(0)
    }

    fn is_binding_ident_at(&self, n: usize) -> bool {
        matches!(&self.peek_at(n).kind, TokenKind::Ident(name)
            if !RESERVED.contains(&name.as_str()) && !name.starts_with('#'))
    }

    fn expect_binding_ident(&mut self) -> Result<Node, ExprError> {
        if self.is_binding_ident() {
            Ok(Node::leaf(NodeKind::Identifier, self.advance().offset))
        } else {
            Err(self.error("expected identifier"))
        }
    }

    /// Automatic semicolon insertion: a statement also ends before `}`, at
    /// end of input or at a line break.
    fn consume_semicolon(&mut self) -> Result<(), ExprError> {
        if self.eat_punct(";") || self.is_punct("}") || self.at_end() || self.peek().newline_before {
            Ok(())
        } else {
            Err(self.error("expected `;`"))
        }
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Run `f` with `in` treated as an operator again.
    fn allow_in<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let result = f(self);
        self.no_in = saved;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<NodeKind> {
        let program = parse(src).unwrap();
        let mut kinds = Vec::new();
        program.walk(&mut |node| {
            kinds.push(node.kind);
            true
        });
        kinds
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(kinds(""), vec![NodeKind::Program]);
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            kinds("a || b && c"),
            vec![
                NodeKind::Program,
                NodeKind::ExpressionStatement,
                NodeKind::Logical,
                NodeKind::Identifier,
                NodeKind::Logical,
                NodeKind::Identifier,
                NodeKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_member_call() {
        assert_eq!(
            kinds("a.b(c)"),
            vec![
                NodeKind::Program,
                NodeKind::ExpressionStatement,
                NodeKind::Call,
                NodeKind::Member,
                NodeKind::Identifier,
                NodeKind::Identifier,
                NodeKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_arrow_detection() {
        assert!(kinds("(a, b) => a + b").contains(&NodeKind::ArrowFunction));
        assert!(kinds("x => x").contains(&NodeKind::ArrowFunction));
        assert!(kinds("async (x) => x").contains(&NodeKind::ArrowFunction));
        assert!(!kinds("(a, b)").contains(&NodeKind::ArrowFunction));
    }

    #[test]
    fn test_object_members() {
        let kinds = kinds("({ a: 1, b, [c]: 2, d() {}, get e() { return 1 }, ...f })");
        assert!(kinds.contains(&NodeKind::Method));
        assert!(kinds.contains(&NodeKind::Getter));
        assert!(kinds.contains(&NodeKind::Spread));
        assert_eq!(kinds.iter().filter(|k| **k == NodeKind::Property).count(), 3);
    }

    #[test]
    fn test_statements() {
        let kinds = kinds(
            "let x = 1, y;\nif (x) { y = 2 } else y = 3\nfor (const k of list) continue\nfor (k in o);\nfor (let i = 0; i < 3; i++) {}\ntry { throw e } catch (e) {} finally {}\nswitch (x) { case 1: break; default: }\nlabel: x",
        );
        for kind in [
            NodeKind::VariableDeclaration,
            NodeKind::If,
            NodeKind::ForOf,
            NodeKind::ForIn,
            NodeKind::For,
            NodeKind::Try,
            NodeKind::Catch,
            NodeKind::Throw,
            NodeKind::Switch,
            NodeKind::SwitchCase,
            NodeKind::Labeled,
        ] {
            assert!(kinds.contains(&kind), "missing {kind:?}");
        }
    }

    #[test]
    fn test_class_members() {
        let kinds = kinds("class A extends B { static x = 1; #y; constructor() { super() } static { } set z(v) {} }");
        assert!(kinds.contains(&NodeKind::ClassDeclaration));
        assert!(kinds.contains(&NodeKind::ClassField));
        assert!(kinds.contains(&NodeKind::StaticBlock));
        assert!(kinds.contains(&NodeKind::Method));
        assert!(kinds.contains(&NodeKind::Setter));
        assert!(kinds.contains(&NodeKind::Super));
    }

    #[test]
    fn test_template_substitution_is_parsed() {
        assert!(kinds("`${() => 1}`").contains(&NodeKind::ArrowFunction));
        assert!(kinds("tag`x`").contains(&NodeKind::TaggedTemplate));
    }

    #[test]
    fn test_syntax_errors() {
        for src in ["a +", "(a", "if x", "a b", "{", "let", "x => ", "a.", "new", "for (;;"] {
            assert!(parse(src).is_err(), "{src} should not parse");
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(parse(&deep).is_err());
        let shallow = format!("{}1{}", "(".repeat(MAX_DEPTH / 2), ")".repeat(MAX_DEPTH / 2));
        assert!(parse(&shallow).is_ok());
        assert!(parse(&"!".repeat(10_000)).is_err());
        assert!(parse(&"{".repeat(10_000)).is_err());
    }

    #[test]
    fn test_long_chains_parse() {
        let sum = vec!["a"; 100_000].join(" + ");
        assert!(parse(&sum).is_ok());
        let member = format!("a{}", ".b()".repeat(50_000));
        assert!(parse(&member).is_ok());
    }

    #[test]
    fn test_asi() {
        assert!(parse("a\nb").is_ok());
        assert!(parse("{ a } b").is_ok());
    }
}
