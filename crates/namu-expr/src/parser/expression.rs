use super::Parser;
use crate::ExprError;
use crate::ast::{Node, NodeKind};
use crate::lexer::{Token, TokenKind};

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=", "||=",
    "??=",
];

const PREFIX_OPERATORS: &[&str] = &["!", "~", "+", "-"];
const PREFIX_KEYWORDS: &[&str] = &["typeof", "void", "delete", "await"];

/// Infix binding powers: `(left, right)`. Left-associative operators bind
/// `right = left + 1`; `**` is right-associative.
fn infix_bp(operator: &str) -> Option<(u8, u8)> {
    let bp = match operator {
        "??" => (1, 2),
        "||" => (3, 4),
        "&&" => (5, 6),
        "|" => (7, 8),
        "^" => (9, 10),
        "&" => (11, 12),
        "==" | "!=" | "===" | "!==" => (13, 14),
        "<" | ">" | "<=" | ">=" | "instanceof" | "in" => (15, 16),
        "<<" | ">>" | ">>>" => (17, 18),
        "+" | "-" => (19, 20),
        "*" | "/" | "%" => (21, 22),
        "**" => (24, 23),
        _ => return None,
    };
    Some(bp)
}

impl Parser {
    /// Comma-separated sequence.
    pub(super) fn parse_expression(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        let first = self.parse_assignment()?;
        if !self.is_punct(",") {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat_punct(",") {
            items.push(self.parse_assignment()?);
        }
        Ok(Node::new(NodeKind::Sequence, offset, items))
    }

    pub(super) fn parse_assignment(&mut self) -> Result<Node, ExprError> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> Result<Node, ExprError> {
        if self.is_arrow_ahead() {
            return self.parse_arrow();
        }

        let offset = self.offset();
        let target = self.parse_conditional()?;
        let is_assignment = matches!(self.peek().kind, TokenKind::Punct(p) if ASSIGNMENT_OPERATORS.contains(&p));
        if !is_assignment {
            return Ok(target);
        }
        self.advance();
        let value = self.parse_assignment()?;
        Ok(Node::new(NodeKind::Assignment, offset, vec![target, value]))
    }

    fn parse_conditional(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        let test = self.parse_binary(0)?;
        if !self.eat_punct("?") {
            return Ok(test);
        }
        let consequent = self.allow_in(Self::parse_assignment)?;
        self.expect_punct(":")?;
        let alternate = self.parse_assignment()?;
        Ok(Node::new(
            NodeKind::Conditional,
            offset,
            vec![test, consequent, alternate],
        ))
    }

    fn parse_binary(&mut self, min_bp: u8) -> Result<Node, ExprError> {
        let offset = self.offset();
        let mut left = self.parse_unary()?;

        loop {
            let operator = match &self.peek().kind {
                TokenKind::Punct(p) => *p,
                TokenKind::Ident(name) if name == "instanceof" => "instanceof",
                TokenKind::Ident(name) if name == "in" && !self.no_in => "in",
                _ => break,
            };
            let Some((l_bp, r_bp)) = infix_bp(operator) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }

            self.advance();
            let right = self.parse_binary(r_bp)?;
            let kind = if matches!(operator, "&&" | "||" | "??") {
                NodeKind::Logical
            } else {
                NodeKind::Binary
            };
            left = Node::new(kind, offset, vec![left, right]);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node, ExprError> {
        self.nested(Self::unary)
    }

    fn unary(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        let kind = match &self.peek().kind {
            TokenKind::Punct(p) if PREFIX_OPERATORS.contains(p) => Some(NodeKind::Unary),
            TokenKind::Punct("++" | "--") => Some(NodeKind::Update),
            TokenKind::Ident(name) if PREFIX_KEYWORDS.contains(&name.as_str()) => {
                Some(NodeKind::Unary)
            }
            _ => None,
        };
        let Some(kind) = kind else {
            return self.parse_postfix();
        };

        self.advance();
        let argument = self.parse_unary()?;
        Ok(Node::new(kind, offset, vec![argument]))
    }

    fn parse_postfix(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        let expression = self.parse_call_member(true)?;
        if (self.is_punct("++") || self.is_punct("--")) && !self.peek().newline_before {
            self.advance();
            return Ok(Node::new(NodeKind::Update, offset, vec![expression]));
        }
        Ok(expression)
    }

    /// Member accesses, calls and tagged templates. Calls are left for the
    /// caller when parsing the callee of `new`.
    fn parse_call_member(&mut self, allow_call: bool) -> Result<Node, ExprError> {
        let offset = self.offset();
        let mut expression = if self.is_keyword("new") {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            if self.eat_punct(".") {
                let property = self.parse_property_name()?;
                expression = Node::new(NodeKind::Member, offset, vec![expression, property]);
            } else if self.is_punct("?.") {
                if !allow_call {
                    return Err(self.error("optional chain in `new` callee"));
                }
                self.advance();
                expression = if self.is_punct("(") {
                    let mut children = vec![expression];
                    children.extend(self.parse_arguments()?);
                    Node::new(NodeKind::Call, offset, children)
                } else if self.eat_punct("[") {
                    let property = self.allow_in(Self::parse_expression)?;
                    self.expect_punct("]")?;
                    Node::new(NodeKind::Member, offset, vec![expression, property])
                } else {
                    let property = self.parse_property_name()?;
                    Node::new(NodeKind::Member, offset, vec![expression, property])
                };
            } else if self.eat_punct("[") {
                let property = self.allow_in(Self::parse_expression)?;
                self.expect_punct("]")?;
                expression = Node::new(NodeKind::Member, offset, vec![expression, property]);
            } else if allow_call && self.is_punct("(") {
                let mut children = vec![expression];
                children.extend(self.parse_arguments()?);
                expression = Node::new(NodeKind::Call, offset, children);
            } else if matches!(self.peek().kind, TokenKind::Template(_)) {
                let template = self.parse_primary()?;
                expression = Node::new(
                    NodeKind::TaggedTemplate,
                    offset,
                    vec![expression, template],
                );
            } else {
                return Ok(expression);
            }
        }
    }

    fn parse_new(&mut self) -> Result<Node, ExprError> {
        let offset = self.advance().offset;
        if self.eat_punct(".") {
            // new.target
            self.parse_property_name()?;
            return Ok(Node::leaf(NodeKind::Identifier, offset));
        }
        let mut children = vec![self.nested(|p| p.parse_call_member(false))?];
        if self.is_punct("(") {
            children.extend(self.parse_arguments()?);
        }
        Ok(Node::new(NodeKind::New, offset, children))
    }

    /// Name after `.`: any identifier, keywords and private names included.
    fn parse_property_name(&mut self) -> Result<Node, ExprError> {
        match self.peek().kind {
            TokenKind::Ident(_) => Ok(Node::leaf(NodeKind::Identifier, self.advance().offset)),
            _ => Err(self.error("expected property name")),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Node>, ExprError> {
        self.expect_punct("(")?;
        self.allow_in(|parser| {
            let mut arguments = Vec::new();
            while !parser.eat_punct(")") {
                arguments.push(parser.parse_spread_or_assignment()?);
                if !parser.is_punct(")") {
                    parser.expect_punct(",")?;
                }
            }
            Ok(arguments)
        })
    }

    fn parse_spread_or_assignment(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        if self.eat_punct("...") {
            let argument = self.parse_assignment()?;
            return Ok(Node::new(NodeKind::Spread, offset, vec![argument]));
        }
        self.parse_assignment()
    }

    fn parse_primary(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Number | TokenKind::String => {
                self.advance();
                Ok(Node::leaf(NodeKind::Literal, offset))
            }
            TokenKind::Regex => {
                self.advance();
                Ok(Node::leaf(NodeKind::Regex, offset))
            }
            TokenKind::Template(substitutions) => {
                self.advance();
                let mut children = Vec::with_capacity(substitutions.len());
                for tokens in substitutions {
                    children.push(parse_substitution(tokens, self.depth)?);
                }
                Ok(Node::new(NodeKind::Template, offset, children))
            }
            TokenKind::Punct("(") => {
                self.advance();
                let expression = self.allow_in(Self::parse_expression)?;
                self.expect_punct(")")?;
                Ok(expression)
            }
            TokenKind::Punct("[") => self.parse_array(),
            TokenKind::Punct("{") => self.parse_object(),
            TokenKind::Ident(name) => self.parse_identifier_like(&name, offset),
            TokenKind::Punct(p) => Err(self.error(format!("unexpected `{p}`"))),
            TokenKind::Eof => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_identifier_like(&mut self, name: &str, offset: usize) -> Result<Node, ExprError> {
        match name {
            "function" => self.parse_function(NodeKind::FunctionExpression),
            "async" if self.is_keyword_at(1, "function") && !self.peek_at(1).newline_before => {
                self.advance();
                self.parse_function(NodeKind::FunctionExpression)
            }
            "class" => self.parse_class(NodeKind::ClassExpression),
            "this" => {
                self.advance();
                Ok(Node::leaf(NodeKind::This, offset))
            }
            "super" => {
                self.advance();
                Ok(Node::leaf(NodeKind::Super, offset))
            }
            "true" | "false" | "null" => {
                self.advance();
                Ok(Node::leaf(NodeKind::Literal, offset))
            }
            _ if self.is_binding_ident() => {
                self.advance();
                Ok(Node::leaf(NodeKind::Identifier, offset))
            }
            _ => Err(self.error(format!("unexpected `{name}`"))),
        }
    }

    fn parse_array(&mut self) -> Result<Node, ExprError> {
        let offset = self.expect_punct("[")?;
        self.allow_in(|parser| {
            let mut elements = Vec::new();
            while !parser.eat_punct("]") {
                if parser.eat_punct(",") {
                    continue;
                }
                elements.push(parser.parse_spread_or_assignment()?);
                if !parser.is_punct("]") {
                    parser.expect_punct(",")?;
                }
            }
            Ok(Node::new(NodeKind::Array, offset, elements))
        })
    }

    fn parse_object(&mut self) -> Result<Node, ExprError> {
        let offset = self.expect_punct("{")?;
        self.allow_in(|parser| {
            let mut members = Vec::new();
            while !parser.eat_punct("}") {
                members.push(parser.parse_object_member()?);
                if !parser.is_punct("}") {
                    parser.expect_punct(",")?;
                }
            }
            Ok(Node::new(NodeKind::Object, offset, members))
        })
    }

    fn parse_object_member(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        if self.eat_punct("...") {
            let argument = self.parse_assignment()?;
            return Ok(Node::new(NodeKind::Spread, offset, vec![argument]));
        }

        if let Some(kind) = self.accessor_ahead() {
            self.advance();
            return self.parse_method(kind);
        }
        if self.modifier_ahead("async") {
            self.advance();
        }
        if self.eat_punct("*") {
            return self.parse_method(NodeKind::Method);
        }

        let key = self.parse_property_key()?;
        if self.is_punct("(") {
            let mut method = self.parse_method_tail(NodeKind::Method, offset)?;
            method.children.insert(0, key);
            return Ok(method);
        }
        if self.eat_punct(":") {
            let value = self.parse_assignment()?;
            return Ok(Node::new(NodeKind::Property, offset, vec![key, value]));
        }
        if self.eat_punct("=") {
            // Default in a destructuring pattern: `{ a = 1 } = o`.
            let value = self.parse_assignment()?;
            return Ok(Node::new(NodeKind::Property, offset, vec![key, value]));
        }
        Ok(Node::new(NodeKind::Property, offset, vec![key]))
    }

    /// Object or class key: identifier, string, number, private name or
    /// `[computed]`.
    pub(super) fn parse_property_key(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        match self.peek().kind {
            TokenKind::Ident(_) => {
                self.advance();
                Ok(Node::leaf(NodeKind::Identifier, offset))
            }
            TokenKind::String | TokenKind::Number => {
                self.advance();
                Ok(Node::leaf(NodeKind::Literal, offset))
            }
            TokenKind::Punct("[") => {
                self.advance();
                let key = self.allow_in(Self::parse_assignment)?;
                self.expect_punct("]")?;
                Ok(key)
            }
            _ => Err(self.error("expected property key")),
        }
    }

    /// `get`/`set` followed by a key starts an accessor.
    pub(super) fn accessor_ahead(&self) -> Option<NodeKind> {
        if self.modifier_ahead("get") {
            Some(NodeKind::Getter)
        } else if self.modifier_ahead("set") {
            Some(NodeKind::Setter)
        } else {
            None
        }
    }

    /// A contextual keyword acts as a modifier when a key follows it rather
    /// than `(`, `:`, `=`, `,`, `;` or `}`.
    pub(super) fn modifier_ahead(&self, keyword: &str) -> bool {
        if !self.is_keyword(keyword) {
            return false;
        }
        match &self.peek_at(1).kind {
            TokenKind::Punct(p) => *p == "[" || *p == "*",
            TokenKind::Ident(_) | TokenKind::String | TokenKind::Number => {
                !self.peek_at(1).newline_before || keyword != "async"
            }
            _ => false,
        }
    }

    /// Key and function tail of a method or accessor.
    pub(super) fn parse_method(&mut self, kind: NodeKind) -> Result<Node, ExprError> {
        let offset = self.offset();
        let key = self.parse_property_key()?;
        let mut method = self.parse_method_tail(kind, offset)?;
        method.children.insert(0, key);
        Ok(method)
    }

    /// `(params) { body }`
    pub(super) fn parse_method_tail(&mut self, kind: NodeKind, offset: usize) -> Result<Node, ExprError> {
        let mut children = self.parse_parameters()?;
        children.push(self.parse_block()?);
        Ok(Node::new(kind, offset, children))
    }

    pub(super) fn parse_function(&mut self, kind: NodeKind) -> Result<Node, ExprError> {
        let offset = self.expect_keyword("function")?;
        self.eat_punct("*");
        let mut children = Vec::new();
        if self.is_binding_ident() {
            children.push(self.expect_binding_ident()?);
        } else if kind == NodeKind::FunctionDeclaration {
            return Err(self.error("function declaration needs a name"));
        }
        children.extend(self.parse_parameters()?);
        children.push(self.parse_block()?);
        Ok(Node::new(kind, offset, children))
    }

    fn parse_parameters(&mut self) -> Result<Vec<Node>, ExprError> {
        self.expect_punct("(")?;
        self.allow_in(|parser| {
            let mut parameters = Vec::new();
            while !parser.eat_punct(")") {
                parameters.push(parser.parse_binding_element()?);
                if !parser.is_punct(")") {
                    parser.expect_punct(",")?;
                }
            }
            Ok(parameters)
        })
    }

    /// Parameter: optional rest, target, optional default.
    fn parse_binding_element(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        if self.eat_punct("...") {
            let target = self.parse_binding_target()?;
            return Ok(Node::new(NodeKind::Spread, offset, vec![target]));
        }
        let target = self.parse_binding_target()?;
        if self.eat_punct("=") {
            let default = self.parse_assignment()?;
            return Ok(Node::new(NodeKind::Assignment, offset, vec![target, default]));
        }
        Ok(target)
    }

    /// Identifier or array/object destructuring pattern.
    pub(super) fn parse_binding_target(&mut self) -> Result<Node, ExprError> {
        if self.is_punct("[") {
            self.parse_array()
        } else if self.is_punct("{") {
            self.parse_object()
        } else {
            self.expect_binding_ident()
        }
    }

    fn is_arrow_ahead(&self) -> bool {
        let start = usize::from(
            self.is_keyword("async")
                && !self.peek_at(1).newline_before
                && (self.is_binding_ident_at(1) || self.is_punct_at(1, "(")),
        );

        if self.is_binding_ident_at(start) {
            return self.is_punct_at(start + 1, "=>") && !self.peek_at(start + 1).newline_before;
        }
        if !self.is_punct_at(start, "(") {
            return false;
        }

        let mut depth = 0usize;
        let mut n = start;
        loop {
            match &self.peek_at(n).kind {
                TokenKind::Punct("(" | "[" | "{") => depth += 1,
                TokenKind::Punct(")" | "]" | "}") => {
                    depth -= 1;
                    if depth == 0 {
                        return self.is_punct_at(n + 1, "=>");
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            n += 1;
        }
    }

    fn parse_arrow(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        if self.is_keyword("async") && !self.is_punct_at(1, "=>") {
            self.advance();
        }

        let mut children = if self.is_punct("(") {
            self.parse_parameters()?
        } else {
            vec![self.expect_binding_ident()?]
        };
        self.expect_punct("=>")?;

        if self.is_punct("{") {
            children.push(self.parse_block()?);
        } else {
            children.push(self.parse_assignment()?);
        }
        Ok(Node::new(NodeKind::ArrowFunction, offset, children))
    }

    pub(super) fn parse_class(&mut self, kind: NodeKind) -> Result<Node, ExprError> {
        let offset = self.expect_keyword("class")?;
        let mut children = Vec::new();
        if self.is_binding_ident() && !self.is_keyword("extends") {
            children.push(self.expect_binding_ident()?);
        } else if kind == NodeKind::ClassDeclaration {
            return Err(self.error("class declaration needs a name"));
        }
        if self.eat_keyword("extends") {
            children.push(self.nested(|p| p.parse_call_member(true))?);
        }

        self.expect_punct("{")?;
        while !self.eat_punct("}") {
            if self.eat_punct(";") {
                continue;
            }
            if self.at_end() {
                return Err(self.error("expected `}`"));
            }
            children.push(self.parse_class_member()?);
        }
        Ok(Node::new(kind, offset, children))
    }

    fn parse_class_member(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        if self.is_keyword("static") && self.is_punct_at(1, "{") {
            self.advance();
            let block = self.parse_block()?;
            return Ok(Node::new(NodeKind::StaticBlock, offset, vec![block]));
        }
        if self.modifier_ahead("static") {
            self.advance();
        }

        if let Some(kind) = self.accessor_ahead() {
            self.advance();
            return self.parse_method(kind);
        }
        if self.modifier_ahead("async") {
            self.advance();
        }
        if self.eat_punct("*") {
            return self.parse_method(NodeKind::Method);
        }

        let key = self.parse_property_key()?;
        if self.is_punct("(") {
            let mut method = self.parse_method_tail(NodeKind::Method, offset)?;
            method.children.insert(0, key);
            return Ok(method);
        }

        let mut children = vec![key];
        if self.eat_punct("=") {
            children.push(self.allow_in(Self::parse_assignment)?);
        }
        self.consume_semicolon()?;
        Ok(Node::new(NodeKind::ClassField, offset, children))
    }
}

/// Parse the tokens of one `${...}` substitution as a full expression,
/// `depth` levels below the top.
fn parse_substitution(tokens: Vec<Token>, depth: usize) -> Result<Node, ExprError> {
    let mut parser = Parser::new(tokens);
    parser.depth = depth;
    let expression = parser.parse_expression()?;
    if !parser.at_end() {
        return Err(parser.error("unexpected token in template substitution"));
    }
    Ok(expression)
}
