use super::Parser;
use crate::ExprError;
use crate::ast::{Node, NodeKind};
use crate::lexer::TokenKind;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> Result<Node, ExprError> {
        self.nested(Self::statement)
    }

    fn statement(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();

        if self.is_punct("{") {
            return self.parse_block();
        }
        if self.eat_punct(";") {
            return Ok(Node::leaf(NodeKind::Empty, offset));
        }

        let keyword = match &self.peek().kind {
            TokenKind::Ident(name) => name.clone(),
            _ => return self.parse_expression_statement(),
        };

        match keyword.as_str() {
            "var" | "let" | "const" => {
                let declaration = self.parse_variable_declaration()?;
                self.consume_semicolon()?;
                Ok(declaration)
            }
            "if" => self.parse_if(),
            "for" => self.parse_for(),
            "while" => {
                self.advance();
                let test = self.parse_parenthesized()?;
                let body = self.parse_statement()?;
                Ok(Node::new(NodeKind::While, offset, vec![test, body]))
            }
            "do" => {
                self.advance();
                let body = self.parse_statement()?;
                self.expect_keyword("while")?;
                let test = self.parse_parenthesized()?;
                self.eat_punct(";");
                Ok(Node::new(NodeKind::DoWhile, offset, vec![body, test]))
            }
            "return" | "throw" => {
                self.advance();
                let mut children = Vec::new();
                let ends = self.is_punct(";")
                    || self.is_punct("}")
                    || self.at_end()
                    || self.peek().newline_before;
                if ends {
                    if keyword == "throw" {
                        return Err(self.error("`throw` needs an expression"));
                    }
                } else {
                    children.push(self.parse_expression()?);
                }
                self.consume_semicolon()?;
                let kind = if keyword == "return" {
                    NodeKind::Return
                } else {
                    NodeKind::Throw
                };
                Ok(Node::new(kind, offset, children))
            }
            "break" | "continue" => {
                self.advance();
                let mut children = Vec::new();
                if self.is_binding_ident() && !self.peek().newline_before {
                    children.push(self.expect_binding_ident()?);
                }
                self.consume_semicolon()?;
                let kind = if keyword == "break" {
                    NodeKind::Break
                } else {
                    NodeKind::Continue
                };
                Ok(Node::new(kind, offset, children))
            }
            "debugger" => {
                self.advance();
                self.consume_semicolon()?;
                Ok(Node::leaf(NodeKind::Debugger, offset))
            }
            "try" => self.parse_try(),
            "switch" => self.parse_switch(),
            "function" => self.parse_function(NodeKind::FunctionDeclaration),
            "async" if self.is_keyword_at(1, "function") && !self.peek_at(1).newline_before => {
                self.advance();
                self.parse_function(NodeKind::FunctionDeclaration)
            }
            "class" => self.parse_class(NodeKind::ClassDeclaration),
            _ if self.is_binding_ident() && self.is_punct_at(1, ":") => {
                let label = self.expect_binding_ident()?;
                self.advance();
                let body = self.parse_statement()?;
                Ok(Node::new(NodeKind::Labeled, offset, vec![label, body]))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Node, ExprError> {
        let offset = self.offset();
        let expression = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Node::new(
            NodeKind::ExpressionStatement,
            offset,
            vec![expression],
        ))
    }

    pub(super) fn parse_block(&mut self) -> Result<Node, ExprError> {
        let offset = self.expect_punct("{")?;
        let mut body = Vec::new();
        while !self.eat_punct("}") {
            if self.at_end() {
                return Err(self.error("expected `}`"));
            }
            body.push(self.parse_statement()?);
        }
        Ok(Node::new(NodeKind::Block, offset, body))
    }

    fn parse_parenthesized(&mut self) -> Result<Node, ExprError> {
        self.expect_punct("(")?;
        let expression = self.allow_in(Self::parse_expression)?;
        self.expect_punct(")")?;
        Ok(expression)
    }

    /// `var`/`let`/`const` with its declarators, without the terminator.
    fn parse_variable_declaration(&mut self) -> Result<Node, ExprError> {
        let offset = self.advance().offset;
        let mut declarators = Vec::new();
        loop {
            let target = self.parse_binding_target()?;
            if self.eat_punct("=") {
                let init = self.parse_assignment()?;
                declarators.push(Node::new(
                    NodeKind::Assignment,
                    target.offset,
                    vec![target, init],
                ));
            } else {
                declarators.push(target);
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(Node::new(
            NodeKind::VariableDeclaration,
            offset,
            declarators,
        ))
    }

    fn parse_if(&mut self) -> Result<Node, ExprError> {
        let offset = self.advance().offset;
        let test = self.parse_parenthesized()?;
        let consequent = self.parse_statement()?;
        let mut children = vec![test, consequent];
        if self.eat_keyword("else") {
            children.push(self.parse_statement()?);
        }
        Ok(Node::new(NodeKind::If, offset, children))
    }

    fn parse_for(&mut self) -> Result<Node, ExprError> {
        let offset = self.advance().offset;
        if self.is_keyword("await") {
            self.advance();
        }
        self.expect_punct("(")?;

        let mut children = Vec::new();
        if !self.is_punct(";") {
            self.no_in = true;
            let init = if self.is_keyword("var") || self.is_keyword("let") || self.is_keyword("const") {
                self.parse_variable_declaration()
            } else {
                self.parse_expression()
            };
            self.no_in = false;
            let init = init?;

            let each = if self.is_keyword("of") {
                Some(NodeKind::ForOf)
            } else if self.is_keyword("in") {
                Some(NodeKind::ForIn)
            } else {
                None
            };
            if let Some(kind) = each {
                self.advance();
                let right = self.allow_in(Self::parse_expression)?;
                self.expect_punct(")")?;
                let body = self.parse_statement()?;
                return Ok(Node::new(kind, offset, vec![init, right, body]));
            }
            children.push(init);
        }

        self.expect_punct(";")?;
        if !self.is_punct(";") {
            children.push(self.allow_in(Self::parse_expression)?);
        }
        self.expect_punct(";")?;
        if !self.is_punct(")") {
            children.push(self.allow_in(Self::parse_expression)?);
        }
        self.expect_punct(")")?;
        children.push(self.parse_statement()?);
        Ok(Node::new(NodeKind::For, offset, children))
    }

    fn parse_try(&mut self) -> Result<Node, ExprError> {
        let offset = self.advance().offset;
        let mut children = vec![self.parse_block()?];
        let mut handled = false;

        if self.is_keyword("catch") {
            let catch_offset = self.advance().offset;
            let mut catch = Vec::new();
            if self.eat_punct("(") {
                catch.push(self.parse_binding_target()?);
                self.expect_punct(")")?;
            }
            catch.push(self.parse_block()?);
            children.push(Node::new(NodeKind::Catch, catch_offset, catch));
            handled = true;
        }
        if self.eat_keyword("finally") {
            children.push(self.parse_block()?);
            handled = true;
        }

        if !handled {
            return Err(self.error("expected `catch` or `finally`"));
        }
        Ok(Node::new(NodeKind::Try, offset, children))
    }

    fn parse_switch(&mut self) -> Result<Node, ExprError> {
        let offset = self.advance().offset;
        let mut children = vec![self.parse_parenthesized()?];
        self.expect_punct("{")?;

        while !self.eat_punct("}") {
            let case_offset = self.offset();
            let mut case = Vec::new();
            if self.eat_keyword("case") {
                case.push(self.allow_in(Self::parse_expression)?);
            } else if !self.eat_keyword("default") {
                return Err(self.error("expected `case` or `default`"));
            }
            self.expect_punct(":")?;

            while !self.is_keyword("case") && !self.is_keyword("default") && !self.is_punct("}") {
                if self.at_end() {
                    return Err(self.error("expected `}`"));
                }
                case.push(self.parse_statement()?);
            }
            children.push(Node::new(NodeKind::SwitchCase, case_offset, case));
        }

        Ok(Node::new(NodeKind::Switch, offset, children))
    }
}
