//! Recursive-descent parser producing [`Node`] trees.
//!
//! ```text
//! expression   := add_subtract EOF
//! add_subtract := mul_div (additive_op mul_div)*
//! mul_div      := unary (multiplicative_op unary)*
//! unary        := '+' unary | '-' unary | custom_unary unary | leaf
//! leaf         := number | '(' add_subtract ')' | '"' raw '"' | identifier ['(' args ')']
//! ```

use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::node::Node;
use crate::operators::{BinaryOp, BinaryOperator, Precedence};
use crate::registry::{BinaryConstructor, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum nesting of parentheses, unary prefixes and call arguments,
    /// plus the length of any chain of binary operators. Bounds the height
    /// of the resulting tree.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

enum Infix {
    Builtin(BinaryOp),
    Custom(BinaryConstructor),
}

pub struct Parser<'r> {
    lexer: Lexer<'r>,
    registry: &'r Registry,
    options: ParserOptions,
    depth: usize,
}

impl<'r> Parser<'r> {
    pub fn new(expression: &str, registry: &'r Registry, options: ParserOptions) -> Self {
        Self {
            lexer: Lexer::new(expression, registry),
            registry,
            options,
            depth: 0,
        }
    }

    /// Parses the whole input into a single tree.
    pub fn parse(mut self) -> Result<Node, ParseError> {
        self.advance()?;
        let node = self.parse_add_subtract()?;
        let token = self.current();
        if token.kind != TokenKind::Eof {
            return Err(ParseError::UnexpectedTrailingInput {
                token: token.to_string(),
                position: token.position,
            });
        }
        Ok(node)
    }

    fn current(&self) -> &Token {
        self.lexer.current()
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.lexer.next_token()?;
        Ok(())
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// The infix operator at the current token, if it binds at `tier`.
    /// Registered operators shadow built-ins with the same token.
    fn infix(&self, tier: Precedence) -> Option<Infix> {
        let token = self.current();
        if token.kind != TokenKind::Symbol {
            return None;
        }
        if let Some(entry) = self.registry.binary(&token.text) {
            return (entry.precedence == tier).then(|| Infix::Custom(entry.constructor.clone()));
        }
        BinaryOp::from_token(&token.text)
            .filter(|op| op.precedence() == tier)
            .map(Infix::Builtin)
    }

    fn parse_binary_tier(
        &mut self,
        tier: Precedence,
        operand: fn(&mut Self) -> Result<Node, ParseError>,
    ) -> Result<Node, ParseError> {
        let mut left = operand(self)?;
        // Each fold adds a level to the left spine, so it counts as nesting.
        let mut folds = 0;
        while let Some(infix) = self.infix(tier) {
            self.enter()?;
            folds += 1;
            self.advance()?;
            let right = operand(self)?;
            left = match infix {
                Infix::Builtin(op) => Node::binary(op, left, right),
                Infix::Custom(constructor) => constructor(left, right),
            };
        }
        self.depth -= folds;
        Ok(left)
    }

    fn parse_add_subtract(&mut self) -> Result<Node, ParseError> {
        self.enter()?;
        let node = self.parse_binary_tier(Precedence::Additive, Self::parse_mul_div)?;
        self.leave();
        Ok(node)
    }

    fn parse_mul_div(&mut self) -> Result<Node, ParseError> {
        self.parse_binary_tier(Precedence::Multiplicative, Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let text = match self.current().kind {
            TokenKind::Symbol => self.current().text.clone(),
            _ => return self.parse_leaf(),
        };

        if let Some(constructor) = self.registry.unary(&text).cloned() {
            let operand = self.parse_prefixed()?;
            return Ok(constructor(operand));
        }
        match text.as_str() {
            "+" => self.parse_prefixed(),
            "-" => Ok(Node::negate(self.parse_prefixed()?)),
            _ => self.parse_leaf(),
        }
    }

    /// Skips a prefix token and parses its operand.
    fn parse_prefixed(&mut self) -> Result<Node, ParseError> {
        self.enter()?;
        self.advance()?;
        let operand = self.parse_unary()?;
        self.leave();
        Ok(operand)
    }

    fn parse_leaf(&mut self) -> Result<Node, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance()?;
                Ok(Node::Number(token.number.unwrap_or_default()))
            }
            TokenKind::Identifier => {
                self.advance()?;
                if self.current().is_symbol("(") {
                    self.parse_call(token.text)
                } else {
                    Ok(Node::Variable(token.text))
                }
            }
            TokenKind::Symbol if token.text == "(" => {
                self.advance()?;
                let node = self.parse_add_subtract()?;
                self.expect_close()?;
                Ok(node)
            }
            TokenKind::Symbol if token.text == "\"" => {
                let text = self
                    .lexer
                    .read_raw_until('"')
                    .ok_or(ParseError::UnterminatedString {
                        position: token.position,
                    })?;
                self.advance()?;
                Ok(Node::String(text))
            }
            _ => Err(ParseError::UnexpectedToken {
                token: token.to_string(),
                position: token.position,
            }),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Node, ParseError> {
        self.advance()?;
        let mut args = Vec::new();
        if !self.current().is_symbol(")") {
            loop {
                args.push(self.parse_add_subtract()?);
                if !self.current().is_symbol(",") {
                    break;
                }
                self.advance()?;
            }
        }
        self.expect_close()?;

        let function = self
            .registry
            .function(&name)
            .cloned()
            .ok_or_else(|| ParseError::UnknownFunction(name.clone()))?;
        Ok(Node::call(name, Some(function), args))
    }

    fn expect_close(&mut self) -> Result<(), ParseError> {
        if !self.current().is_symbol(")") {
            return Err(ParseError::MissingCloseParenthesis {
                position: self.current().position,
            });
        }
        self.advance()
    }
}

/// Parses `expression` with default options.
pub fn parse(expression: &str, registry: &Registry) -> Result<Node, ParseError> {
    parse_with_options(expression, registry, ParserOptions::default())
}

pub fn parse_with_options(
    expression: &str,
    registry: &Registry,
    options: ParserOptions,
) -> Result<Node, ParseError> {
    log::trace!("parsing {:?}", expression);
    Parser::new(expression, registry, options).parse()
}
