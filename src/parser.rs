use std::mem;

use log::debug;
use thiserror::Error;

use crate::{
    ast::{BinOp, ElementType, Expr, Token, UnaryOp},
    lexer::{LexError, Lexer, Position},
};

/// Maximum height of a parsed tree: parentheses, calls, arrays, prefix
/// operators and each link of an operator chain all count.
///
/// Keeps recursive descent (and the later tree walks) well inside the stack
/// for hostile input such as thousands of opening parentheses or a
/// `1 + 1 + ...` chain of any length.
pub const MAX_PARSE_DEPTH: usize = 128;

/// Errors raised while building the syntax tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Expected {expected}, got {found} at {position}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        position: Position,
    },

    #[error("Unexpected end of input at {position}: expected {expected}")]
    UnexpectedEof {
        expected: &'static str,
        position: Position,
    },

    #[error("Unmatched '(' at {position}")]
    UnmatchedParen { position: Position },

    #[error("Unterminated array literal starting at {position}")]
    UnterminatedArray { position: Position },

    #[error("Unexpected {found} at {position} after a complete expression")]
    TrailingInput { found: String, position: Position },

    #[error("Invalid name '{name}' at {position}")]
    InvalidVariable { name: String, position: Position },

    #[error("Expression nested too deeply at {position} (limit is {limit})", limit = MAX_PARSE_DEPTH)]
    TooDeeplyNested { position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::UnmatchedParen { position }
            | ParseError::UnterminatedArray { position }
            | ParseError::TrailingInput { position, .. }
            | ParseError::InvalidVariable { position, .. }
            | ParseError::TooDeeplyNested { position } => *position,
        }
    }
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    current_position: Position,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let current_position = lexer.token_start();
        Ok(Parser {
            lexer,
            current_token,
            current_position,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        self.current_position = self.lexer.token_start();
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.current_token {
            Token::Eof => ParseError::UnexpectedEof {
                expected,
                position: self.current_position,
            },
            ref token => ParseError::UnexpectedToken {
                expected,
                found: token.describe(),
                position: self.current_position,
            },
        }
    }

    /// Runs `f` one nesting level deeper, failing once the limit is reached.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.descend()?;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Takes one nesting level, failing once the limit is reached.
    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(ParseError::TooDeeplyNested {
                position: self.current_position,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Parse primary expressions (atoms): literals, variables, calls, arrays
    /// and parenthesized groups
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_position;
        match mem::replace(&mut self.current_token, Token::Eof) {
            // Literals
            Token::Integer(n) => {
                self.advance()?;
                Ok(Expr::Integer(n))
            }
            Token::Float(n) => {
                self.advance()?;
                Ok(Expr::Float(n))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Expr::String(s))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Expr::Boolean(b))
            }

            // Variables and calls
            Token::Identifier(name) => {
                self.advance()?;
                if self.check(&Token::LParen) {
                    self.parse_call(name, start)
                } else {
                    self.parse_variable(name, start)
                }
            }

            // Array literals
            Token::ArrayType(element_type) => {
                self.advance()?;
                self.parse_array_literal(element_type, start)
            }
            Token::LBracket => {
                self.advance()?;
                self.parse_array_literal(ElementType::Any, start)
            }

            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.close_paren(start)?;
                Ok(expr)
            }

            token => {
                self.current_token = token;
                Err(self.unexpected("an expression"))
            }
        }
    }

    /// Expects `)` for a group or argument list opened at `open`.
    fn close_paren(&mut self, open: Position) -> Result<(), ParseError> {
        match self.current_token {
            Token::RParen => self.advance(),
            Token::Eof => Err(ParseError::UnmatchedParen { position: open }),
            _ => Err(self.unexpected("')'")),
        }
    }

    fn parse_variable(&mut self, name: String, start: Position) -> Result<Expr, ParseError> {
        let path: Vec<String> = name.split('.').map(str::to_string).collect();
        if path.iter().any(String::is_empty) {
            return Err(ParseError::InvalidVariable {
                name,
                position: start,
            });
        }
        Ok(Expr::Variable(path))
    }

    fn parse_call(&mut self, name: String, start: Position) -> Result<Expr, ParseError> {
        if name.contains('.') {
            return Err(ParseError::InvalidVariable {
                name,
                position: start,
            });
        }

        let open = self.current_position;
        self.advance()?; // consume '('

        let mut args = vec![];
        if self.check(&Token::RParen) {
            self.advance()?;
            return Ok(Expr::Call { name, args });
        }

        loop {
            if self.check(&Token::Eof) {
                return Err(ParseError::UnmatchedParen { position: open });
            }
            args.push(self.parse_expression()?);

            match self.current_token {
                Token::Comma => self.advance()?,
                _ => {
                    self.close_paren(open)?;
                    break;
                }
            }
        }

        Ok(Expr::Call { name, args })
    }

    /// Parses the elements after an opening `[` (or `TYPE[`) at `open`.
    fn parse_array_literal(
        &mut self,
        element_type: ElementType,
        open: Position,
    ) -> Result<Expr, ParseError> {
        let mut elements = vec![];
        if self.check(&Token::RBracket) {
            self.advance()?;
            return Ok(Expr::Array {
                element_type,
                elements,
            });
        }

        loop {
            if self.check(&Token::Eof) {
                return Err(ParseError::UnterminatedArray { position: open });
            }
            elements.push(self.parse_expression()?);

            match self.current_token {
                Token::Comma => self.advance()?,
                Token::RBracket => {
                    self.advance()?;
                    break;
                }
                Token::Eof => return Err(ParseError::UnterminatedArray { position: open }),
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }

        Ok(Expr::Array {
            element_type,
            elements,
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current_token {
            Token::Minus => UnaryOp::Neg,
            Token::Bang => UnaryOp::Not,
            _ => return self.parse_primary(),
        };

        self.advance()?;
        let operand = self.nested(|p| p.parse_unary())?;
        Ok(Expr::unary(op, operand))
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_unary()?;

        if matches!(self.current_token, Token::StarStar | Token::Caret) {
            self.advance()?;
            // Right-associative: 2 ** 3 ** 2 == 2 ** (3 ** 2)
            let right = self.nested(|p| p.parse_power())?;
            return Ok(Expr::binary(BinOp::Power, left, right));
        }
        Ok(left)
    }

    /// Parses `operand (operator operand)*` into a left-leaning tree.
    ///
    /// Every link adds one level to the tree, so links count against the
    /// nesting limit just like parentheses do.
    fn parse_left_assoc(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        operator: fn(&Token) -> Option<BinOp>,
    ) -> Result<Expr, ParseError> {
        let base = self.depth;
        let result = self.parse_chain(operand, operator);
        self.depth = base;
        result
    }

    fn parse_chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        operator: fn(&Token) -> Option<BinOp>,
    ) -> Result<Expr, ParseError> {
        let mut left = operand(self)?;

        while let Some(op) = operator(&self.current_token) {
            self.descend()?;
            self.advance()?;
            let right = operand(self)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_power, |token| match token {
            Token::Star => Some(BinOp::Multiply),
            Token::Slash => Some(BinOp::Divide),
            Token::Percent => Some(BinOp::Modulo),
            Token::SlashSlash => Some(BinOp::FloorDivide),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_multiplicative, |token| match token {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Subtract),
            _ => None,
        })
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_additive, |token| match token {
            Token::ShiftLeft => Some(BinOp::ShiftLeft),
            Token::ShiftRight => Some(BinOp::ShiftRight),
            _ => None,
        })
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_shift, |token| match token {
            Token::Lt => Some(BinOp::LessThan),
            Token::LtEq => Some(BinOp::LessEqual),
            Token::Gt => Some(BinOp::GreaterThan),
            Token::GtEq => Some(BinOp::GreaterEqual),
            _ => None,
        })
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_relational, |token| match token {
            Token::EqEq => Some(BinOp::Equal),
            Token::NotEq => Some(BinOp::NotEqual),
            _ => None,
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_equality, |token| match token {
            Token::AndAnd => Some(BinOp::And),
            _ => None,
        })
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_and, |token| match token {
            Token::OrOr => Some(BinOp::Or),
            _ => None,
        })
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(|p| p.parse_or())
    }

    /// Parses a complete expression; the whole input must be consumed.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;

        if !self.check(&Token::Eof) {
            return Err(ParseError::TrailingInput {
                found: self.current_token.describe(),
                position: self.current_position,
            });
        }

        debug!("parsed {}", expr);
        Ok(expr)
    }
}
