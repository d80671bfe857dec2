use std::fmt;

use log::trace;
use thiserror::Error;

use crate::ast::{ElementType, Token};

/// Zero-based character offset into the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub offset: usize,
}

impl Position {
    pub fn new(offset: usize) -> Self {
        Position { offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "position {}", self.offset)
    }
}

/// Errors raised while scanning source text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Unexpected character '{ch}' at {position}")]
    UnexpectedCharacter { ch: char, position: Position },

    #[error("Unexpected '{ch}' at {position} (did you mean '{suggestion}'?)")]
    IncompleteOperator {
        ch: char,
        suggestion: &'static str,
        position: Position,
    },

    #[error("Unterminated string starting at {position}: missing closing quote")]
    UnterminatedString { position: Position },

    #[error("Malformed number '{literal}' at {position}")]
    MalformedNumber { literal: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::IncompleteOperator { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::MalformedNumber { position, .. } => *position,
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    token_start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            token_start: 0,
        }
    }

    /// Where the most recently returned token began.
    pub fn token_start(&self) -> Position {
        Position::new(self.token_start)
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '"' {
                return Ok(result);
            }
            result.push(ch);
        }

        Err(LexError::UnterminatedString {
            position: Position::new(start),
        })
    }

    fn read_digits(&mut self, number: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = Position::new(self.position);
        let mut number = String::new();
        let mut is_float = false;

        self.read_digits(&mut number);

        if self.current_char() == Some('.') {
            number.push('.');
            self.advance();
            if !self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError::MalformedNumber {
                    literal: number,
                    position: start,
                });
            }
            is_float = true;
            self.read_digits(&mut number);

            if self.current_char() == Some('.') {
                number.push('.');
                return Err(LexError::MalformedNumber {
                    literal: number,
                    position: start,
                });
            }
        }

        if let Some(e @ ('e' | 'E')) = self.current_char() {
            number.push(e);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.current_char() {
                number.push(sign);
                self.advance();
            }
            if !self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError::MalformedNumber {
                    literal: number,
                    position: start,
                });
            }
            is_float = true;
            self.read_digits(&mut number);
        }

        let token = if is_float {
            number.parse::<f64>().map(Token::Float).ok()
        } else {
            number.parse::<i64>().map(Token::Integer).ok()
        };

        token.ok_or(LexError::MalformedNumber {
            literal: number,
            position: start,
        })
    }

    /// Consumes `len` characters and yields `token`.
    fn operator(&mut self, len: usize, token: Token) -> Result<Token, LexError> {
        self.position += len;
        Ok(token)
    }

    fn incomplete(&self, ch: char, suggestion: &'static str) -> Result<Token, LexError> {
        Err(LexError::IncompleteOperator {
            ch,
            suggestion,
            position: Position::new(self.position),
        })
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.position;

        let next = self.peek_char(1);
        let token = match self.current_char() {
            None => Ok(Token::Eof),
            Some('*') if next == Some('*') => self.operator(2, Token::StarStar),
            Some('/') if next == Some('/') => self.operator(2, Token::SlashSlash),
            Some('<') if next == Some('<') => self.operator(2, Token::ShiftLeft),
            Some('>') if next == Some('>') => self.operator(2, Token::ShiftRight),
            Some('=') if next == Some('=') => self.operator(2, Token::EqEq),
            Some('!') if next == Some('=') => self.operator(2, Token::NotEq),
            Some('>') if next == Some('=') => self.operator(2, Token::GtEq),
            Some('<') if next == Some('=') => self.operator(2, Token::LtEq),
            Some('&') if next == Some('&') => self.operator(2, Token::AndAnd),
            Some('|') if next == Some('|') => self.operator(2, Token::OrOr),
            Some('+') => self.operator(1, Token::Plus),
            Some('-') => self.operator(1, Token::Minus),
            Some('*') => self.operator(1, Token::Star),
            Some('/') => self.operator(1, Token::Slash),
            Some('%') => self.operator(1, Token::Percent),
            Some('^') => self.operator(1, Token::Caret),
            Some('<') => self.operator(1, Token::Lt),
            Some('>') => self.operator(1, Token::Gt),
            Some('(') => self.operator(1, Token::LParen),
            Some(')') => self.operator(1, Token::RParen),
            Some('[') => self.operator(1, Token::LBracket),
            Some(']') => self.operator(1, Token::RBracket),
            Some(',') => self.operator(1, Token::Comma),
            Some('!') => self.operator(1, Token::Bang),
            Some('=') => self.incomplete('=', "=="),
            Some('&') => self.incomplete('&', "&&"),
            Some('|') => self.incomplete('|', "||"),
            Some('"') => self.read_string().map(Token::String),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "true" => Ok(Token::Boolean(true)),
                    "false" => Ok(Token::Boolean(false)),
                    name => match ElementType::from_prefix(name) {
                        Some(ty) if self.current_char() == Some('[') => {
                            self.advance();
                            Ok(Token::ArrayType(ty))
                        }
                        _ => Ok(Token::Identifier(ident)),
                    },
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) => Err(LexError::UnexpectedCharacter {
                ch,
                position: Position::new(self.position),
            }),
        }?;

        trace!("token {:?} at {}", token, self.token_start);
        Ok(token)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("true false truest");
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::Identifier("truest".to_string())
    );
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_expression() {
    let mut lexer = Lexer::new("(3 + 4) * 2");
    assert_eq!(lexer.next_token().unwrap(), Token::LParen);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(3));
    assert_eq!(lexer.next_token().unwrap(), Token::Plus);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(4));
    assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    assert_eq!(lexer.next_token().unwrap(), Token::Star);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(2));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_token_start() {
    let mut lexer = Lexer::new("  foo ==  12");
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_start(), Position::new(2));
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_start(), Position::new(6));
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_start(), Position::new(10));
}
