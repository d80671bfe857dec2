use crate::ast::ElementType;

/// Lexical tokens produced by the [`Lexer`](crate::lexer::Lexer).
///
/// Each variant is the token kind; literal-bearing kinds carry their decoded
/// payload. The start position of a token is reported separately by
/// [`Lexer::token_start`](crate::lexer::Lexer::token_start).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Integer literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 1250
    /// ```
    Integer(i64),

    /// Floating-point literal, written with a fraction or an exponent
    ///
    /// # Examples
    /// ```text
    /// 5.25
    /// 1e+06
    /// 2.5E-3
    /// ```
    Float(f64),

    /// String literal enclosed in double quotes
    ///
    /// No escape sequences are processed.
    ///
    /// # Examples
    /// ```text
    /// "abc"
    /// "x > 3"
    /// ```
    String(String),

    /// Boolean literal (`true` / `false`)
    Boolean(bool),

    /// Variable or function name
    ///
    /// Dots are part of the identifier, so a dotted path arrives as one token
    /// and is split into segments by the parser.
    ///
    /// # Examples
    /// ```text
    /// foo
    /// bar.qux.quux
    /// _x
    /// ```
    Identifier(String),

    /// Typed array prefix: a type name immediately followed by `[`
    ///
    /// # Examples
    /// ```text
    /// int[1, 2, 3]
    /// string["a", "b"]
    /// ```
    ArrayType(ElementType),

    // Arithmetic
    /// Addition or string concatenation
    Plus,

    /// Subtraction, or unary negation in operand position
    Minus,

    /// Multiplication
    Star,

    /// Division
    Slash,

    /// Modulo
    Percent,

    /// Exponentiation (`**`)
    StarStar,

    /// Floor division (`//`)
    SlashSlash,

    /// Exponentiation, alternate spelling (`^`)
    Caret,

    // Shifts
    /// Left shift (`<<`)
    ShiftLeft,

    /// Right shift (`>>`)
    ShiftRight,

    // Comparison
    /// Equality operator
    EqEq,

    /// Inequality operator
    NotEq,

    /// Less than
    Lt,

    /// Less than or equal
    LtEq,

    /// Greater than
    Gt,

    /// Greater than or equal
    GtEq,

    // Logical
    /// Logical AND (`&&`)
    AndAnd,

    /// Logical OR (`||`)
    OrOr,

    /// Logical negation (`!`)
    Bang,

    // Delimiters
    /// Left parenthesis for grouping or function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Left bracket opening an array literal
    LBracket,

    /// Right bracket
    RBracket,

    /// Comma separating arguments or array elements
    Comma,

    /// End of input
    Eof,
}

impl Token {
    /// Short human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Integer(n) => format!("integer {}", n),
            Token::Float(n) => format!("float {}", n),
            Token::String(s) => format!("string \"{}\"", s),
            Token::Boolean(b) => format!("boolean {}", b),
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::ArrayType(ty) => format!("array type '{}['", ty),
            Token::Eof => "end of input".to_string(),
            other => match other.symbol() {
                Some(sym) => format!("'{}'", sym),
                None => format!("{:?}", other),
            },
        }
    }

    /// Source spelling of operator and delimiter tokens.
    pub fn symbol(&self) -> Option<&'static str> {
        let sym = match self {
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::StarStar => "**",
            Token::SlashSlash => "//",
            Token::Caret => "^",
            Token::ShiftLeft => "<<",
            Token::ShiftRight => ">>",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Gt => ">",
            Token::GtEq => ">=",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::Bang => "!",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Comma => ",",
            _ => return None,
        };
        Some(sym)
    }
}
