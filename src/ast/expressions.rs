use std::fmt;

use crate::ast::{BinOp, ElementType, UnaryOp};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Trees are immutable once built and hold no evaluation state, so a single
/// tree can be evaluated against many contexts (concurrently, if needed) and
/// rendered as a template any number of times.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal integer
    ///
    /// # Example
    /// ```text
    /// 42
    /// ```
    Integer(i64),

    /// Literal floating point number
    ///
    /// # Example
    /// ```text
    /// 5.25
    /// ```
    Float(f64),

    /// String literal
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// ```
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// Array literal with an element type hint
    ///
    /// # Examples
    /// ```text
    /// int[1, 2, 3]
    /// [foo, "bar", 1.5]
    /// ```
    Array {
        element_type: ElementType,
        elements: Vec<Expr>,
    },

    // References
    /// Variable path, one entry per dotted segment
    ///
    /// # Examples
    /// ```text
    /// foo            // ["foo"]
    /// bar.qux.quux   // ["bar", "qux", "quux"]
    /// ```
    Variable(Vec<String>),

    // Operations
    /// Unary operation (negation, logical not)
    UnaryOp { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation (arithmetic, shift, comparison, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Builtin function call
    ///
    /// # Examples
    /// ```text
    /// sqrt(25)
    /// filter(int[1, 2, 3], "x > 1")
    /// ```
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    /// Builds a variable node from a dotted path such as `bar.baz`.
    pub fn variable(path: &str) -> Self {
        Expr::Variable(path.split('.').map(str::to_string).collect())
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    /// True for nodes with no sub-expressions.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Expr::Integer(_) | Expr::Float(_) | Expr::String(_) | Expr::Boolean(_) | Expr::Variable(_)
        )
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Prints the expression back as fully parenthesized source.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(n) => write!(f, "{}", n),
            Expr::Float(n) => write!(f, "{:?}", n),
            Expr::String(s) => write!(f, "\"{}\"", s),
            Expr::Boolean(b) => write!(f, "{}", b),
            Expr::Array {
                element_type,
                elements,
            } => {
                write!(f, "{}[", element_type)?;
                write_list(f, elements)?;
                f.write_str("]")
            }
            Expr::Variable(path) => f.write_str(&path.join(".")),
            Expr::UnaryOp { op, operand } => write!(f, "({}{})", op, operand),
            Expr::BinaryOp { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                write_list(f, args)?;
                f.write_str(")")
            }
        }
    }
}
