use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Logical
    /// Logical OR (`||`)
    Or,
    /// Logical AND (`&&`)
    And,

    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Bitwise shift
    /// Left shift (`<<`)
    ShiftLeft,
    /// Right shift (`>>`)
    ShiftRight,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,
    /// Floor division (`//`)
    FloorDivide,
    /// Exponentiation (`**` or `^`)
    Power,
}

impl BinOp {
    pub const ALL: [BinOp; 17] = [
        BinOp::Or,
        BinOp::And,
        BinOp::Equal,
        BinOp::NotEqual,
        BinOp::LessThan,
        BinOp::LessEqual,
        BinOp::GreaterThan,
        BinOp::GreaterEqual,
        BinOp::ShiftLeft,
        BinOp::ShiftRight,
        BinOp::Add,
        BinOp::Subtract,
        BinOp::Multiply,
        BinOp::Divide,
        BinOp::Modulo,
        BinOp::FloorDivide,
        BinOp::Power,
    ];

    /// Canonical source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::LessThan => "<",
            BinOp::LessEqual => "<=",
            BinOp::GreaterThan => ">",
            BinOp::GreaterEqual => ">=",
            BinOp::ShiftLeft => "<<",
            BinOp::ShiftRight => ">>",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
            BinOp::FloorDivide => "//",
            BinOp::Power => "**",
        }
    }

    /// Name of the equivalent prefix function, as emitted by template
    /// rendering and registered in the standard library.
    pub fn function_name(self) -> &'static str {
        match self {
            BinOp::Or => "or",
            BinOp::And => "and",
            BinOp::Equal => "eq",
            BinOp::NotEqual => "ne",
            BinOp::LessThan => "lt",
            BinOp::LessEqual => "le",
            BinOp::GreaterThan => "gt",
            BinOp::GreaterEqual => "ge",
            BinOp::ShiftLeft => "shl",
            BinOp::ShiftRight => "shr",
            BinOp::Add => "add",
            BinOp::Subtract => "sub",
            BinOp::Multiply => "mul",
            BinOp::Divide => "div",
            BinOp::Modulo => "mod",
            BinOp::FloorDivide => "divint",
            BinOp::Power => "pow",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Equal
                | BinOp::NotEqual
                | BinOp::LessThan
                | BinOp::LessEqual
                | BinOp::GreaterThan
                | BinOp::GreaterEqual
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Numeric negation (`-`)
    Neg,
    /// Logical negation (`!`)
    Not,
}

impl UnaryOp {
    pub fn function_name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Not => "not",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => f.write_str("-"),
            UnaryOp::Not => f.write_str("!"),
        }
    }
}

/// Element type hint of an array literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// `int[...]`
    Int,
    /// `float[...]`
    Float,
    /// `string[...]`
    String,
    /// `bool[...]`
    Bool,
    /// Bare `[...]`, elements of any kind
    Any,
}

impl ElementType {
    /// Maps a typed-array prefix to its element type.
    pub fn from_prefix(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ElementType::Int),
            "float" => Some(ElementType::Float),
            "string" => Some(ElementType::String),
            "bool" => Some(ElementType::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Int => "int",
            ElementType::Float => "float",
            ElementType::String => "string",
            ElementType::Bool => "bool",
            ElementType::Any => "",
        };
        f.write_str(name)
    }
}
