//! # Condex Expression Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the Abstract Syntax Tree (AST) for the
//! condex expression language, a compact boolean/arithmetic grammar meant to be
//! embedded in hosts that need user-supplied conditions.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, variables, operations, calls)
//! - **[operators]** - Binary and unary operators, array element types
//!
//! ## Quick Start
//!
//! ```text
//! price * quantity >= 100 && customer.tier == "gold"
//! ```
//!
//! ## Operator Precedence
//!
//! From lowest to highest binding:
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `\|\|` | left |
//! | 2 | `&&` | left |
//! | 3 | `==` `!=` | left |
//! | 4 | `<` `<=` `>` `>=` | left |
//! | 5 | `<<` `>>` | left |
//! | 6 | `+` `-` | left |
//! | 7 | `*` `/` `%` `//` | left |
//! | 8 | `**` `^` | right |
//! | 9 | unary `-` `!` | prefix |
//!
//! ## Examples
//!
//! ### Dotted variables
//!
//! ```text
//! foo == (bar.baz + bar.qux.quux)
//! ```
//!
//! ### Typed arrays and higher-order builtins
//!
//! ```text
//! filter(int[1, 2, 3, 4, 5], "x > 3")
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use operators::{BinOp, ElementType, UnaryOp};
pub use tokens::Token;
