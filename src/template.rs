//! Renders a syntax tree as a template-engine conditional in prefix call
//! syntax, e.g. `foo == (bar.baz + 1)` becomes `eq .foo (add .bar.baz 1)`.
//!
//! Rendering never evaluates anything and cannot fail. Every function name
//! it emits is also registered in [`Registry::standard`](crate::builtins::Registry::standard).

use crate::ast::{Expr, UnaryOp};

/// Renders `expr` as a template conditional.
///
/// # Examples
///
/// ```
/// use condex::template::render;
///
/// let expr = condex::parse("\"abc\" == \"abc\" && 5 == 5.00").unwrap();
/// assert_eq!(render(&expr), "and ( eq \"abc\" \"abc\" ) ( eq 5 5.000000 )");
/// ```
pub fn render(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Integer(n) => out.push_str(&n.to_string()),
        Expr::Float(n) => out.push_str(&format!("{:.6}", n)),
        Expr::String(s) => write_string(out, s),
        Expr::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Expr::Variable(path) => {
            for segment in path {
                out.push('.');
                out.push_str(segment);
            }
        }

        // Negative literals stay literals
        Expr::UnaryOp {
            op: UnaryOp::Neg,
            operand,
        } if matches!(**operand, Expr::Integer(_) | Expr::Float(_)) => {
            out.push('-');
            write_expr(out, operand);
        }
        Expr::UnaryOp { op, operand } => {
            out.push_str(op.function_name());
            out.push(' ');
            write_operand(out, operand);
        }

        Expr::BinaryOp { op, left, right } if op.is_logical() => {
            // and ( L ) ( R )
            out.push_str(op.function_name());
            out.push_str(" ( ");
            write_expr(out, left);
            out.push_str(" ) ( ");
            write_expr(out, right);
            out.push_str(" )");
        }
        Expr::BinaryOp { op, left, right } => {
            out.push_str(op.function_name());
            out.push(' ');
            write_operand(out, left);
            out.push(' ');
            write_operand(out, right);
        }

        Expr::Array { elements, .. } => write_call(out, "list", elements),
        Expr::Call { name, args } => write_call(out, name, args),
    }
}

fn write_call(out: &mut String, name: &str, args: &[Expr]) {
    out.push_str(name);
    for arg in args {
        out.push(' ');
        write_operand(out, arg);
    }
}

/// Writes an argument position: compound expressions are parenthesized.
fn write_operand(out: &mut String, expr: &Expr) {
    if is_atomic(expr) {
        write_expr(out, expr);
    } else {
        out.push('(');
        write_expr(out, expr);
        out.push(')');
    }
}

fn is_atomic(expr: &Expr) -> bool {
    match expr {
        Expr::UnaryOp {
            op: UnaryOp::Neg,
            operand,
        } => matches!(**operand, Expr::Integer(_) | Expr::Float(_)),
        Expr::Call { args, .. } => args.is_empty(),
        other => other.is_leaf(),
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;

    #[test]
    fn negative_literals_are_not_calls() {
        let expr = Expr::unary(UnaryOp::Neg, Expr::Integer(5));
        assert_eq!(render(&expr), "-5");

        let expr = Expr::binary(
            BinOp::Multiply,
            Expr::unary(UnaryOp::Neg, Expr::Integer(5)),
            Expr::Integer(4),
        );
        assert_eq!(render(&expr), "mul -5 4");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(render(&Expr::String(r#"a"b\c"#.into())), r#""a\"b\\c""#);
    }
}
