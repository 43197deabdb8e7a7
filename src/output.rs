//! Canonical text output for expressions.
//!
//! Printing is deterministic and re-parses to a structurally identical AST.
//!
//! # Features
//!
//! - **Canonical output** via [`to_expression_string()`] - minimal parentheses
//! - **Grouped output** via [`to_grouped_string()`] - every nested `and`/`or`
//!   parenthesized, handy for checking precedence
//! - **String escaping** - quotes, backslashes and control characters
//!
//! # Examples
//!
//! ```
//! use verdict::parser::parse;
//! use verdict::output::{to_expression_string, to_grouped_string};
//!
//! let expr = parse("a == 1 or b == 2 and not c is empty", 0).unwrap();
//! assert_eq!(to_expression_string(&expr), "a == 1 or b == 2 and not c is empty");
//! assert_eq!(to_grouped_string(&expr), "a == 1 or (b == 2 and (not c is empty))");
//! ```

use std::fmt;

use crate::ast::{Expression, Literal, MatchExpr, MatchOperator, PathSegment, Selector, TokenKind};

pub struct ExpressionPrinter {
    grouped: bool,
}

impl ExpressionPrinter {
    pub fn new(grouped: bool) -> Self {
        ExpressionPrinter { grouped }
    }

    pub fn print(&self, expr: &Expression) -> String {
        let mut out = String::new();
        self.print_expression(expr, 0, &mut out);
        out
    }

    /// Binding strength; a child binding looser than its context needs parentheses.
    fn precedence(expr: &Expression) -> u8 {
        match expr {
            Expression::Or { .. } => 1,
            Expression::And { .. } => 2,
            Expression::Not { .. } => 3,
            Expression::Match(_) => 4,
        }
    }

    fn print_expression(&self, expr: &Expression, min_precedence: u8, out: &mut String) {
        let nested = min_precedence > 0 && !matches!(expr, Expression::Match(_));
        let wrap = Self::precedence(expr) < min_precedence || (self.grouped && nested);
        if wrap {
            out.push('(');
        }

        match expr {
            Expression::Match(m) => print_match(m, out),
            Expression::Not { operand } => {
                out.push_str("not ");
                self.print_expression(operand, 3, out);
            }
            Expression::And { left, right } => {
                self.print_expression(left, 2, out);
                out.push_str(" and ");
                self.print_expression(right, 3, out);
            }
            Expression::Or { left, right } => {
                self.print_expression(left, 1, out);
                out.push_str(" or ");
                self.print_expression(right, 2, out);
            }
        }

        if wrap {
            out.push(')');
        }
    }
}

fn print_match(m: &MatchExpr, out: &mut String) {
    let selector = selector_to_string(&m.selector);
    let value = m.value.as_ref().map(literal_to_string);

    match (m.operator, value) {
        (MatchOperator::In | MatchOperator::NotIn, Some(value)) => {
            out.push_str(&format!("{} {} {}", value, m.operator, selector));
        }
        (operator, Some(value)) => {
            out.push_str(&format!("{} {} {}", selector, operator, value));
        }
        (operator, None) => {
            out.push_str(&format!("{} {}", selector, operator));
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Prints a selector: `Meta.Tags[0]`, `Meta["app name"]`.
pub fn selector_to_string(selector: &Selector) -> String {
    let mut out = String::new();

    for (i, segment) in selector.segments().iter().enumerate() {
        match segment {
            // Keywords only read as names after a dot
            PathSegment::Field(name)
                if is_identifier(name) && (i > 0 || TokenKind::keyword(name).is_none()) =>
            {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(name);
            }
            PathSegment::Field(name) | PathSegment::Quoted(name) => {
                out.push('[');
                out.push_str(&quote(name));
                out.push(']');
            }
            PathSegment::Index(index) => {
                out.push_str(&format!("[{}]", index));
            }
        }
    }
    out
}

/// Prints a literal in a form the lexer reads back as the same literal.
pub fn literal_to_string(literal: &Literal) -> String {
    match literal {
        Literal::String(s) => quote(s),
        Literal::Integer(n) => n.to_string(),
        // Debug keeps a fraction or exponent, so `3.0` stays a float
        Literal::Float(n) => format!("{:?}", n),
        Literal::Boolean(b) => b.to_string(),
        Literal::Null => "null".to_string(),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// Convenience functions

/// Converts an expression to its canonical text, with the fewest parentheses
/// that preserve the tree shape.
pub fn to_expression_string(expr: &Expression) -> String {
    ExpressionPrinter::new(false).print(expr)
}

/// Converts an expression to text with every nested `and`, `or` and `not`
/// group parenthesized.
pub fn to_grouped_string(expr: &Expression) -> String {
    ExpressionPrinter::new(true).print(expr)
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_expression_string(self))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&selector_to_string(self))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&literal_to_string(self))
    }
}
