//! # Verdict Expression Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for verdict, a small
//! boolean predicate language evaluated against dynamically shaped data.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Boolean expression nodes and leaf predicates
//! - **[operators]** - Match operators (comparison, membership, emptiness, regex)
//! - **[selector]** - Paths into the datum
//! - **[literal]** - Typed literal operands
//!
//! ## Quick Start
//!
//! ```text
//! Meta.Env == "prod" and (Tags contains "web" or Name matches "^svc-")
//! ```
//!
//! ## Precedence
//!
//! From loosest to tightest binding: `or`, `and`, `not`. Parentheses group
//! explicitly. `a or b and c` is `a or (b and c)`; `not a and b` is
//! `(not a) and b`.
//!
//! ## Leaf Predicates
//!
//! ```text
//! Name == "web"                  // equality
//! Count != 3                     // inequality
//! Tags contains "prod"           // membership, selector first
//! "prod" in Tags                 // membership, value first
//! Labels is empty                // emptiness
//! Labels is not empty
//! Name matches "^svc-[0-9]+$"    // regular expression
//! Name not matches `\d`
//! ```
//!
//! ## Selectors
//!
//! ```text
//! Meta.Tags[0]
//! Meta["app name"].Version
//! ["top level key"].Child
//! ```
pub mod expressions;
pub mod literal;
pub mod operators;
pub mod selector;
pub mod tokens;

pub use expressions::{Expression, MatchExpr, Pattern};
pub use literal::Literal;
pub use operators::MatchOperator;
pub use selector::{PathSegment, Selector};
pub use tokens::{Token, TokenKind};
