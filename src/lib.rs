pub mod ast;
pub mod evaluator;
pub mod filter;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Expression, Literal, MatchExpr, MatchOperator, PathSegment, Selector, Token, TokenKind};
pub use evaluator::{CompileOptions, DEFAULT_TAG_NAME, EvalError, Evaluator, compile};
pub use filter::Filter;
pub use lexer::{LexError, Lexer};
pub use output::{to_expression_string, to_grouped_string};
pub use parser::{ParseError, Parser, parse};
pub use resolver::{HookError, PathResolver, ResolveOptions, Resolver, ResolverError, ValueHook, hook};
pub use value::{Field, Record, Value};
