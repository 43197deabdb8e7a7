use std::fmt;

use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde::Serialize;

use crate::{
    ast::{Expression, Literal, MatchExpr, MatchOperator},
    lexer::Lexer,
    parser::{ParseError, Parser},
    resolver::{PathResolver, ResolveOptions, Resolver, ResolverError, ValueHook},
    value::Value,
};

/// Tag name used for record field aliases unless configured otherwise.
pub const DEFAULT_TAG_NAME: &str = "verdict";

/// Options threaded through [`compile`].
///
/// Every compiled [`Evaluator`] keeps its own copy, so evaluators with
/// different limits or hooks coexist freely.
#[derive(Clone)]
pub struct CompileOptions {
    /// Maximum number of leaf match expressions; 0 means unlimited
    pub max_expressions: usize,
    /// Tag under which record fields carry their selector alias
    pub tag_name: String,
    /// Optional transform applied to every value a selector steps through
    pub hook: Option<ValueHook>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            max_expressions: 0,
            tag_name: DEFAULT_TAG_NAME.to_string(),
            hook: None,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_expressions(mut self, max_expressions: usize) -> Self {
        self.max_expressions = max_expressions;
        self
    }

    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = tag_name.into();
        self
    }

    pub fn with_hook(mut self, hook: ValueHook) -> Self {
        self.hook = Some(hook);
        self
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("max_expressions", &self.max_expressions)
            .field("tag_name", &self.tag_name)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

/// Errors that can occur during evaluation.
///
/// An error aborts the one `evaluate` call; the compiled expression stays
/// usable.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// The resolver failed for a selector (not the same as absence)
    #[error("resolver failure: {0}")]
    Resolver(#[from] ResolverError),

    /// A `matches` pattern that does not compile
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A value that an operator cannot work with
    #[error("type error: {0}")]
    TypeError(String),

    /// The datum could not be converted into a [`Value`]
    #[error("cannot convert datum: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A compiled expression, ready to be evaluated against any number of data.
///
/// `Evaluator` is immutable and `Send + Sync`; share it across threads
/// freely.
///
/// # Examples
///
/// ```
/// use verdict::{Evaluator, Value};
///
/// let evaluator = Evaluator::new(r#"Tags contains "prod" and Replicas != 0"#).unwrap();
///
/// let datum = Value::from(serde_json::json!({"Tags": ["prod", "web"], "Replicas": 3}));
/// assert!(evaluator.evaluate(&datum).unwrap());
///
/// let datum = Value::from(serde_json::json!({"Tags": ["dev"], "Replicas": 3}));
/// assert!(!evaluator.evaluate(&datum).unwrap());
/// ```
pub struct Evaluator {
    expression: Expression,
    tag_name: String,
    hook: Option<ValueHook>,
}

/// Compiles `expression` with the given options.
#[tracing::instrument(level = "debug", skip(options), err)]
pub fn compile(expression: &str, options: CompileOptions) -> Result<Evaluator, ParseError> {
    let mut parser =
        Parser::new(Lexer::new(expression))?.with_max_expressions(options.max_expressions);
    let ast = parser.parse()?;
    tracing::debug!(
        leaves = parser.expression_count(),
        limit = options.max_expressions,
        "compiled expression"
    );

    Ok(Evaluator {
        expression: ast,
        tag_name: options.tag_name,
        hook: options.hook,
    })
}

impl Evaluator {
    /// Compiles `expression` with default options.
    pub fn new(expression: &str) -> Result<Self, ParseError> {
        compile(expression, CompileOptions::default())
    }

    pub fn with_options(expression: &str, options: CompileOptions) -> Result<Self, ParseError> {
        compile(expression, options)
    }

    /// The syntax tree this evaluator runs.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    fn resolve_options(&self) -> ResolveOptions<'_> {
        ResolveOptions {
            tag_name: &self.tag_name,
            hook: self.hook.as_ref(),
        }
    }

    /// Evaluates the expression against a [`Value`].
    pub fn evaluate(&self, datum: &Value) -> Result<bool, EvalError> {
        self.evaluate_with(&PathResolver, datum)
    }

    /// Evaluates the expression with a custom resolver.
    pub fn evaluate_with<R: Resolver>(
        &self,
        resolver: &R,
        datum: &R::Datum,
    ) -> Result<bool, EvalError> {
        let options = self.resolve_options();
        self.eval_expr(&self.expression, resolver, datum, &options)
    }

    /// Converts a serializable host value and evaluates against it.
    ///
    /// Struct fields are addressed by their serde names.
    pub fn evaluate_serialize<T: Serialize + ?Sized>(&self, datum: &T) -> Result<bool, EvalError> {
        let value = Value::from_serialize(datum)?;
        self.evaluate(&value)
    }

    fn eval_expr<R: Resolver>(
        &self,
        expr: &Expression,
        resolver: &R,
        datum: &R::Datum,
        options: &ResolveOptions<'_>,
    ) -> Result<bool, EvalError> {
        match expr {
            Expression::Match(m) => self.eval_match(m, resolver, datum, options),
            Expression::Not { operand } => Ok(!self.eval_expr(operand, resolver, datum, options)?),
            Expression::And { left, right } => {
                if !self.eval_expr(left, resolver, datum, options)? {
                    return Ok(false);
                }
                self.eval_expr(right, resolver, datum, options)
            }
            Expression::Or { left, right } => {
                if self.eval_expr(left, resolver, datum, options)? {
                    return Ok(true);
                }
                self.eval_expr(right, resolver, datum, options)
            }
        }
    }

    fn eval_match<R: Resolver>(
        &self,
        m: &MatchExpr,
        resolver: &R,
        datum: &R::Datum,
        options: &ResolveOptions<'_>,
    ) -> Result<bool, EvalError> {
        let resolved = resolver
            .resolve(datum, &m.selector, options)
            .inspect_err(|e| {
                tracing::debug!(selector = %m.selector, error = %e, "selector resolution failed");
            })?;

        let result = match resolved {
            // Absent values are empty and never equal, contain or match anything
            None => m.operator == MatchOperator::IsEmpty,
            Some(value) => apply_operator(m, &value, self.tag_name.as_str())?,
        };

        tracing::trace!(
            selector = %m.selector,
            operator = %m.operator,
            result,
            "evaluated match"
        );
        Ok(result)
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("expression", &self.expression)
            .field("tag_name", &self.tag_name)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

fn apply_operator(m: &MatchExpr, value: &Value, tag_name: &str) -> Result<bool, EvalError> {
    let matched = match m.operator {
        MatchOperator::IsEmpty | MatchOperator::IsNotEmpty => is_empty(value),
        MatchOperator::Equal | MatchOperator::NotEqual => values_equal(value, operand(m)?),
        MatchOperator::In
        | MatchOperator::NotIn
        | MatchOperator::Contains
        | MatchOperator::NotContains => contains(value, operand(m)?, tag_name),
        MatchOperator::Matches | MatchOperator::NotMatches => matches_pattern(m, value)?,
    };
    Ok(matched != m.operator.is_negated())
}

fn operand(m: &MatchExpr) -> Result<&Literal, EvalError> {
    m.value.as_ref().ok_or_else(|| {
        EvalError::TypeError(format!(
            "operator '{}' on '{}' requires a value",
            m.operator, m.selector
        ))
    })
}

/// Scalar equality between a resolved value and a literal.
///
/// Types must agree, except that numbers compare by logical value across
/// integer, unsigned and float representations. Mismatches are unequal.
pub fn values_equal(value: &Value, literal: &Literal) -> bool {
    match (value, literal) {
        (Value::String(a), Literal::String(b)) => a == b,
        (Value::Boolean(a), Literal::Boolean(b)) => a == b,
        (Value::Null, Literal::Null) => true,
        (v, l) if v.is_numeric() && l.is_numeric() => numbers_equal(v, l),
        _ => false,
    }
}

fn numbers_equal(value: &Value, literal: &Literal) -> bool {
    match (value, literal) {
        (Value::Integer(a), Literal::Integer(b)) => a == b,
        (Value::Unsigned(a), Literal::Integer(b)) => u64::try_from(*b).is_ok_and(|b| *a == b),
        (Value::Float(a), Literal::Float(b)) => a == b,
        _ => match (value_decimal(value), literal_decimal(literal)) {
            (Some(a), Some(b)) => a == b,
            // Beyond the decimal range only floats remain; compare them directly
            _ => match (value.as_float(), literal_float(literal)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        },
    }
}

fn value_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(n) => Decimal::from_i64(*n),
        Value::Unsigned(n) => Decimal::from_u64(*n),
        Value::Float(n) => Decimal::from_f64(*n),
        _ => None,
    }
}

fn literal_decimal(literal: &Literal) -> Option<Decimal> {
    match literal {
        Literal::Integer(n) => Decimal::from_i64(*n),
        Literal::Float(n) => Decimal::from_f64(*n),
        _ => None,
    }
}

fn literal_float(literal: &Literal) -> Option<f64> {
    match literal {
        Literal::Integer(n) => Some(*n as f64),
        Literal::Float(n) => Some(*n),
        _ => None,
    }
}

/// Membership: element of an array, substring of a string, key of an object
/// or visible field of a record.
pub fn contains(value: &Value, literal: &Literal, tag_name: &str) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| values_equal(item, literal)),
        Value::String(s) => literal.as_str().is_some_and(|needle| s.contains(needle)),
        Value::Object(map) => literal.as_str().is_some_and(|key| map.contains_key(key)),
        Value::Record(record) => literal
            .as_str()
            .is_some_and(|key| record.get(key, tag_name).is_some()),
        _ => false,
    }
}

/// Null and zero-length strings, arrays and objects are empty.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn matches_pattern(m: &MatchExpr, value: &Value) -> Result<bool, EvalError> {
    let pattern = m.pattern().ok_or_else(|| {
        EvalError::TypeError(format!(
            "operator '{}' on '{}' requires a string pattern",
            m.operator, m.selector
        ))
    })?;
    let regex = pattern
        .regex()
        .map_err(|source| EvalError::InvalidPattern {
            pattern: pattern.source().to_string(),
            source: source.clone(),
        })?;

    let text = value.to_text().ok_or_else(|| {
        EvalError::TypeError(format!(
            "cannot match {} at '{}' against a pattern",
            value.type_name(),
            m.selector
        ))
    })?;
    Ok(regex.is_match(&text))
}
