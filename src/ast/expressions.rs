use regex::Regex;

use crate::ast::{Literal, MatchOperator, Selector};

/// Abstract Syntax Tree node of a boolean expression.
///
/// The set of variants is closed; the evaluator handles every node kind in a
/// single exhaustive match. Nodes are never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Leaf predicate
    ///
    /// # Examples
    /// ```text
    /// Name == "web"
    /// Tags contains "prod"
    /// Labels is empty
    /// ```
    Match(MatchExpr),

    /// Negation
    ///
    /// # Example
    /// ```text
    /// not Enabled == true
    /// ```
    Not { operand: Box<Expression> },

    /// Conjunction, short-circuiting on a false left operand
    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Disjunction, short-circuiting on a true left operand
    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn not(operand: Expression) -> Self {
        Expression::Not {
            operand: Box::new(operand),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of leaf predicates in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Expression::Match(_) => 1,
            Expression::Not { operand } => operand.leaf_count(),
            Expression::And { left, right } | Expression::Or { left, right } => {
                left.leaf_count() + right.leaf_count()
            }
        }
    }
}

impl From<MatchExpr> for Expression {
    fn from(m: MatchExpr) -> Self {
        Expression::Match(m)
    }
}

/// A regular expression literal compiled when its node is built.
///
/// A pattern that fails to compile is kept along with its error so the failure
/// surfaces when the leaf is evaluated.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: Result<Regex, regex::Error>,
}

impl Pattern {
    pub fn new(source: &str) -> Self {
        Pattern {
            source: source.to_string(),
            compiled: Regex::new(source),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> Result<&Regex, &regex::Error> {
        self.compiled.as_ref()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Leaf predicate: `selector operator value`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpr {
    pub selector: Selector,
    pub operator: MatchOperator,
    pub value: Option<Literal>,
    pattern: Option<Pattern>,
}

impl MatchExpr {
    /// Builds a leaf, compiling the pattern for `matches`/`not matches` with a
    /// string value.
    ///
    /// Operand arity is the caller's responsibility; the parser checks it
    /// before building nodes.
    pub fn new(selector: Selector, operator: MatchOperator, value: Option<Literal>) -> Self {
        let pattern = match (operator, &value) {
            (MatchOperator::Matches | MatchOperator::NotMatches, Some(Literal::String(s))) => {
                Some(Pattern::new(s))
            }
            _ => None,
        };
        MatchExpr {
            selector,
            operator,
            value,
            pattern,
        }
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }
}
