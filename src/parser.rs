use crate::{
    ast::{Expression, Literal, MatchExpr, MatchOperator, PathSegment, Selector, Token, TokenKind},
    lexer::{LexError, Lexer},
};
use std::mem;

/// Deepest nesting of parentheses and `not` accepted by the parser.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Tallest expression tree accepted by the parser, counting every `and`,
/// `or` and `not` node between the root and a leaf.
pub const MAX_TREE_DEPTH: usize = 2048;

/// Errors produced while parsing expression text.
///
/// Every variant carries the byte offset of the offending input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected {found} at offset {offset}: expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        offset: usize,
    },

    #[error("unexpected end of input at offset {offset}: expected {expected}")]
    UnexpectedEof {
        expected: &'static str,
        offset: usize,
    },

    #[error("operator '{operator}' at offset {offset} requires a value")]
    MissingOperand {
        operator: MatchOperator,
        offset: usize,
    },

    #[error("operator '{operator}' at offset {offset} does not accept {found}")]
    OperandMismatch {
        operator: MatchOperator,
        found: String,
        offset: usize,
    },

    #[error("unbalanced parentheses: '(' at offset {offset} is never closed")]
    UnbalancedParen { offset: usize },

    #[error("unexpected trailing input {found} at offset {offset}")]
    TrailingInput { found: String, offset: usize },

    #[error("too many expressions: more than {limit} match expressions, exceeded at offset {offset}")]
    TooManyExpressions { limit: usize, offset: usize },

    #[error("expression nested deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { limit: usize, offset: usize },
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Lex(e) => e.offset(),
            ParseError::UnexpectedToken { offset, .. }
            | ParseError::UnexpectedEof { offset, .. }
            | ParseError::MissingOperand { offset, .. }
            | ParseError::OperandMismatch { offset, .. }
            | ParseError::UnbalancedParen { offset }
            | ParseError::TrailingInput { offset, .. }
            | ParseError::TooManyExpressions { offset, .. }
            | ParseError::NestingTooDeep { offset, .. } => *offset,
        }
    }
}

/// Parses `input` into an expression, with `max_expressions` leaves at most
/// (0 means unlimited).
pub fn parse(input: &str, max_expressions: usize) -> Result<Expression, ParseError> {
    Parser::new(Lexer::new(input))?
        .with_max_expressions(max_expressions)
        .parse()
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    max_expressions: usize,
    expressions: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            max_expressions: 0,
            expressions: 0,
            depth: 0,
        })
    }

    /// Limits the number of leaf match expressions; 0 means unlimited.
    pub fn with_max_expressions(mut self, max_expressions: usize) -> Self {
        self.max_expressions = max_expressions;
        self
    }

    /// Number of leaf match expressions built so far.
    pub fn expression_count(&self) -> usize {
        self.expressions
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    /// Takes the current token and moves on to the next one.
    fn bump(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.current_token, next))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current_token.kind) == mem::discriminant(kind)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        if self.current_token.is_eof() {
            ParseError::UnexpectedEof {
                expected,
                offset: self.current_token.offset,
            }
        } else {
            ParseError::UnexpectedToken {
                found: self.current_token.to_string(),
                expected,
                offset: self.current_token.offset,
            }
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), ParseError> {
        if !self.check(&kind) {
            return Err(self.unexpected(expected));
        }
        self.advance()
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                offset: self.current_token.offset,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parse a complete expression; trailing input is an error.
    pub fn parse(&mut self) -> Result<Expression, ParseError> {
        let expr = self.parse_expression()?;
        if !self.current_token.is_eof() {
            return Err(ParseError::TrailingInput {
                found: self.current_token.to_string(),
                offset: self.current_token.offset,
            });
        }
        Ok(expr)
    }

    pub fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_or().map(|(expr, _)| expr)
    }

    /// Height of a new node over children of `height`, checked against
    /// [`MAX_TREE_DEPTH`].
    fn grow(&self, height: usize, offset: usize) -> Result<usize, ParseError> {
        let height = height + 1;
        if height > MAX_TREE_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_TREE_DEPTH,
                offset,
            });
        }
        Ok(height)
    }

    // The parse_* functions below return each subtree with its height.

    fn parse_or(&mut self) -> Result<(Expression, usize), ParseError> {
        let (mut left, mut height) = self.parse_and()?;

        while self.check(&TokenKind::Or) {
            let offset = self.current_token.offset;
            self.advance()?;
            let (right, right_height) = self.parse_and()?;
            height = self.grow(height.max(right_height), offset)?;
            left = Expression::or(left, right);
        }
        Ok((left, height))
    }

    fn parse_and(&mut self) -> Result<(Expression, usize), ParseError> {
        let (mut left, mut height) = self.parse_unary()?;

        while self.check(&TokenKind::And) {
            let offset = self.current_token.offset;
            self.advance()?;
            let (right, right_height) = self.parse_unary()?;
            height = self.grow(height.max(right_height), offset)?;
            left = Expression::and(left, right);
        }
        Ok((left, height))
    }

    fn parse_unary(&mut self) -> Result<(Expression, usize), ParseError> {
        if self.check(&TokenKind::Not) {
            let offset = self.current_token.offset;
            self.enter()?;
            self.advance()?;
            let (operand, height) = self.parse_unary()?;
            self.leave();
            let height = self.grow(height, offset)?;
            return Ok((Expression::not(operand), height));
        }
        self.parse_primary()
    }

    /// Parse primary expressions: a parenthesized group or a leaf predicate
    fn parse_primary(&mut self) -> Result<(Expression, usize), ParseError> {
        match &self.current_token.kind {
            TokenKind::LParen => {
                let open = self.current_token.offset;
                self.enter()?;
                self.advance()?;
                let grouped = self.parse_or()?;
                match self.current_token.kind {
                    TokenKind::RParen => self.advance()?,
                    TokenKind::Eof => return Err(ParseError::UnbalancedParen { offset: open }),
                    _ => return Err(self.unexpected("')' or a boolean operator")),
                }
                self.leave();
                Ok(grouped)
            }
            TokenKind::Identifier(_) | TokenKind::LBracket => {
                self.parse_selector_first().map(|leaf| (leaf, 1))
            }
            TokenKind::String(_)
            | TokenKind::Integer(_)
            | TokenKind::Float(_)
            | TokenKind::Boolean(_)
            | TokenKind::Null => self.parse_value_first().map(|leaf| (leaf, 1)),
            _ => Err(self.unexpected("a selector, a value or '('")),
        }
    }

    /// `Selector op [Literal]`
    fn parse_selector_first(&mut self) -> Result<Expression, ParseError> {
        let start = self.current_token.offset;
        let selector = self.parse_selector()?;
        let operator_offset = self.current_token.offset;

        let operator = match self.current_token.kind {
            TokenKind::EqEq => MatchOperator::Equal,
            TokenKind::NotEq => MatchOperator::NotEqual,
            TokenKind::Contains => MatchOperator::Contains,
            TokenKind::Matches => MatchOperator::Matches,
            TokenKind::Is => {
                self.advance()?;
                let operator = if self.check(&TokenKind::Not) {
                    self.advance()?;
                    MatchOperator::IsNotEmpty
                } else {
                    MatchOperator::IsEmpty
                };
                if !self.check(&TokenKind::Empty) {
                    return Err(self.unexpected("'empty'"));
                }
                operator
            }
            TokenKind::Not => {
                self.advance()?;
                match self.current_token.kind {
                    TokenKind::Contains => MatchOperator::NotContains,
                    TokenKind::Matches => MatchOperator::NotMatches,
                    _ => return Err(self.unexpected("'contains' or 'matches' after 'not'")),
                }
            }
            _ => return Err(self.unexpected("a match operator")),
        };
        self.advance()?;

        let value = if operator.takes_value() {
            Some(self.parse_operand(operator, operator_offset)?)
        } else {
            None
        };
        self.finish_match(start, selector, operator, value)
    }

    /// `Literal ['not'] 'in' Selector`
    fn parse_value_first(&mut self) -> Result<Expression, ParseError> {
        let start = self.current_token.offset;
        let value = self.parse_literal()?;

        let operator = if self.check(&TokenKind::Not) {
            self.advance()?;
            MatchOperator::NotIn
        } else {
            MatchOperator::In
        };
        self.expect(TokenKind::In, "'in' or 'not in' after a value")?;

        let selector = self.parse_selector()?;
        self.finish_match(start, selector, operator, Some(value))
    }

    fn parse_operand(
        &mut self,
        operator: MatchOperator,
        operator_offset: usize,
    ) -> Result<Literal, ParseError> {
        let offset = self.current_token.offset;
        let literal = match self.current_token.kind {
            TokenKind::String(_)
            | TokenKind::Integer(_)
            | TokenKind::Float(_)
            | TokenKind::Boolean(_)
            | TokenKind::Null => self.parse_literal()?,
            _ => {
                return Err(ParseError::MissingOperand {
                    operator,
                    offset: operator_offset,
                });
            }
        };

        if matches!(operator, MatchOperator::Matches | MatchOperator::NotMatches)
            && literal.as_str().is_none()
        {
            return Err(ParseError::OperandMismatch {
                operator,
                found: format!("a {} value", literal.type_name()),
                offset,
            });
        }
        Ok(literal)
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        let literal = match &mut self.current_token.kind {
            TokenKind::String(s) => Literal::String(mem::take(s)),
            TokenKind::Integer(n) => Literal::Integer(*n),
            TokenKind::Float(n) => Literal::Float(*n),
            TokenKind::Boolean(b) => Literal::Boolean(*b),
            TokenKind::Null => Literal::Null,
            _ => return Err(self.unexpected("a value")),
        };
        self.advance()?;
        Ok(literal)
    }

    /// Parse a selector: a head segment followed by `.name`, `[index]` or `["key"]`
    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut segments = Vec::new();

        match &self.current_token.kind {
            TokenKind::Identifier(_) => {
                let token = self.bump()?;
                segments.push(PathSegment::Field(token.text));
            }
            TokenKind::LBracket => segments.push(self.parse_bracket_segment()?),
            _ => return Err(self.unexpected("a selector")),
        }

        loop {
            if self.check(&TokenKind::Dot) {
                self.advance()?; // consume '.'

                // Keywords are plain names after a dot
                if !self.current_token.kind.is_word() {
                    return Err(self.unexpected("a field name after '.'"));
                }
                let token = self.bump()?;
                segments.push(PathSegment::Field(token.text));
            } else if self.check(&TokenKind::LBracket) {
                segments.push(self.parse_bracket_segment()?);
            } else {
                break;
            }
        }

        Selector::new(segments).ok_or_else(|| self.unexpected("a selector"))
    }

    /// `[index]` or `["key"]`
    fn parse_bracket_segment(&mut self) -> Result<PathSegment, ParseError> {
        self.advance()?; // Consume '['
        let offset = self.current_token.offset;

        let segment = match &mut self.current_token.kind {
            TokenKind::Integer(n) => {
                let n = *n;
                let index = usize::try_from(n).map_err(|_| ParseError::UnexpectedToken {
                    found: self.current_token.to_string(),
                    expected: "a non-negative index",
                    offset,
                })?;
                PathSegment::Index(index)
            }
            TokenKind::String(key) => PathSegment::Quoted(mem::take(key)),
            _ => return Err(self.unexpected("an index or a quoted key")),
        };
        self.advance()?;

        self.expect(TokenKind::RBracket, "']'")?;
        Ok(segment)
    }

    fn finish_match(
        &mut self,
        offset: usize,
        selector: Selector,
        operator: MatchOperator,
        value: Option<Literal>,
    ) -> Result<Expression, ParseError> {
        self.expressions += 1;
        if self.max_expressions > 0 && self.expressions > self.max_expressions {
            return Err(ParseError::TooManyExpressions {
                limit: self.max_expressions,
                offset,
            });
        }
        Ok(Expression::Match(MatchExpr::new(selector, operator, value)))
    }
}
