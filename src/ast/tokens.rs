use std::fmt;

/// The kind of a lexical token, carrying the decoded payload for literals.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -10
    /// ```
    Integer(i64),

    /// Floating-point literal (has a fraction or an exponent)
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// -0.5
    /// 1e6
    /// ```
    Float(f64),

    /// String literal in double quotes, single quotes or backticks
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'item #1'
    /// `^svc-\d+$`
    /// ```
    String(String),

    /// Boolean values
    Boolean(bool),

    /// Null value
    Null,

    // Selectors
    /// Selector segment name
    ///
    /// Must start with letter or underscore, followed by letters, digits, or underscores.
    ///
    /// # Examples
    /// ```text
    /// Name
    /// item_count
    /// _internal
    /// ```
    Identifier(String),

    // Keywords
    /// Logical AND
    And,
    /// Logical OR
    Or,
    /// Negation, also the prefix of `not in`, `not contains`, `not matches`
    Not,
    /// Membership with the value first (`"prod" in Tags`)
    In,
    /// Membership with the selector first (`Tags contains "prod"`)
    Contains,
    /// Regular expression match
    Matches,
    /// Prefix of `is empty` / `is not empty`
    Is,
    /// Suffix of `is empty` / `is not empty`
    Empty,

    // Operators
    /// Equality operator
    EqEq,
    /// Inequality operator
    NotEq,

    // Delimiters
    /// Left parenthesis for grouping
    LParen,
    /// Right parenthesis
    RParen,
    /// Left bracket for index or quoted key segments
    LBracket,
    /// Right bracket
    RBracket,
    /// Dot between selector segments
    Dot,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Maps identifier text onto a keyword token, if it is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "in" => TokenKind::In,
            "contains" => TokenKind::Contains,
            "matches" => TokenKind::Matches,
            "is" => TokenKind::Is,
            "empty" => TokenKind::Empty,
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            "null" => TokenKind::Null,
            _ => return None,
        };
        Some(kind)
    }

    /// True for tokens spelled as a bare word (identifiers and keywords).
    pub fn is_word(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_)
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Not
                | TokenKind::In
                | TokenKind::Contains
                | TokenKind::Matches
                | TokenKind::Is
                | TokenKind::Empty
                | TokenKind::Boolean(_)
                | TokenKind::Null
        )
    }
}

/// A token together with its raw source text and byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            offset,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            write!(f, "end of input")
        } else {
            write!(f, "'{}'", self.text)
        }
    }
}
