use crate::ast::{Token, TokenKind};

/// Errors produced while tokenizing expression text.
///
/// Offsets are byte offsets into the source text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unexpected '{ch}' at offset {offset} (did you mean '{expected}'?)")]
    IncompleteOperator {
        ch: char,
        expected: &'static str,
        offset: usize,
    },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid escape sequence '\\{ch}' at offset {offset}")]
    InvalidEscape { ch: char, offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
}

impl LexError {
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnexpectedChar { offset, .. }
            | LexError::IncompleteOperator { offset, .. }
            | LexError::UnterminatedString { offset }
            | LexError::InvalidEscape { offset, .. }
            | LexError::InvalidNumber { offset, .. } => *offset,
        }
    }
}

pub struct Lexer {
    source: String,
    input: Vec<(usize, char)>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            source: input.to_string(),
            input: input.char_indices().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).map(|&(_, c)| c)
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).map(|&(_, c)| c)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Byte offset of the current character, or the input length at the end.
    fn offset(&self) -> usize {
        self.input
            .get(self.position)
            .map(|&(o, _)| o)
            .unwrap_or(self.source.len())
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, &self.source[start..self.offset()], start)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.offset();
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' if quote != '`' => {
                    self.advance(); // Consume backslash
                    let escape_offset = self.offset();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('0') => result.push('\0'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some('u') => {
                            result.push(self.read_unicode_escape(escape_offset)?);
                            continue;
                        }
                        Some(ch) => {
                            return Err(LexError::InvalidEscape {
                                ch,
                                offset: escape_offset,
                            });
                        }
                        None => return Err(LexError::UnterminatedString { offset: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { offset: start })
    }

    /// Reads `u{XXXX}` after a backslash, leaving the cursor past the `}`.
    fn read_unicode_escape(&mut self, offset: usize) -> Result<char, LexError> {
        let invalid = LexError::InvalidEscape { ch: 'u', offset };
        self.advance(); // Consume 'u'
        if self.current_char() != Some('{') {
            return Err(invalid);
        }
        self.advance();

        let mut digits = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '}' {
                break;
            }
            if !ch.is_ascii_hexdigit() || digits.len() == 6 {
                return Err(invalid);
            }
            digits.push(ch);
            self.advance();
        }
        if self.current_char() != Some('}') || digits.is_empty() {
            return Err(invalid);
        }
        self.advance();

        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(invalid)
    }

    fn read_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.offset();
        let mut number = String::new();
        let mut is_float = false;

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E') && self.exponent_follows() {
                is_float = true;
                number.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char() {
                    number.push(sign);
                    self.advance();
                }
                while let Some(d) = self.current_char().filter(|c| c.is_ascii_digit()) {
                    number.push(d);
                    self.advance();
                }
                break;
            } else {
                break;
            }
        }

        // Reject things like `12abc` rather than splitting them into two tokens
        if self
            .current_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            number.push_str(&self.read_identifier());
            return Err(LexError::InvalidNumber {
                text: number,
                offset: start,
            });
        }

        let invalid = || LexError::InvalidNumber {
            text: number.clone(),
            offset: start,
        };
        if is_float {
            // Overflow parses to infinity, which no literal can spell
            number
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(TokenKind::Float)
                .ok_or_else(invalid)
        } else {
            number
                .parse::<i64>()
                .map(TokenKind::Integer)
                .map_err(|_| invalid())
        }
    }

    fn exponent_follows(&self) -> bool {
        match self.peek_char(1) {
            Some(c) if c.is_ascii_digit() => true,
            Some('+' | '-') => self.peek_char(2).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.offset();

        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some('(') => {
                self.advance();
                TokenKind::LParen
            }
            Some(')') => {
                self.advance();
                TokenKind::RParen
            }
            Some('[') => {
                self.advance();
                TokenKind::LBracket
            }
            Some(']') => {
                self.advance();
                TokenKind::RBracket
            }
            Some('.') => {
                self.advance();
                TokenKind::Dot
            }
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::EqEq
                } else {
                    return Err(LexError::IncompleteOperator {
                        ch: '=',
                        expected: "==",
                        offset: start,
                    });
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::NotEq
                } else {
                    return Err(LexError::IncompleteOperator {
                        ch: '!',
                        expected: "!=",
                        offset: start,
                    });
                }
            }
            Some(quote @ ('"' | '\'' | '`')) => TokenKind::String(self.read_string(quote)?),
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()?
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                TokenKind::keyword(&ident).unwrap_or(TokenKind::Identifier(ident))
            }
            Some(ch) => return Err(LexError::UnexpectedChar { ch, offset: start }),
        };

        Ok(self.token(kind, start))
    }

    /// Tokenizes the whole input; the last token is always `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and or not true false null");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::And);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Or);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Not);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Boolean(true));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Boolean(false));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Null);
}

#[test]
fn test_match_expression() {
    let mut lexer = Lexer::new("Meta.Tags[0] == \"prod\"");
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Identifier("Meta".to_string())
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Dot);
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Identifier("Tags".to_string())
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::LBracket);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Integer(0));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::RBracket);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::EqEq);
    let value = lexer.next_token().unwrap();
    assert_eq!(value.kind, TokenKind::String("prod".to_string()));
    assert_eq!(value.offset, 16);
    assert_eq!(value.text, "\"prod\"");
    assert!(lexer.next_token().unwrap().is_eof());
}
