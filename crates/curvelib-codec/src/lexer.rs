//! Curve command lexer.
//!
//! Tokenizes one `setAttr` curve command. Handles:
//! - Words (e.g., `setAttr`, `type`, `open`, `no`)
//! - Double-quoted strings (e.g., `"%s.cc"`, `"nurbsCurve"`)
//! - Integers and reals (e.g., `3`, `-0.5`, `1e-05`)
//! - Flag dashes (`-` in `- type`)
//! - A trailing `;`, which host scripts sometimes leave on the line

use crate::error::CodecError;

/// A token in a curve command.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare word, case preserved.
    Word(String),
    /// String literal (contents without quotes).
    Str(String),
    /// Integer number.
    Integer(i64),
    /// Real number.
    Real(f64),
    /// Flag dash `-`.
    Dash,
    /// Statement terminator `;`.
    Semicolon,
}

/// Position in the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub col: usize,
}

/// A token with its position in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// Position where the token starts.
    pub pos: Position,
}

/// Lexer for curve commands.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenize the entire input.
    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>, CodecError> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    /// Get the next token, or `None` if at end of input.
    pub fn next_token(&mut self) -> Result<Option<SpannedToken>, CodecError> {
        self.skip_whitespace();

        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };

        let start_pos = Position {
            line: self.line,
            col: self.col,
        };

        let token = match ch {
            b';' => {
                self.advance();
                Token::Semicolon
            }
            b'"' => self.read_string()?,
            b'-' | b'+' => {
                if self.starts_number(self.pos + 1) {
                    self.read_number()?
                } else if ch == b'-' {
                    self.advance();
                    Token::Dash
                } else {
                    return Err(self.unexpected(ch));
                }
            }
            b'.' if self.starts_number(self.pos) => self.read_number()?,
            b'0'..=b'9' => self.read_number()?,
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.read_word(),
            _ => return Err(self.unexpected(ch)),
        };

        Ok(Some(SpannedToken {
            token,
            pos: start_pos,
        }))
    }

    fn unexpected(&self, ch: u8) -> CodecError {
        CodecError::lexer(
            self.line,
            self.col,
            format!("unexpected character: '{}'", ch as char),
        )
    }

    /// Whether a number starts at `at` (a digit, or `.` followed by a digit).
    fn starts_number(&self, at: usize) -> bool {
        match self.input.get(at) {
            Some(c) if c.is_ascii_digit() => true,
            Some(b'.') => self.input.get(at + 1).is_some_and(u8::is_ascii_digit),
            _ => false,
        }
    }

    fn peek_char(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self) -> Result<Token, CodecError> {
        let start_line = self.line;
        let start_col = self.col;
        self.advance(); // opening quote

        let mut content = Vec::new();
        loop {
            match self.peek_char() {
                None | Some(b'\n') => {
                    return Err(CodecError::lexer(
                        start_line,
                        start_col,
                        "unterminated string",
                    ));
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    match self.advance() {
                        Some(escaped) => content.push(escaped),
                        None => {
                            return Err(CodecError::lexer(
                                start_line,
                                start_col,
                                "unterminated string",
                            ));
                        }
                    }
                }
                Some(ch) => {
                    content.push(ch);
                    self.advance();
                }
            }
        }

        Ok(Token::Str(String::from_utf8_lossy(&content).into_owned()))
    }

    fn read_number(&mut self) -> Result<Token, CodecError> {
        let start_line = self.line;
        let start_col = self.col;

        let mut num_str = String::new();
        let mut is_real = false;

        if let Some(ch @ (b'-' | b'+')) = self.peek_char() {
            num_str.push(ch as char);
            self.advance();
        }

        self.take_digits(&mut num_str);

        if self.peek_char() == Some(b'.') {
            is_real = true;
            num_str.push('.');
            self.advance();
            self.take_digits(&mut num_str);
        }

        if let Some(ch @ (b'E' | b'e')) = self.peek_char() {
            is_real = true;
            num_str.push(ch as char);
            self.advance();
            if let Some(sign @ (b'-' | b'+')) = self.peek_char() {
                num_str.push(sign as char);
                self.advance();
            }
            self.take_digits(&mut num_str);
        }

        if is_real {
            let val: f64 = num_str.parse().map_err(|_| {
                CodecError::lexer(
                    start_line,
                    start_col,
                    format!("invalid real number: {num_str}"),
                )
            })?;
            Ok(Token::Real(val))
        } else if let Ok(val) = num_str.parse::<i64>() {
            Ok(Token::Integer(val))
        } else {
            // digits beyond i64 are still a valid coordinate
            let val: f64 = num_str.parse().map_err(|_| {
                CodecError::lexer(start_line, start_col, format!("invalid integer: {num_str}"))
            })?;
            Ok(Token::Real(val))
        }
    }

    fn take_digits(&mut self, out: &mut String) {
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                out.push(ch as char);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> Token {
        let mut name = String::new();
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                name.push(ch as char);
                self.advance();
            } else {
                break;
            }
        }
        Token::Word(name)
    }
}
