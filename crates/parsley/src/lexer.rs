//! Tokenizer driven by the registry's known-token table.

use crate::error::LexError;
use crate::registry::Registry;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Identifier,
    Number,
    /// One of the registry's known tokens.
    Symbol,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. Empty for `Eof`.
    pub text: String,
    /// Parsed value of a `Number` token.
    pub number: Option<f64>,
    /// Character offset of the first character.
    pub position: usize,
}

impl Token {
    fn eof(position: usize) -> Self {
        Token {
            kind: TokenKind::Eof,
            text: String::new(),
            number: None,
            position,
        }
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("EOF"),
            _ => f.write_str(&self.text),
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '.'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Produces tokens one at a time from an input string.
///
/// The set of symbols is read from the registry, so operators registered
/// before lexing are recognised like the built-in ones.
pub struct Lexer<'r> {
    chars: Vec<char>,
    pos: usize,
    registry: &'r Registry,
    current: Token,
    done: bool,
}

impl<'r> Lexer<'r> {
    /// Creates a lexer positioned before the first token. `current()` reports
    /// `Eof` until `next_token` is called.
    pub fn new(input: &str, registry: &'r Registry) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
            registry,
            current: Token::eof(0),
            done: false,
        }
    }

    /// The most recently produced token.
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Character offset the next token will be read from.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Rewinds to the start of the input.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.current = Token::eof(0);
        self.done = false;
    }

    /// Advances to the next token and returns it.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let token = self.lex()?;
        self.current = token.clone();
        Ok(token)
    }

    /// Reads every remaining token, ending with `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if eof {
                return Ok(tokens);
            }
        }
    }

    /// Collects raw characters up to the next `quote`, consuming the quote.
    ///
    /// Returns `None`, with the input exhausted, if no closing quote exists.
    /// Nothing inside the quotes is tokenized and there are no escapes.
    pub fn read_raw_until(&mut self, quote: char) -> Option<String> {
        let start = self.pos;
        match self.chars[start..].iter().position(|&c| c == quote) {
            Some(offset) => {
                let text: String = self.chars[start..start + offset].iter().collect();
                self.pos = start + offset + 1;
                Some(text)
            }
            None => {
                self.pos = self.chars.len();
                None
            }
        }
    }

    fn peek_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    fn lex(&mut self) -> Result<Token, LexError> {
        while matches!(self.peek_at(self.pos), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }

        let start = self.pos;
        let Some(c) = self.peek_at(start) else {
            return Ok(Token::eof(start));
        };

        if let Some(end) = self.match_symbol(start) {
            self.pos = end;
            return Ok(Token {
                kind: TokenKind::Symbol,
                text: self.chars[start..end].iter().collect(),
                number: None,
                position: start,
            });
        }

        let starts_number = c.is_ascii_digit()
            || (c == '.' && matches!(self.peek_at(start + 1), Some(d) if d.is_ascii_digit()));
        if starts_number {
            return self.lex_number(start);
        }

        if is_identifier_start(c) {
            let mut end = start;
            while matches!(self.peek_at(end), Some(c) if is_identifier_char(c)) {
                end += 1;
            }
            self.pos = end;
            return Ok(Token {
                kind: TokenKind::Identifier,
                text: self.chars[start..end].iter().collect(),
                number: None,
                position: start,
            });
        }

        Err(LexError::UnexpectedCharacter {
            character: c,
            position: start,
        })
    }

    /// Greedy match against the known tokens. Returns the end offset of the
    /// symbol, or `None` if the input at `start` should be lexed otherwise.
    fn match_symbol(&self, start: usize) -> Option<usize> {
        let max_len = self.registry.max_token_len();
        let mut candidate = String::new();
        let mut end = start;
        let mut complete = None;

        while end < self.chars.len() && end - start < max_len {
            candidate.push(self.chars[end]);
            if !self.registry.is_token_prefix(&candidate) {
                break;
            }
            end += 1;
            if self.registry.is_known_token(&candidate) {
                complete = Some(end);
            }
        }
        if end == start {
            return None;
        }

        let matched = &self.chars[start..end];
        let word_like = is_identifier_start(matched[0]) && matched.iter().all(|&c| is_identifier_char(c));
        match complete {
            Some(stop) => {
                let word = &self.chars[start..stop];
                let word_like = is_identifier_start(word[0]) && word.iter().all(|&c| is_identifier_char(c));
                let glued = matches!(self.peek_at(stop), Some(c) if is_identifier_char(c));
                if word_like && glued {
                    None
                } else {
                    Some(stop)
                }
            }
            None if word_like => None,
            None => Some(end),
        }
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, LexError> {
        let mut end = start;
        let mut seen_point = false;
        while let Some(c) = self.peek_at(end) {
            if c.is_ascii_digit() {
                end += 1;
            } else if c == '.' && !seen_point {
                seen_point = true;
                end += 1;
            } else {
                break;
            }
        }
        self.pos = end;

        let literal: String = self.chars[start..end].iter().collect();
        // Cannot fail for the literals scanned above.
        let number = literal
            .parse::<f64>()
            .map_err(|_| LexError::InvalidNumericLiteral {
                literal: literal.clone(),
                position: start,
            })?;
        Ok(Token {
            kind: TokenKind::Number,
            text: literal,
            number: Some(number),
            position: start,
        })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    /// Yields tokens up to, but not including, `Eof`. Stops after the first
    /// error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => {
                self.done = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
