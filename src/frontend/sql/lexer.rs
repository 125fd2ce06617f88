use std::fmt;

use crate::frontend::sql::errors::{ParseError, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // identifiers & keywords
    Ident(String),

    // literals, kept as written; typing happens against the column schema
    Number(String),
    String(String),

    // punctuation
    Comma,
    LParen,
    RParen,
    Semicolon,
    Star,

    // operators
    Eq,
    NotEq,
    Lt,
    Gt,

    EOF,
}

impl Token {
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Ident(s) if s.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) | Token::Number(s) => write!(f, "{s}"),
            Token::String(s) => write!(f, "'{s}'"),
            Token::Comma => write!(f, ","),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Semicolon => write!(f, ";"),
            Token::Star => write!(f, "*"),
            Token::Eq => write!(f, "="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::EOF => write!(f, "end of input"),
        }
    }
}

pub struct Tokenizer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    len: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            len: input.len(),
        }
    }

    /// Splits the whole input; the last token is always [`Token::EOF`].
    pub fn tokenize(mut self) -> Result<Vec<(Token, Position)>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let (token, position) = self.next_token()?;
            let done = token == Token::EOF;
            tokens.push((token, position));
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<(Token, Position), ParseError> {
        self.skip_whitespace();

        let (offset, c) = match self.chars.next() {
            Some(next) => next,
            None => return Ok((Token::EOF, Position::at(self.len))),
        };
        let position = Position::at(offset);

        let token = match c {
            // ---------- punctuation ----------
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ';' => Token::Semicolon,
            '*' => Token::Star,

            // ---------- operators ----------
            '=' => Token::Eq,
            '<' => Token::Lt,
            '>' => Token::Gt,
            '!' if self.consume('=') => Token::NotEq,

            // ---------- string literal ----------
            '\'' | '"' => Token::String(self.quoted(c, position)?),

            // ---------- number ----------
            '-' if self.peek_is(|ch| ch.is_ascii_digit()) => {
                Token::Number(self.take_while(c.to_string(), |ch| ch.is_ascii_digit()))
            }
            c if c.is_ascii_digit() => {
                Token::Number(self.take_while(c.to_string(), |ch| ch.is_ascii_digit()))
            }

            // ---------- identifier ----------
            c if is_ident_start(c) => Token::Ident(self.take_while(c.to_string(), is_ident_continue)),

            other => return Err(ParseError::UnexpectedChar { ch: other, position }),
        };

        Ok((token, position))
    }

    fn quoted(&mut self, quote: char, start: Position) -> Result<String, ParseError> {
        let mut s = String::new();
        for (_, ch) in self.chars.by_ref() {
            if ch == quote {
                return Ok(s);
            }
            s.push(ch);
        }
        Err(ParseError::UnterminatedString { position: start })
    }

    fn take_while(&mut self, mut acc: String, pred: impl Fn(char) -> bool) -> String {
        while let Some(&(_, ch)) = self.chars.peek() {
            if !pred(ch) {
                break;
            }
            acc.push(ch);
            self.chars.next();
        }
        acc
    }

    fn peek_is(&mut self, pred: impl Fn(char) -> bool) -> bool {
        matches!(self.chars.peek(), Some(&(_, c)) if pred(c))
    }

    fn consume(&mut self, expected: char) -> bool {
        self.peek_is(|c| c == expected) && {
            self.chars.next();
            true
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_is(char::is_whitespace) {
            self.chars.next();
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
