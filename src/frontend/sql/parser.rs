use std::collections::HashSet;

use crate::frontend::sql::{
    ast::{Assignment, CompareOp, Predicate, Statement},
    errors::{ParseError, Position},
    lexer::{Token, Tokenizer},
};
use crate::types::{Column, DataType};

pub fn parse(sql: &str) -> Result<Statement, ParseError> {
    let tokens = Tokenizer::new(sql).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };

    let stmt = parser.statement()?;
    parser.finish()?;
    Ok(stmt)
}

struct Parser {
    tokens: Vec<(Token, Position)>,
    pos: usize,
}

impl Parser {
    fn statement(&mut self) -> Result<Statement, ParseError> {
        let head = match self.peek() {
            Token::Ident(word) => word.to_ascii_uppercase(),
            _ => return Err(ParseError::Unsupported),
        };

        match head.as_str() {
            "SHOW" => self.show(),
            "CREATE" => self.create_table(),
            "DROP" => {
                self.keywords(&["DROP", "TABLE"])?;
                Ok(Statement::DropTable {
                    name: self.ident("table name")?,
                })
            }
            "TRUNCATE" => {
                self.keywords(&["TRUNCATE", "TABLE"])?;
                Ok(Statement::TruncateTable {
                    name: self.ident("table name")?,
                })
            }
            "INSERT" => self.insert(),
            "SELECT" => self.select(),
            "UPDATE" => self.update(),
            "DELETE" => {
                self.keywords(&["DELETE", "FROM"])?;
                let table = self.ident("table name")?;
                self.keyword("WHERE")?;
                Ok(Statement::Delete {
                    table,
                    predicate: self.predicate()?,
                })
            }
            _ => Err(ParseError::Unsupported),
        }
    }

    fn show(&mut self) -> Result<Statement, ParseError> {
        self.keyword("SHOW")?;

        if self.peek().is_keyword("TABLES") {
            self.advance();
            return Ok(Statement::ShowTables);
        }

        self.keywords(&["COLUMNS", "FROM"])?;
        Ok(Statement::ShowColumns {
            table: self.ident("table name")?,
        })
    }

    fn create_table(&mut self) -> Result<Statement, ParseError> {
        self.keywords(&["CREATE", "TABLE"])?;
        let name = self.ident("table name")?;
        self.expect(Token::LParen, "'('")?;

        let mut columns = Vec::new();
        let mut seen = HashSet::new();
        loop {
            let column = self.column_definition()?;
            if !seen.insert(column.name.clone()) {
                return Err(ParseError::DuplicateColumn(column.name));
            }
            columns.push(column);

            match self.advance() {
                Token::Comma => continue,
                Token::RParen => break,
                other => return Err(self.expected_before("',' or ')'", other)),
            }
        }

        Ok(Statement::CreateTable { name, columns })
    }

    /// Exactly one name token followed by one type token.
    fn column_definition(&mut self) -> Result<Column, ParseError> {
        let mut parts = Vec::new();
        while !matches!(self.peek(), Token::Comma | Token::RParen | Token::EOF) {
            parts.push(self.advance());
        }

        match parts.as_slice() {
            [Token::Ident(name), Token::Ident(ty)] => {
                let ty: DataType = ty.parse().map_err(|_| ParseError::UnknownType {
                    column: name.clone(),
                    ty: ty.clone(),
                })?;
                Ok(Column::new(name.clone(), ty))
            }
            _ => Err(ParseError::MalformedDefinition {
                definition: parts
                    .iter()
                    .map(Token::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            }),
        }
    }

    fn insert(&mut self) -> Result<Statement, ParseError> {
        self.keywords(&["INSERT", "INTO"])?;
        let table = self.ident("table name")?;
        self.keyword("VALUES")?;
        self.expect(Token::LParen, "'('")?;

        let mut values = vec![self.literal()?];
        loop {
            match self.advance() {
                Token::Comma => values.push(self.literal()?),
                Token::RParen => break,
                other => return Err(self.expected_before("',' or ')'", other)),
            }
        }

        Ok(Statement::Insert { table, values })
    }

    fn select(&mut self) -> Result<Statement, ParseError> {
        self.keyword("SELECT")?;

        let columns = if *self.peek() == Token::Star {
            self.advance();
            None
        } else {
            let mut names = vec![self.ident("column name")?];
            while *self.peek() == Token::Comma {
                self.advance();
                names.push(self.ident("column name")?);
            }
            Some(names)
        };

        self.keyword("FROM")?;
        let table = self.ident("table name")?;

        let predicate = if self.peek().is_keyword("WHERE") {
            self.advance();
            Some(self.predicate()?)
        } else {
            None
        };

        Ok(Statement::Select {
            table,
            columns,
            predicate,
        })
    }

    fn update(&mut self) -> Result<Statement, ParseError> {
        self.keyword("UPDATE")?;
        let table = self.ident("table name")?;
        self.keyword("SET")?;

        let column = self.ident("column name")?;
        self.expect(Token::Eq, "'='")?;
        let value = self.literal()?;

        self.keyword("WHERE")?;
        Ok(Statement::Update {
            table,
            assignment: Assignment { column, value },
            predicate: self.predicate()?,
        })
    }

    fn predicate(&mut self) -> Result<Predicate, ParseError> {
        let column = self.ident("column name")?;

        let op = match self.advance() {
            Token::Eq => CompareOp::Eq,
            Token::NotEq => CompareOp::NotEq,
            Token::Lt => CompareOp::Lt,
            Token::Gt => CompareOp::Gt,
            other => return Err(self.expected_before("comparison operator", other)),
        };

        Ok(Predicate {
            column,
            op,
            value: self.literal()?,
        })
    }

    /// Integer, quoted string or bare word, returned as written.
    fn literal(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Token::Number(s) | Token::String(s) | Token::Ident(s) => Ok(s),
            other => Err(self.expected_before("value", other)),
        }
    }

    fn ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.advance() {
            Token::Ident(s) => Ok(s),
            other => Err(self.expected_before(what, other)),
        }
    }

    fn keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.peek().is_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(keyword))
        }
    }

    fn keywords(&mut self, keywords: &[&str]) -> Result<(), ParseError> {
        keywords.iter().try_for_each(|kw| self.keyword(kw))
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), ParseError> {
        if *self.peek() == token {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(what))
        }
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        if *self.peek() == Token::Semicolon {
            self.advance();
        }
        match self.peek() {
            Token::EOF => Ok(()),
            _ => Err(self.expected("end of statement")),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// Returns the current token and moves on; stays put at EOF.
    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].0.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expected(&self, what: &str) -> ParseError {
        ParseError::Expected {
            expected: what.to_string(),
            found: self.peek().to_string(),
            position: self.tokens[self.pos].1,
        }
    }

    /// Error for a token already consumed by [`Parser::advance`].
    fn expected_before(&self, what: &str, found: Token) -> ParseError {
        let at = if found == Token::EOF {
            self.pos
        } else {
            self.pos.saturating_sub(1)
        };

        ParseError::Expected {
            expected: what.to_string(),
            found: found.to_string(),
            position: self.tokens[at].1,
        }
    }
}
