use crate::{
    ast::*,
    clause::{Clause, ClauseToken, Term},
    error::{QueryError, Result},
    literal::{Extraction, Substitutions, extract_literals},
    table::{FieldBehavior, FieldDef},
    tokenizer::{Comparator, Token, Tokenizer},
    value::Value,
};

/// Everything known about one query while it is being read: its tokens and
/// the values its literal labels stand for.
#[derive(Debug, Clone)]
pub struct QueryFeed {
    pub tokens: Vec<Token>,
    pub extraction: Extraction,
}

impl QueryFeed {
    /// Extracts literals and placeholders, then tokenizes what is left.
    pub fn new(query: &str, subs: Option<&Substitutions>) -> Result<Self> {
        let extraction = extract_literals(query, subs)?;
        let tokens = Tokenizer::new(extraction.text()).tokenize()?;
        Ok(Self { tokens, extraction })
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    extraction: Extraction,
    position: usize,
}

impl Parser {
    pub fn new(feed: QueryFeed) -> Self {
        Self {
            tokens: feed.tokens,
            extraction: feed.extraction,
            position: 0,
        }
    }

    /// Parses one command. A trailing `;` is accepted; anything else after the
    /// command is an error.
    pub fn parse(&mut self) -> Result<Statement> {
        let statement = match self.current_token() {
            Token::Select => self.parse_select(),
            Token::InsertInto => self.parse_insert(),
            Token::Update => self.parse_update(),
            Token::DeleteFrom => self.parse_delete(),
            other => Err(QueryError::malformed(format!("unknown command {other:?}"))),
        }?;

        if matches!(self.current_token(), Token::Semicolon) {
            self.advance();
        }

        if !self.is_at_end() {
            return Err(QueryError::malformed(format!(
                "unexpected token after statement: {:?}",
                self.current_token()
            )));
        }

        Ok(statement)
    }

    /// Parses a schema field specification: `name [auto_inc] [timestamp] [default <value>]`.
    pub fn parse_field_def(&mut self) -> Result<FieldDef> {
        let name = self
            .consume_ident()
            .map_err(|e| QueryError::InvalidSchema(e.to_string()))?;
        let mut field = FieldDef::new(name);

        while !self.is_at_end() {
            let attribute = self
                .consume_ident()
                .map_err(|e| QueryError::InvalidSchema(e.to_string()))?;
            let behavior = match attribute.to_lowercase().as_str() {
                "auto_inc" => FieldBehavior::AutoIncrement,
                "timestamp" => FieldBehavior::Timestamp,
                "default" => FieldBehavior::Default(self.consume_value().map_err(|_| {
                    QueryError::InvalidSchema(format!("missing default value for {:?}", field.name))
                })?),
                _ => {
                    return Err(QueryError::InvalidSchema(format!(
                        "unknown attribute {attribute:?} on field {:?}",
                        field.name
                    )));
                }
            };
            field.behaviors.push(behavior);
        }

        Ok(field)
    }

    //helpers
    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_token(), Token::Eof)
    }

    fn consume(&mut self, expected: Token) -> Result<()> {
        if *self.current_token() == expected {
            self.advance();
            Ok(())
        } else {
            Err(QueryError::malformed(format!(
                "expected {:?}, found {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    fn consume_ident(&mut self) -> Result<String> {
        match self.current_token() {
            Token::Ident(string) => {
                let string = string.clone();
                self.advance();
                Ok(string)
            }
            _ => Err(QueryError::malformed(format!(
                "expected identifier, found {:?}",
                self.current_token()
            ))),
        }
    }

    /// Reads `ident (, ident)*`.
    fn consume_ident_list(&mut self) -> Result<Vec<String>> {
        let mut idents = vec![self.consume_ident()?];
        while matches!(self.current_token(), Token::Comma) {
            self.advance();
            idents.push(self.consume_ident()?);
        }
        Ok(idents)
    }

    /// Reads a value: a literal label, a number, `true`/`false`/`null`, or a
    /// bare word taken as text.
    fn consume_value(&mut self) -> Result<Value> {
        let value = match self.current_token() {
            Token::Number(n) => Value::Int(*n),
            Token::FloatNumber(f) => Value::Float(*f),
            Token::Ident(word) => match self.extraction.resolve(word) {
                Some(value) => value.clone(),
                None => match word.to_lowercase().as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    "null" => Value::Null,
                    _ => Value::from(word.as_str()),
                },
            },
            other => {
                return Err(QueryError::malformed(format!(
                    "expected a value, found {other:?}"
                )));
            }
        };
        self.advance();
        Ok(value)
    }

    fn consume_comparator(&mut self) -> Result<Comparator> {
        match self.current_token() {
            Token::Op(op) => {
                let op = *op;
                self.advance();
                Ok(op)
            }
            other => Err(QueryError::malformed(format!(
                "expected a comparison operator, found {other:?}"
            ))),
        }
    }

    fn parse_table_path(&mut self) -> Result<TablePath> {
        let first = self.consume_ident()?;
        if matches!(self.current_token(), Token::Dot) {
            self.advance();
            let table = self.consume_ident()?;
            return Ok(TablePath::new(Some(first), table));
        }
        Ok(TablePath::new(None, first))
    }

    /// Collects the `WHERE` clause up to `ORDER BY`, `LIMIT` or the end of the query.
    fn parse_where(&mut self) -> Result<Option<Clause>> {
        if !matches!(self.current_token(), Token::Where) {
            return Ok(None);
        }
        self.advance();

        let mut tokens = Vec::new();
        loop {
            let token = match self.current_token() {
                Token::OrderBy | Token::Limit | Token::Semicolon | Token::Eof => break,
                Token::LeftParen => ClauseToken::Open,
                Token::RightParen => ClauseToken::Close,
                Token::And => ClauseToken::And,
                Token::Or => ClauseToken::Or,
                Token::Ident(_) => {
                    let field = self.consume_ident()?;
                    let op = self.consume_comparator()?;
                    let value = self.consume_value()?;
                    tokens.push(ClauseToken::Term(Term { field, op, value }));
                    continue;
                }
                other => {
                    return Err(QueryError::malformed(format!(
                        "unexpected {other:?} in WHERE clause"
                    )));
                }
            };
            tokens.push(token);
            self.advance();
        }

        Clause::new(tokens).map(Some)
    }

    fn parse_order_by(&mut self) -> Result<Option<OrderBy>> {
        if !matches!(self.current_token(), Token::OrderBy) {
            return Ok(None);
        }
        self.advance();

        let columns = self.consume_ident_list()?;
        let direction = match self.current_token() {
            Token::Asc => {
                self.advance();
                SortDirection::Asc
            }
            Token::Desc => {
                self.advance();
                SortDirection::Desc
            }
            _ => SortDirection::Asc,
        };
        Ok(Some(OrderBy { columns, direction }))
    }

    /// `LIMIT n`: any non-negative number, fractions are truncated.
    fn parse_limit(&mut self) -> Result<Option<usize>> {
        if !matches!(self.current_token(), Token::Limit) {
            return Ok(None);
        }
        self.advance();

        let value = self.consume_value()?;
        let limit = match &value {
            Value::Int(n) => usize::try_from(*n).ok(),
            other => {
                let n = other.to_number();
                (n.is_finite() && n >= 0.0).then(|| n.trunc() as usize)
            }
        };
        limit
            .map(Some)
            .ok_or_else(|| QueryError::malformed(format!("invalid LIMIT {value}")))
    }

    fn parse_select(&mut self) -> Result<Statement> {
        self.consume(Token::Select)?;
        let columns = if matches!(self.current_token(), Token::Star) {
            self.advance();
            ColumnsSelect::Star
        } else {
            ColumnsSelect::ColumnsNames(self.consume_ident_list()?)
        };
        self.consume(Token::From)?;
        let table = self.parse_table_path()?;
        let where_clause = self.parse_where()?;
        let order_by = self.parse_order_by()?;
        let limit = self.parse_limit()?;

        Ok(Statement::Select(Select {
            columns,
            table,
            where_clause,
            order_by,
            limit,
        }))
    }

    fn parse_insert(&mut self) -> Result<Statement> {
        self.consume(Token::InsertInto)?;
        let table = self.parse_table_path()?;

        self.consume(Token::LeftParen)?;
        let columns = self.consume_ident_list()?;
        self.consume(Token::RightParen)?;

        self.consume(Token::Values)?;
        self.consume(Token::LeftParen)?;
        let mut values = vec![self.consume_value()?];
        while matches!(self.current_token(), Token::Comma) {
            self.advance();
            values.push(self.consume_value()?);
        }
        self.consume(Token::RightParen)?;

        if columns.len() != values.len() {
            return Err(QueryError::malformed(format!(
                "{} field(s) but {} value(s) in INSERT",
                columns.len(),
                values.len()
            )));
        }

        Ok(Statement::InsertInto(InsertInto {
            table,
            columns,
            values,
        }))
    }

    fn parse_update(&mut self) -> Result<Statement> {
        self.consume(Token::Update)?;
        let table = self.parse_table_path()?;
        self.consume(Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let field = self.consume_ident()?;
            self.consume(Token::Op(Comparator::Eq))?;
            assignments.push((field, self.consume_value()?));
            if !matches!(self.current_token(), Token::Comma) {
                break;
            }
            self.advance();
        }
        let where_clause = self.parse_where()?;

        Ok(Statement::Update(Update {
            table,
            assignments,
            where_clause,
        }))
    }

    fn parse_delete(&mut self) -> Result<Statement> {
        self.consume(Token::DeleteFrom)?;
        let table = self.parse_table_path()?;
        let where_clause = self.parse_where()?;

        Ok(Statement::DeleteFrom(DeleteFrom {
            table,
            where_clause,
        }))
    }
}

/// Parses a query into a statement.
pub fn parse_query(query: &str, subs: Option<&Substitutions>) -> Result<Statement> {
    Parser::new(QueryFeed::new(query, subs)?).parse()
}

/// Parses one schema field specification, e.g. `role default 'guest'`.
pub fn parse_field_spec(spec: &str) -> Result<FieldDef> {
    Parser::new(QueryFeed::new(spec, None)?).parse_field_def()
}
