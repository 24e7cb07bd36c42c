use std::fmt;

use crate::error::{QueryError, Result};

/// The comparison operators allowed in a `WHERE` term or a `SET` assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Comparator {
    /// Maps an operator run such as `>=` to its comparator.
    ///
    /// # Errors
    /// Returns [QueryError::UnknownComparator] for any other run (`<>`, `==`, `=!`...).
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        match symbol {
            "=" => Ok(Self::Eq),
            "!=" => Ok(Self::NotEq),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::LtEq),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::GtEq),
            _ => Err(QueryError::UnknownComparator(symbol.to_string())),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Represents the smallest meaningful units (atoms) of the query language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- Keywords ---
    Select,
    From,
    Where,
    And,
    Or,
    /// `ORDER BY`, read as one keyword.
    OrderBy,
    Asc,
    Desc,
    Limit,
    /// `INSERT INTO`, read as one keyword.
    InsertInto,
    Values,
    Update,
    Set,
    /// `DELETE FROM`, read as one keyword.
    DeleteFrom,

    // --- Identifiers & Literals ---
    /// A name representing a datastore, a table or a field (e.g., `users`, `id`).
    /// Literal labels produced by the extractor also come out as identifiers.
    Ident(String),
    /// A 64-bit integer literal (e.g., `42`).
    Number(i64),
    /// A 64-bit floating-point literal (e.g., `3.14`).
    FloatNumber(f64),

    // --- Symbols ---
    /// One of `= != < <= > >=`
    Op(Comparator),
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Comma `,`
    Comma,
    /// Dot `.` between a datastore and a table name
    Dot,
    /// Semicolon `;`
    Semicolon,
    /// Wildcard `*`
    Star,

    // --- Special ---
    /// Represents the End Of Input.
    Eof,
}

/// Words that may be followed by a second word to form a single keyword.
const COMPOUND_KEYWORDS: [(&str, &str, Token); 3] = [
    ("ORDER", "BY", Token::OrderBy),
    ("INSERT", "INTO", Token::InsertInto),
    ("DELETE", "FROM", Token::DeleteFrom),
];

/// A lexical scanner that converts a de-literalized query into a sequence of [Token]s.
///
/// Whitespace only separates tokens, so `a = 1`, `a=1` and `a =1` all produce the
/// same three tokens. Keywords are matched case-insensitively on whole words.
pub struct Tokenizer {
    /// The input string stored as a vector of characters for easy iteration.
    input: Vec<char>,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Processes the entire input and returns a vector of tokens ending with [Token::Eof].
    ///
    /// # Errors
    /// Returns an error if an invalid character or operator is encountered.
    ///
    /// # Example
    /// ```
    /// # use storeql::tokenizer::{Tokenizer, Token};
    /// let tokens = Tokenizer::new("select * from users order by id").tokenize().unwrap();
    /// assert_eq!(tokens[0], Token::Select);
    /// assert_eq!(tokens[4], Token::OrderBy);
    /// ```
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        tokens.push(Token::Eof);
        Ok(tokens)
    }

    /// Identifies the next token based on the character at the current position.
    fn next_token(&mut self) -> Result<Token> {
        let ch = self.current_char();

        match ch {
            '(' => {
                self.advance();
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RightParen)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            '.' => {
                self.advance();
                Ok(Token::Dot)
            }
            ';' => {
                self.advance();
                Ok(Token::Semicolon)
            }
            '*' => {
                self.advance();
                Ok(Token::Star)
            }
            '!' | '=' | '<' | '>' => self.read_operator(),
            '-' if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_word()),
            _ => Err(QueryError::malformed(format!(
                "character {ch:?} is not supported"
            ))),
        }
    }

    // --- Navigation Helpers ---

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    // --- Extraction Logic ---

    /// Reads a whole run of operator characters so that `<>` or `==` are
    /// rejected instead of being split into two valid operators.
    fn read_operator(&mut self) -> Result<Token> {
        let mut symbol = String::new();
        while !self.is_at_end() && matches!(self.current_char(), '!' | '=' | '<' | '>') {
            symbol.push(self.current_char());
            self.advance();
        }
        Comparator::from_symbol(&symbol).map(Token::Op)
    }

    /// Reads a word and decides whether it is a keyword or an identifier.
    fn read_word(&mut self) -> Token {
        let word = self.read_identifier();
        let upper = word.to_uppercase();

        for (first, second, token) in &COMPOUND_KEYWORDS {
            if upper == *first {
                let checkpoint = self.position;
                self.skip_whitespace();
                if !self.is_at_end() && self.current_char().is_alphabetic() {
                    let next = self.read_identifier();
                    if next.eq_ignore_ascii_case(second) {
                        return token.clone();
                    }
                }
                self.position = checkpoint;
            }
        }

        match upper.as_str() {
            "SELECT" => Token::Select,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "AND" => Token::And,
            "OR" => Token::Or,
            "ASC" => Token::Asc,
            "DESC" => Token::Desc,
            "LIMIT" => Token::Limit,
            "VALUES" => Token::Values,
            "UPDATE" => Token::Update,
            "SET" => Token::Set,
            _ => Token::Ident(word),
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();

        while !self.is_at_end()
            && (self.current_char().is_alphanumeric() || self.current_char() == '_')
        {
            ident.push(self.current_char());
            self.advance();
        }
        ident
    }

    /// Reads a numeric literal. If a dot `.` is encountered, it returns a
    /// [Token::FloatNumber], otherwise a [Token::Number].
    fn read_number(&mut self) -> Result<Token> {
        let mut number = String::new();
        let mut has_dot = false;

        if self.current_char() == '-' {
            number.push('-');
            self.advance();
        }

        while !self.is_at_end()
            && (self.current_char().is_ascii_digit() || (self.current_char() == '.' && !has_dot))
        {
            if self.current_char() == '.' {
                has_dot = true;
            }
            number.push(self.current_char());
            self.advance();
        }

        if !self.is_at_end() && self.current_char() == '.' {
            return Err(QueryError::malformed("multiple dots are not allowed for a float"));
        }

        if has_dot {
            return number
                .parse::<f64>()
                .map(Token::FloatNumber)
                .map_err(|e| QueryError::malformed(format!("{number}: {e}")));
        }

        // integers beyond i64 are still numbers
        match number.parse::<i64>() {
            Ok(n) => Ok(Token::Number(n)),
            Err(_) => number
                .parse::<f64>()
                .map(Token::FloatNumber)
                .map_err(|e| QueryError::malformed(format!("{number}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Tokenizer::new(input).tokenize().unwrap()
    }

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(
            tokenize("SELECT * FROM users"),
            vec![
                Token::Select,
                Token::Star,
                Token::From,
                Token::Ident("users".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(tokenize("select"), tokenize("SeLeCt"));
        assert_eq!(
            tokenize("a=1 and b=2 AND c=3 or d=4"),
            vec![
                Token::Ident("a".into()),
                Token::Op(Comparator::Eq),
                Token::Number(1),
                Token::And,
                Token::Ident("b".into()),
                Token::Op(Comparator::Eq),
                Token::Number(2),
                Token::And,
                Token::Ident("c".into()),
                Token::Op(Comparator::Eq),
                Token::Number(3),
                Token::Or,
                Token::Ident("d".into()),
                Token::Op(Comparator::Eq),
                Token::Number(4),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_compound_keywords() {
        assert_eq!(
            tokenize("insert  into t"),
            vec![Token::InsertInto, Token::Ident("t".into()), Token::Eof]
        );
        assert_eq!(
            tokenize("Delete\n\tFrom t"),
            vec![Token::DeleteFrom, Token::Ident("t".into()), Token::Eof]
        );
        assert_eq!(
            tokenize("ORDER BY a,b DESC"),
            vec![
                Token::OrderBy,
                Token::Ident("a".into()),
                Token::Comma,
                Token::Ident("b".into()),
                Token::Desc,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        assert_eq!(
            tokenize("orders ordered_by"),
            vec![
                Token::Ident("orders".into()),
                Token::Ident("ordered_by".into()),
                Token::Eof,
            ]
        );
        // a lone ORDER stays an identifier
        assert_eq!(
            tokenize("order by_date"),
            vec![
                Token::Ident("order".into()),
                Token::Ident("by_date".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_with_and_without_spaces() {
        let expected = vec![
            Token::Ident("age".into()),
            Token::Op(Comparator::GtEq),
            Token::Number(18),
            Token::Eof,
        ];
        assert_eq!(tokenize("age>=18"), expected);
        assert_eq!(tokenize("age >= 18"), expected);
        assert_eq!(tokenize("  age   >=18  "), expected);

        assert_eq!(tokenize("a!=b")[1], Token::Op(Comparator::NotEq));
        assert_eq!(tokenize("a<b")[1], Token::Op(Comparator::Lt));
        assert_eq!(tokenize("a<=b")[1], Token::Op(Comparator::LtEq));
        assert_eq!(tokenize("a>b")[1], Token::Op(Comparator::Gt));
    }

    #[test]
    fn test_unknown_operator() {
        let err = Tokenizer::new("a<>1").tokenize().unwrap_err();
        assert_eq!(err, QueryError::UnknownComparator("<>".into()));

        let err = Tokenizer::new("a == 1").tokenize().unwrap_err();
        assert_eq!(err, QueryError::UnknownComparator("==".into()));
    }

    #[test]
    fn test_parentheses_and_paths() {
        assert_eq!(
            tokenize("( a=1 )"),
            vec![
                Token::LeftParen,
                Token::Ident("a".into()),
                Token::Op(Comparator::Eq),
                Token::Number(1),
                Token::RightParen,
                Token::Eof,
            ]
        );
        assert_eq!(
            tokenize("session.users"),
            vec![
                Token::Ident("session".into()),
                Token::Dot,
                Token::Ident("users".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(
            tokenize("42, -7, 1.5"),
            vec![
                Token::Number(42),
                Token::Comma,
                Token::Number(-7),
                Token::Comma,
                Token::FloatNumber(1.5),
                Token::Eof,
            ]
        );
        assert!(Tokenizer::new("1.2.3").tokenize().is_err());
    }

    #[test]
    fn test_integer_overflow_becomes_float() {
        assert_eq!(
            tokenize("9223372036854775807 9223372036854775808 -9223372036854775809"),
            vec![
                Token::Number(i64::MAX),
                Token::FloatNumber(9223372036854775808.0),
                Token::FloatNumber(-9223372036854775809.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_literal_labels_are_identifiers() {
        assert_eq!(
            tokenize("name=_LIT1_"),
            vec![
                Token::Ident("name".into()),
                Token::Op(Comparator::Eq),
                Token::Ident("_LIT1_".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unsupported_character() {
        assert!(Tokenizer::new("a=1 # comment").tokenize().is_err());
    }
}
