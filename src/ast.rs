use std::{fmt, str::FromStr};

use crate::{
    clause::Clause,
    error::{QueryError, Result},
    value::Value,
};

/// A parsed command, ready to be run against a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    InsertInto(InsertInto),
    Update(Update),
    DeleteFrom(DeleteFrom),
}

impl Statement {
    /// Keyword naming the command, used in logs.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::InsertInto(_) => "INSERT_INTO",
            Self::Update(_) => "UPDATE",
            Self::DeleteFrom(_) => "DELETE_FROM",
        }
    }

    pub fn table(&self) -> &TablePath {
        match self {
            Self::Select(s) => &s.table,
            Self::InsertInto(i) => &i.table,
            Self::Update(u) => &u.table,
            Self::DeleteFrom(d) => &d.table,
        }
    }
}

/// `[datastore.]table` as written in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePath {
    /// `None` when the query relies on the default datastore.
    pub datastore: Option<String>,
    pub table: String,
}

impl TablePath {
    pub fn new(datastore: Option<String>, table: impl Into<String>) -> Self {
        Self {
            datastore,
            table: table.into(),
        }
    }
}

impl FromStr for TablePath {
    type Err = QueryError;

    fn from_str(path: &str) -> Result<Self> {
        let path = path.trim();
        let (datastore, table) = match path.split_once('.') {
            Some((datastore, table)) => (Some(datastore.to_string()), table),
            None => (None, path),
        };

        if table.is_empty() || datastore.as_deref().is_some_and(str::is_empty) {
            return Err(QueryError::malformed(format!("invalid table path {path:?}")));
        }
        Ok(Self::new(datastore, table))
    }
}

impl fmt::Display for TablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.datastore {
            Some(datastore) => write!(f, "{datastore}.{}", self.table),
            None => f.write_str(&self.table),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnsSelect {
    Star,
    ColumnsNames(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// `ORDER BY col, col, ... [ASC|DESC]`: one direction shared by every column.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub columns: Vec<String>,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub columns: ColumnsSelect,
    pub table: TablePath,
    pub where_clause: Option<Clause>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertInto {
    pub table: TablePath,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: TablePath,
    pub assignments: Vec<(String, Value)>,
    pub where_clause: Option<Clause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteFrom {
    pub table: TablePath,
    pub where_clause: Option<Clause>,
}
