use std::{cmp::Ordering, fmt};

use bitvec::prelude::*;
use tracing::{debug, info, trace};

use crate::{
    ast::{
        ColumnsSelect, DeleteFrom, InsertInto, OrderBy, Select, SortDirection, Statement,
        TablePath, Update,
    },
    clause::Clause,
    config::{ChainEvaluation, EngineConfig},
    error::Result,
    literal::Substitutions,
    parser::{parse_field_spec, parse_query},
    persistence::{NoopPersistence, Persistence},
    store::{Datastore, Store},
    table::{Row, Schema, Table},
    value::Value,
};

/// Rows produced by a query.
///
/// `SELECT` yields the matching rows; mutating commands yield the whole table
/// as it stands after the command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Emits the rendered result at `info` level.
    pub fn log(&self) {
        info!("\n{self}");
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            lines.push(format!("[{i}]"));
            for (field, value) in row {
                lines.push(format!("\t{field}:"));
                lines.push(format!("\t  {value}"));
            }
        }
        f.write_str(&lines.join("\n"))
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// The main entry point of the query engine.
///
/// Owns the [Store] holding both datastores; tables live as long as the
/// database does. Every command that changes a table is followed by a call to
/// the [Persistence] hook.
#[derive(Debug, Default)]
pub struct Database<P: Persistence = NoopPersistence> {
    store: Store,
    config: EngineConfig,
    persistence: P,
}

impl Database {
    /// Creates an empty database with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_persistence(config, NoopPersistence)
    }
}

impl<P: Persistence> Database<P> {
    pub fn with_persistence(config: EngineConfig, persistence: P) -> Self {
        Self {
            store: Store::new(),
            config,
            persistence,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Runs one query. The addressed table is created if it does not exist yet.
    ///
    /// # Errors
    /// Every error is raised before any row is touched, see [crate::QueryError].
    ///
    /// # Example
    /// ```
    /// use storeql::{Database, Value};
    ///
    /// let mut db = Database::new();
    /// db.query("INSERT INTO users (id, name) VALUES (1, 'Alice')").unwrap();
    /// db.query("INSERT INTO users (id, name) VALUES (2, 'Bob')").unwrap();
    ///
    /// let result = db.query("SELECT name FROM users WHERE id > 1").unwrap();
    /// assert_eq!(result.len(), 1);
    /// assert_eq!(result.rows[0]["name"], Value::from("Bob"));
    /// ```
    pub fn query(&mut self, sql: &str) -> Result<QueryResult> {
        self.run(sql, None)
    }

    /// Runs one query whose `:name` or `?` placeholders are filled from `subs`.
    ///
    /// # Example
    /// ```
    /// use storeql::{Database, Substitutions, Value};
    ///
    /// let mut db = Database::new();
    /// db.query_with(
    ///     "INSERT INTO session.notes (title) VALUES (:title)",
    ///     &Substitutions::named([("title", "it's here")]),
    /// )
    /// .unwrap();
    ///
    /// let subs = Substitutions::positional(["it's here"]);
    /// let result = db
    ///     .query_with("SELECT * FROM session.notes WHERE title = ?", &subs)
    ///     .unwrap();
    /// assert_eq!(result.rows[0]["title"], Value::from("it's here"));
    /// ```
    pub fn query_with(&mut self, sql: &str, subs: &Substitutions) -> Result<QueryResult> {
        self.run(sql, Some(subs))
    }

    fn run(&mut self, sql: &str, subs: Option<&Substitutions>) -> Result<QueryResult> {
        let statement = parse_query(sql, subs)?;
        let datastore = self.resolve_datastore(statement.table())?;
        debug!(verb = statement.verb(), table = %statement.table(), %datastore, "executing query");

        let mode = self.config.chain_evaluation;
        let table = self
            .store
            .table_or_create(datastore, &statement.table().table);

        let (result, mutated) = match statement {
            Statement::Select(select) => (execute_select(table, select, mode), false),
            Statement::InsertInto(insert) => (execute_insert(table, insert), true),
            Statement::Update(update) => (execute_update(table, update, mode), true),
            Statement::DeleteFrom(delete) => (execute_delete(table, delete, mode), true),
        };
        trace!(rows = result.len(), "query done");

        if mutated {
            self.commit();
        }
        Ok(result)
    }

    /// Creates a table whose schema is read from field specifications such as
    /// `"id auto_inc"`, `"created timestamp"` or `"role default 'guest'"`.
    ///
    /// Does nothing if the table already exists.
    ///
    /// # Errors
    /// [crate::QueryError::InvalidSchema] if a specification can't be read or a
    /// field is declared twice.
    pub fn define_table<S: AsRef<str>>(&mut self, path: &str, fields: &[S]) -> Result<()> {
        let (datastore, name) = self.resolve_path(path)?;
        if self.store.table(datastore, &name).is_some() {
            return Ok(());
        }

        let fields = fields
            .iter()
            .map(|spec| parse_field_spec(spec.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let schema = Schema::new(fields)?;
        debug!(%datastore, table = %name, fields = schema.fields().len(), "defining table");

        self.store.create_table(datastore, &name, Table::new(schema));
        self.commit();
        Ok(())
    }

    pub fn table_exists(&self, path: &str) -> Result<bool> {
        Ok(self.table(path)?.is_some())
    }

    pub fn table(&self, path: &str) -> Result<Option<&Table>> {
        let (datastore, name) = self.resolve_path(path)?;
        Ok(self.store.table(datastore, &name))
    }

    /// Lists every datastore followed by its tables, one per line.
    ///
    /// Tables are listed in name order, not in the order they were created.
    pub fn show_tables(&self) -> String {
        let mut lines = Vec::new();
        for datastore in Datastore::ALL {
            lines.push(format!("[{datastore}]"));
            lines.extend(self.store.table_names(datastore).map(|name| format!("\t{name}")));
        }
        lines.join("\n")
    }

    /// Removes a table. Dropping a table that does not exist is not an error.
    pub fn drop_table(&mut self, path: &str) -> Result<()> {
        let (datastore, name) = self.resolve_path(path)?;
        let dropped = self.store.drop_table(datastore, &name).is_some();
        debug!(%datastore, table = %name, dropped, "dropping table");
        self.commit();
        Ok(())
    }

    /// Appends rows to a table, creating it if needed. Each row goes through the
    /// table's schema first.
    pub fn insert(&mut self, path: &str, rows: impl IntoIterator<Item = Row>) -> Result<QueryResult> {
        let (datastore, name) = self.resolve_path(path)?;
        let table = self.store.table_or_create(datastore, &name);
        for row in rows {
            table.insert(row);
        }
        let result = QueryResult {
            rows: table.rows.clone(),
        };
        trace!(%datastore, table = %name, rows = result.len(), "bulk insert");

        self.commit();
        Ok(result)
    }

    //helpers
    fn resolve_path(&self, path: &str) -> Result<(Datastore, String)> {
        let path: TablePath = path.parse()?;
        let datastore = self.resolve_datastore(&path)?;
        Ok((datastore, path.table))
    }

    fn resolve_datastore(&self, path: &TablePath) -> Result<Datastore> {
        match &path.datastore {
            Some(name) => name.parse(),
            None => Ok(self.config.default_datastore),
        }
    }

    fn commit(&mut self) {
        debug!("commit");
        self.persistence.commit(&self.store);
    }
}

/// Marks the rows satisfying the clause. Without a clause every row matches.
fn match_rows(table: &Table, where_clause: Option<&Clause>, mode: ChainEvaluation) -> BitVec {
    table
        .rows
        .iter()
        .map(|row| where_clause.is_none_or(|clause| clause.evaluate(row, mode)))
        .collect()
}

/// Filters, sorts, truncates, then projects.
///
/// Projection removes the unselected fields from the stored rows themselves,
/// not only from the returned copies.
fn execute_select(table: &mut Table, select: Select, mode: ChainEvaluation) -> QueryResult {
    let mask = match_rows(table, select.where_clause.as_ref(), mode);
    let mut selected: Vec<usize> = mask.iter_ones().collect();
    trace!(matched = selected.len(), "select filter");

    if let Some(order_by) = &select.order_by {
        // sort_by is stable, ties keep table order
        selected.sort_by(|&a, &b| compare_rows(&table.rows[a], &table.rows[b], order_by));
    }

    if let Some(limit) = select.limit {
        selected.truncate(limit);
    }

    if let ColumnsSelect::ColumnsNames(names) = &select.columns {
        for &index in &selected {
            table.rows[index].retain(|field, _| names.contains(field));
        }
    }

    QueryResult {
        rows: selected.iter().map(|&index| table.rows[index].clone()).collect(),
    }
}

/// Compares two rows column by column, moving to the next column only on a tie.
/// One direction applies to every column.
fn compare_rows(a: &Row, b: &Row, order_by: &OrderBy) -> Ordering {
    for column in &order_by.columns {
        let left = a.get(column).unwrap_or(&Value::Null);
        let right = b.get(column).unwrap_or(&Value::Null);

        let mut ord = left.sort_cmp(right);
        if order_by.direction == SortDirection::Desc {
            ord = ord.reverse();
        }
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn execute_insert(table: &mut Table, insert: InsertInto) -> QueryResult {
    let row: Row = insert.columns.into_iter().zip(insert.values).collect();
    table.insert(row);

    QueryResult {
        rows: table.rows.clone(),
    }
}

/// Assigns the new values to every matching row. Fields the schema does not
/// declare are left out, unless the schema is empty.
fn execute_update(table: &mut Table, update: Update, mode: ChainEvaluation) -> QueryResult {
    let mask = match_rows(table, update.where_clause.as_ref(), mode);
    let assignments: Vec<_> = update
        .assignments
        .into_iter()
        .filter(|(field, _)| table.schema.is_empty() || table.schema.contains(field))
        .collect();

    for index in mask.iter_ones() {
        let row = &mut table.rows[index];
        for (field, value) in &assignments {
            row.insert(field.clone(), value.clone());
        }
    }
    trace!(updated = mask.count_ones(), "update");

    QueryResult {
        rows: table.rows.clone(),
    }
}

/// Keeps the rows that do not match, in their original order.
fn execute_delete(table: &mut Table, delete: DeleteFrom, mode: ChainEvaluation) -> QueryResult {
    let mask = match_rows(table, delete.where_clause.as_ref(), mode);
    trace!(deleted = mask.count_ones(), "delete");

    let mut index = 0;
    table.rows.retain(|_| {
        let keep = !mask[index];
        index += 1;
        keep
    });

    QueryResult {
        rows: table.rows.clone(),
    }
}
