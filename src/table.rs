use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    error::{QueryError, Result},
    value::Value,
};

/// A record: field name → scalar value.
pub type Row = BTreeMap<String, Value>;

/// What the schema does to a field when a row is inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldBehavior {
    /// Always overwritten with the table's next counter value.
    AutoIncrement,
    /// Always overwritten with the insertion time, in milliseconds since the epoch.
    Timestamp,
    /// Used only when the inserted row does not carry the field.
    Default(Value),
}

/// Field definition in the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    /// Applied in declaration order.
    pub behaviors: Vec<FieldBehavior>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviors: Vec::new(),
        }
    }

    pub fn with(mut self, behavior: FieldBehavior) -> Self {
        self.behaviors.push(behavior);
        self
    }
}

/// The closed set of fields rows of a table may hold.
///
/// An empty schema accepts rows as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    /// # Errors
    /// Returns [QueryError::InvalidSchema] if two fields share a name.
    pub fn new(fields: Vec<FieldDef>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(QueryError::InvalidSchema(format!(
                    "field {:?} is declared twice",
                    field.name
                )));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Removes every field the schema does not declare. No-op on an empty schema.
    pub fn prune(&self, row: &mut Row) {
        if !self.is_empty() {
            row.retain(|name, _| self.contains(name));
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Row>,
    pub schema: Schema,
    /// Last value handed out to an auto-increment field.
    auto_inc: u64,
    last_timestamp: i64,
}

impl Table {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    pub fn auto_inc(&self) -> u64 {
        self.auto_inc
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Validates a row against the schema and appends it.
    pub fn insert(&mut self, row: Row) {
        let row = self.validate_row(row);
        self.rows.push(row);
    }

    /// Makes a row comply with the schema.
    ///
    /// For each declared field, in order: auto-increment and timestamp
    /// fields are overwritten, defaults fill absent fields, and fields with no
    /// behavior that are absent become `NULL`. Undeclared fields are then
    /// dropped. Rows pass through untouched when the schema is empty.
    pub fn validate_row(&mut self, mut row: Row) -> Row {
        if self.schema.is_empty() {
            return row;
        }

        for field in &self.schema.fields {
            if field.behaviors.is_empty() {
                row.entry(field.name.clone()).or_insert(Value::Null);
                continue;
            }

            for behavior in &field.behaviors {
                match behavior {
                    FieldBehavior::AutoIncrement => {
                        self.auto_inc += 1;
                        row.insert(field.name.clone(), Value::Int(self.auto_inc as i64));
                    }
                    FieldBehavior::Timestamp => {
                        // strictly increasing so two inserts never share a timestamp
                        let now = Utc::now().timestamp_millis().max(self.last_timestamp + 1);
                        self.last_timestamp = now;
                        row.insert(field.name.clone(), Value::Int(now));
                    }
                    FieldBehavior::Default(value) => {
                        row.entry(field.name.clone())
                            .or_insert_with(|| value.clone());
                    }
                }
            }
        }

        self.schema.prune(&mut row);
        row
    }
}
