//! The datastores and the tables they hold.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{QueryError, Result},
    table::Table,
};

/// Names one of the two partitions of a [Store].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datastore {
    Local,
    Session,
}

impl Datastore {
    pub const ALL: [Datastore; 2] = [Datastore::Local, Datastore::Session];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Session => "session",
        }
    }
}

impl FromStr for Datastore {
    type Err = QueryError;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ds| ds.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| QueryError::UnknownDatastore(name.to_string()))
    }
}

impl fmt::Display for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tables of one datastore, by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Partition {
    pub tables: BTreeMap<String, Table>,
}

/// Owns both datastores. Each [crate::Database] has its own store, created
/// empty and dropped with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    local: Partition,
    session: Partition,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition(&self, datastore: Datastore) -> &Partition {
        match datastore {
            Datastore::Local => &self.local,
            Datastore::Session => &self.session,
        }
    }

    pub fn partition_mut(&mut self, datastore: Datastore) -> &mut Partition {
        match datastore {
            Datastore::Local => &mut self.local,
            Datastore::Session => &mut self.session,
        }
    }

    pub fn table(&self, datastore: Datastore, name: &str) -> Option<&Table> {
        self.partition(datastore).tables.get(name)
    }

    pub fn table_mut(&mut self, datastore: Datastore, name: &str) -> Option<&mut Table> {
        self.partition_mut(datastore).tables.get_mut(name)
    }

    /// Returns the table, creating an empty one without schema if needed.
    pub fn table_or_create(&mut self, datastore: Datastore, name: &str) -> &mut Table {
        self.partition_mut(datastore)
            .tables
            .entry(name.to_string())
            .or_default()
    }

    /// Adds a table. Returns `false` and leaves the store unchanged if the
    /// name is already taken.
    pub fn create_table(&mut self, datastore: Datastore, name: &str, table: Table) -> bool {
        let tables = &mut self.partition_mut(datastore).tables;
        if tables.contains_key(name) {
            return false;
        }
        tables.insert(name.to_string(), table);
        true
    }

    pub fn drop_table(&mut self, datastore: Datastore, name: &str) -> Option<Table> {
        self.partition_mut(datastore).tables.remove(name)
    }

    /// Table names of a datastore, in name order.
    pub fn table_names(&self, datastore: Datastore) -> impl Iterator<Item = &str> {
        self.partition(datastore).tables.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datastore_names() {
        assert_eq!("local".parse::<Datastore>().unwrap(), Datastore::Local);
        assert_eq!("SESSION".parse::<Datastore>().unwrap(), Datastore::Session);
        assert_eq!(
            "disk".parse::<Datastore>().unwrap_err(),
            QueryError::UnknownDatastore("disk".into())
        );
        assert_eq!(Datastore::Session.to_string(), "session");
    }

    #[test]
    fn test_create_and_drop_table() {
        let mut store = Store::new();

        assert!(store.create_table(Datastore::Local, "users", Table::default()));
        assert!(!store.create_table(Datastore::Local, "users", Table::default()));
        assert!(store.table(Datastore::Local, "users").is_some());
        // datastores are separate partitions
        assert!(store.table(Datastore::Session, "users").is_none());

        assert!(store.drop_table(Datastore::Local, "users").is_some());
        assert!(store.table(Datastore::Local, "users").is_none());
        assert!(store.drop_table(Datastore::Local, "users").is_none());
    }

    #[test]
    fn test_table_or_create() {
        let mut store = Store::new();
        store.table_or_create(Datastore::Session, "events").rows.push(Default::default());
        store.table_or_create(Datastore::Session, "events");

        assert_eq!(store.table(Datastore::Session, "events").unwrap().len(), 1);
    }

    #[test]
    fn test_table_names_sorted() {
        let mut store = Store::new();
        store.table_or_create(Datastore::Local, "users");
        store.table_or_create(Datastore::Local, "posts");

        let names: Vec<&str> = store.table_names(Datastore::Local).collect();
        assert_eq!(names, vec!["posts", "users"]);
        assert_eq!(store.table_names(Datastore::Session).count(), 0);
    }

    #[test]
    fn test_serialized_layout() {
        let mut store = Store::new();
        store.table_or_create(Datastore::Local, "t");

        let json: serde_json::Value = serde_json::to_value(&store).unwrap();
        assert!(json["local"]["tables"]["t"]["rows"].is_array());
        assert!(json["session"]["tables"].as_object().unwrap().is_empty());
    }
}
