pub mod ast;
pub mod clause;
pub mod config;
pub mod database;
pub mod error;
pub mod literal;
pub mod parser;
pub mod persistence;
pub mod store;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use config::{ChainEvaluation, EngineConfig};
pub use database::{Database, QueryResult};
pub use error::{QueryError, Result};
pub use literal::Substitutions;
pub use persistence::{JsonSnapshot, NoopPersistence, Persistence};
pub use store::{Datastore, Store};
pub use table::{FieldBehavior, FieldDef, Row, Schema, Table};
pub use value::Value;
