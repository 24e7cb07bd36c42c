//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{error::Result, store::Datastore};

/// How a flat `AND`/`OR` chain (no parentheses left) is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainEvaluation {
    /// Left to right, stopping at the first operand whose value combined with
    /// the following operator settles the result. `a AND b OR c` with `a`
    /// false is false, whatever `c` is.
    #[default]
    Sequential,
    /// `AND` binds tighter than `OR`: the chain is an `OR` of `AND` groups.
    Precedence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Datastore used by paths without a `datastore.` prefix.
    pub default_datastore: Datastore,
    pub chain_evaluation: ChainEvaluation,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_datastore: Datastore::Local,
            chain_evaluation: ChainEvaluation::Sequential,
        }
    }
}

impl EngineConfig {
    /// Loads a configuration from JSON; missing keys keep their default.
    ///
    /// ```
    /// # use storeql::{ChainEvaluation, Datastore, EngineConfig};
    /// let config = EngineConfig::from_json_str(r#"{"chain_evaluation": "precedence"}"#).unwrap();
    /// assert_eq!(config.chain_evaluation, ChainEvaluation::Precedence);
    /// assert_eq!(config.default_datastore, Datastore::Local);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_default_datastore(mut self, datastore: Datastore) -> Self {
        self.default_datastore = datastore;
        self
    }

    pub fn with_chain_evaluation(mut self, chain_evaluation: ChainEvaluation) -> Self {
        self.chain_evaluation = chain_evaluation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.default_datastore, Datastore::Local);
        assert_eq!(config.chain_evaluation, ChainEvaluation::Sequential);
    }

    #[test]
    fn test_load_from_json() {
        let config = EngineConfig::from_json_str(
            r#"{"default_datastore": "session", "chain_evaluation": "sequential"}"#,
        )
        .unwrap();
        assert_eq!(config.default_datastore, Datastore::Session);

        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        let err = EngineConfig::from_json_str(r#"{"default_datastore": "disk"}"#).unwrap_err();
        assert!(matches!(err, QueryError::InvalidConfig(_)));
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_default_datastore(Datastore::Session)
            .with_chain_evaluation(ChainEvaluation::Precedence);
        assert_eq!(config.default_datastore, Datastore::Session);
        assert_eq!(config.chain_evaluation, ChainEvaluation::Precedence);

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }
}
