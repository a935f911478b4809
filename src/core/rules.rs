//! Rule configuration loading and the read-only rule store.
//!
//! The rule document is JSON:
//!
//! ```json
//! {
//!   "responsables": ["ANA", "LUIS"],
//!   "reglas": {
//!     "dosDigitos": { "23": "ANA" },
//!     "unDigito":  { "8": "LUIS" }
//!   }
//! }
//! ```
//!
//! Loading through [`RuleConfig::load`] validates the document's shape.
//! A [`RuleStore`] built directly from a `RuleConfig` does no validation at
//! all: a key of the wrong length simply never matches.

use crate::core::matcher::Matcher;
use crate::utils::error::{DistributorError, Result};
use crate::utils::validation::validate_non_empty_string;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

const EMBEDDED_RULES: &str = include_str!("../../config/default_rules.json");

pub const TWO_DIGIT_TABLE: &str = "dosDigitos";
pub const ONE_DIGIT_TABLE: &str = "unDigito";

/// How rule values that are not declared in `responsables` are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Accept and log a warning.
    #[default]
    Lenient,
    /// Reject with [`DistributorError::UnknownHandler`].
    Strict,
}

impl ValidationMode {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTables {
    #[serde(rename = "dosDigitos", default)]
    pub two_digit: BTreeMap<String, String>,
    #[serde(rename = "unDigito", default)]
    pub one_digit: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(rename = "responsables", default)]
    pub handlers: Vec<String>,
    #[serde(rename = "reglas")]
    pub rules: RuleTables,
}

impl RuleConfig {
    /// Reads, parses and validates a rule document.
    pub fn load<P: AsRef<Path>>(path: P, mode: ValidationMode) -> Result<Self> {
        let config = Self::from_file(&path)?;
        config.validate(mode)?;
        tracing::debug!(
            "Loaded rules from {}: {} two-digit, {} one-digit, {} handlers",
            path.as_ref().display(),
            config.rules.two_digit.len(),
            config.rules.one_digit.len(),
            config.handlers.len()
        );
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    /// Parses without validating key lengths or handler names.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| DistributorError::ConfigValidationError {
            field: "rules".to_string(),
            message: format!("Rule document does not match the expected shape: {}", e),
        })
    }

    /// The assignment table compiled into the binary.
    pub fn embedded_default() -> Result<Self> {
        Self::from_json_str(EMBEDDED_RULES)
    }

    pub fn validate(&self, mode: ValidationMode) -> Result<()> {
        let known: HashSet<&str> = self.handlers.iter().map(String::as_str).collect();

        for name in &self.handlers {
            validate_non_empty_string("responsables", name)?;
        }

        for (table, rules, expected_len) in [
            (TWO_DIGIT_TABLE, &self.rules.two_digit, 2),
            (ONE_DIGIT_TABLE, &self.rules.one_digit, 1),
        ] {
            for (key, handler) in rules {
                if key.chars().count() != expected_len {
                    return Err(DistributorError::InvalidRuleKey {
                        table: table.to_string(),
                        key: key.clone(),
                        expected_len,
                    });
                }

                if !key.chars().all(|c| c.is_ascii_digit()) {
                    tracing::warn!(
                        "Rule key '{}' in '{}' is not numeric and will only match literal text",
                        key,
                        table
                    );
                }

                validate_non_empty_string(&format!("reglas.{}.{}", table, key), handler)?;

                if !known.contains(handler.as_str()) {
                    match mode {
                        ValidationMode::Strict => {
                            return Err(DistributorError::UnknownHandler {
                                table: table.to_string(),
                                key: key.clone(),
                                handler: handler.clone(),
                            });
                        }
                        ValidationMode::Lenient => {
                            tracing::warn!(
                                "Rule '{}' in '{}' assigns '{}', which is not listed in responsables",
                                key,
                                table,
                                handler
                            );
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Immutable rule set consulted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStore {
    handlers: Vec<String>,
    matchers: Vec<Matcher>,
}

impl RuleStore {
    /// Builds the store without validation. Duplicate handler names are
    /// collapsed, keeping first-seen order.
    pub fn new(config: RuleConfig) -> Self {
        let RuleConfig { handlers, rules } = config;
        let matchers = vec![
            Matcher::TwoDigit(rules.two_digit.into_iter().collect()),
            Matcher::OneDigit(rules.one_digit.into_iter().collect()),
        ];
        Self::with_matchers(handlers, matchers)
    }

    /// Builds a store from an explicit, ordered list of rule tiers.
    pub fn with_matchers(handlers: Vec<String>, matchers: Vec<Matcher>) -> Self {
        let mut seen = HashSet::new();
        let handlers = handlers
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();
        Self { handlers, matchers }
    }

    pub fn two_digit(&self, key: &str) -> Option<&str> {
        self.matchers
            .iter()
            .filter(|m| matches!(m, Matcher::TwoDigit(_)))
            .find_map(|m| m.lookup(key))
    }

    pub fn one_digit(&self, key: &str) -> Option<&str> {
        self.matchers
            .iter()
            .filter(|m| matches!(m, Matcher::OneDigit(_)))
            .find_map(|m| m.lookup(key))
    }

    pub fn known_handlers(&self) -> &[String] {
        &self.handlers
    }

    /// Rule tiers in the order the engine consults them.
    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    pub fn rule_count(&self) -> usize {
        self.matchers.iter().map(|m| m.rules().len()).sum()
    }
}

impl From<RuleConfig> for RuleStore {
    fn from(config: RuleConfig) -> Self {
        RuleStore::new(config)
    }
}
