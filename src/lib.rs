pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::file_source::{FileSource, InputFormat};
pub use crate::adapters::http_source::{HttpSource, HttpSourceSettings};
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::engine::{assign, AssignmentEngine};
pub use crate::core::pipeline::DistributionPipeline;
pub use crate::core::rules::{RuleConfig, RuleStore, ValidationMode};
pub use crate::core::runner::{DistributionRunner, RunReport};
pub use crate::domain::model::{Assignment, CaseIdentifier, DistributionSummary, DATA_ERROR, UNASSIGNED};
pub use crate::utils::error::{DistributorError, Result};
