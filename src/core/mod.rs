pub mod engine;
pub mod export;
pub mod matcher;
pub mod pipeline;
pub mod rules;
pub mod runner;

pub use crate::domain::model::{Assignment, CaseIdentifier, DistributionResult};
pub use crate::domain::ports::{CaseSource, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
