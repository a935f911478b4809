use crate::core::engine::AssignmentEngine;
use crate::core::export::{filter_by_handler, to_csv, to_json};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{Assignment, CaseIdentifier, DistributionResult, DistributionSummary};
use crate::domain::ports::CaseSource;
use crate::utils::error::{DistributorError, Result};
use chrono::Utc;

/// Extract cases from a [`CaseSource`], assign them with an
/// [`AssignmentEngine`] and write the exports through a [`Storage`].
pub struct DistributionPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    source: Box<dyn CaseSource>,
    engine: AssignmentEngine,
}

impl<S: Storage, C: ConfigProvider> DistributionPipeline<S, C> {
    pub fn new(storage: S, config: C, source: Box<dyn CaseSource>, engine: AssignmentEngine) -> Self {
        Self {
            storage,
            config,
            source,
            engine,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn exported<'a>(&self, assignments: &'a [Assignment]) -> Vec<&'a Assignment> {
        match self.config.handler_filter() {
            Some(handler) => filter_by_handler(assignments, handler),
            None => assignments.iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DistributionPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<CaseIdentifier>> {
        let cases = self.source.fetch().await?;
        if cases.is_empty() {
            return Err(DistributorError::NoRecords {
                source_name: self.source.describe(),
            });
        }

        tracing::debug!("Fetched {} case(s) from {}", cases.len(), self.source.describe());
        Ok(cases)
    }

    async fn transform(&self, cases: Vec<CaseIdentifier>) -> Result<DistributionResult> {
        let assignments = self.engine.assign(&cases);
        let summary = DistributionSummary::from_assignments(&assignments);

        let exported = self.exported(&assignments);
        if let Some(handler) = self.config.handler_filter() {
            tracing::debug!("Exporting {} case(s) assigned to {}", exported.len(), handler);
        }

        let csv_output = to_csv(exported.iter().copied(), self.config.include_trace())?;
        let json_output = to_json(exported.iter().copied(), &summary, Utc::now())?;

        Ok(DistributionResult {
            assignments,
            summary,
            csv_output,
            json_output,
        })
    }

    async fn load(&self, result: DistributionResult) -> Result<Vec<String>> {
        let mut written = Vec::new();

        for format in self.config.output_formats() {
            let (filename, data) = match format.as_str() {
                "csv" => (self.config.csv_filename(), result.csv_output.as_bytes()),
                "json" => (self.config.json_filename(), result.json_output.as_bytes()),
                other => {
                    return Err(DistributorError::InvalidConfigValueError {
                        field: "output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Valid formats: csv, json".to_string(),
                    })
                }
            };

            self.storage.write_file(filename, data).await?;
            written.push(self.storage.location(filename));
        }

        Ok(written)
    }
}
