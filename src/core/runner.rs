use crate::core::Pipeline;
use crate::domain::model::DistributionSummary;
use crate::utils::error::Result;
use std::time::Instant;

/// Outcome of one distribution run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: DistributionSummary,
    /// Locations written by the load phase; empty for dry runs.
    pub outputs: Vec<String>,
}

pub struct DistributionRunner<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> DistributionRunner<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.execute(true).await
    }

    /// Extracts and assigns, but writes nothing.
    pub async fn dry_run(&self) -> Result<RunReport> {
        self.execute(false).await
    }

    async fn execute(&self, write_outputs: bool) -> Result<RunReport> {
        let started = Instant::now();
        tracing::info!("Starting case distribution");

        tracing::info!("Extracting cases...");
        let cases = self.pipeline.extract().await?;
        tracing::info!("Extracted {} case(s)", cases.len());

        tracing::info!("Applying rules...");
        let result = self.pipeline.transform(cases).await?;
        let summary = result.summary.clone();
        tracing::info!(
            "Assigned {} of {} case(s) ({} unassigned, {} data errors)",
            summary.assigned,
            summary.total,
            summary.unassigned,
            summary.data_errors
        );
        if summary.total > 0 && summary.unassigned * 2 > summary.total {
            tracing::warn!(
                "More than half of the cases matched no rule; check the rule document"
            );
        }

        let outputs = if write_outputs {
            tracing::info!("Writing exports...");
            let outputs = self.pipeline.load(result).await?;
            for output in &outputs {
                tracing::info!("Output saved to: {}", output);
            }
            outputs
        } else {
            tracing::info!("Dry run, skipping exports");
            Vec::new()
        };

        tracing::debug!("Distribution finished in {:?}", started.elapsed());
        Ok(RunReport { summary, outputs })
    }
}
