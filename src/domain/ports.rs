use crate::domain::model::{CaseIdentifier, DistributionResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Human-readable location of `path` for logs and reports.
    fn location(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Supplies the case identifiers of one batch. Implementations own
/// retries, timeouts and error classification of the extraction step.
#[async_trait]
pub trait CaseSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<CaseIdentifier>>;

    /// Short label used in logs and `NoRecords` errors.
    fn describe(&self) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn include_trace(&self) -> bool;
    fn handler_filter(&self) -> Option<&str>;
    fn csv_filename(&self) -> &str {
        "distribution.csv"
    }
    fn json_filename(&self) -> &str {
        "distribution.json"
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<CaseIdentifier>>;
    async fn transform(&self, cases: Vec<CaseIdentifier>) -> Result<DistributionResult>;
    async fn load(&self, result: DistributionResult) -> Result<Vec<String>>;
}
