use crate::domain::model::CaseIdentifier;
use crate::domain::ports::CaseSource;
use crate::utils::error::{DistributorError, Result};
use crate::utils::validation::SUPPORTED_INPUT_FORMATS;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const NUMBER_COLUMNS: [&str; 3] = ["numero", "número", "number"];
const YEAR_COLUMNS: [&str; 3] = ["anio", "año", "year"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Array of `{"numero": .., "anio": ..}` objects.
    Json,
    /// Header row with number and year columns.
    Csv,
    /// One `number/year` per line.
    Text,
}

impl InputFormat {
    /// Guesses the format from the file extension. Unknown extensions are
    /// treated as plain text.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => InputFormat::Json,
            Some("csv") => InputFormat::Csv,
            _ => InputFormat::Text,
        }
    }
}

impl FromStr for InputFormat {
    type Err = DistributorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(InputFormat::Json),
            "csv" => Ok(InputFormat::Csv),
            "text" | "txt" => Ok(InputFormat::Text),
            other => Err(DistributorError::InvalidConfigValueError {
                field: "input_format".to_string(),
                value: other.to_string(),
                reason: format!("Valid formats: {}", SUPPORTED_INPUT_FORMATS.join(", ")),
            }),
        }
    }
}

pub fn parse_cases(data: &[u8], format: InputFormat) -> Result<Vec<CaseIdentifier>> {
    match format {
        InputFormat::Json => Ok(serde_json::from_slice(data)?),
        InputFormat::Csv => parse_csv(data),
        InputFormat::Text => parse_text(data),
    }
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
}

fn parse_csv(data: &[u8]) -> Result<Vec<CaseIdentifier>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let number_idx = find_column(&headers, &NUMBER_COLUMNS).ok_or_else(|| {
        DistributorError::ExtractionError {
            message: format!(
                "CSV input needs one of the columns {}",
                NUMBER_COLUMNS.join(", ")
            ),
        }
    })?;
    let year_idx = find_column(&headers, &YEAR_COLUMNS);

    let mut cases = Vec::new();
    for record in reader.records() {
        let record = record?;
        let number = record.get(number_idx).unwrap_or_default();
        let year = year_idx
            .and_then(|idx| record.get(idx))
            .unwrap_or_default();
        cases.push(CaseIdentifier::new(number, year));
    }
    Ok(cases)
}

fn parse_text(data: &[u8]) -> Result<Vec<CaseIdentifier>> {
    let content = std::str::from_utf8(data).map_err(|e| DistributorError::ExtractionError {
        message: format!("Text input is not valid UTF-8: {}", e),
    })?;

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(CaseIdentifier::parse_full_string)
        .collect())
}

/// Reads a case list previously produced by the extraction step.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: InputFormat,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, format: Option<InputFormat>) -> Self {
        let path = path.into();
        let format = format.unwrap_or_else(|| InputFormat::from_path(&path));
        Self { path, format }
    }

    pub fn format(&self) -> InputFormat {
        self.format
    }
}

#[async_trait]
impl CaseSource for FileSource {
    async fn fetch(&self) -> Result<Vec<CaseIdentifier>> {
        tracing::debug!("Reading {:?} input from {}", self.format, self.path.display());
        let data = tokio::fs::read(&self.path).await?;
        parse_cases(&data, self.format)
    }

    fn describe(&self) -> String {
        format!("file '{}'", self.path.display())
    }
}
