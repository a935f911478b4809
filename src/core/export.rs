use crate::domain::model::{Assignment, DistributionSummary};
use crate::utils::error::{DistributorError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const CSV_HEADERS: [&str; 4] = ["Expediente", "Numero", "Año", "Responsable"];
pub const CSV_TRACE_HEADER: &str = "Regla Aplicada";

/// Assignments of a single handler, input order kept.
pub fn filter_by_handler<'a>(assignments: &'a [Assignment], handler: &str) -> Vec<&'a Assignment> {
    assignments
        .iter()
        .filter(|a| a.handler() == handler)
        .collect()
}

/// Every field quoted, one row per assignment.
pub fn to_csv<'a, I>(assignments: I, include_trace: bool) -> Result<String>
where
    I: IntoIterator<Item = &'a Assignment>,
{
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    let mut headers = CSV_HEADERS.to_vec();
    if include_trace {
        headers.push(CSV_TRACE_HEADER);
    }
    writer.write_record(&headers)?;

    for assignment in assignments {
        let mut row = vec![
            assignment.full_string(),
            assignment.number(),
            assignment.year(),
            assignment.handler(),
        ];
        if include_trace {
            row.push(assignment.rule_applied());
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DistributorError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| DistributorError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    summary: &'a DistributionSummary,
    assignments: Vec<&'a Assignment>,
}

pub fn to_json<'a, I>(
    assignments: I,
    summary: &DistributionSummary,
    generated_at: DateTime<Utc>,
) -> Result<String>
where
    I: IntoIterator<Item = &'a Assignment>,
{
    let report = JsonReport {
        generated_at,
        summary,
        assignments: assignments.into_iter().collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
