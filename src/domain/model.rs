use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handler recorded when the case number is empty after trimming.
pub const DATA_ERROR: &str = "DATA_ERROR";

/// Handler recorded when no configured rule matches the case number.
pub const UNASSIGNED: &str = "UNASSIGNED";

/// One case file as delivered by the extraction step.
///
/// `number` is kept exactly as extracted (leading zeros, blanks and
/// non-digit characters included). `year` is carried for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCase", rename_all = "camelCase")]
pub struct CaseIdentifier {
    number: String,
    year: String,
    full_string: String,
}

impl CaseIdentifier {
    pub fn new(number: impl Into<String>, year: impl Into<String>) -> Self {
        let number = number.into();
        let year = year.into();
        let full_string = format!("{}/{}", number, year);
        Self {
            number,
            year,
            full_string,
        }
    }

    /// Parses the `number/year` display form, splitting at the last `/`.
    /// Text without a separator becomes the number with an empty year.
    pub fn parse_full_string(value: &str) -> Self {
        match value.rsplit_once('/') {
            Some((number, year)) => Self::new(number.trim(), year.trim()),
            None => Self::new(value.trim(), ""),
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn full_string(&self) -> &str {
        &self.full_string
    }
}

/// Wire shape of an extracted record. Accepts both the Spanish field names
/// used by the extraction service and their English equivalents.
#[derive(Debug, Deserialize)]
struct RawCase {
    #[serde(default, alias = "numero", deserialize_with = "lenient_string")]
    number: String,
    #[serde(default, alias = "anio", deserialize_with = "lenient_string")]
    year: String,
}

impl From<RawCase> for CaseIdentifier {
    fn from(raw: RawCase) -> Self {
        CaseIdentifier::new(raw.number, raw.year)
    }
}

// null -> "", numbers and booleans -> their text form
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// The engine's verdict for one case identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(flatten)]
    case: CaseIdentifier,
    handler: String,
    rule_applied: String,
}

impl Assignment {
    pub fn new(case: CaseIdentifier, handler: impl Into<String>, rule_applied: impl Into<String>) -> Self {
        Self {
            case,
            handler: handler.into(),
            rule_applied: rule_applied.into(),
        }
    }

    pub fn case(&self) -> &CaseIdentifier {
        &self.case
    }

    pub fn number(&self) -> &str {
        self.case.number()
    }

    pub fn year(&self) -> &str {
        self.case.year()
    }

    pub fn full_string(&self) -> &str {
        self.case.full_string()
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Audit text naming the rule that fired. Not meant to be parsed.
    pub fn rule_applied(&self) -> &str {
        &self.rule_applied
    }

    pub fn is_data_error(&self) -> bool {
        self.handler == DATA_ERROR
    }

    pub fn is_unassigned(&self) -> bool {
        self.handler == UNASSIGNED
    }
}

/// Per-handler totals for one distributed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub total: usize,
    pub assigned: usize,
    pub unassigned: usize,
    pub data_errors: usize,
    pub per_handler: BTreeMap<String, usize>,
}

impl DistributionSummary {
    pub fn from_assignments(assignments: &[Assignment]) -> Self {
        let mut summary = Self {
            total: assignments.len(),
            ..Self::default()
        };

        for assignment in assignments {
            if assignment.is_data_error() {
                summary.data_errors += 1;
            } else if assignment.is_unassigned() {
                summary.unassigned += 1;
            } else {
                summary.assigned += 1;
            }
            *summary
                .per_handler
                .entry(assignment.handler().to_string())
                .or_insert(0) += 1;
        }

        summary
    }

    /// Distinct handler values present in the batch, sentinels included, sorted.
    pub fn handlers(&self) -> Vec<&str> {
        self.per_handler.keys().map(String::as_str).collect()
    }
}

impl fmt::Display for DistributionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cases: {}", self.total)?;
        for (handler, count) in &self.per_handler {
            writeln!(f, "  {:<16} {}", handler, count)?;
        }
        write!(
            f,
            "Assigned: {}, unassigned: {}, data errors: {}",
            self.assigned, self.unassigned, self.data_errors
        )
    }
}

#[derive(Debug, Clone)]
pub struct DistributionResult {
    pub assignments: Vec<Assignment>,
    pub summary: DistributionSummary,
    pub csv_output: String,
    pub json_output: String,
}
