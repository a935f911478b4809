pub mod cli;
pub mod toml_config;

use crate::core::rules::{RuleConfig, ValidationMode};
use crate::utils::error::Result;

/// Loads the rule document at `path`, or the embedded table when no path
/// is configured. Both go through the same validation.
pub fn load_rules(path: Option<&str>, mode: ValidationMode) -> Result<RuleConfig> {
    match path {
        Some(path) => RuleConfig::load(path, mode),
        None => {
            tracing::debug!("No rule document configured, using the embedded table");
            let config = RuleConfig::embedded_default()?;
            config.validate(mode)?;
            Ok(config)
        }
    }
}

#[cfg(feature = "cli")]
mod flags {
    use super::load_rules;
    use crate::adapters::file_source::{FileSource, InputFormat};
    use crate::adapters::http_source::{HttpSource, HttpSourceSettings};
    use crate::core::rules::{RuleConfig, ValidationMode};
    use crate::core::ConfigProvider;
    use crate::domain::ports::CaseSource;
    use crate::utils::error::{DistributorError, Result};
    use crate::utils::validation::{
        validate_non_empty_string, validate_output_formats, validate_path, validate_url, Validate,
    };
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "case-distributor")]
    #[command(about = "Assigns case-file identifiers to handlers by their ending digits")]
    pub struct CliConfig {
        /// Case list produced by the extraction step (json, csv or text)
        #[arg(short, long)]
        pub input: Option<String>,

        /// Input format; inferred from the file extension when omitted
        #[arg(long)]
        pub input_format: Option<String>,

        /// Fetch the case list from an extraction service instead of a file
        #[arg(long)]
        pub extraction_endpoint: Option<String>,

        /// Rule document (JSON); the embedded table is used when omitted
        #[arg(short, long)]
        pub rules: Option<String>,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_value = "csv")]
        pub formats: Vec<String>,

        /// Add the "Regla Aplicada" column to the CSV export
        #[arg(long)]
        pub include_trace: bool,

        /// Export only the cases assigned to this handler
        #[arg(long)]
        pub handler: Option<String>,

        /// Reject rules that assign handlers missing from "responsables"
        #[arg(long)]
        pub strict_handlers: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub log_json: bool,

        /// Run extraction and assignment without writing any file
        #[arg(long)]
        pub dry_run: bool,
    }

    impl CliConfig {
        pub fn validation_mode(&self) -> ValidationMode {
            ValidationMode::from_strict_flag(self.strict_handlers)
        }

        pub fn load_rules(&self) -> Result<RuleConfig> {
            load_rules(self.rules.as_deref(), self.validation_mode())
        }

        pub fn case_source(&self) -> Result<Box<dyn CaseSource>> {
            match (&self.input, &self.extraction_endpoint) {
                (Some(path), None) => {
                    let format = self
                        .input_format
                        .as_deref()
                        .map(str::parse::<InputFormat>)
                        .transpose()?;
                    Ok(Box::new(FileSource::new(path, format)))
                }
                (None, Some(endpoint)) => Ok(Box::new(HttpSource::new(HttpSourceSettings::new(
                    endpoint.clone(),
                ))?)),
                (Some(_), Some(_)) => Err(DistributorError::config(
                    "Use either --input or --extraction-endpoint, not both",
                )),
                (None, None) => Err(DistributorError::MissingConfigError {
                    field: "input".to_string(),
                }),
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            match (&self.input, &self.extraction_endpoint) {
                (Some(path), None) => validate_path("input", path)?,
                (None, Some(endpoint)) => validate_url("extraction_endpoint", endpoint)?,
                (Some(_), Some(_)) => {
                    return Err(DistributorError::config(
                        "Use either --input or --extraction-endpoint, not both",
                    ))
                }
                (None, None) => {
                    return Err(DistributorError::MissingConfigError {
                        field: "input".to_string(),
                    })
                }
            }

            if let Some(format) = &self.input_format {
                format.parse::<InputFormat>()?;
            }
            if let Some(rules) = &self.rules {
                validate_path("rules", rules)?;
            }
            if let Some(handler) = &self.handler {
                validate_non_empty_string("handler", handler)?;
            }
            validate_path("output_path", &self.output_path)?;
            validate_output_formats("formats", &self.formats)
        }
    }

    impl ConfigProvider for CliConfig {
        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn include_trace(&self) -> bool {
            self.include_trace
        }

        fn handler_filter(&self) -> Option<&str> {
            self.handler.as_deref()
        }
    }

}

#[cfg(feature = "cli")]
pub use flags::CliConfig;
