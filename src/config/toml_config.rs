use crate::adapters::file_source::{FileSource, InputFormat};
use crate::adapters::http_source::{HttpSource, HttpSourceSettings};
use crate::config::load_rules;
use crate::core::rules::{RuleConfig, ValidationMode};
use crate::core::ConfigProvider;
use crate::domain::ports::CaseSource;
use crate::utils::error::{DistributorError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_output_formats, validate_path,
    validate_positive_number, validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: RunConfig,
    #[serde(default)]
    pub rules: RulesSection,
    pub source: SourceConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesSection {
    /// Rule document; the embedded table is used when absent.
    pub path: Option<String>,
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// "file" or "api"
    pub r#type: String,
    pub path: Option<String>,
    pub format: Option<String>,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub body: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub include_trace: Option<bool>,
    pub handler_filter: Option<String>,
    pub filenames: Option<FilenameConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilenameConfig {
    pub csv: Option<String>,
    pub json: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern is valid"))
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses after replacing `${VAR}` with the environment value. Unset
    /// variables are left as written.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| DistributorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validation_mode(&self) -> ValidationMode {
        ValidationMode::from_strict_flag(self.rules.strict.unwrap_or(false))
    }

    pub fn load_rules(&self) -> Result<RuleConfig> {
        load_rules(self.rules.path.as_deref(), self.validation_mode())
    }

    pub fn is_api_source(&self) -> bool {
        self.source.r#type == "api"
    }

    pub fn http_settings(&self) -> Result<HttpSourceSettings> {
        let endpoint = validate_required_field("source.endpoint", &self.source.endpoint)?;
        let defaults = HttpSourceSettings::new(endpoint.clone());

        Ok(HttpSourceSettings {
            method: self.source.method.clone().unwrap_or(defaults.method.clone()),
            body: self.source.body.clone(),
            headers: self.source.headers.clone().unwrap_or_default(),
            timeout: self
                .source
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            retry_attempts: self.source.retry_attempts.unwrap_or(defaults.retry_attempts),
            retry_delay: self
                .source
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
            ..defaults
        })
    }

    pub fn case_source(&self) -> Result<Box<dyn CaseSource>> {
        if self.is_api_source() {
            return Ok(Box::new(HttpSource::new(self.http_settings()?)?));
        }

        let path = validate_required_field("source.path", &self.source.path)?;
        let format = self
            .source
            .format
            .as_deref()
            .map(str::parse::<InputFormat>)
            .transpose()?;
        Ok(Box::new(FileSource::new(path, format)))
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("run.name", &self.run.name)?;
        validate_one_of("source.type", &self.source.r#type, &["file", "api"])?;

        if self.is_api_source() {
            let endpoint = validate_required_field("source.endpoint", &self.source.endpoint)?;
            validate_url("source.endpoint", endpoint)?;
            if let Some(attempts) = self.source.retry_attempts {
                validate_positive_number("source.retry_attempts", attempts as usize, 1)?;
            }
        } else {
            let path = validate_required_field("source.path", &self.source.path)?;
            validate_path("source.path", path)?;
            if let Some(format) = &self.source.format {
                format.parse::<InputFormat>()?;
            }
        }

        if let Some(path) = &self.rules.path {
            validate_path("rules.path", path)?;
        }
        if let Some(handler) = &self.load.handler_filter {
            validate_non_empty_string("load.handler_filter", handler)?;
        }

        validate_path("load.output_path", &self.load.output_path)?;
        validate_output_formats("load.output_formats", &self.load.output_formats)
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn include_trace(&self) -> bool {
        self.load.include_trace.unwrap_or(false)
    }

    fn handler_filter(&self) -> Option<&str> {
        self.load.handler_filter.as_deref()
    }

    fn csv_filename(&self) -> &str {
        self.load
            .filenames
            .as_ref()
            .and_then(|f| f.csv.as_deref())
            .unwrap_or("distribution.csv")
    }

    fn json_filename(&self) -> &str {
        self.load
            .filenames
            .as_ref()
            .and_then(|f| f.json.as_deref())
            .unwrap_or("distribution.json")
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
