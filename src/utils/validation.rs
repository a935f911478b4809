use crate::utils::error::{DistributorError, Result};
use url::Url;

/// Output formats the load phase knows how to write.
pub const SUPPORTED_OUTPUT_FORMATS: [&str; 2] = ["csv", "json"];

/// Input formats the file source knows how to parse.
pub const SUPPORTED_INPUT_FORMATS: [&str; 3] = ["json", "csv", "text"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DistributorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DistributorError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DistributorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DistributorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DistributorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(DistributorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(DistributorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Unsupported value. Valid values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(DistributorError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    for format in formats {
        validate_one_of(field_name, format, &SUPPORTED_OUTPUT_FORMATS)?;
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| DistributorError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DistributorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.endpoint", "https://example.com").is_ok());
        assert!(validate_url("source.endpoint", "http://example.com").is_ok());
        assert!(validate_url("source.endpoint", "").is_err());
        assert!(validate_url("source.endpoint", "invalid-url").is_err());
        assert!(validate_url("source.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("source.retry_attempts", 3, 1).is_ok());
        assert!(validate_positive_number("source.retry_attempts", 0, 1).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let formats = vec!["csv".to_string(), "json".to_string()];
        assert!(validate_output_formats("load.output_formats", &formats).is_ok());

        let invalid = vec!["tsv".to_string()];
        assert!(validate_output_formats("load.output_formats", &invalid).is_err());

        assert!(matches!(
            validate_output_formats("load.output_formats", &[]),
            Err(DistributorError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("handler", "JUAN").is_ok());
        assert!(validate_non_empty_string("handler", "   ").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("cases.json".to_string());
        assert_eq!(
            validate_required_field("source.path", &present).unwrap(),
            "cases.json"
        );
        let absent: Option<String> = None;
        assert!(validate_required_field("source.path", &absent).is_err());
    }
}
