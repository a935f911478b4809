use crate::domain::model::CaseIdentifier;
use crate::domain::ports::CaseSource;
use crate::utils::error::{DistributorError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSourceSettings {
    pub endpoint: String,
    pub method: String,
    pub body: Option<String>,
    pub headers: HashMap<String, String>,
    pub timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl HttpSourceSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: "GET".to_string(),
            body: None,
            headers: HashMap::new(),
            timeout: Duration::from_secs(60),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

/// Fetches already-extracted case records from an extraction service.
///
/// The service answers with a JSON array of `{"numero", "anio"}` objects.
/// 403 and 429 fail immediately; 5xx responses are retried with a linearly
/// growing delay until `retry_attempts` is exhausted.
pub struct HttpSource {
    client: Client,
    settings: HttpSourceSettings,
}

impl HttpSource {
    pub fn new(settings: HttpSourceSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    fn build_request(&self) -> Result<reqwest::RequestBuilder> {
        let method = reqwest::Method::from_bytes(self.settings.method.to_uppercase().as_bytes())
            .map_err(|_| DistributorError::InvalidConfigValueError {
                field: "source.method".to_string(),
                value: self.settings.method.clone(),
                reason: "Not a valid HTTP method".to_string(),
            })?;

        let mut request = self.client.request(method, &self.settings.endpoint);
        for (name, value) in &self.settings.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &self.settings.body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone());
        }
        Ok(request)
    }

    async fn fetch_once(&self) -> Result<std::result::Result<Vec<CaseIdentifier>, StatusCode>> {
        let response = self.build_request()?.send().await?;
        let status = response.status();
        tracing::debug!("Extraction service responded with {}", status);

        match status.as_u16() {
            _ if status.is_success() => {
                let body = response.text().await?;
                if body.trim().is_empty() {
                    return Err(DistributorError::ExtractionError {
                        message: "Extraction service returned an empty body; the document may be unreadable"
                            .to_string(),
                    });
                }
                Ok(Ok(serde_json::from_str(&body)?))
            }
            401 | 403 => Err(DistributorError::PermissionDenied {
                status: status.as_u16(),
            }),
            429 => Err(DistributorError::QuotaExceeded),
            _ if status.is_server_error() => Ok(Err(status)),
            _ => Err(DistributorError::ExtractionError {
                message: format!("Unexpected response status {}", status),
            }),
        }
    }
}

#[async_trait]
impl CaseSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<CaseIdentifier>> {
        let attempts = self.settings.retry_attempts.max(1);
        let mut last_status = StatusCode::SERVICE_UNAVAILABLE;

        for attempt in 1..=attempts {
            tracing::debug!(
                "Requesting cases from {} (attempt {}/{})",
                self.settings.endpoint,
                attempt,
                attempts
            );

            match self.fetch_once().await? {
                Ok(cases) => return Ok(cases),
                Err(status) => {
                    last_status = status;
                    if attempt < attempts {
                        let delay = self.settings.retry_delay * attempt;
                        tracing::warn!(
                            "Extraction service overloaded ({}), retrying in {:?}",
                            status,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(DistributorError::ServiceUnavailable {
            status: last_status.as_u16(),
            attempts,
        })
    }

    fn describe(&self) -> String {
        format!("extraction service '{}'", self.settings.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn settings(url: String) -> HttpSourceSettings {
        HttpSourceSettings {
            retry_delay: Duration::from_millis(1),
            ..HttpSourceSettings::new(url)
        }
    }

    #[tokio::test]
    async fn test_fetch_parses_records() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/cases");
            then.status(200).json_body(serde_json::json!([
                {"numero": "123", "anio": "2024"},
                {"numero": "8", "anio": "2023"}
            ]));
        });

        let source = HttpSource::new(settings(server.url("/cases"))).unwrap();
        let cases = source.fetch().await.unwrap();

        mock.assert();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[1].full_string(), "8/2023");
    }

    #[tokio::test]
    async fn test_post_sends_body_and_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/extract")
                .header("x-api-key", "secret")
                .json_body(serde_json::json!({"document": "abc"}));
            then.status(200).json_body(serde_json::json!([{"numero": "1", "anio": "2024"}]));
        });

        let mut settings = settings(server.url("/extract"));
        settings.method = "post".to_string();
        settings.body = Some(r#"{"document": "abc"}"#.to_string());
        settings
            .headers
            .insert("x-api-key".to_string(), "secret".to_string());

        let cases = HttpSource::new(settings).unwrap().fetch().await.unwrap();
        mock.assert();
        assert_eq!(cases[0].number(), "1");
    }

    #[tokio::test]
    async fn test_forbidden_is_permission_denied() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/cases");
            then.status(403);
        });

        let source = HttpSource::new(settings(server.url("/cases"))).unwrap();
        let err = source.fetch().await.unwrap_err();

        mock.assert_hits(1);
        assert!(matches!(err, DistributorError::PermissionDenied { status: 403 }));
    }

    #[tokio::test]
    async fn test_rate_limit_is_quota_exceeded() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cases");
            then.status(429);
        });

        let source = HttpSource::new(settings(server.url("/cases"))).unwrap();
        assert!(matches!(
            source.fetch().await.unwrap_err(),
            DistributorError::QuotaExceeded
        ));
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/cases");
            then.status(503);
        });

        let source = HttpSource::new(settings(server.url("/cases"))).unwrap();
        let err = source.fetch().await.unwrap_err();

        mock.assert_hits(3);
        assert!(matches!(
            err,
            DistributorError::ServiceUnavailable {
                status: 503,
                attempts: 3
            }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_body_is_extraction_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cases");
            then.status(200).body("");
        });

        let source = HttpSource::new(settings(server.url("/cases"))).unwrap();
        assert!(matches!(
            source.fetch().await.unwrap_err(),
            DistributorError::ExtractionError { .. }
        ));
    }
}
