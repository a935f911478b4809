use case_distributor::core::ConfigProvider;
use case_distributor::utils::validation::Validate;
use case_distributor::{
    AssignmentEngine, DistributionPipeline, DistributionRunner, DistributorError, FileSource,
    HttpSource, HttpSourceSettings, LocalStorage, RuleConfig, RuleStore, TomlConfig,
    ValidationMode,
};
use httpmock::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

const RULES: &str = r#"{
    "responsables": ["ANA", "LUIS", "JUAN"],
    "reglas": {
        "dosDigitos": { "23": "ANA", "90": "JUAN" },
        "unDigito": { "8": "LUIS", "0": "LUIS" }
    }
}"#;

struct TestConfig {
    formats: Vec<String>,
    include_trace: bool,
}

impl ConfigProvider for TestConfig {
    fn output_path(&self) -> &str {
        "unused"
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn include_trace(&self) -> bool {
        self.include_trace
    }

    fn handler_filter(&self) -> Option<&str> {
        None
    }
}

fn engine() -> AssignmentEngine {
    let config = RuleConfig::from_json_str(RULES).unwrap();
    config.validate(ValidationMode::Strict).unwrap();
    AssignmentEngine::new(RuleStore::new(config))
}

#[tokio::test]
async fn test_end_to_end_from_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("cases.json");
    std::fs::write(
        &input,
        r#"[
            {"numero": "123", "anio": "2024"},
            {"numero": "8", "anio": "2023"},
            {"numero": "  ", "anio": "2023"},
            {"numero": "90", "anio": "2022"},
            {"numero": "77", "anio": "2022"}
        ]"#,
    )
    .unwrap();

    let output_dir = temp_dir.path().join("out");
    let config = TestConfig {
        formats: vec!["csv".to_string(), "json".to_string()],
        include_trace: false,
    };
    let pipeline = DistributionPipeline::new(
        LocalStorage::new(&output_dir),
        config,
        Box::new(FileSource::new(&input, None)),
        engine(),
    );

    let report = DistributionRunner::new(pipeline).run().await.unwrap();

    assert_eq!(report.summary.total, 5);
    assert_eq!(report.summary.assigned, 3);
    assert_eq!(report.summary.data_errors, 1);
    assert_eq!(report.summary.unassigned, 1);
    assert_eq!(report.outputs.len(), 2);

    let csv = std::fs::read_to_string(output_dir.join("distribution.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#""Expediente","Numero","Año","Responsable""#,
            r#""123/2024","123","2024","ANA""#,
            r#""8/2023","8","2023","LUIS""#,
            r#""  /2023","  ","2023","DATA_ERROR""#,
            r#""90/2022","90","2022","JUAN""#,
            r#""77/2022","77","2022","UNASSIGNED""#,
        ]
    );

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join("distribution.json")).unwrap())
            .unwrap();
    assert_eq!(json["assignments"][3]["ruleApplied"], "ending 90 (two-digit rule)");
    assert_eq!(json["summary"]["perHandler"]["LUIS"], 1);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("cases.txt");
    std::fs::write(&input, "123/2024\n8/2023\n").unwrap();

    let output_dir = temp_dir.path().join("out");
    let pipeline = DistributionPipeline::new(
        LocalStorage::new(&output_dir),
        TestConfig {
            formats: vec!["csv".to_string()],
            include_trace: true,
        },
        Box::new(FileSource::new(&input, None)),
        engine(),
    );

    let report = DistributionRunner::new(pipeline).dry_run().await.unwrap();

    assert_eq!(report.summary.assigned, 2);
    assert!(report.outputs.is_empty());
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_empty_input_fails_before_assignment() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("cases.json");
    std::fs::write(&input, "[]").unwrap();

    let pipeline = DistributionPipeline::new(
        LocalStorage::new(temp_dir.path()),
        TestConfig {
            formats: vec!["csv".to_string()],
            include_trace: false,
        },
        Box::new(FileSource::new(&input, None)),
        engine(),
    );

    let err = DistributionRunner::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, DistributorError::NoRecords { .. }));
    assert!(!temp_dir.path().join("distribution.csv").exists());
}

#[tokio::test]
async fn test_end_to_end_from_extraction_service() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/cases");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"numero": "1023", "anio": "2024"},
                {"numero": "18", "anio": "2024"}
            ]));
    });

    let settings = HttpSourceSettings {
        retry_delay: Duration::from_millis(1),
        ..HttpSourceSettings::new(server.url("/cases"))
    };
    let pipeline = DistributionPipeline::new(
        LocalStorage::new(temp_dir.path()),
        TestConfig {
            formats: vec!["csv".to_string()],
            include_trace: true,
        },
        Box::new(HttpSource::new(settings).unwrap()),
        engine(),
    );

    let report = DistributionRunner::new(pipeline).run().await.unwrap();
    api_mock.assert();

    assert_eq!(report.summary.per_handler["ANA"], 1);
    assert_eq!(report.summary.per_handler["LUIS"], 1);

    let csv = std::fs::read_to_string(temp_dir.path().join("distribution.csv")).unwrap();
    assert!(csv.contains(r#""18/2024","18","2024","LUIS","ending 8 (one-digit rule)""#));
}

#[tokio::test]
async fn test_toml_driven_run_with_handler_filter() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().to_str().unwrap().replace('\\', "/");

    std::fs::write(temp_dir.path().join("rules.json"), RULES).unwrap();
    std::fs::write(
        temp_dir.path().join("cases.csv"),
        "numero,anio\n123,2024\n0008,2023\n590,2022\n",
    )
    .unwrap();

    let config_content = format!(
        r#"
[run]
name = "filtered"

[rules]
path = "{base}/rules.json"
strict = true

[source]
type = "file"
path = "{base}/cases.csv"

[load]
output_path = "{base}/out"
output_formats = ["csv", "json"]
handler_filter = "JUAN"

[load.filenames]
csv = "juan.csv"
json = "juan.json"
"#
    );

    let config = TomlConfig::from_toml_str(&config_content).unwrap();
    config.validate().unwrap();

    let rules = config.load_rules().unwrap();
    let source = config.case_source().unwrap();
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = DistributionPipeline::new(
        storage,
        config,
        source,
        AssignmentEngine::new(RuleStore::new(rules)),
    );

    let report = DistributionRunner::new(pipeline).run().await.unwrap();
    assert_eq!(report.summary.total, 3);

    let csv = std::fs::read_to_string(temp_dir.path().join("out/juan.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], r#""590/2022","590","2022","JUAN""#);
    assert!(temp_dir.path().join("out/juan.json").exists());
}

#[test]
fn test_strict_rules_reject_unlisted_handler() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("rules.json");
    std::fs::write(
        &path,
        r#"{"responsables": ["ANA"], "reglas": {"dosDigitos": {"23": "PEDRO"}}}"#,
    )
    .unwrap();

    assert!(RuleConfig::load(&path, ValidationMode::Lenient).is_ok());
    let err = RuleConfig::load(&path, ValidationMode::Strict).unwrap_err();
    assert!(matches!(err, DistributorError::UnknownHandler { .. }));
}
