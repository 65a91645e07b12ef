//! Pipeline and CLI integration tests.
//!
//! These tests exercise the full load → analyze → report pipeline,
//! error handling paths, and CLI command handlers with real fixture files.

use stride_tools::cli::{run_analyze, run_rules, RulesConfig};
use stride_tools::config::{AnalyzeConfig, AnalyzeConfigBuilder, RulesPathConfig};
use stride_tools::pipeline::{exit_codes, load_input, PipelineError};
use stride_tools::reports::{create_reporter, ReportConfig, ReportFormat};
use stride_tools::{analyze, AnalysisInput, DataFlow};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Fixtures
// ============================================================================

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn json_config(model: &str, out: &Path) -> AnalyzeConfigBuilder {
    AnalyzeConfigBuilder::new()
        .model(Some(fixture_path(model)))
        .output_format(ReportFormat::Json)
        .output_file(Some(out.to_path_buf()))
        .quiet(true)
}

fn read_json(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("report should exist");
    serde_json::from_str(&content).expect("report should be valid JSON")
}

fn rejected(config: AnalyzeConfig) -> anyhow::Error {
    let err = run_analyze(config).expect_err("input should be rejected");
    let pipeline = err
        .downcast_ref::<PipelineError>()
        .expect("should be a pipeline error");
    assert_eq!(pipeline.exit_code(), exit_codes::INPUT_REJECTED);
    err
}

// ============================================================================
// Load Stage Tests
// ============================================================================

mod load_stage {
    use super::*;

    #[test]
    fn yaml_and_json_fixtures_load_the_same_input() {
        let yaml = load_input(&AnalyzeConfig {
            model: Some(fixture_path("web_app.yaml")),
            ..AnalyzeConfig::default()
        })
        .expect("yaml should load");
        let json = load_input(&AnalyzeConfig {
            model: Some(fixture_path("web_app.json")),
            ..AnalyzeConfig::default()
        })
        .expect("json should load");

        assert_eq!(yaml.input.flows, json.input.flows);
        assert_eq!(yaml.input.boundaries, json.input.boundaries);
        assert_eq!(yaml.input.description.trim(), json.input.description.trim());
    }

    #[test]
    fn inline_flags_append_to_the_file() {
        let config = AnalyzeConfigBuilder::new()
            .model(Some(fixture_path("web_app.yaml")))
            .flow("Admin,Web Server,session token")
            .boundary("Admin Network:admin")
            .build()
            .unwrap();
        let loaded = load_input(&config).unwrap();

        assert_eq!(loaded.input.flows.len(), 3);
        assert_eq!(loaded.input.flows[2], DataFlow::new("Admin", "Web Server", "session token"));
        assert_eq!(loaded.input.boundaries[2].name, "Admin Network");
    }

    #[test]
    fn relative_diagram_resolves_next_to_model() {
        let config = AnalyzeConfig {
            model: Some(fixture_path("with_diagram.yaml")),
            ..AnalyzeConfig::default()
        };
        let loaded = load_input(&config).unwrap();
        let diagram = loaded.input.diagram.expect("diagram should be set");
        assert_eq!(diagram.path, fixture_path("architecture.drawio"));
    }

    #[test]
    fn missing_model_file_is_a_load_failure() {
        let config = AnalyzeConfig {
            model: Some(fixture_path("does_not_exist.yaml")),
            ..AnalyzeConfig::default()
        };
        let err = load_input(&config).unwrap_err();
        assert!(matches!(err, PipelineError::LoadFailed { .. }));
        assert_eq!(err.exit_code(), exit_codes::ERROR);
    }
}

// ============================================================================
// Analyze Command Tests
// ============================================================================

mod analyze_command {
    use super::*;

    #[test]
    fn web_app_fixture_report() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("report.json");
        let code = run_analyze(json_config("web_app.yaml", &out).build().unwrap()).unwrap();
        assert_eq!(code, exit_codes::SUCCESS);

        let report = read_json(&out);
        let threats = report["threats"].as_array().unwrap();
        assert_eq!(threats.len(), 18);
        assert_eq!(report["summary"]["total"], 18);
        assert_eq!(threats[0]["id"], "T1");
        assert_eq!(threats[0]["dfdElement"], "System");
        assert_eq!(threats[9]["dfdElement"], "User → Web Server");
        assert_eq!(threats[17]["dfdElement"], "Database Zone");
        assert!(report["metadata"]["modelPath"]
            .as_str()
            .unwrap()
            .ends_with("web_app.yaml"));
    }

    #[test]
    fn fail_on_threats_sets_exit_code() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("report.json");
        let config = json_config("web_app.yaml", &out)
            .fail_on_threats(true)
            .build()
            .unwrap();
        assert_eq!(run_analyze(config).unwrap(), exit_codes::THREATS_FOUND);
    }

    #[test]
    fn custom_rules_disable_and_extend() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("report.json");
        let config = json_config("web_app.yaml", &out)
            .rules_file(Some(fixture_path("custom_rules.yaml")))
            .flow("Checkout,Payments,card number")
            .build()
            .unwrap();
        run_analyze(config).unwrap();

        let report = read_json(&out);
        let ids: Vec<&str> = report["threats"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["ruleId"].as_str().unwrap())
            .collect();
        assert!(!ids.contains(&"PUB-I-001"));
        assert!(ids.contains(&"ORG-I-001"));
    }

    #[test]
    fn invalid_rules_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("report.json");
        let config = json_config("web_app.yaml", &out)
            .rules_file(Some(fixture_path("bad_rules.yaml")))
            .build()
            .unwrap();
        let err = run_analyze(config).unwrap_err();
        let pipeline = err.downcast_ref::<PipelineError>().unwrap();
        assert!(matches!(pipeline, PipelineError::RulesFailed { .. }));
        assert!(format!("{err:#}").contains("authentication"));
        assert!(!out.exists());
    }

    #[test]
    fn diagram_fixture_adds_component_threats() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("report.json");
        run_analyze(json_config("with_diagram.yaml", &out).build().unwrap()).unwrap();

        let report = read_json(&out);
        let diagram: Vec<_> = report["threats"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|t| t["origin"] == "diagram")
            .collect();
        assert_eq!(diagram.len(), 6);
    }

    #[test]
    fn ascii_diagram_written_alongside_report() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("report.json");
        let dfd = tmp.path().join("dfd.txt");
        let config = json_config("web_app.yaml", &out)
            .diagram_file(Some(dfd.clone()))
            .build()
            .unwrap();
        run_analyze(config).unwrap();

        let text = std::fs::read_to_string(&dfd).unwrap();
        assert!(text.contains("User"));
        assert!(text.contains("DMZ"));
    }

    #[test]
    fn dot_diagram_inferred_from_extension() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("report.json");
        let dfd = tmp.path().join("dfd.dot");
        let config = json_config("web_app.yaml", &out)
            .diagram_file(Some(dfd.clone()))
            .build()
            .unwrap();
        run_analyze(config).unwrap();

        let dot = std::fs::read_to_string(&dfd).unwrap();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("cluster_"));
    }

    #[test]
    fn missing_graphviz_falls_back_to_ascii() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("report.json");
        let config = json_config("web_app.yaml", &out)
            .diagram_file(Some(tmp.path().join("dfd.svg")))
            .graphviz_binary("/nonexistent/graphviz/dot")
            .build()
            .unwrap();
        assert_eq!(run_analyze(config).unwrap(), exit_codes::SUCCESS);

        assert!(out.exists(), "report must not depend on rendering");
        assert!(tmp.path().join("dfd.txt").exists());
        assert!(!tmp.path().join("dfd.svg").exists());
    }
}

// ============================================================================
// Rejected Input Tests
// ============================================================================

mod rejected_input {
    use super::*;

    #[test]
    fn model_without_description_or_diagram() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("report.json");
        let err = rejected(json_config("flows_only.yaml", &out).build().unwrap());
        assert!(format!("{err:#}").contains("provide a description or diagram"));
        assert!(!out.exists());
    }

    #[test]
    fn malformed_flow_reports_index_and_field() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("report.json");
        let err = rejected(json_config("malformed_flow.yaml", &out).build().unwrap());
        assert!(format!("{err:#}").contains("data flow #2 is missing 'source'"));
    }

    #[test]
    fn boundary_without_description() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("report.json");
        let err = rejected(json_config("malformed_boundary.yaml", &out).build().unwrap());
        assert!(format!("{err:#}").contains("trust boundary #2 is missing 'description'"));
        assert!(!out.exists());
    }

    #[test]
    fn inline_boundary_without_description() {
        for boundary in ["Backend", "Backend:   "] {
            let config = AnalyzeConfigBuilder::new()
                .description("internal tool")
                .boundary(boundary)
                .quiet(true)
                .build()
                .unwrap();
            rejected(config);
        }
    }

    #[test]
    fn blank_inline_flow_field() {
        let config = AnalyzeConfigBuilder::new()
            .description("internal tool")
            .flow("User,,PII")
            .quiet(true)
            .build()
            .unwrap();
        rejected(config);
    }

    #[test]
    fn missing_diagram_file() {
        let config = AnalyzeConfigBuilder::new()
            .overrides(stride_tools::parsers::InputOverrides {
                diagram: Some(fixture_path("missing.png")),
                ..Default::default()
            })
            .quiet(true)
            .build()
            .unwrap();
        let err = rejected(config);
        assert!(format!("{err:#}").contains("missing.png"));
    }
}

// ============================================================================
// Rules Command Tests
// ============================================================================

mod rules_command {
    use super::*;

    #[test]
    fn check_accepts_valid_file() {
        let config = RulesConfig {
            rules: RulesPathConfig {
                path: Some(fixture_path("custom_rules.yaml")),
            },
            check: true,
            quiet: true,
            ..RulesConfig::default()
        };
        assert_eq!(run_rules(config).unwrap(), exit_codes::SUCCESS);
    }

    #[test]
    fn check_rejects_unknown_feature_with_suggestion() {
        let config = RulesConfig {
            rules: RulesPathConfig {
                path: Some(fixture_path("bad_rules.yaml")),
            },
            check: true,
            quiet: true,
            ..RulesConfig::default()
        };
        let err = run_rules(config).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("authentcation"));
        assert!(message.contains("authentication"));
    }
}

// ============================================================================
// Report Snapshot Tests
// ============================================================================

#[test]
fn csv_report_snapshot() {
    let input = AnalysisInput::new("internal tool").with_flow(DataFlow::new("Worker", "Queue", "event"));
    let model = analyze(&input);
    let csv = create_reporter(ReportFormat::Csv)
        .generate(&input, &model, &ReportConfig::default())
        .unwrap();

    insta::assert_snapshot!(csv, @r###"
    id,type,stride,dfdElement,description,mitigation,controls,asvs,samm,ruleId,origin
    T1,"Tampering",T,"Worker → Queue","Data integrity risk in flow from worker to queue.","Use digital signatures or HMAC for data integrity, and validate all inputs at the destination.","Apply HMAC-SHA256 and schema-based validation.","V5.1.4 - Verify data integrity; V5.2.2 - Verify input sanitization.","Design Level 2 - Implement integrity controls; Verification Level 1 - Validate inputs.",FLOW-T-001,flow
    "###);
}
