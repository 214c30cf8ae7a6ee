use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "stricture-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_stricture<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_stricture");
    Command::new(bin)
        .args(args)
        .output()
        .expect("stricture command should execute")
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected valid JSON stdout, got error: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn write_manifest(path: &Path) {
    let payload = serde_json::json!({
        "manifestVersion": "1",
        "contracts": [{
            "id": "objects.v1",
            "producer": "object-store",
            "protocol": "http",
            "endpoints": [{
                "path": "/objects/{key}",
                "method": "GET",
                "statusCodes": [200, 404]
            }]
        }]
    });
    fs::write(path, serde_json::to_vec_pretty(&payload).unwrap())
        .expect("manifest should be written");
}

fn write_conformant_facts(path: &Path) {
    let payload = serde_json::json!({
        "client": "rust-sdk",
        "endpoints": {
            "objects.v1": {
                "GET /objects/{key}": {
                    "response": {"handledStatuses": [404]},
                    "errorHandling": {"boundary": "present"},
                    "tests": [
                        {"name": "get_ok", "kind": "happy", "statuses": [200]},
                        {"name": "get_missing", "kind": "negative", "statuses": [404]}
                    ]
                }
            }
        }
    });
    fs::write(path, serde_json::to_vec_pretty(&payload).unwrap())
        .expect("facts should be written");
}

#[test]
fn check_clean_run_exits_zero() {
    let dir = TempDirGuard::new("check-clean");
    let manifest = dir.path().join("manifest.json");
    let facts = dir.path().join("facts.json");
    write_manifest(&manifest);
    write_conformant_facts(&facts);

    let output = run_stricture([
        "check",
        "--manifest",
        manifest.to_str().unwrap(),
        "--facts",
        facts.to_str().unwrap(),
        "--json",
    ]);
    assert_eq!(output.status.code(), Some(0));

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["report"]["summary"]["violations"], 0);
    assert_eq!(payload["report"]["client"], "rust-sdk");
    assert!(payload["generatedAt"].is_string());
}

#[test]
fn check_empty_facts_exits_one_with_findings() {
    let dir = TempDirGuard::new("check-dirty");
    let manifest = dir.path().join("manifest.json");
    let facts = dir.path().join("facts.json");
    write_manifest(&manifest);
    fs::write(&facts, "{}").unwrap();

    let output = run_stricture([
        "check",
        "--manifest",
        manifest.to_str().unwrap(),
        "--facts",
        facts.to_str().unwrap(),
        "--json",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let payload = parse_json_stdout(&output);
    let violations = payload["report"]["violations"].as_array().unwrap();
    assert!(!violations.is_empty());
    assert!(
        violations
            .iter()
            .all(|v| v["findingId"].as_str().unwrap().starts_with("f1_"))
    );
}

#[test]
fn check_min_severity_high_ignores_medium_findings() {
    let dir = TempDirGuard::new("check-floor");
    let manifest = dir.path().join("manifest.json");
    let facts = dir.path().join("facts.json");
    write_manifest(&manifest);
    write_conformant_facts(&facts);

    // Strip the negative test so only medium test-quality findings remain.
    let mut payload: Value =
        serde_json::from_str(&fs::read_to_string(&facts).unwrap()).unwrap();
    let tests = &mut payload["endpoints"]["objects.v1"]["GET /objects/{key}"]["tests"];
    *tests = serde_json::json!([{"name": "get_ok", "kind": "happy", "statuses": [200]}]);
    fs::write(&facts, serde_json::to_vec(&payload).unwrap()).unwrap();

    let output = run_stricture([
        "check",
        "--manifest",
        manifest.to_str().unwrap(),
        "--facts",
        facts.to_str().unwrap(),
        "--min-severity",
        "high",
    ]);
    assert_eq!(output.status.code(), Some(0));

    let strict = run_stricture([
        "check",
        "--manifest",
        manifest.to_str().unwrap(),
        "--facts",
        facts.to_str().unwrap(),
    ]);
    assert_eq!(strict.status.code(), Some(1));
}

#[test]
fn check_rule_filter_restricts_the_report() {
    let dir = TempDirGuard::new("check-rule-filter");
    let manifest = dir.path().join("manifest.json");
    let facts = dir.path().join("facts.json");
    write_manifest(&manifest);
    fs::write(&facts, "{}").unwrap();

    let output = run_stricture([
        "check",
        "--manifest",
        manifest.to_str().unwrap(),
        "--facts",
        facts.to_str().unwrap(),
        "--rule",
        "TQ-negative-cases",
        "--json",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let payload = parse_json_stdout(&output);
    let violations = payload["report"]["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["ruleId"], "TQ-negative-cases");
    assert_eq!(payload["report"]["summary"]["violations"], 1);
    assert_eq!(payload["report"]["summary"]["high"], 0);

    // Filtering down to a rule that produced nothing makes the run clean.
    let clean = run_stricture([
        "check",
        "--manifest",
        manifest.to_str().unwrap(),
        "--facts",
        facts.to_str().unwrap(),
        "--rule",
        "CTR-concurrency-safety",
    ]);
    assert_eq!(clean.status.code(), Some(0));
}

#[test]
fn check_unknown_rule_filter_is_fatal() {
    let dir = TempDirGuard::new("check-rule-unknown");
    let manifest = dir.path().join("manifest.json");
    let facts = dir.path().join("facts.json");
    write_manifest(&manifest);
    fs::write(&facts, "{}").unwrap();

    let output = run_stricture([
        "check",
        "--manifest",
        manifest.to_str().unwrap(),
        "--facts",
        facts.to_str().unwrap(),
        "--rule",
        "CTR-request-shap",
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown rule id"));
}

#[test]
fn check_missing_manifest_is_fatal() {
    let dir = TempDirGuard::new("check-fatal");
    let facts = dir.path().join("facts.json");
    fs::write(&facts, "{}").unwrap();

    let output = run_stricture([
        "check",
        "--manifest",
        dir.path().join("absent.json").to_str().unwrap(),
        "--facts",
        facts.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn config_disables_rules() {
    let dir = TempDirGuard::new("check-config");
    let manifest = dir.path().join("manifest.json");
    let facts = dir.path().join("facts.json");
    let config = dir.path().join("stricture.toml");
    write_manifest(&manifest);
    fs::write(&facts, "{}").unwrap();
    fs::write(
        &config,
        concat!(
            "[rules]\n",
            "\"CTR-status-code-handling\" = \"off\"\n",
            "\"TQ-error-path-coverage\" = \"off\"\n",
            "\"TQ-negative-cases\" = \"off\"\n",
        ),
    )
    .unwrap();

    let output = run_stricture([
        "check",
        "--manifest",
        manifest.to_str().unwrap(),
        "--facts",
        facts.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--json",
    ]);
    assert_eq!(output.status.code(), Some(0));
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["report"]["summary"]["violations"], 0);
}

#[test]
fn config_with_unknown_rule_is_fatal() {
    let dir = TempDirGuard::new("check-badconfig");
    let manifest = dir.path().join("manifest.json");
    let facts = dir.path().join("facts.json");
    let config = dir.path().join("stricture.toml");
    write_manifest(&manifest);
    fs::write(&facts, "{}").unwrap();
    fs::write(&config, "[rules]\n\"CTR-request-shap\" = \"off\"\n").unwrap();

    let output = run_stricture([
        "check",
        "--manifest",
        manifest.to_str().unwrap(),
        "--facts",
        facts.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown rule id"));
}

#[test]
fn rules_lists_the_catalogue() {
    let output = run_stricture(["rules", "--json"]);
    assert_eq!(output.status.code(), Some(0));

    let payload = parse_json_stdout(&output);
    let rules = payload["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 10);
    assert!(
        rules
            .iter()
            .any(|r| r["id"] == "CTR-lifecycle-incomplete" && r["defaultSeverity"] == "high")
    );
    assert!(
        rules
            .iter()
            .any(|r| r["id"] == "TQ-negative-cases" && r["defaultSeverity"] == "medium")
    );
}

#[test]
fn manifest_check_accepts_valid_and_rejects_invalid() {
    let dir = TempDirGuard::new("manifest-check");
    let valid = dir.path().join("valid.json");
    write_manifest(&valid);

    let output = run_stricture([
        "manifest-check",
        "--manifest",
        valid.to_str().unwrap(),
        "--json",
    ]);
    assert_eq!(output.status.code(), Some(0));
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["valid"], true);
    assert_eq!(payload["contracts"], 1);

    let invalid = dir.path().join("invalid.json");
    fs::write(
        &invalid,
        serde_json::json!({
            "manifestVersion": "1",
            "contracts": [{
                "id": "objects.v1",
                "producer": "object-store",
                "protocol": "http",
                "endpoints": [{
                    "path": "/objects/{key}",
                    "method": "GET",
                    "statusCodes": []
                }]
            }]
        })
        .to_string(),
    )
    .unwrap();

    let output = run_stricture([
        "manifest-check",
        "--manifest",
        invalid.to_str().unwrap(),
        "--json",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["valid"], false);
}

#[test]
fn manifest_check_unreadable_file_is_fatal() {
    let dir = TempDirGuard::new("manifest-check-fatal");
    let output = run_stricture([
        "manifest-check",
        "--manifest",
        dir.path().join("absent.json").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}
