use stricture_engine::config::{EngineConfig, load_config};
use stricture_engine::violation::Severity;
use stricture_facts::{BehaviorModel, load_facts};
use stricture_manifest::{ManifestSet, load_manifest};

/// Fatal operational errors (unreadable or malformed inputs) exit 2 so
/// CI can tell them apart from a failed check, which exits 1.
pub const EXIT_VIOLATIONS: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

pub fn load_manifest_or_exit(path: &str) -> ManifestSet {
    load_manifest(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    })
}

pub fn load_facts_or_exit(path: &str) -> BehaviorModel {
    load_facts(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    })
}

pub fn load_config_or_exit(path: Option<&str>) -> EngineConfig {
    match path {
        None => EngineConfig::default(),
        Some(path) => load_config(path).unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(EXIT_FATAL);
        }),
    }
}

pub fn parse_severity_or_exit(raw: &str) -> Severity {
    raw.parse().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    })
}

pub fn print_json(payload: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(payload).expect("json serialization")
    );
}

pub fn generated_at() -> String {
    chrono::Utc::now().to_rfc3339()
}
