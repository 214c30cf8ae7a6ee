use crate::support::{EXIT_FATAL, EXIT_VIOLATIONS, generated_at, print_json};
use serde_json::json;
use stricture_manifest::{ManifestError, load_manifest};

pub fn run(manifest: String, json_output: bool) {
    match load_manifest(&manifest) {
        Ok(set) => {
            let endpoints: usize = set.contracts.iter().map(|c| c.endpoints.len()).sum();
            if json_output {
                print_json(&json!({
                    "generatedAt": generated_at(),
                    "manifestPath": manifest,
                    "valid": true,
                    "manifestVersion": set.manifest_version,
                    "contracts": set.contracts.len(),
                    "endpoints": endpoints,
                }));
            } else {
                println!("stricture manifest-check --manifest {manifest}");
                println!("  Version: {}", set.manifest_version);
                println!(
                    "  Valid: yes ({} contract(s), {} endpoint(s))",
                    set.contracts.len(),
                    endpoints
                );
            }
        }
        // An unreadable file is an operational failure, not a verdict on
        // the manifest itself.
        Err(e @ ManifestError::ReadFile { .. }) => {
            eprintln!("error: {e}");
            std::process::exit(EXIT_FATAL);
        }
        Err(e) => {
            if json_output {
                print_json(&json!({
                    "generatedAt": generated_at(),
                    "manifestPath": manifest,
                    "valid": false,
                    "error": e.to_string(),
                }));
            } else {
                eprintln!("error: {e}");
            }
            std::process::exit(EXIT_VIOLATIONS);
        }
    }
}
