use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stricture",
    about = "Stricture: static conformance checking of API clients against declared contracts",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a behavioral model against a contract manifest
    Check {
        /// Path to the contract manifest JSON
        #[arg(long, default_value = "stricture.manifest.json")]
        manifest: String,

        /// Path to the extracted behavioral model JSON
        #[arg(long)]
        facts: String,

        /// Optional rule configuration TOML
        #[arg(long)]
        config: Option<String>,

        /// Lowest severity that fails the run: low, medium, or high
        #[arg(long, default_value = "low")]
        min_severity: String,

        /// Restrict the report to one rule ID (repeatable)
        #[arg(long = "rule")]
        rules: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the rule catalogue with default severities
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a contract manifest without running any rules
    ManifestCheck {
        /// Path to the contract manifest JSON
        #[arg(long, default_value = "stricture.manifest.json")]
        manifest: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
