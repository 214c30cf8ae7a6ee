//! Stricture CLI: the `stricture` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            manifest,
            facts,
            config,
            min_severity,
            rules,
            json,
        } => commands::check::run(manifest, facts, config, min_severity, rules, json),

        Commands::Rules { json } => commands::rules::run(json),

        Commands::ManifestCheck { manifest, json } => commands::manifest_check::run(manifest, json),
    }
}
