//! OSS Alternative Finder CLI
//!
//! Tools for maintaining the mappings dataset and for running the lookup
//! engine outside the browser: validate and inspect `mappings.json`, resolve
//! hosts from the command line, and serve the extension's message protocol
//! over stdio as a native-messaging-style host.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use oaf_core::dataset::Dataset;
use oaf_service::stores::DismissalStore;

mod serve;
mod state;

#[derive(Parser)]
#[command(name = "oaf-cli")]
#[command(about = "OSS Alternative Finder dataset tools and protocol host")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a mappings file against the dataset invariants
    Validate {
        /// Mappings JSON file
        #[arg(short, long, default_value = "data/mappings.json")]
        input: String,
    },

    /// Dump dataset statistics
    Info {
        /// Mappings JSON file
        #[arg(short, long, default_value = "data/mappings.json")]
        input: String,
    },

    /// Resolve a hostname or URL against the dataset
    Resolve {
        /// Mappings JSON file
        #[arg(short, long, default_value = "data/mappings.json")]
        input: String,

        /// Hostname (example.com) or URL (https://example.com/page)
        target: String,
    },

    /// Search the dataset by substring
    Search {
        /// Mappings JSON file
        #[arg(short, long, default_value = "data/mappings.json")]
        input: String,

        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Speak the message protocol over stdio, one JSON object per line
    Serve {
        /// Mappings JSON file
        #[arg(short, long, default_value = "data/mappings.json")]
        input: String,

        /// Directory holding settings.json and dismissals.json
        #[arg(short, long, default_value = ".oaf-state")]
        state: PathBuf,
    },

    /// Mark a host as dismissed (the banner stays hidden there)
    Dismiss {
        /// Directory holding settings.json and dismissals.json
        #[arg(short, long, default_value = ".oaf-state")]
        state: PathBuf,

        host: String,
    },

    /// Remove every per-host dismissal record
    ClearDismissals {
        /// Directory holding settings.json and dismissals.json
        #[arg(short, long, default_value = ".oaf-state")]
        state: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Info { input } => cmd_info(&input),
        Commands::Resolve { input, target } => cmd_resolve(&input, &target),
        Commands::Search {
            input,
            query,
            limit,
        } => cmd_search(&input, &query, limit),
        Commands::Serve { input, state } => serve::run_serve(serve::ServeOptions {
            input,
            state,
        }),
        Commands::Dismiss { state, host } => cmd_dismiss(&state, &host),
        Commands::ClearDismissals { state } => cmd_clear_dismissals(&state),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_dataset(input: &str) -> Result<Dataset, String> {
    let bytes =
        std::fs::read(input).map_err(|e| format!("Failed to read '{}': {}", input, e))?;
    Dataset::from_slice(&bytes).map_err(|e| format!("Invalid dataset '{}': {}", input, e))
}

fn cmd_validate(input: &str) -> Result<(), String> {
    let dataset = load_dataset(input)?;
    let issues = dataset.lint();

    if issues.is_empty() {
        println!("Dataset '{}' is valid ({} domains)", input, dataset.len());
        return Ok(());
    }

    for issue in &issues {
        println!("  {issue}");
    }
    Err(format!("{} issue(s) found in '{}'", issues.len(), input))
}

fn cmd_info(input: &str) -> Result<(), String> {
    let dataset = load_dataset(input)?;

    let mut alternatives = 0usize;
    let mut without_alternatives = 0usize;
    let mut categories: Vec<&str> = Vec::new();
    for (_, entry) in dataset.iter() {
        alternatives += entry.alternatives.len();
        if entry.alternatives.is_empty() {
            without_alternatives += 1;
        }
        if let Some(category) = entry.category.as_deref() {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
    }

    println!("Dataset: {}", input);
    println!("  Domains:       {}", dataset.len());
    println!("  Alternatives:  {}", alternatives);
    println!("  Categories:    {}", categories.len());
    println!("  No-alt entries: {}", without_alternatives);

    Ok(())
}

fn cmd_resolve(input: &str, target: &str) -> Result<(), String> {
    let coordinator = serve::build_coordinator(input, None)?;
    let response = coordinator.handle(request_for_target(target));

    let json = serde_json::to_string_pretty(&response)
        .map_err(|e| format!("Failed to encode response: {}", e))?;
    println!("{json}");

    if response.is_ok() {
        Ok(())
    } else {
        Err(format!("Resolution failed for '{}'", target))
    }
}

/// Targets with a scheme go through URL resolution; everything else is
/// treated as a bare hostname.
fn request_for_target(target: &str) -> oaf_service::Request {
    if target.contains("://") {
        oaf_service::Request::ResolveUrl {
            url: target.to_string(),
        }
    } else {
        oaf_service::Request::ResolveHost {
            hostname: target.to_string(),
        }
    }
}

fn cmd_search(input: &str, query: &str, limit: usize) -> Result<(), String> {
    let dataset = load_dataset(input)?;
    let hits = dataset.search(query, limit);

    if hits.is_empty() {
        println!("No matches for '{}'", query);
        return Ok(());
    }

    for hit in &hits {
        let category = hit
            .entry
            .category
            .as_deref()
            .map(|c| format!(" [{}]", c))
            .unwrap_or_default();
        println!(
            "  {} - {}{} ({} alternatives)",
            hit.domain,
            hit.entry.name,
            category,
            hit.entry.alternatives.len()
        );
    }
    println!("{} result(s)", hits.len());

    Ok(())
}

fn cmd_dismiss(state: &std::path::Path, host: &str) -> Result<(), String> {
    let areas = state::StateAreas::open(state);
    let dismissals = DismissalStore::new(areas.local);
    dismissals
        .dismiss(host)
        .map_err(|e| format!("Failed to persist dismissal: {}", e))?;
    println!("Dismissed '{}'", oaf_core::normalize_host(host));
    Ok(())
}

fn cmd_clear_dismissals(state: &std::path::Path) -> Result<(), String> {
    let areas = state::StateAreas::open(state);
    let dismissals = DismissalStore::new(areas.local);
    let removed = dismissals
        .clear_all()
        .map_err(|e| format!("Failed to clear dismissals: {}", e))?;
    if removed > 0 {
        println!("Cleared {} dismissed site(s)", removed);
    } else {
        println!("Nothing to clear");
    }
    Ok(())
}
