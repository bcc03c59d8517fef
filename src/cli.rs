//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Zone;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Zonewatch - run encroachment analyses for industrial zones
///
/// Starts an analysis run on the backend, keeps the latest result on disk
/// and prints the dashboard views derived from it.
///
/// Examples:
///   zonewatch --zone Tifra
///   zonewatch --zone "Siltara Phase 1" --format json --output tifra.json
///   zonewatch --show
///   zonewatch --health --api-url http://analysis.local:5000
///   zonewatch --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Industrial zone to analyze
    ///
    /// Matched case-insensitively. Defaults to the first zone (Bhanpuri).
    #[arg(short, long, value_name = "ZONE")]
    pub zone: Option<Zone>,

    /// Analysis backend base URL
    ///
    /// Overrides .zonewatch.toml. Defaults to http://localhost:5000.
    #[arg(long, value_name = "URL", env = "ZONEWATCH_API_URL")]
    pub api_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .zonewatch.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Storage file holding the latest analysis result
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Keep the result in memory only; nothing is read from or written to disk
    #[arg(long, conflicts_with_all = ["store", "show"])]
    pub no_store: bool,

    /// Request timeout in seconds
    ///
    /// Without it the request waits as long as the transport allows.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the views to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the views for the stored result without running an analysis
    #[arg(long, conflicts_with_all = ["health", "zone"])]
    pub show: bool,

    /// Check that the analysis backend is up
    #[arg(long, conflicts_with = "zone")]
    pub health: bool,

    /// List the zones that can be analyzed
    #[arg(long)]
    pub list_zones: bool,

    /// Generate a default .zonewatch.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for printed views.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for commands that never touch the backend
        if self.init_config || self.list_zones {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref output) = self.output {
            if output.is_dir() {
                return Err(format!("Output path is a directory: {}", output.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// The zone to analyze.
    pub fn selected_zone(&self) -> Zone {
        self.zone.unwrap_or_default()
    }
}
