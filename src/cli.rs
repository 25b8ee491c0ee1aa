//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use label_query_core::DEFAULT_CONCURRENCY;

/// Resolve drug substance names to single label records.
///
/// Each name is looked up by substance name, falling back to brand name.
/// Join co-formulated substances with ';' to look up a compound product.
#[derive(Parser, Debug)]
#[command(name = "label-query")]
#[command(author, version, about)]
pub struct Args {
    /// Substance names (comma or newline separated; "aspirin; caffeine" is one compound)
    #[arg(value_name = "NAMES")]
    pub names: Vec<String>,

    /// CSV file whose non-empty cells are substance names
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// API key for the label-search endpoint
    #[arg(long, env = "LABEL_QUERY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Maximum concurrent lookups (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Comma-separated record fields to print (e.g. openfda.brand_name,warnings)
    #[arg(long, value_delimiter = ',', value_name = "FIELDS")]
    pub fields: Vec<String>,

    /// Label-search endpoint URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,
}
