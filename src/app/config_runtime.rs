use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use label_query_core::LabelClientConfig;

use crate::app_config::{FileConfig, VerbositySetting, validate_base_url};
use crate::cli::Args;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) concurrency: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let command = Args::command();
    let matches = command.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = sources_from_matches(&matches);
    (args, sources)
}

fn sources_from_matches(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        concurrency: is_commandline_value(matches, "concurrency"),
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Fills unset arguments from the config file.
///
/// The API key is taken from the file only when neither `--api-key` nor
/// `LABEL_QUERY_API_KEY` provided one.
pub(crate) fn apply_config_defaults(
    mut args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Result<Args> {
    if let Some(file_config) = file_config {
        if args.api_key.is_none()
            && let Some(api_key) = &file_config.api_key
        {
            args.api_key = Some(api_key.clone());
        }

        if !cli_sources.concurrency
            && let Some(concurrency) = file_config.concurrency
        {
            args.concurrency = concurrency;
        }

        if args.base_url.is_none()
            && let Some(base_url) = &file_config.base_url
        {
            args.base_url = Some(base_url.clone());
        }

        if !cli_sources.verbose
            && !cli_sources.quiet
            && let Some(verbosity) = file_config.verbosity
        {
            apply_config_verbosity(&mut args, verbosity);
        }
    }

    if !(1..=100).contains(&args.concurrency) {
        bail!(
            "Invalid effective concurrency value: {}. Expected range: 1..=100",
            args.concurrency
        );
    }
    if args.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
        args.api_key = None;
    }

    Ok(args)
}

fn apply_config_verbosity(args: &mut Args, verbosity: VerbositySetting) {
    match verbosity {
        VerbositySetting::Default => {
            args.quiet = false;
            args.verbose = 0;
        }
        VerbositySetting::Verbose => {
            args.quiet = false;
            args.verbose = 1;
        }
        VerbositySetting::Quiet => {
            args.quiet = true;
            args.verbose = 0;
        }
        VerbositySetting::Debug => {
            args.quiet = false;
            args.verbose = 2;
        }
    }
}

/// Builds the search client settings: endpoint from flag or file, timeouts from file.
pub(crate) fn resolve_client_config(
    args: &Args,
    file_config: Option<&FileConfig>,
) -> Result<LabelClientConfig> {
    let mut config = LabelClientConfig::default();

    if let Some(base_url) = &args.base_url {
        validate_base_url(base_url)
            .with_context(|| format!("Invalid --base-url value '{base_url}'"))?;
        config.base_url.clone_from(base_url);
    }

    let Some(file_config) = file_config else {
        return Ok(config);
    };
    if let Some(secs) = file_config.connect_timeout_secs {
        config.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file_config.read_timeout_secs {
        config.read_timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

pub(crate) fn resolve_default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}
