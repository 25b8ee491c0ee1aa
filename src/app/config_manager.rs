//! Configuration lifecycle: load file config, merge CLI, resolve client settings.

use std::path::PathBuf;

use anyhow::Result;
use label_query_core::LabelClientConfig;

use crate::app::config_runtime::{self, CliValueSources};
use crate::app_config::{FileConfig, VerbositySetting, load_default_file_config};
use crate::cli::Args;

/// Resolved configuration bundle for one invocation.
pub(crate) struct ResolvedConfig {
    pub(crate) args: Args,
    pub(crate) client: LabelClientConfig,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) loaded_from_file: bool,
    /// Verbosity label from the config file, for diagnostics.
    pub(crate) file_verbosity: Option<&'static str>,
}

/// Loads the default config file and merges it under the CLI arguments.
pub(crate) fn resolve_config(args: Args, cli_sources: &CliValueSources) -> Result<ResolvedConfig> {
    let loaded = load_default_file_config()?;
    merge(args, cli_sources, loaded.config.as_ref(), loaded.path)
}

fn merge(
    args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
    config_path: Option<PathBuf>,
) -> Result<ResolvedConfig> {
    let args = config_runtime::apply_config_defaults(args, cli_sources, file_config)?;
    let client = config_runtime::resolve_client_config(&args, file_config)?;
    Ok(ResolvedConfig {
        args,
        client,
        config_path,
        loaded_from_file: file_config.is_some(),
        file_verbosity: file_config
            .and_then(|file| file.verbosity)
            .map(VerbositySetting::as_str),
    })
}
