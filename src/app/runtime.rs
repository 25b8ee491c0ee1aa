use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};
use label_query_core::{
    LabelSearch, LabelSearchClient, QueryOrchestrator, SubstanceResolver,
};
use tracing::{debug, info, warn};

use crate::app::{
    config_manager, config_runtime, exit_handler, input_processor, progress_manager, terminal,
};
use crate::{ProcessExit, output};

pub(crate) async fn run_label_query() -> Result<ProcessExit> {
    let (args, cli_sources) = config_runtime::parse_cli_with_sources();
    let resolved = config_manager::resolve_config(args, &cli_sources)?;

    let default_level = config_runtime::resolve_default_log_level(&resolved.args);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    let no_color = terminal::is_no_color_requested(&resolved.args);
    terminal::init_tracing(default_level, force_cli_log_level, no_color);

    debug!(
        config_path = ?resolved.config_path,
        loaded_from_file = resolved.loaded_from_file,
        file_verbosity = resolved.file_verbosity.unwrap_or("unset"),
        "Configuration resolved"
    );
    info!("label-query starting");

    let args = resolved.args;
    let input = input_processor::process_input(&args)?;
    if input.parsed.is_empty() {
        output::print_quick_start_guidance(input.piped_stdin_was_empty);
        return Ok(ProcessExit::Success);
    }
    info!("{}", input.parsed);
    for duplicate in &input.parsed.duplicates {
        debug!(name = %duplicate, "Skipped duplicate name");
    }

    let client = LabelSearchClient::with_config(&resolved.client)
        .context("Failed to build label search client")?;
    debug!(endpoint = %client.base_url(), "Label search client ready");
    let search: Arc<dyn LabelSearch> = Arc::new(client);
    let orchestrator =
        QueryOrchestrator::new(SubstanceResolver::new(search), usize::from(args.concurrency))?;

    let run = orchestrator.start(input.parsed.names.iter().cloned(), args.api_key.as_deref())?;
    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let progress = progress_manager::spawn_progress_ui(use_spinner, orchestrator.subscribe());

    let summary = run.wait().await?;
    if let Some(handle) = progress
        && let Err(error) = handle.await
    {
        warn!(error = %error, "progress task ended abnormally");
    }

    let batch = orchestrator.snapshot();
    output::print_report(&batch, &args.fields);
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        total = batch.len(),
        "Query complete"
    );

    Ok(exit_handler::determine_exit_outcome(
        summary.succeeded,
        summary.failed,
    ))
}
