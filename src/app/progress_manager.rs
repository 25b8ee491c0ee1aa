//! Progress UI (spinner) for query runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use label_query_core::QueryBatch;
use tokio::sync::watch;

/// Spawns the spinner when requested.
///
/// The spinner follows batch snapshots of one run and clears itself once the
/// batch is finished, replaced by another run, or the orchestrator goes away.
pub(crate) fn spawn_progress_ui(
    use_spinner: bool,
    updates: watch::Receiver<QueryBatch>,
) -> Option<tokio::task::JoinHandle<()>> {
    if !use_spinner {
        return None;
    }
    Some(tokio::spawn(run_spinner(updates)))
}

async fn run_spinner(mut updates: watch::Receiver<QueryBatch>) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let generation = updates.borrow_and_update().generation();
    loop {
        let done = {
            let batch = updates.borrow_and_update();
            if batch.generation() != generation {
                break;
            }
            spinner.set_message(progress_message(&batch));
            batch.all_finished()
        };
        if done || updates.changed().await.is_err() {
            break;
        }
    }

    spinner.finish_and_clear();
}

pub(crate) fn progress_message(batch: &QueryBatch) -> String {
    let total = batch.len();
    let finished = batch.finished_count();
    let active = batch.in_progress_count();
    if active == 0 {
        format!("[{finished}/{total}] Waiting for lookups...")
    } else {
        format!("[{finished}/{total}] Querying {active} name(s)...")
    }
}
