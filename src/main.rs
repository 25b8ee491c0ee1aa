//! CLI entry point for the label-query tool.

use std::process::ExitCode;

mod app;
mod app_config;
mod cli;
mod output;

/// Process outcome mapped to an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every name resolved, or there was nothing to do
    Success,
    /// Some names resolved and some failed
    Partial,
    /// Every name failed
    Failure,
}

impl ProcessExit {
    fn code(self) -> ExitCode {
        match self {
            Self::Success | Self::Partial => ExitCode::SUCCESS,
            Self::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match app::runtime::run_label_query().await {
        Ok(exit) => exit.code(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
