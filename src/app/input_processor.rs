//! Assembly of the name list from positional arguments, a CSV file and/or stdin.

use std::fs;
use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result};
use label_query_core::{ParseResult, parse_csv_names, parse_substance_names};

use crate::cli::Args;

/// Names gathered for one invocation.
#[derive(Debug, Default)]
pub(crate) struct CollectedInput {
    pub(crate) parsed: ParseResult,
    /// Stdin was piped but held nothing but whitespace.
    pub(crate) piped_stdin_was_empty: bool,
}

/// Reads every input source named by `args`.
///
/// Stdin is read only when it is piped and no names or file were given.
pub(crate) fn process_input(args: &Args) -> Result<CollectedInput> {
    let csv_text = match &args.file {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read names file '{}'", path.display()))?,
        ),
        None => None,
    };

    let stdin_text = if args.names.is_empty() && csv_text.is_none() && !io::stdin().is_terminal()
    {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read names from stdin")?;
        Some(buffer)
    } else {
        None
    };

    Ok(collect(&args.names, csv_text.as_deref(), stdin_text.as_deref()))
}

fn collect(names: &[String], csv_text: Option<&str>, stdin_text: Option<&str>) -> CollectedInput {
    let mut parsed = ParseResult::new();
    for name in names {
        parsed.merge(parse_substance_names(name));
    }
    if let Some(csv_text) = csv_text {
        parsed.merge(parse_csv_names(csv_text));
    }

    let mut piped_stdin_was_empty = false;
    if let Some(stdin_text) = stdin_text {
        if stdin_text.trim().is_empty() {
            piped_stdin_was_empty = true;
        } else {
            parsed.merge(parse_substance_names(stdin_text));
        }
    }

    CollectedInput {
        parsed,
        piped_stdin_was_empty,
    }
}
