//! CLI output formatting and display helpers.

use label_query_core::{
    LabelMatch, QueryBatch, QueryOutcome, available_field_keys, field_counts,
    missing_selected_fields, select_fields,
};

/// Message when no input was provided at all.
pub const NO_INPUT_GUIDANCE: &str =
    "No input provided. Pass substance names as arguments, pipe them via stdin, or use --file.";

/// Message when stdin was piped but empty.
pub const EMPTY_STDIN_GUIDANCE: &str =
    "Received empty stdin input. Pipe substance names, or pass them as arguments.";

/// Example for piping input.
pub const INPUT_PIPE_EXAMPLE: &str = "Example: printf 'aspirin\\nibuprofen\\n' | label-query";

/// Example for passing names as arguments.
pub const INPUT_ARG_EXAMPLE: &str = "Example: label-query acetaminophen 'aspirin; caffeine'";

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

/// Returns lines for quick-start guidance (headline + examples), truncated to width.
pub fn quick_start_guidance_lines(empty_stdin: bool, width: usize) -> Vec<String> {
    let headline = if empty_stdin {
        EMPTY_STDIN_GUIDANCE
    } else {
        NO_INPUT_GUIDANCE
    };

    vec![
        truncate_to_width(headline, width),
        truncate_to_width(INPUT_PIPE_EXAMPLE, width),
        truncate_to_width(INPUT_ARG_EXAMPLE, width),
    ]
}

/// Prints quick-start guidance to stdout (no input or empty stdin).
pub fn print_quick_start_guidance(empty_stdin: bool) {
    let width = terminal_width().min(80);
    for line in quick_start_guidance_lines(empty_stdin, width) {
        println!("{line}");
    }
}

/// Renders one block per name in input order, then field coverage when
/// fields were selected.
pub fn report_lines(batch: &QueryBatch, fields: &[String], width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, outcome) in batch.iter() {
        match outcome {
            QueryOutcome::Success(found) => {
                lines.push(format!("[ok] {name} ({})", found.path));
                lines.extend(match_lines(found, fields, width));
            }
            QueryOutcome::Failure(message) => {
                lines.push(truncate_to_width(
                    &format!("[failed] {name}: {message}"),
                    width,
                ));
            }
            pending => lines.push(format!("[{}] {name}", pending.label())),
        }
    }

    if !fields.is_empty() && batch.success_count() > 0 {
        let succeeded = batch.success_count();
        let coverage = field_counts(batch, fields)
            .into_iter()
            .map(|(field, count)| format!("{field} {count}/{succeeded}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(truncate_to_width(
            &format!("Field coverage: {coverage}"),
            width,
        ));
    }
    lines
}

fn match_lines(found: &LabelMatch, fields: &[String], width: usize) -> Vec<String> {
    let rows = select_fields(&found.record, fields);
    if rows.is_empty() {
        let available = available_field_keys(&found.record);
        if !fields.is_empty() && !available.is_empty() {
            let missing = missing_selected_fields(&available, fields);
            return vec![
                truncate_to_width(
                    &format!(
                        "    The fields {} are not present in the data.",
                        missing.join(", ")
                    ),
                    width,
                ),
                truncate_to_width(
                    &format!("    Available fields are: {}.", available.join(", ")),
                    width,
                ),
            ];
        }
        return vec!["    No data to display".to_string()];
    }

    rows.iter()
        .map(|(key, value)| truncate_to_width(&format!("    {key}: {value}"), width))
        .collect()
}

/// Prints the run report to stdout.
pub fn print_report(batch: &QueryBatch, fields: &[String]) {
    for line in report_lines(batch, fields, terminal_width()) {
        println!("{line}");
    }
}
