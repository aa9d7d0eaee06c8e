//! fanout - run a command once per input item with bounded concurrency.
//!
//! The binary is a thin shell around this library:
//!
//! ```text
//! Cli + FanoutConfig ──► Settings ──► read_items ──► execute ──► render_{text,json}
//!                                                      │
//!                                       fanout_engine::run_parallel
//!                                       (CommandTemplate::run per item)
//! ```

mod args;
mod command;
mod process;
mod render;

use std::io::{self, BufRead};

use fanout_engine::{ExecutorError, RunOptions, run_parallel};

pub use args::{Cli, Settings};
pub use command::{CommandError, CommandOutput, CommandTemplate, DEFAULT_PLACEHOLDER};
pub use process::ChildGuard;
pub use render::{CommandReport, render_json, render_text};

/// One item per non-blank line, kept verbatim apart from the line ending.
pub fn read_items(reader: impl BufRead) -> io::Result<Vec<String>> {
    let mut items = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            items.push(line);
        }
    }
    Ok(items)
}

/// Run the configured command over `items`.
///
/// Only an invalid `max_concurrent` fails the call; per-item problems are in the report.
pub async fn execute(
    settings: &Settings,
    items: Vec<String>,
) -> Result<CommandReport, ExecutorError> {
    let template = &settings.template;

    let mut options = RunOptions::new()
        .with_max_concurrent(settings.max_concurrent)
        .with_label("fanout");
    if let Some(only_first_n) = settings.only_first_n {
        options = options.with_only_first_n(only_first_n);
    }
    if let Some(skip) = settings.skip.as_ref() {
        options = options.skip_when(move |item: &String| skip.is_match(item));
    }

    run_parallel(
        items,
        move |item: String| template.run(item),
        CommandOutput::success,
        options,
    )
    .await
}
