//! Command-line arguments and their merge with file/env configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use regex::Regex;

use fanout_config::FanoutConfig;
use fanout_types::MaxConcurrent;

use crate::command::{CommandError, CommandTemplate};

#[derive(Debug, Parser)]
#[command(
    name = "fanout",
    version,
    about = "Run a command once per input line, a bounded number at a time",
    after_help = "Each non-empty input line is one item. `{}` in COMMAND is replaced by the item; \
                  without a placeholder the item is appended as the last argument."
)]
pub struct Cli {
    /// Commands running at once [default: 10]
    #[arg(short = 'j', long, value_name = "N", allow_negative_numbers = true)]
    pub max_concurrent: Option<i64>,

    /// Only consider the first N items (skipped items count)
    #[arg(short = 'n', long = "only-first", value_name = "N")]
    pub only_first: Option<usize>,

    /// Skip items matching this regex
    #[arg(short, long, value_name = "REGEX")]
    pub skip: Option<Regex>,

    /// Read items from FILE instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Per-item timeout; a timed-out item is rejected
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Run COMMAND through `<SHELL> -c`
    #[arg(long, value_name = "SHELL")]
    pub shell: Option<String>,

    /// Token replaced by the item [default: {}]
    #[arg(long, value_name = "TOKEN")]
    pub placeholder: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(required = true, last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Everything a run needs, after flags, environment and config file are merged.
#[derive(Debug)]
pub struct Settings {
    /// Not validated here; the coordinator rejects non-positive values.
    pub max_concurrent: i64,
    pub only_first_n: Option<usize>,
    pub skip: Option<Regex>,
    pub input: Option<PathBuf>,
    pub json: bool,
    pub template: CommandTemplate,
}

impl Settings {
    /// Merge `cli` over `config`. `config` should already carry env overrides.
    pub fn resolve(cli: Cli, config: &FanoutConfig) -> Result<Self, CommandError> {
        let command = config.command.as_ref();
        let shell = cli
            .shell
            .or_else(|| command.and_then(|c| c.shell.clone()));
        let timeout_secs = cli
            .timeout
            .or_else(|| command.and_then(|c| c.timeout_secs));

        let mut template = CommandTemplate::new(cli.command)?
            .with_shell(shell)
            .with_timeout(timeout_secs.map(Duration::from_secs));
        if let Some(placeholder) = cli
            .placeholder
            .or_else(|| command.and_then(|c| c.placeholder.clone()))
        {
            template = template.with_placeholder(placeholder)?;
        }

        Ok(Self {
            max_concurrent: cli
                .max_concurrent
                .or_else(|| config.max_concurrent())
                .unwrap_or(MaxConcurrent::DEFAULT.get() as i64),
            only_first_n: cli.only_first.or_else(|| config.only_first_n()),
            skip: cli.skip,
            input: cli.input,
            json: cli.json,
            template,
        })
    }
}
