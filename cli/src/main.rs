//! fanout CLI - binary entry point.
//!
//! ```text
//! main() -> FanoutConfig::resolve() -> init_tracing() -> prepare() -> run() -> print
//!                                                                      ▲
//!                                                   shutdown_signal() ─┘ (drops the run)
//! ```
//!
//! Exit codes: `0` every executed item succeeded, `1` some item failed or was
//! rejected, `2` bad configuration or unreadable input, `130`/`143` interrupted by
//! SIGINT/SIGTERM.
//!
//! Children live in their own process groups, so a terminal Ctrl-C reaches only
//! fanout. Dropping the run future on the signal drops every `ChildGuard`, which
//! kills the in-flight commands.

use std::fs::File;
#[cfg(not(unix))]
use std::future;
use std::future::Future;
use std::io::{self, BufReader, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::select;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fanout::{Cli, Settings, execute, read_items, render_json, render_text};
use fanout_config::FanoutConfig;
use fanout_types::RunSummary;

const DEFAULT_LOG_FILTER: &str = "warn";

/// Logs go to stderr; stdout carries only the report.
fn init_tracing(config_filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_filter.unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

/// Listen for SIGINT/SIGTERM; resolves with the conventional `128 + signo` exit code.
///
/// The handlers are registered before this returns, so a signal arriving while the
/// run starts up is not lost.
#[cfg(unix)]
fn shutdown_signal() -> io::Result<impl Future<Output = u8>> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        select! {
            _ = interrupt.recv() => 130,
            _ = terminate.recv() => 143,
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> io::Result<impl Future<Output = u8>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => 130,
            Err(_) => future::pending().await,
        }
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match FanoutConfig::resolve() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("fanout: {err}");
            return ExitCode::from(2);
        }
    };
    init_tracing(config.log_filter());
    if let Some(path) = FanoutConfig::path().filter(|path| path.exists()) {
        tracing::debug!(path = %path.display(), "config loaded");
    }

    // Input is read before the signal handlers are installed.
    let (settings, items) = match prepare(cli, &config) {
        Ok(prepared) => prepared,
        Err(err) => {
            eprintln!("fanout: {err:#}");
            return ExitCode::from(2);
        }
    };

    let shutdown = match shutdown_signal() {
        Ok(shutdown) => shutdown,
        Err(err) => {
            tracing::warn!(%err, "failed to install signal handlers");
            return finish(run(&settings, items).await);
        }
    };

    select! {
        result = run(&settings, items) => finish(result),
        code = shutdown => {
            tracing::warn!(code, "interrupted, killing running commands");
            eprintln!("fanout: interrupted");
            ExitCode::from(code)
        }
    }
}

fn finish(result: Result<RunSummary>) -> ExitCode {
    match result {
        Ok(summary) if summary.all_succeeded() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(err) => {
            eprintln!("fanout: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn prepare(cli: Cli, config: &FanoutConfig) -> Result<(Settings, Vec<String>)> {
    let settings = Settings::resolve(cli, config).context("invalid command")?;

    let items = match &settings.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            read_items(BufReader::new(file))
                .with_context(|| format!("failed to read {}", path.display()))?
        }
        None => read_items(io::stdin().lock()).context("failed to read stdin")?,
    };
    tracing::debug!(items = items.len(), "input read");

    Ok((settings, items))
}

async fn run(settings: &Settings, items: Vec<String>) -> Result<RunSummary> {
    let report = execute(settings, items).await?;

    let rendered = if settings.json {
        let mut json = render_json(&report).context("failed to encode report")?;
        json.push('\n');
        json
    } else {
        render_text(&report)
    };
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write report")?;

    Ok(report.summary())
}
