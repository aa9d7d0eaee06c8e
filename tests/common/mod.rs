//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::fs;
use std::iter;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use clap::Parser;
use fanout::{Cli, Settings};
use fanout_config::FanoutConfig;

/// Parse `args` as if given after `fanout` and merge them over `config`.
pub fn settings_with(config: &FanoutConfig, args: &[&str]) -> Settings {
    let argv = iter::once("fanout").chain(args.iter().copied());
    let cli = Cli::try_parse_from(argv).expect("valid test arguments");
    Settings::resolve(cli, config).expect("valid test settings")
}

pub fn settings(args: &[&str]) -> Settings {
    settings_with(&FanoutConfig::default(), args)
}

pub fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Write one item per line into `dir/items.txt`.
pub fn write_items(dir: &Path, items: &[&str]) -> PathBuf {
    let path = dir.join("items.txt");
    fs::write(&path, items.join("\n")).expect("write items file");
    path
}

/// The built `fanout` binary, isolated from the user's config and environment.
pub fn fanout_command(config_path: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fanout"));
    cmd.env(fanout_config::CONFIG_PATH_ENV, config_path)
        .env_remove(fanout_config::MAX_CONCURRENT_ENV)
        .env_remove(fanout_config::ONLY_FIRST_N_ENV)
        .env_remove("RUST_LOG");
    cmd
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// True while `pid` exists and is not a zombie.
#[cfg(target_os = "linux")]
pub fn running(pid: u32) -> bool {
    fs::read_to_string(format!("/proc/{pid}/stat"))
        .ok()
        .and_then(|stat| {
            let state = stat.rsplit_once(") ")?.1.chars().next()?;
            Some(state != 'Z' && state != 'X')
        })
        .unwrap_or(false)
}
