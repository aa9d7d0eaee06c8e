//! Configuration loading for fanout.
//!
//! Settings come from an optional TOML file (`$FANOUT_CONFIG`, else
//! `~/.fanout/config.toml`) and a small set of environment overrides:
//!
//! ```toml
//! [run]
//! max_concurrent = 10
//! only_first_n = 25
//!
//! [command]
//! shell = "sh"
//! placeholder = "{}"
//! timeout_secs = 30
//!
//! [log]
//! filter = "info"
//! ```
//!
//! String values may reference environment variables as `${VAR}`.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "FANOUT_CONFIG";
pub const MAX_CONCURRENT_ENV: &str = "FANOUT_MAX_CONCURRENT";
pub const ONLY_FIRST_N_ENV: &str = "FANOUT_ONLY_FIRST_N";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::Invalid { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct FanoutConfig {
    pub run: Option<RunConfig>,
    pub command: Option<CommandConfig>,
    pub log: Option<LogConfig>,
}

/// Run policy defaults.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Operations in flight at once. Validated when the run starts, not here.
    pub max_concurrent: Option<i64>,
    /// Only consider the first N input items.
    pub only_first_n: Option<usize>,
}

/// How the CLI turns an item into a process.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandConfig {
    /// Run the command through this shell (`<shell> -c <command>`) instead of directly.
    pub shell: Option<String>,
    /// Token replaced by the item in each command argument. Default: `{}`.
    pub placeholder: Option<String>,
    /// Per-item timeout in seconds.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: Option<String>,
}

/// Replace `${VAR}` references with the variable's value (empty when unset).
///
/// An unclosed `${` is kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl FanoutConfig {
    /// Load the config file, if there is one.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load a specific config file. A missing file is `Ok(None)`.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::parse(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {}: {}", path.display(), err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env();
        Ok(config)
    }

    /// File config (or defaults) with environment overrides applied.
    pub fn resolve() -> Result<Self, ConfigError> {
        let mut config = Self::load()?.unwrap_or_default();
        config.apply_env_overrides(|name| env::var(name).ok())?;
        Ok(config)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Apply `FANOUT_MAX_CONCURRENT` and `FANOUT_ONLY_FIRST_N` from `lookup`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(MAX_CONCURRENT_ENV) {
            let value = parse_env_int::<i64>(MAX_CONCURRENT_ENV, &raw)?;
            self.run.get_or_insert_with(RunConfig::default).max_concurrent = Some(value);
        }
        if let Some(raw) = lookup(ONLY_FIRST_N_ENV) {
            let value = parse_env_int::<usize>(ONLY_FIRST_N_ENV, &raw)?;
            self.run.get_or_insert_with(RunConfig::default).only_first_n = Some(value);
        }
        Ok(())
    }

    #[must_use]
    pub fn max_concurrent(&self) -> Option<i64> {
        self.run.as_ref().and_then(|run| run.max_concurrent)
    }

    #[must_use]
    pub fn only_first_n(&self) -> Option<usize> {
        self.run.as_ref().and_then(|run| run.only_first_n)
    }

    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        self.log.as_ref().and_then(|log| log.filter.as_deref())
    }

    fn expand_env(&mut self) {
        if let Some(command) = self.command.as_mut() {
            for value in [command.shell.as_mut(), command.placeholder.as_mut()]
                .into_iter()
                .flatten()
            {
                *value = expand_env_vars(value);
            }
        }
        if let Some(filter) = self.log.as_mut().and_then(|log| log.filter.as_mut()) {
            *filter = expand_env_vars(filter);
        }
    }
}

fn parse_env_int<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse::<T>().map_err(|err| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: err.to_string(),
    })
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".fanout").join("config.toml"))
}
