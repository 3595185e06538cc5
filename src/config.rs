use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Process settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Workspace opened before the first request, if any.
    pub workspace: Option<PathBuf>,
    /// `EnvFilter` directive string.
    pub log_filter: String,
    pub log_json: bool,
}

impl Config {
    /// Reads from the environment:
    /// - `SCHOOLD_WORKSPACE`
    /// - `SCHOOLD_LOG`
    /// - `SCHOOLD_LOG_JSON`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let workspace = lookup("SCHOOLD_WORKSPACE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let log_filter = lookup("SCHOOLD_LOG")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let log_json = match lookup("SCHOOLD_LOG_JSON").as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => bail!("SCHOOLD_LOG_JSON must be 0/1 or true/false, got {other:?}"),
        };
        Ok(Self {
            workspace,
            log_filter,
            log_json,
        })
    }
}
