use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

use crate::{LoggerFormat, LoggerLevel, LoggerResult};

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Log level filter expression (e.g., "info", "bnm_core=debug,info").
    pub level: LoggerLevel,
    /// Whether to include module/target names in text and json output.
    pub with_targets: bool,
    /// Whether to use colored text output.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Configuration derived from the process environment.
    ///
    /// - `GITHUB_ACTIONS=true` selects the workflow-command format;
    /// - `RUNNER_DEBUG=1` raises the level to `debug`;
    /// - `BNM_LOG` / `BNM_LOG_FORMAT` override both.
    pub fn for_runner<F>(lookup: F) -> LoggerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        if set("GITHUB_ACTIONS").as_deref() == Some("true") {
            cfg.format = LoggerFormat::Actions;
            cfg.with_targets = false;
            cfg.use_color = false;
        }
        if set("RUNNER_DEBUG").as_deref() == Some("1") {
            cfg.level = LoggerLevel::debug();
        }
        if let Some(format) = set("BNM_LOG_FORMAT") {
            cfg.format = format.parse()?;
        }
        if let Some(level) = set("BNM_LOG") {
            cfg.level = level.parse()?;
        }
        Ok(cfg)
    }

    /// Color is used only if enabled and stdout is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}
