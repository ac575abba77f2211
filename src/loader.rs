//! # Configuration file loader.
//!
//! Reads the line-oriented system description into a [`SystemSpec`]:
//!
//! ```text
//! # comment
//! resources A:1 B:2 C:1
//! task t1 50 100 A:1 B:1
//! task t2 50 100 C:1
//! ```
//!
//! - Empty lines and lines starting with `#` are skipped.
//! - `resources` lines may repeat; each `name:amount` adds one resource.
//! - `task name busy_ms idle_ms [name:amount]...` adds one task.
//! - Any other keyword is skipped and reported in [`Parsed::skipped`].
//!
//! Numbers are read as signed integers; range checks (negative values, zero
//! demand, unknown names) happen when the session is built.

use std::path::Path;

use crate::error::ConfigError;
use crate::tasks::{SystemSpec, TaskSpec};

/// A line the loader did not understand and ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    /// The line as read (trailing `\r` stripped).
    pub content: String,
}

/// Loader output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parsed {
    /// The system description.
    pub spec: SystemSpec,
    /// Lines with an unknown keyword.
    pub skipped: Vec<SkippedLine>,
}

/// Parser for the system description format.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads and parses a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Parsed, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses the text of a configuration file.
    pub fn parse(text: &str) -> Result<Parsed, ConfigError> {
        let mut out = Parsed::default();

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let content = raw.trim_end_matches('\r');
            let trimmed = content.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut tokens = trimmed.split_whitespace();
            match tokens.next() {
                Some("resources") => {
                    for tok in tokens {
                        let (name, amount) = pair(line, tok)?;
                        out.spec = out.spec.with_resource(name, amount);
                    }
                }
                Some("task") => {
                    let name = tokens.next().ok_or_else(|| missing(line, "task name"))?;
                    let busy = number(line, "busy time", tokens.next())?;
                    let idle = number(line, "idle time", tokens.next())?;
                    let mut task = TaskSpec::new(name, busy, idle);
                    for tok in tokens {
                        let (res, amount) = pair(line, tok)?;
                        task = task.with_demand(res, amount);
                    }
                    out.spec = out.spec.with_task(task);
                }
                _ => out.skipped.push(SkippedLine {
                    line,
                    content: content.to_string(),
                }),
            }
        }
        Ok(out)
    }
}

fn missing(line: usize, what: &str) -> ConfigError {
    ConfigError::Parse {
        line,
        reason: format!("missing {what}"),
    }
}

fn number(line: usize, what: &str, tok: Option<&str>) -> Result<i64, ConfigError> {
    let tok = tok.ok_or_else(|| missing(line, what))?;
    tok.parse::<i64>().map_err(|e| ConfigError::Parse {
        line,
        reason: format!("invalid {what} {tok:?}: {e}"),
    })
}

fn pair(line: usize, tok: &str) -> Result<(&str, i64), ConfigError> {
    let (name, amount) = tok.split_once(':').ok_or_else(|| ConfigError::Parse {
        line,
        reason: format!("expected name:amount, got {tok:?}"),
    })?;
    if name.is_empty() {
        return Err(ConfigError::Parse {
            line,
            reason: format!("empty resource name in {tok:?}"),
        });
    }
    Ok((name, number(line, "amount", Some(amount))?))
}
