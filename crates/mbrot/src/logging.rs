//! Subscriber setup.
//!
//! The filter comes from `MBROT_LOG` when it is set and parses, otherwise
//! from `--log-level`. Interactive sessions own the terminal, so they log
//! only to a file; headless commands log to stderr unless a file is given.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{AppError, Result};

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "MBROT_LOG";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Pick the target for a command.
    #[must_use]
    pub fn choose(log_file: Option<&Path>, owns_terminal: bool) -> Self {
        match (log_file, owns_terminal) {
            (Some(path), _) => Self::File(path.to_path_buf()),
            (None, true) => Self::Off,
            (None, false) => Self::Stderr,
        }
    }
}

/// Build the level filter.
///
/// # Errors
/// Returns [`AppError::InvalidArgument`] if `level` is not a valid directive
/// and the environment does not supply one.
pub fn filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|err| AppError::invalid(format!("log level `{level}`: {err}")))
}

/// Install the global subscriber.
///
/// # Errors
/// Fails on an invalid level, an unopenable log file, or if a subscriber is
/// already installed.
pub fn init(level: &str, target: &LogTarget) -> Result<()> {
    let filter = filter(level)?;
    let installed = match target {
        LogTarget::Off => return Ok(()),
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| AppError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    installed.map_err(|err| AppError::invalid(format!("logging already initialised: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interactive_without_file_is_silent() {
        assert_eq!(LogTarget::choose(None, true), LogTarget::Off);
    }

    #[test]
    fn headless_without_file_uses_stderr() {
        assert_eq!(LogTarget::choose(None, false), LogTarget::Stderr);
    }

    #[test]
    fn file_wins_in_every_mode() {
        let path = Path::new("/tmp/mbrot.log");
        for owns_terminal in [true, false] {
            assert_eq!(
                LogTarget::choose(Some(path), owns_terminal),
                LogTarget::File(path.to_path_buf())
            );
        }
    }

    #[test]
    fn level_directives_parse() {
        if std::env::var_os(LOG_ENV).is_some() {
            return;
        }
        assert!(filter("debug").is_ok());
        assert!(filter("mbrot=trace,warn").is_ok());
        assert!(filter("mbrot=loudest").is_err());
    }

    #[test]
    fn off_target_installs_nothing() {
        assert!(init("info", &LogTarget::Off).is_ok());
    }

    #[test]
    fn unopenable_log_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("mbrot.log");
        let err = init("info", &LogTarget::File(path.clone())).unwrap_err();
        assert!(matches!(err, AppError::LogFile { path: p, .. } if p == path));
    }
}
