// src/utils/log.rs

//! Logging setup.
//!
//! Console output always goes to stderr through `env_logger`. With a log file
//! configured, every line is also written to that file, which is truncated
//! when the process starts.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use env_logger::{Builder, Env, Target};

use crate::error::Result;

/// Initialize the global logger.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str, file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    builder.format_timestamp_secs();

    if let Some(path) = file {
        let sink = open_truncated(path)?;
        builder.target(Target::Pipe(Box::new(Tee::new(io::stderr(), sink))));
    }

    if builder.try_init().is_err() {
        log::warn!("Logger already initialized; keeping the existing one");
    }
    Ok(())
}

/// Create (or empty) the log file, making parent directories as needed.
pub fn open_truncated(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Writer that duplicates everything into two sinks.
pub struct Tee<A, B> {
    primary: A,
    secondary: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        self.secondary.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.secondary.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tee_writes_to_both_sinks() {
        let mut tee = Tee::new(Vec::new(), Vec::new());
        write!(tee, "window 1 of 2880").unwrap();
        tee.flush().unwrap();
        assert_eq!(tee.primary, b"window 1 of 2880");
        assert_eq!(tee.secondary, b"window 1 of 2880");
    }

    #[test]
    fn log_file_is_truncated_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("run.log");

        {
            let mut file = open_truncated(&path).unwrap();
            writeln!(file, "previous run").unwrap();
        }
        assert!(!fs::read_to_string(&path).unwrap().is_empty());

        open_truncated(&path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().is_empty());
    }
}
