//! Diagnostics sink handed to the runner and exporters.
//!
//! Nothing in the library logs through a global; callers construct a sink and
//! pass it in. [`LogDiagnostics`] forwards to the `log` facade, which the
//! binary routes into the debug log file.

use crate::error::{BatchError, Result};
use env_logger::{Env, Target, WriteStyle};
use log::{debug, error, info};
use std::fs::OpenOptions;
use std::path::Path;

/// Log target used by [`LogDiagnostics`].
pub const LOG_TARGET: &str = "ds_connector_registration";

/// Receives progress and failure messages from a run.
pub trait Diagnostics {
    /// Records a routine event.
    fn info(&self, message: &str);

    /// Records a failure. `message` names the affected line, endpoint or file.
    fn error(&self, message: &str);
}

/// Sink that forwards to the `log` crate under [`LOG_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn info(&self, message: &str) {
        info!(target: LOG_TARGET, "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: LOG_TARGET, "{}", message);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &D {
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}

/// Routes the `log` facade into `path`, appending to an existing file.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`.
/// A logger installed earlier in the process stays in place.
pub fn init_file_logger(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| BatchError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;

    let installed = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .write_style(WriteStyle::Never)
        .try_init();
    if installed.is_err() {
        debug!("logger already installed, keeping it");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Collect(RefCell<Vec<(bool, String)>>);

    impl Diagnostics for Collect {
        fn info(&self, message: &str) {
            self.0.borrow_mut().push((false, message.to_string()));
        }

        fn error(&self, message: &str) {
            self.0.borrow_mut().push((true, message.to_string()));
        }
    }

    #[test]
    fn test_reference_forwards_to_sink() {
        let sink = Collect(RefCell::new(Vec::new()));
        let by_ref: &dyn Diagnostics = &&sink;
        by_ref.info("reading file");
        by_ref.error("file missing");
        assert_eq!(
            *sink.0.borrow(),
            vec![
                (false, "reading file".to_string()),
                (true, "file missing".to_string())
            ]
        );
    }

    #[test]
    fn test_init_file_logger_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");
        init_file_logger(&path).unwrap();
        assert!(path.exists());
        LogDiagnostics.info("logger initialised");
    }

    #[test]
    fn test_init_file_logger_reports_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("debug.log");
        match init_file_logger(&path) {
            Err(BatchError::LogFile { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected LogFile error, got {:?}", other),
        }
    }
}
