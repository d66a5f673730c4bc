//! The run command. Check the active document, find an interpreter, launch it.
//!
//! Preconditions fail fast as `RunError`s before anything is spawned. Once a
//! process exists, everything else arrives as `RunEvent`s on its `RunHandle`.

pub mod error;
pub mod locator;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::config::RunConfig;

pub use error::{Notification, RunError, RunResult, Severity};
pub use locator::{locate, Probe, SystemProbe};
pub use process::{spawn_run, RunEvent, RunHandle, RunOutcome};

/// File extensions the run command accepts.
pub const EXTENSIONS: &[&str] = &["eui", "ewui"];

/// Whether `path` ends in a recognized EUI extension.
pub fn is_eui_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXTENSIONS.contains(&e))
}

/// Runs EUI documents through the packaged interpreter script.
///
/// Reruns are not serialized: each `execute` spawns an independent process
/// even if an earlier one is still alive.
pub struct RunCommand<P: Probe = SystemProbe> {
    extension_root: PathBuf,
    config: RunConfig,
    probe: P,
    runs: AtomicU64,
}

impl RunCommand<SystemProbe> {
    pub fn new(extension_root: impl Into<PathBuf>, config: RunConfig) -> Self {
        Self::with_probe(extension_root, config, SystemProbe)
    }
}

impl<P: Probe> RunCommand<P> {
    pub fn with_probe(extension_root: impl Into<PathBuf>, config: RunConfig, probe: P) -> Self {
        Self {
            extension_root: extension_root.into(),
            config,
            probe,
            runs: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Validate the active document. The host is expected to have saved it.
    pub fn check_document<'a>(&self, document: Option<&'a Path>) -> RunResult<&'a Path> {
        let document = document.ok_or(RunError::NoActiveDocument)?;
        if !is_eui_file(document) {
            return Err(RunError::UnrecognizedExtension(document.to_path_buf()));
        }
        Ok(document)
    }

    /// Location of the interpreter script, which must exist.
    pub fn script_path(&self) -> RunResult<PathBuf> {
        let path = self.config.script_path(&self.extension_root);
        if !self.probe.exists(&path) {
            return Err(RunError::MissingInterpreterScript(path));
        }
        Ok(path)
    }

    /// Find an interpreter executable per the configured override and candidates.
    pub async fn interpreter(&self) -> RunResult<String> {
        locate(
            self.config.interpreter_path.as_deref(),
            &self.config.candidates,
            &self.probe,
            self.config.probe_timeout(),
        )
        .await
        .ok_or(RunError::NoInterpreterFound)
    }

    /// Run `document`. Returns once the process is spawned, or once the
    /// launch has failed (reported as the handle's only event).
    pub async fn execute(&self, document: Option<&Path>) -> RunResult<RunHandle> {
        let document = self.check_document(document)?;
        let script = self.script_path()?;
        let interpreter = self.interpreter().await?;

        let run_id = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        if run_id > 1 {
            debug!("run {run_id}: earlier runs may still be alive");
        }
        info!("Running {} with {interpreter}", document.display());

        Ok(spawn_run(
            run_id,
            &interpreter,
            &script,
            document,
            self.config.stderr_max_chars,
        ))
    }
}
