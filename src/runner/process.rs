//! Process runner: spawn the interpreter against a file and stream what happens.
//!
//! Every run delivers its events over one channel to one consumer. Output
//! chunks come first in whatever order the pipes produce them; exactly one
//! `Finished` event closes the stream.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::error::{Notification, RunError};

const READ_CHUNK: usize = 4096;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Exit code 0.
    Success,
    NonZeroExit(i32),
    /// The process existed but its status could not be read or it was killed
    /// by a signal.
    ProcessError(String),
    /// No process was ever created.
    LaunchFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// A trimmed chunk of standard output. Informational only.
    Stdout(String),
    /// A trimmed chunk of standard error, cut to the configured length.
    Stderr(String),
    /// Always last, always exactly once.
    Finished(RunOutcome),
}

impl RunEvent {
    /// What the user should see for this event, if anything.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            RunEvent::Stdout(_) => None,
            RunEvent::Stderr(msg) => {
                Some(RunError::RuntimeStderrWarning(msg.clone()).notification())
            }
            RunEvent::Finished(RunOutcome::Success) => {
                Some(Notification::info("EUI window launched!"))
            }
            RunEvent::Finished(RunOutcome::NonZeroExit(code)) => {
                Some(RunError::NonZeroExit(*code).notification())
            }
            RunEvent::Finished(RunOutcome::ProcessError(msg)) => {
                Some(Notification::error(format!("Process error: {msg}")))
            }
            RunEvent::Finished(RunOutcome::LaunchFailure(msg)) => {
                Some(RunError::LaunchFailure(msg.clone()).notification())
            }
        }
    }
}

/// Receiving end of one run.
#[derive(Debug)]
pub struct RunHandle {
    run_id: u64,
    pid: Option<u32>,
    events: mpsc::UnboundedReceiver<RunEvent>,
}

impl RunHandle {
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// OS process id, `None` when the launch failed.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Next event, or `None` once the stream is exhausted.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Drain the stream and return the terminal outcome.
    pub async fn wait(mut self) -> RunOutcome {
        while let Some(event) = self.events.recv().await {
            if let RunEvent::Finished(outcome) = event {
                return outcome;
            }
        }
        RunOutcome::ProcessError("event stream closed before the process finished".into())
    }
}

/// Cut `s` to at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Launch `interpreter <script> <target>` and return immediately.
///
/// Must be called from within a Tokio runtime. The process is never killed or
/// timed out; it runs until it exits on its own.
pub fn spawn_run(
    run_id: u64,
    interpreter: &str,
    script: &Path,
    target: &Path,
    stderr_max_chars: usize,
) -> RunHandle {
    let (tx, rx) = mpsc::unbounded_channel();

    let mut cmd = Command::new(interpreter);
    cmd.arg(script)
        .arg(target)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!("run {run_id}: failed to launch {interpreter}: {e}");
            let _ = tx.send(RunEvent::Finished(RunOutcome::LaunchFailure(e.to_string())));
            return RunHandle {
                run_id,
                pid: None,
                events: rx,
            };
        }
    };

    let pid = child.id();
    debug!("run {run_id}: spawned {interpreter} (pid {pid:?}) for {}", target.display());
    tokio::spawn(supervise(run_id, child, tx, stderr_max_chars));

    RunHandle {
        run_id,
        pid,
        events: rx,
    }
}

async fn supervise(
    run_id: u64,
    mut child: Child,
    tx: mpsc::UnboundedSender<RunEvent>,
    stderr_max_chars: usize,
) {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let out_tx = tx.clone();
    let out = async move {
        if let Some(stdout) = stdout {
            pump(stdout, |chunk| {
                info!("[EUI output] {chunk}");
                let _ = out_tx.send(RunEvent::Stdout(chunk));
            })
            .await;
        }
    };

    let err_tx = tx.clone();
    let err = async move {
        if let Some(stderr) = stderr {
            pump(stderr, |chunk| {
                error!("[Python error] {chunk}");
                let _ = err_tx.send(RunEvent::Stderr(truncate_chars(&chunk, stderr_max_chars)));
            })
            .await;
        }
    };

    tokio::join!(out, err);

    let outcome = match child.wait().await {
        Ok(status) => match status.code() {
            Some(0) => RunOutcome::Success,
            Some(code) => RunOutcome::NonZeroExit(code),
            None => RunOutcome::ProcessError(format!("terminated without exit code ({status})")),
        },
        Err(e) => RunOutcome::ProcessError(e.to_string()),
    };
    debug!("run {run_id}: finished with {outcome:?}");
    let _ = tx.send(RunEvent::Finished(outcome));
}

/// Length of a UTF-8 sequence cut off at the end of `bytes`, or 0.
fn incomplete_tail(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let b = bytes[bytes.len() - back];
        if b & 0xC0 == 0x80 {
            continue;
        }
        let width = match b {
            0xF0..=0xF7 => 4,
            0xE0..=0xEF => 3,
            0xC0..=0xDF => 2,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}

/// Read `reader` to EOF, handing each non-blank chunk to `emit`.
///
/// A character split across two reads is held back until it is complete.
async fn pump<R: AsyncRead + Unpin>(mut reader: R, mut emit: impl FnMut(String)) {
    let mut buf = vec![0u8; READ_CHUNK];
    let mut pending: Vec<u8> = Vec::new();
    let mut flush = |bytes: &[u8]| {
        let chunk = String::from_utf8_lossy(bytes).trim().to_string();
        if !chunk.is_empty() {
            emit(chunk);
        }
    };
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                pending.extend_from_slice(&buf[..n]);
                let complete = pending.len() - incomplete_tail(&pending);
                flush(&pending[..complete]);
                pending.drain(..complete);
            }
            Err(e) => {
                warn!("pipe read failed: {e}");
                break;
            }
        }
    }
    if !pending.is_empty() {
        flush(&pending);
    }
}
