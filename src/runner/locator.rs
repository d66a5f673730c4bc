//! Interpreter discovery: the configured override if it exists, otherwise the
//! first candidate that answers a `--version` probe within the timeout.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Filesystem and process checks the locator relies on.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Whether `path` names an existing file.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `candidate --version` exits successfully within `timeout`.
    async fn responds(&self, candidate: &str, timeout: Duration) -> bool;
}

/// Probe backed by the real filesystem and process table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

#[async_trait]
impl Probe for SystemProbe {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    async fn responds(&self, candidate: &str, timeout: Duration) -> bool {
        let mut cmd = Command::new(candidate);
        cmd.arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!("probe {candidate}: {e}");
                return false;
            }
        };

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => {
                debug!("probe {candidate}: {status}");
                status.success()
            }
            Ok(Err(e)) => {
                debug!("probe {candidate}: wait failed: {e}");
                false
            }
            Err(_) => {
                warn!("probe {candidate} timed out after {}ms", timeout.as_millis());
                let _ = child.kill().await;
                false
            }
        }
    }
}

/// Resolve an interpreter executable.
///
/// A configured override that exists is returned without probing anything.
/// Otherwise candidates are probed in order and the first one that responds
/// wins. `None` means no usable interpreter.
pub async fn locate<P: Probe + ?Sized>(
    configured: Option<&Path>,
    candidates: &[String],
    probe: &P,
    timeout: Duration,
) -> Option<String> {
    if let Some(path) = configured {
        if probe.exists(path) {
            info!("Using configured interpreter {}", path.display());
            return Some(path.to_string_lossy().into_owned());
        }
        warn!(
            "Configured interpreter {} does not exist, probing candidates",
            path.display()
        );
    }

    for candidate in candidates {
        if probe.responds(candidate, timeout).await {
            info!("Found interpreter {candidate}");
            return Some(candidate.clone());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Answers from fixed sets and records every call.
    #[derive(Default)]
    struct FakeProbe {
        files: Vec<PathBuf>,
        working: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Probe for FakeProbe {
        fn exists(&self, path: &Path) -> bool {
            self.calls.lock().unwrap().push(format!("exists:{}", path.display()));
            self.files.iter().any(|f| f == path)
        }

        async fn responds(&self, candidate: &str, _timeout: Duration) -> bool {
            self.calls.lock().unwrap().push(candidate.to_string());
            self.working.iter().any(|w| w == candidate)
        }
    }

    fn candidates(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    const T: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn existing_override_skips_probing() {
        let probe = FakeProbe {
            files: vec![PathBuf::from("/opt/python")],
            working: candidates(&["python"]),
            ..Default::default()
        };
        let found = locate(
            Some(Path::new("/opt/python")),
            &candidates(&["python", "python3"]),
            &probe,
            T,
        )
        .await;
        assert_eq!(found.as_deref(), Some("/opt/python"));
        assert_eq!(*probe.calls.lock().unwrap(), vec!["exists:/opt/python".to_string()]);
    }

    #[tokio::test]
    async fn missing_override_falls_through_to_candidates() {
        let probe = FakeProbe {
            working: candidates(&["python3"]),
            ..Default::default()
        };
        let found = locate(
            Some(Path::new("/gone/python")),
            &candidates(&["python", "python3"]),
            &probe,
            T,
        )
        .await;
        assert_eq!(found.as_deref(), Some("python3"));
    }

    #[tokio::test]
    async fn first_success_stops_probing() {
        let probe = FakeProbe {
            working: candidates(&["c", "d"]),
            ..Default::default()
        };
        let found = locate(None, &candidates(&["a", "b", "c", "d"]), &probe, T).await;
        assert_eq!(found.as_deref(), Some("c"));
        assert_eq!(*probe.calls.lock().unwrap(), candidates(&["a", "b", "c"]));
    }

    #[tokio::test]
    async fn nothing_found() {
        let probe = FakeProbe::default();
        assert!(locate(None, &candidates(&["a", "b"]), &probe, T).await.is_none());
        assert!(locate(None, &[], &probe, T).await.is_none());
    }

    #[tokio::test]
    async fn resolution_is_deterministic() {
        let probe = FakeProbe {
            working: candidates(&["b", "c"]),
            ..Default::default()
        };
        let list = candidates(&["a", "b", "c"]);
        let first = locate(None, &list, &probe, T).await;
        let second = locate(None, &list, &probe, T).await;
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_probe_missing_executable() {
        assert!(
            !SystemProbe
                .responds("/nonexistent/eui-python-xyz", Duration::from_secs(1))
                .await
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_probe_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("slow-python");
        std::fs::write(&script, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let start = std::time::Instant::now();
        let ok = SystemProbe
            .responds(script.to_str().unwrap(), Duration::from_millis(200))
            .await;
        assert!(!ok);
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn system_probe_exists_checks_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("python");
        std::fs::write(&file, "").unwrap();
        assert!(SystemProbe.exists(&file));
        assert!(!SystemProbe.exists(dir.path()));
        assert!(!SystemProbe.exists(&dir.path().join("nope")));
    }
}
