//! Run configuration: where the interpreter lives and how runs are reported.
//!
//! User-level config: `~/.eui/config.yaml`
//! Project-level config: `.eui/config.yaml` (overrides user values field by field)
//!
//! Resolution for the interpreter override: project → user → `EUI_PYTHON_PATH`.
//! Everything else falls back to built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable consulted when no config file sets an interpreter.
pub const INTERPRETER_ENV: &str = "EUI_PYTHON_PATH";

/// Interpreter executables probed in order when no override is usable.
pub const DEFAULT_CANDIDATES: &[&str] = &[
    "python",
    "python3",
    "py",
    "/usr/bin/python3",
    "/usr/local/bin/python3",
];

/// Packaged side-car script that actually executes EUI files.
pub const DEFAULT_SCRIPT_NAME: &str = "easy_ui_interpreter.py";

const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_STDERR_MAX_CHARS: usize = 150;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot determine home directory")]
    NoHome,
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML serialize error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Fully resolved settings for the run command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// User-configured interpreter; wins over `candidates` when the file exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter_path: Option<PathBuf>,
    pub candidates: Vec<String>,
    pub probe_timeout_ms: u64,
    pub stderr_max_chars: usize,
    pub script_name: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            interpreter_path: None,
            candidates: DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            stderr_max_chars: DEFAULT_STDERR_MAX_CHARS,
            script_name: DEFAULT_SCRIPT_NAME.into(),
        }
    }
}

/// On-disk shape: every field optional so files can be layered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    interpreter_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    probe_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stderr_max_chars: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script_name: Option<String>,
}

impl ConfigFile {
    fn read(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_yaml::from_str::<Option<Self>>(&content) {
            Ok(file) => file.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring malformed config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    fn apply_to(self, config: &mut RunConfig) {
        if self.interpreter_path.is_some() {
            config.interpreter_path = self.interpreter_path;
        }
        if let Some(candidates) = self.candidates {
            config.candidates = candidates;
        }
        if let Some(ms) = self.probe_timeout_ms {
            config.probe_timeout_ms = ms;
        }
        if let Some(max) = self.stderr_max_chars {
            config.stderr_max_chars = max;
        }
        if let Some(name) = self.script_name {
            config.script_name = name;
        }
    }
}

/// Path to `~/.eui/`.
fn dirs_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|p| PathBuf::from(p).join(".eui"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(".eui"))
    }
}

/// Path to the user-level config file.
pub fn user_config_path() -> Option<PathBuf> {
    dirs_path().map(|p| p.join("config.yaml"))
}

/// Path to the project-level config file, relative to the working directory.
pub fn project_config_path() -> PathBuf {
    PathBuf::from(".eui").join("config.yaml")
}

impl RunConfig {
    /// Load from the default locations and the environment.
    pub fn load() -> Self {
        let project = project_config_path();
        Self::load_from(
            user_config_path().as_deref(),
            Some(project.as_path()),
            std::env::var(INTERPRETER_ENV).ok(),
        )
    }

    /// Layer `user`, then `project`, then fill the override from `env_override`
    /// if neither file set one. Missing files are skipped.
    pub fn load_from(
        user: Option<&Path>,
        project: Option<&Path>,
        env_override: Option<String>,
    ) -> Self {
        let mut config = Self::default();
        if let Some(path) = user {
            ConfigFile::read(path).apply_to(&mut config);
        }
        if let Some(path) = project {
            ConfigFile::read(path).apply_to(&mut config);
        }
        if config.interpreter_path.is_none() {
            config.interpreter_path = env_override
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from);
        }
        config
    }

    /// Per-candidate bound on the version probe.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Expected location of the interpreter script under `extension_root`.
    pub fn script_path(&self, extension_root: &Path) -> PathBuf {
        extension_root.join(&self.script_name)
    }

    /// Save to `~/.eui/config.yaml`.
    pub fn save(&self) -> Result<(), ConfigError> {
        let dir = dirs_path().ok_or(ConfigError::NoHome)?;
        self.save_to(&dir.join("config.yaml"))
    }

    /// Save to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = RunConfig::default();
        assert!(config.interpreter_path.is_none());
        assert_eq!(config.candidates[0], "python");
        assert_eq!(config.candidates.len(), 5);
        assert_eq!(config.stderr_max_chars, 150);
        assert_eq!(config.script_name, "easy_ui_interpreter.py");
        assert_eq!(config.probe_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn load_from_yaml_file() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("user.yaml");
        std::fs::write(
            &user,
            "interpreter_path: /opt/py/bin/python\ncandidates: [python3]\nstderr_max_chars: 80\n",
        )
        .unwrap();

        let config = RunConfig::load_from(Some(&user), None, None);
        assert_eq!(config.interpreter_path, Some(PathBuf::from("/opt/py/bin/python")));
        assert_eq!(config.candidates, vec!["python3".to_string()]);
        assert_eq!(config.stderr_max_chars, 80);
        // Unset fields keep defaults
        assert_eq!(config.probe_timeout_ms, 2_000);
    }

    #[test]
    fn project_overrides_user_field_by_field() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("user.yaml");
        let project = dir.path().join("project.yaml");
        std::fs::write(&user, "interpreter_path: /user/python\nprobe_timeout_ms: 500\n").unwrap();
        std::fs::write(&project, "interpreter_path: /project/python\n").unwrap();

        let config = RunConfig::load_from(Some(&user), Some(&project), None);
        assert_eq!(config.interpreter_path, Some(PathBuf::from("/project/python")));
        assert_eq!(config.probe_timeout_ms, 500);
    }

    #[test]
    fn env_fills_missing_override() {
        let config = RunConfig::load_from(None, None, Some("/env/python".into()));
        assert_eq!(config.interpreter_path, Some(PathBuf::from("/env/python")));

        let config = RunConfig::load_from(None, None, Some("  ".into()));
        assert!(config.interpreter_path.is_none());
    }

    #[test]
    fn file_override_beats_env() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("user.yaml");
        std::fs::write(&user, "interpreter_path: /file/python\n").unwrap();
        let config = RunConfig::load_from(Some(&user), None, Some("/env/python".into()));
        assert_eq!(config.interpreter_path, Some(PathBuf::from("/file/python")));
    }

    #[test]
    fn malformed_or_missing_files_fall_back() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "candidates: {not: [a list").unwrap();
        let empty = dir.path().join("empty.yaml");
        std::fs::write(&empty, "").unwrap();
        let missing = dir.path().join("missing.yaml");

        let config = RunConfig::load_from(Some(&bad), Some(&missing), None);
        assert_eq!(config, RunConfig::default());
        let config = RunConfig::load_from(Some(&empty), None, None);
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = RunConfig {
            interpreter_path: Some("/usr/bin/python3".into()),
            stderr_max_chars: 40,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let back = RunConfig::load_from(Some(&path), None, None);
        assert_eq!(back, config);
    }

    #[test]
    fn script_path_joins_root() {
        let config = RunConfig::default();
        assert_eq!(
            config.script_path(Path::new("/ext")),
            PathBuf::from("/ext/easy_ui_interpreter.py")
        );
    }
}
