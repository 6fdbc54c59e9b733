//! CLI configuration.
//!
//! Settings are read from an optional YAML file, `pw.yaml` in the
//! installation directory (the directory holding the `pw` executable).
//! Missing keys fall back to defaults, and command-line flags override both.
//!
//! # Example YAML
//!
//! ```yaml
//! store_path: store
//! format: csv
//! min_password_length: 12
//! log_level: info
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Configuration file looked up in the installation directory.
pub const CONFIG_FILE_NAME: &str = "pw.yaml";

/// Store file used when no path is configured.
pub const DEFAULT_STORE_FILE: &str = "store";

/// Settings for one `pw` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PwConfig {
    /// Store file; relative paths resolve against the installation directory.
    pub store_path: Option<PathBuf>,
    /// Default output format.
    pub format: OutputFormat,
    /// Shortest password `pw set` accepts.
    pub min_password_length: usize,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for PwConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            format: OutputFormat::Json,
            min_password_length: 9,
            log_level: "warn".to_string(),
        }
    }
}

impl PwConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|err| format!("Failed to read config '{}': {err}", path.display()))?;
        serde_yaml::from_reader(BufReader::new(file))
            .map_err(|err| format!("Failed to parse config '{}': {err}", path.display()))
    }

    /// Loads `pw.yaml` from `install_dir`, or defaults if there is none.
    pub fn load_from_install_dir(install_dir: &Path) -> Result<Self, String> {
        let path = install_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Resolves the store file location against `install_dir`.
    pub fn store_path(&self, install_dir: &Path) -> PathBuf {
        match &self.store_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => install_dir.join(path),
            None => install_dir.join(DEFAULT_STORE_FILE),
        }
    }
}

/// Directory containing the running executable.
pub fn install_dir() -> Result<PathBuf, String> {
    let exe = std::env::current_exe()
        .map_err(|err| format!("Failed to locate the pw executable: {err}"))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| format!("Executable '{}' has no parent directory", exe.display()))
}
