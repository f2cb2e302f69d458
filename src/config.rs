//! # Configuration
//!
//! A [`SyncConfig`] describes one synchronisation: which remote to follow,
//! where to materialize it and how to maintain the mirror. The CLI builds one
//! from flags, or loads a list of them from a `.not-quite-submodules.yaml`
//! file:
//!
//! ```yaml
//! - remote: git@github.com:org/deploy-recipes.git
//!   target: config/deploy
//!   update_interval: 3600
//! - remote: https://github.com/org/shared-ci.git
//!   target: .ci
//!   version: 2.1.0
//!   branch: main
//! ```
//!
//! A single mapping without the surrounding list is accepted too. Relative
//! `target` and `mirror` paths are resolved against the directory holding the
//! file.
//!
//! The force flag is not part of the configuration; it comes from the
//! environment through [`force_from_env`] or from the command line.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::defaults::{
    default_mirror_path, DEFAULT_UPDATE_INTERVAL_SECS, FORCE_ENV, LEGACY_FORCE_ENV,
};
use crate::error::{Error, Result};
use crate::version::VersionTag;

const KNOWN_KEYS: &str = "remote, target, mirror, update_interval, version, branch";

fn default_update_interval_secs() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}

/// Settings for one synchronisation of a remote into a target directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Anything `git clone` accepts.
    pub remote: String,
    /// Directory receiving the materialized files.
    pub target: PathBuf,
    /// Staging clone location. Derived from `remote` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<PathBuf>,
    /// Seconds a mirror stays fresh after a refresh.
    #[serde(default = "default_update_interval_secs")]
    pub update_interval: u64,
    /// Pin this tag instead of following the latest one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Primary branch of the remote. Resolved from the mirror when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl SyncConfig {
    pub fn new(remote: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            remote: remote.into(),
            target: target.into(),
            mirror: None,
            update_interval: DEFAULT_UPDATE_INTERVAL_SECS,
            version: None,
            branch: None,
        }
    }

    pub fn with_mirror(mut self, mirror: impl Into<PathBuf>) -> Self {
        self.mirror = Some(mirror.into());
        self
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval.as_secs();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// The configured mirror path, or the default one derived from `remote`.
    pub fn mirror_path(&self) -> PathBuf {
        self.mirror
            .clone()
            .unwrap_or_else(|| default_mirror_path(&self.remote))
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    /// Check the fields serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.remote.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: "'remote' must not be empty".to_string(),
                hint: Some("Set it to a URL or path that `git clone` accepts".to_string()),
            });
        }
        if self.target.as_os_str().is_empty() {
            return Err(Error::ConfigParse {
                message: format!("'target' must not be empty (remote {})", self.remote),
                hint: None,
            });
        }
        if let Some(version) = &self.version {
            VersionTag::parse(version).map_err(|_| Error::ConfigParse {
                message: format!("'version' value '{}' is not a version", version),
                hint: Some("Use a dotted numeric tag such as 1.4.0".to_string()),
            })?;
        }
        if matches!(&self.branch, Some(b) if b.trim().is_empty()) {
            return Err(Error::ConfigParse {
                message: "'branch' must not be empty".to_string(),
                hint: Some("Remove the key to use the remote's default branch".to_string()),
            });
        }
        Ok(())
    }

    fn resolve_relative_to(mut self, base: &Path) -> Self {
        // Only a relative remote that exists on disk is a path; anything else
        // (URLs, scp-style locations) is left for git to interpret.
        if Path::new(&self.remote).is_relative() {
            let local = base.join(&self.remote);
            if local.exists() {
                self.remote = local.to_string_lossy().into_owned();
            }
        }
        if self.target.is_relative() {
            self.target = base.join(&self.target);
        }
        if let Some(mirror) = self.mirror.take() {
            self.mirror = Some(if mirror.is_relative() {
                base.join(mirror)
            } else {
                mirror
            });
        }
        self
    }
}

/// Parse configuration entries from YAML.
///
/// Accepts a list of entries or a single entry. Empty input yields no entries.
pub fn parse(yaml_content: &str) -> Result<Vec<SyncConfig>> {
    if yaml_content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries = match serde_yaml::from_str::<Vec<SyncConfig>>(yaml_content) {
        Ok(entries) => entries,
        Err(list_err) => match serde_yaml::from_str::<SyncConfig>(yaml_content) {
            Ok(single) => vec![single],
            Err(_) => return Err(yaml_error(list_err)),
        },
    };

    for entry in &entries {
        entry.validate()?;
    }
    Ok(entries)
}

fn yaml_error(err: serde_yaml::Error) -> Error {
    let message = err.to_string();
    let hint = if message.contains("unknown field") {
        Some(format!("Valid keys are: {}", KNOWN_KEYS))
    } else if message.contains("missing field") {
        Some("Every entry needs at least 'remote' and 'target'".to_string())
    } else {
        None
    };
    Error::ConfigParse { message, hint }
}

/// Load configuration entries from a file, resolving relative paths against
/// the file's directory.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<SyncConfig>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let base = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok(parse(&content)?
        .into_iter()
        .map(|entry| entry.resolve_relative_to(&base))
        .collect())
}

/// Whether the environment requests a forced update.
///
/// Presence of [`FORCE_ENV`] sets the flag whatever its value.
/// [`LEGACY_FORCE_ENV`] is honoured with a warning.
pub fn force_from_env() -> bool {
    if env::var_os(FORCE_ENV).is_some() {
        return true;
    }
    if env::var_os(LEGACY_FORCE_ENV).is_some() {
        warn!(
            "{} is deprecated, set {} instead",
            LEGACY_FORCE_ENV, FORCE_ENV
        );
        return true;
    }
    false
}
