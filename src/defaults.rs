//! Default values for not-quite-submodules configuration.
//!
//! This module provides centralized default values and well-known names used
//! across the library and the CLI.

use std::env;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

/// Name of the marker file written into the target directory.
pub const MARKER_FILE: &str = ".CURRENT_TAG";

/// Name of the exclusion file written into the target directory.
pub const IGNORE_FILE: &str = ".gitignore";

/// Default configuration file looked up by `sync` when no remote is given.
pub const CONFIG_FILE: &str = ".not-quite-submodules.yaml";

/// Environment variable that forces a refresh and re-materialization.
pub const FORCE_ENV: &str = "FORCE_UPDATE";

/// Legacy spelling of [`FORCE_ENV`], still honoured.
pub const LEGACY_FORCE_ENV: &str = "CAPBOOTSTRAP_FORCE";

/// Branch used when the mirror's remote HEAD cannot be resolved.
pub const FALLBACK_BRANCH: &str = "master";

/// Default staleness interval in seconds (one day).
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 60 * 60 * 24;

/// Returns the root directory holding mirrors.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/not-quite-submodules` (XDG Base Directory)
/// - macOS: `~/Library/Caches/not-quite-submodules`
/// - Windows: `{FOLDERID_LocalAppData}\not-quite-submodules`
///
/// Falls back to the system temporary directory if the platform cache
/// directory cannot be determined.
pub fn default_mirror_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("not-quite-submodules")
}

/// Deterministic mirror directory name for a remote: the first nine hex
/// characters of the SHA-256 digest of the remote location.
pub fn mirror_dir_name(remote: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(remote.as_bytes()));
    digest[..9].to_string()
}

/// Default mirror path for a remote.
pub fn default_mirror_path(remote: &str) -> PathBuf {
    default_mirror_root().join(mirror_dir_name(remote))
}
