//! Minimum engine version gate for the linked SQLite library.

use std::sync::OnceLock;

use pw_core::{EngineVersion, REQUIRED_ENGINE_VERSION, check_engine_version};
use tracing::debug;

static INSTALLED: OnceLock<pw_core::Result<EngineVersion>> = OnceLock::new();

/// Checks the linked SQLite library against [`REQUIRED_ENGINE_VERSION`].
///
/// The check runs once per process; later calls return the cached result.
///
/// # Errors
///
/// Returns [`pw_core::Error::IncompatibleEngine`] if the library is too old,
/// or [`pw_core::Error::MalformedVersion`] if its version string cannot be
/// parsed.
pub fn validate() -> pw_core::Result<EngineVersion> {
    INSTALLED
        .get_or_init(|| {
            let installed = rusqlite::version();
            debug!(installed, required = REQUIRED_ENGINE_VERSION, "checking sqlite version");
            check_engine_version(installed, REQUIRED_ENGINE_VERSION)
        })
        .clone()
}
