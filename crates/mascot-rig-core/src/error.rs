//! Error types for asset indexing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while building a character's resource index.
///
/// Only `NoCoreData` aborts a character load; everything else is degraded
/// to a logged skip by the index builder.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No core rig data file exists anywhere under the character directory.
    /// Fatal for this character; the previously loaded character stays active.
    #[error("no core rig data (.moc3) found under '{0}'")]
    NoCoreData(PathBuf),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest parse failed for '{path}': {message}")]
    ManifestParse { path: PathBuf, message: String },
}
