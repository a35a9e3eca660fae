//! Error taxonomy for the engine.
//!
//! Empty operations (undo at the bottom of the stack, replacing a color with
//! itself, reducing to more colors than exist) are not errors; they surface as
//! [`crate::editor::Outcome`] values.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Document text is not a well-formed vector document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),

    /// Rendering or encoding an export failed. The live document is untouched.
    #[error("export failed: {0}")]
    Export(String),

    #[error("no document loaded")]
    NoDocument,

    #[error("a document load is still in flight")]
    Loading,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
