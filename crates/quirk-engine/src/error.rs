//! Error types for the quirk engine

use thiserror::Error;

/// Errors that can occur inside the quirk engine
///
/// Only used at internal seams: the public `decode` entry point never
/// fails for malformed-but-bounded device input, it degrades to a
/// shorter write list instead.
#[derive(Error, Debug)]
pub enum QuirkError {
    /// Wire-level decode failure
    #[error("Decode error: {0}")]
    Decode(#[from] zcl_codec::DecodeError),

    /// No binding matches the incoming report
    #[error("No binding for cluster {cluster:#06X} attribute {attribute:#06X}")]
    UnknownBinding { cluster: u16, attribute: u16 },

    /// JSON serialization error for structured writes
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
