//! Core error types.

use thiserror::Error;

/// Errors raised while turning a problem into a prompt.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The problem names a prompt type with no template.
    #[error("invalid prompt type: {0}")]
    InvalidPromptType(String),
}

/// Errors raised while building a request attachment.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// The image file could not be read.
    #[error("failed to read image {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
