mod commands;
mod history;

use thiserror::Error;

use crate::decode::DecodeError;
use crate::export::ExportError;

pub use commands::{Command, ObjectEdit};
pub use history::History;

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur during command execution
#[derive(Debug, Error)]
pub enum CommandError {
    /// The user supplied nothing to work with, e.g. an empty upload
    #[error("No input provided: {0}")]
    EmptyInput(&'static str),

    /// The command parameters are invalid for the target object
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Image bytes could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Rendering the document to a bitmap failed
    #[error(transparent)]
    Export(#[from] ExportError),
}
