mod commands;
mod history;

use thiserror::Error;

use crate::layer::LayerId;
use crate::params::ParamTarget;

pub use commands::Command;
pub use history::{CommandHistory, MAX_HISTORY};

/// Result type for command operations
pub type CommandResult<T> = Result<T, CommandError>;

/// Errors that can occur during command execution
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("No layer with id {0}")]
    LayerNotFound(LayerId),

    #[error("Layer index {index} is out of range ({len} layers)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Nothing to bind a parameter to for {0:?}")]
    NoSuchBinding(ParamTarget),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}
