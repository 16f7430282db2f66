use thiserror::Error;

use crate::workflow::types::{CommandId, StateId};

/// Failure of a single workflow command execution, as signalled by the
/// workflow engine.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The item's current state has no next-step mapping for the command.
    /// Recorded per item; the batch continues.
    #[error("workflow state {state} specifies no next step for command {command}")]
    MissingTransition { state: StateId, command: CommandId },

    /// Any other transition failure. Not absorbed locally; fails the whole
    /// request.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// User-facing errors of the workbox core.
#[derive(Debug, Error)]
pub enum WorkboxError {
    /// A bulk action was invoked with no items selected.
    #[error("there are no selected items")]
    EmptySelection,

    /// The supplied comment exceeds the configured maximum length.
    #[error(
        "the comment is too long: {length} characters entered, a comment cannot contain more than {max} characters"
    )]
    CommentTooLong { length: usize, max: usize },

    /// A command execution failed for a reason other than a missing
    /// transition; the whole batch is aborted.
    #[error("workflow command execution failed")]
    Execute(#[source] anyhow::Error),

    /// `resume` was called with no suspended confirmation in session state.
    #[error("no pending confirmation to resume")]
    NoPendingConfirmation,

    /// The suspended confirmation state in the session store does not
    /// deserialize.
    #[error("stored confirmation state is corrupt")]
    CorruptPendingState(#[from] serde_json::Error),
}
