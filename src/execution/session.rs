// Suspended confirmation protocol
//
// A command that needs a comment prompt suspends the operation between two
// inbound requests. Everything needed to resume is serialized into the
// session store; the resumed request either executes with the confirmed
// fields or, on cancel, short-circuits to a no-op.

use serde::{Deserialize, Serialize};

use crate::error::WorkboxError;
use crate::workflow::traits::SessionState;
use crate::workflow::types::{CommandId, FieldMap, ItemReference, StateId, WorkflowHandle};

const PENDING_KEY: &str = "workbox/pending-confirmation";

/// The `AwaitingConfirmation` half of the two-phase protocol: the deferred
/// command and its selection, persisted across the suspension boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub items: Vec<ItemReference>,
    pub command: CommandId,
    pub workflow: WorkflowHandle,
    /// Originating state the items must still be in at execution time, if
    /// the action was scoped to one state.
    pub state: Option<StateId>,
}

impl PendingConfirmation {
    pub fn store(&self, session: &dyn SessionState) -> Result<(), WorkboxError> {
        let serialized = serde_json::to_string(self)?;
        session.set(PENDING_KEY, serialized);
        Ok(())
    }

    pub fn load(session: &dyn SessionState) -> Result<Option<Self>, WorkboxError> {
        match session.get(PENDING_KEY) {
            Some(serialized) => Ok(Some(serde_json::from_str(&serialized)?)),
            None => Ok(None),
        }
    }

    pub fn clear(session: &dyn SessionState) {
        session.remove(PENDING_KEY);
    }
}

/// What the confirmation dialog came back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationResult {
    /// The user confirmed; the field payload carries the entered comment.
    Confirmed(FieldMap),
    /// The user abandoned the dialog; the deferred command must not run.
    Cancelled,
}
