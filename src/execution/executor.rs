// Batch command execution with partial-failure collection

use crate::error::{ExecuteError, WorkboxError};
use crate::workflow::traits::{ItemStore, Workflow};
use crate::workflow::types::{CommandId, FieldMap, ItemReference, StateId, COMMENTS_FIELD};

/// Terminal outcome of one item within a batch. No retries within a batch;
/// a failed item is recorded and the batch proceeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The command was invoked and the transition completed.
    Applied,
    /// The item has no current workflow state.
    SkippedNoState,
    /// The item's state no longer matches the required originating state;
    /// it changed concurrently between selection and execution.
    SkippedWrongState,
    /// The item reference no longer resolves.
    FailedNotFound,
    /// The item's state specifies no next step for the command.
    FailedMissingTransition,
}

impl ItemOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ItemOutcome::FailedNotFound | ItemOutcome::FailedMissingTransition
        )
    }
}

/// Handed back when the batch held exactly one item; the caller feeds it to
/// the rebalancer once the transition has completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionToken {
    pub previous_state: StateId,
}

/// Per-batch aggregate result.
///
/// Failures are surfaced as a single batch-level warning without a per-item
/// breakdown; the per-item results are kept for logging and tests.
#[derive(Debug)]
pub struct BatchOutcome {
    pub results: Vec<(ItemReference, ItemOutcome)>,
    pub pending: Option<CompletionToken>,
}

impl BatchOutcome {
    pub fn any_failed(&self) -> bool {
        self.results.iter().any(|(_, o)| o.is_failure())
    }

    /// The one aggregate warning shown to the user, if anything failed.
    pub fn warning(&self) -> Option<&'static str> {
        self.any_failed().then_some(
            "One or more items could not be processed because their workflow state \
             does not specify the next step.",
        )
    }
}

/// Applies one command to a batch of item references, collecting per-item
/// failures without aborting the batch.
pub struct BatchCommandExecutor<'a> {
    store: &'a dyn ItemStore,
}

impl<'a> BatchCommandExecutor<'a> {
    pub fn new(store: &'a dyn ItemStore) -> Self {
        Self { store }
    }

    /// Execute `command` against every reference, in input order.
    ///
    /// Items whose current state does not match `required_state` (when
    /// supplied) are skipped silently. A missing "Comments" field is
    /// synthesized from the item's current state display name so every
    /// transition log entry carries some comment text. A missing-transition
    /// failure is recorded and the batch continues; any other execution
    /// failure aborts the whole batch.
    pub fn execute(
        &self,
        refs: &[ItemReference],
        workflow: &dyn Workflow,
        fields: Option<FieldMap>,
        command: &CommandId,
        required_state: Option<&StateId>,
    ) -> Result<BatchOutcome, WorkboxError> {
        if refs.is_empty() {
            return Err(WorkboxError::EmptySelection);
        }
        let mut fields = fields.unwrap_or_default();
        let single = refs.len() == 1;
        let mut results = Vec::with_capacity(refs.len());
        let mut pending = None;

        for reference in refs {
            let Some(item) = self.store.get_item(reference) else {
                tracing::warn!(item = %reference, "item reference no longer resolves");
                results.push((reference.clone(), ItemOutcome::FailedNotFound));
                continue;
            };
            let Some(state) = workflow.state_of(&item) else {
                results.push((reference.clone(), ItemOutcome::SkippedNoState));
                continue;
            };
            if let Some(required) = required_state {
                if &state.id != required {
                    results.push((reference.clone(), ItemOutcome::SkippedWrongState));
                    continue;
                }
            }
            if !fields.contains(COMMENTS_FIELD) {
                let comment = if state.display_name.trim().is_empty() {
                    String::new()
                } else {
                    state.display_name.clone()
                };
                fields.insert(COMMENTS_FIELD, comment);
            }
            match workflow.execute(command, &item, &fields, true) {
                Ok(()) => {
                    if single {
                        pending = Some(CompletionToken {
                            previous_state: state.id.clone(),
                        });
                    }
                    results.push((reference.clone(), ItemOutcome::Applied));
                }
                Err(ExecuteError::MissingTransition { .. }) => {
                    tracing::warn!(
                        item = %reference,
                        state = %state.id,
                        command = %command,
                        "state has no next step for command"
                    );
                    results.push((reference.clone(), ItemOutcome::FailedMissingTransition));
                }
                Err(ExecuteError::Other(source)) => {
                    return Err(WorkboxError::Execute(source));
                }
            }
        }

        let outcome = BatchOutcome { results, pending };
        if outcome.any_failed() {
            tracing::warn!(
                command = %command,
                total = refs.len(),
                "batch completed with one or more failed items"
            );
        }
        Ok(outcome)
    }
}
