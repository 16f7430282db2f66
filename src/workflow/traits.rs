// Collaborator contracts - dependency injection seams for testability
//
// The workflow provider, item store, command filter and the two user-scoped
// stores are pre-existing services. The core only ever talks to them through
// these traits.

use std::sync::Arc;

use crate::error::ExecuteError;
use crate::workflow::types::{
    CommandId, FieldMap, Item, ItemReference, StateId, WorkflowCommand, WorkflowEvent,
    WorkflowHandle, WorkflowState,
};

/// Source of workflow definitions.
pub trait WorkflowProvider {
    /// Handles of every configured workflow, in display order.
    fn workflows(&self) -> Vec<WorkflowHandle>;

    /// Look up a single workflow definition.
    fn get_workflow(&self, handle: &WorkflowHandle) -> Option<Arc<dyn Workflow>>;
}

/// A resolved workflow definition: its states, commands, member items and
/// the transition engine itself.
pub trait Workflow {
    fn handle(&self) -> &WorkflowHandle;

    fn display_name(&self) -> &str;

    fn icon(&self) -> &str;

    /// All states of the workflow, in definition order.
    fn states(&self) -> Vec<WorkflowState>;

    /// Look up a state by identifier.
    fn state(&self, id: &StateId) -> Option<WorkflowState>;

    /// The state an item currently sits in, if it is in this workflow at all.
    fn state_of(&self, item: &Item) -> Option<WorkflowState>;

    /// Commands declared on a state.
    fn commands_for_state(&self, state: &StateId) -> Vec<WorkflowCommand>;

    /// Commands currently executable against one item. More expensive than
    /// the state-level lookup since transition eligibility is evaluated per
    /// item.
    fn commands_for_item(&self, item: &Item) -> Vec<WorkflowCommand>;

    /// References of every item declared to be in the given state, before
    /// any permission filtering.
    fn items(&self, state: &StateId) -> Vec<ItemReference>;

    /// Current number of items in the given state.
    fn item_count(&self, state: &StateId) -> usize;

    /// The transition history of an item, oldest first.
    fn history(&self, item: &Item) -> Vec<WorkflowEvent>;

    /// Execute a command against one item with the given field payload.
    ///
    /// `logged` controls whether the transition is written to the history.
    fn execute(
        &self,
        command: &CommandId,
        item: &Item,
        fields: &FieldMap,
        logged: bool,
    ) -> Result<(), ExecuteError>;
}

/// The persistent item store holding the content items themselves.
pub trait ItemStore {
    /// Resolve a reference to a concrete item. `None` when the referenced
    /// version no longer exists.
    fn get_item(&self, reference: &ItemReference) -> Option<Item>;
}

/// Narrows raw command lists to those actually visible/actionable.
pub trait CommandFilter {
    /// Filter commands for one item, or for a whole state when `item` is
    /// `None`.
    fn filter_visible(
        &self,
        commands: Vec<WorkflowCommand>,
        item: Option<&Item>,
    ) -> Vec<WorkflowCommand>;
}

/// User-scoped settings registry, durable across sessions. Backs the page
/// size preference and pane visibility.
pub trait UserSettings {
    fn get_string(&self, key: &str) -> Option<String>;

    fn set_string(&self, key: &str, value: &str);

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_string(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn set_int(&self, key: &str, value: i64) {
        self.set_string(key, &value.to_string());
    }
}

/// User-scoped key/value state that survives across requests within one
/// client session. Backs the per-state scroll offsets and the suspended
/// confirmation protocol. Writes are last-write-wins; concurrent sessions of
/// the same user may race, which is accepted as a UX-only hazard.
pub trait SessionState {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);

    fn remove(&self, key: &str);
}
