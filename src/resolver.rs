// State membership resolution under visibility and permission filters

use crate::workflow::traits::{CommandFilter, ItemStore, Workflow};
use crate::workflow::types::{
    AccessRights, Actor, CommandId, Item, ItemReference, WorkflowState,
};

/// Resolved, permission-filtered membership of one workflow state.
/// Recomputed on every render; never cached across requests.
#[derive(Debug, Clone)]
pub struct StateItemSet {
    pub state: WorkflowState,
    pub items: Vec<(ItemReference, Item)>,
    /// Commands valid across the set: the per-item union below the
    /// cardinality threshold, the state-level set above it.
    pub command_ids: Vec<CommandId>,
}

impl StateItemSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// How states with nothing actionable are treated when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyStateDisplay {
    /// Suppress any state whose resolved command set is empty.
    RequireCommands,
    /// Show every state, suppressing only final states holding no items.
    ShowUnlessFinal,
}

/// Resolves which items of a state the actor may act on, and which commands
/// apply across them.
pub struct StateItemSetResolver<'a> {
    store: &'a dyn ItemStore,
    filter: &'a dyn CommandFilter,
    actor: &'a Actor,
    /// Raw item counts above this skip per-item command computation.
    state_filtering_threshold: usize,
}

impl<'a> StateItemSetResolver<'a> {
    pub fn new(
        store: &'a dyn ItemStore,
        filter: &'a dyn CommandFilter,
        actor: &'a Actor,
        state_filtering_threshold: usize,
    ) -> Self {
        Self {
            store,
            filter,
            actor,
            state_filtering_threshold,
        }
    }

    /// The actor may act on an item only with read, language-read and
    /// language-write permission, and either administrator rights or the
    /// ability to hold the lock. This conjunction is what keeps items the
    /// actor cannot act on out of the workbox.
    fn can_act_on(&self, access: &AccessRights) -> bool {
        access.can_read
            && access.can_read_language
            && access.can_write_language
            && (self.actor.is_administrator || access.can_lock || access.has_lock)
    }

    /// Resolve the permission-filtered membership of `state`.
    ///
    /// When the raw (pre-filter) item count exceeds the threshold, per-item
    /// command computation is skipped and the state-level command set is
    /// reported instead. Exact per-item correctness for small states,
    /// conservative approximation for large ones.
    pub fn resolve(&self, state: &WorkflowState, workflow: &dyn Workflow) -> StateItemSet {
        let refs = workflow.items(&state.id);
        let state_level = refs.len() > self.state_filtering_threshold;
        let mut items = Vec::new();
        let mut command_ids: Vec<CommandId> = Vec::new();

        for reference in refs {
            let Some(item) = self.store.get_item(&reference) else {
                continue;
            };
            if !self.can_act_on(&item.access) {
                continue;
            }
            if !state_level {
                let visible = self
                    .filter
                    .filter_visible(workflow.commands_for_item(&item), Some(&item));
                for command in visible {
                    if !command_ids.contains(&command.id) {
                        command_ids.push(command.id);
                    }
                }
            }
            items.push((reference, item));
        }

        if state_level {
            tracing::debug!(
                state = %state.id,
                threshold = self.state_filtering_threshold,
                "state over threshold, using state-level command filtering"
            );
            let visible = self
                .filter
                .filter_visible(workflow.commands_for_state(&state.id), None);
            for command in visible {
                if !command_ids.contains(&command.id) {
                    command_ids.push(command.id);
                }
            }
        }

        StateItemSet {
            state: state.clone(),
            items,
            command_ids,
        }
    }

    /// Just the permission-filtered references of a state, in declaration
    /// order. Backs "send all" selections.
    pub fn permitted_references(
        &self,
        state: &WorkflowState,
        workflow: &dyn Workflow,
    ) -> Vec<ItemReference> {
        workflow
            .items(&state.id)
            .into_iter()
            .filter(|reference| {
                self.store
                    .get_item(reference)
                    .is_some_and(|item| self.can_act_on(&item.access))
            })
            .collect()
    }

    /// Whether a resolved state should be rendered at all.
    pub fn should_display(&self, set: &StateItemSet, mode: EmptyStateDisplay) -> bool {
        match mode {
            EmptyStateDisplay::RequireCommands => !set.command_ids.is_empty(),
            EmptyStateDisplay::ShowUnlessFinal => !(set.state.is_final && set.is_empty()),
        }
    }
}
