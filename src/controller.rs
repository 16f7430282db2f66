// Workbox controller - action dispatch over the transition and pagination core
//
// One inbound user action enters through `dispatch` (or `resume` for the
// second half of a suspended confirmation); everything below it runs
// synchronously within that request.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::WorkboxConfig;
use crate::error::WorkboxError;
use crate::execution::executor::{BatchCommandExecutor, BatchOutcome};
use crate::execution::session::{ConfirmationResult, PendingConfirmation};
use crate::pagination::offset::OffsetStore;
use crate::pagination::pager::{slice_page, Navigator};
use crate::pagination::rebalance::{on_single_item_complete, RefreshPlan};
use crate::resolver::{EmptyStateDisplay, StateItemSet, StateItemSetResolver};
use crate::workflow::traits::{
    CommandFilter, ItemStore, SessionState, UserSettings, Workflow, WorkflowProvider,
};
use crate::workflow::types::{
    Actor, CommandId, FieldMap, Item, ItemReference, StateId, WorkflowCommand, WorkflowEvent,
    WorkflowHandle, WorkflowState, COMMENTS_FIELD,
};

const PAGE_SIZE_KEY: &str = "/Current_User/Workbox/Page Size";
const PANES_KEY_PREFIX: &str = "/Current_User/Panes/";
const PANE_VISIBLE: &str = "visible";
const PANE_HIDDEN: &str = "hidden";

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").expect("static pattern"));

/// Stable per-workflow pane key, usable in registry paths and element ids.
pub fn pane_id(workflow: &WorkflowHandle) -> String {
    format!("P{}", NON_WORD.replace_all(workflow.as_str(), ""))
}

/// A user action against the workbox. Closed set; dispatch is exhaustive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkboxAction {
    /// Invoke a command on one item.
    Send {
        item: ItemReference,
        command: CommandId,
        workflow: WorkflowHandle,
    },
    /// Invoke a command on an explicit selection out of one state.
    SendSelected {
        items: Vec<ItemReference>,
        command: CommandId,
        workflow: WorkflowHandle,
        state: StateId,
    },
    /// Invoke a command on every permitted item of one state.
    SendAll {
        command: CommandId,
        workflow: WorkflowHandle,
        state: StateId,
    },
    /// Jump a state's view to an arbitrary offset.
    Jump {
        workflow: WorkflowHandle,
        state: StateId,
        offset: usize,
    },
    /// Change the user's page size preference.
    SetPageSize { size: usize },
    /// Toggle a workflow pane between visible and hidden.
    TogglePane { workflow: WorkflowHandle },
}

/// Outcome of dispatching one action.
#[derive(Debug)]
pub enum ActionEffect {
    /// A batch executed; the refresh plan carries corrected offsets when a
    /// single-item transition was rebalanced.
    Executed {
        outcome: BatchOutcome,
        refresh: RefreshPlan,
    },
    /// The operation is suspended until the comment prompt comes back.
    AwaitingConfirmation,
    /// A state pane re-rendered in place (offset jump).
    Pane(StatePane),
    /// A pane was shown or hidden.
    PaneVisibility { pane_id: String, visible: bool },
    /// The whole view should reload.
    Refresh(RefreshPlan),
    /// Nothing to do (unresolvable workflow, cancelled confirmation).
    NoOp,
}

/// One item row of a state pane.
#[derive(Debug, Clone)]
pub struct ItemRow {
    pub reference: ItemReference,
    pub item: Item,
    /// Commands actionable on this item, for the row's own controls.
    pub commands: Vec<WorkflowCommand>,
    pub last_event: Option<WorkflowEvent>,
}

/// The visible window of one workflow state.
#[derive(Debug, Clone)]
pub struct StatePane {
    pub state: WorkflowState,
    pub rows: Vec<ItemRow>,
    /// State-level commands valid across the resolved set, for the
    /// selected/all controls.
    pub commands: Vec<WorkflowCommand>,
    pub navigator: Navigator,
}

/// One workflow's pane: its displayable states.
#[derive(Debug, Clone)]
pub struct WorkflowPane {
    pub workflow: WorkflowHandle,
    pub display_name: String,
    pub icon: String,
    pub pane_id: String,
    pub states: Vec<StatePane>,
}

/// The workbox core, wired to its collaborators for the duration of one
/// request. Holds no cross-request state of its own; everything durable
/// lives behind `UserSettings` and `SessionState`.
pub struct Workbox<'a> {
    provider: &'a dyn WorkflowProvider,
    items: &'a dyn ItemStore,
    commands: &'a dyn CommandFilter,
    settings: &'a dyn UserSettings,
    session: &'a dyn SessionState,
    actor: Actor,
    raw_url: Option<Url>,
    config: WorkboxConfig,
}

impl<'a> Workbox<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: &'a dyn WorkflowProvider,
        items: &'a dyn ItemStore,
        commands: &'a dyn CommandFilter,
        settings: &'a dyn UserSettings,
        session: &'a dyn SessionState,
        actor: Actor,
        config: WorkboxConfig,
    ) -> Self {
        Self {
            provider,
            items,
            commands,
            settings,
            session,
            actor,
            raw_url: None,
            config,
        }
    }

    /// Attach the raw URL of the current request; offset fallbacks and
    /// refresh URLs derive from it.
    pub fn with_raw_url(mut self, raw_url: Url) -> Self {
        self.raw_url = Some(raw_url);
        self
    }

    /// The acting user's page size preference.
    pub fn page_size(&self) -> usize {
        let default = self.config.pagination.default_page_size;
        let stored = self.settings.get_int(PAGE_SIZE_KEY, default as i64);
        usize::try_from(stored).unwrap_or(default)
    }

    pub fn set_page_size(&self, size: usize) {
        self.settings.set_int(PAGE_SIZE_KEY, size as i64);
    }

    pub fn offsets(&self) -> OffsetStore<'_> {
        OffsetStore::new(self.session, self.raw_url.as_ref())
    }

    fn resolver(&self) -> StateItemSetResolver<'_> {
        StateItemSetResolver::new(
            self.items,
            self.commands,
            &self.actor,
            self.config.commands.state_filtering_item_threshold,
        )
    }

    fn display_mode(&self) -> EmptyStateDisplay {
        if self.config.display.show_empty_states {
            EmptyStateDisplay::ShowUnlessFinal
        } else {
            EmptyStateDisplay::RequireCommands
        }
    }

    /// Whether this request came from a reload rather than a first open.
    pub fn is_reload(&self) -> bool {
        self.raw_url
            .as_ref()
            .and_then(|url| {
                url.query_pairs()
                    .find(|(key, _)| key == "reload")
                    .map(|(_, value)| value == "1")
            })
            .unwrap_or(false)
    }

    /// Build the workbox view: one pane per visible workflow.
    ///
    /// A sole configured workflow defaults to visible on first open, so a
    /// fresh user is not greeted by an empty screen.
    pub fn load(&self) -> Vec<WorkflowPane> {
        let handles = self.provider.workflows();
        let mut panes = Vec::new();
        for handle in &handles {
            let Some(workflow) = self.provider.get_workflow(handle) else {
                continue;
            };
            let key = format!("{PANES_KEY_PREFIX}{}", pane_id(handle));
            if !self.is_reload()
                && handles.len() == 1
                && self.settings.get_string(&key).unwrap_or_default().is_empty()
            {
                self.settings.set_string(&key, PANE_VISIBLE);
            }
            if self.settings.get_string(&key).as_deref() == Some(PANE_VISIBLE) {
                panes.push(self.build_workflow_pane(&*workflow));
            }
        }
        panes
    }

    /// Build one workflow's pane, suppressing states per the display mode.
    pub fn build_workflow_pane(&self, workflow: &dyn Workflow) -> WorkflowPane {
        let resolver = self.resolver();
        let mode = self.display_mode();
        let states = workflow
            .states()
            .iter()
            .filter_map(|state| {
                let set = resolver.resolve(state, workflow);
                resolver
                    .should_display(&set, mode)
                    .then(|| self.build_state_pane(workflow, &set))
            })
            .collect();
        WorkflowPane {
            workflow: workflow.handle().clone(),
            display_name: workflow.display_name().to_string(),
            icon: workflow.icon().to_string(),
            pane_id: pane_id(workflow.handle()),
            states,
        }
    }

    /// Build the visible window of one resolved state.
    pub fn build_state_pane(&self, workflow: &dyn Workflow, set: &StateItemSet) -> StatePane {
        let offset = self.offsets().get(&set.state.id);
        let page_size = self.page_size();
        let rows = slice_page(&set.items, offset, page_size)
            .iter()
            .map(|(reference, item)| ItemRow {
                reference: reference.clone(),
                item: item.clone(),
                commands: self
                    .commands
                    .filter_visible(workflow.commands_for_item(item), Some(item)),
                last_event: workflow.history(item).pop(),
            })
            .collect();
        let commands = workflow
            .commands_for_state(&set.state.id)
            .into_iter()
            .filter(|command| set.command_ids.contains(&command.id))
            .collect();
        StatePane {
            state: set.state.clone(),
            rows,
            commands,
            navigator: Navigator {
                count: set.len(),
                offset,
                page_size,
            },
        }
    }

    /// Dispatch one user action.
    pub fn dispatch(&self, action: WorkboxAction) -> Result<ActionEffect, WorkboxError> {
        match action {
            WorkboxAction::Send {
                item,
                command,
                workflow,
            } => self.send(item, command, workflow),
            WorkboxAction::SendSelected {
                items,
                command,
                workflow,
                state,
            } => self.send_many(items, command, workflow, state),
            WorkboxAction::SendAll {
                command,
                workflow,
                state,
            } => {
                let Some(workflow_impl) = self.get_workflow(&workflow) else {
                    return Ok(ActionEffect::NoOp);
                };
                let Some(state_def) = workflow_impl.state(&state) else {
                    tracing::debug!(state = %state, "workflow state not found");
                    return Ok(ActionEffect::NoOp);
                };
                let refs = self
                    .resolver()
                    .permitted_references(&state_def, &*workflow_impl);
                self.send_many(refs, command, workflow, state)
            }
            WorkboxAction::Jump {
                workflow,
                state,
                offset,
            } => {
                let Some(workflow_impl) = self.get_workflow(&workflow) else {
                    return Ok(ActionEffect::NoOp);
                };
                let Some(state_def) = workflow_impl.state(&state) else {
                    tracing::debug!(state = %state, "workflow state not found");
                    return Ok(ActionEffect::NoOp);
                };
                self.offsets().set(&state, offset);
                let set = self.resolver().resolve(&state_def, &*workflow_impl);
                Ok(ActionEffect::Pane(
                    self.build_state_pane(&*workflow_impl, &set),
                ))
            }
            WorkboxAction::SetPageSize { size } => {
                self.set_page_size(size);
                Ok(ActionEffect::Refresh(RefreshPlan::default()))
            }
            WorkboxAction::TogglePane { workflow } => {
                let id = pane_id(&workflow);
                let key = format!("{PANES_KEY_PREFIX}{id}");
                let current = self.settings.get_string(&key).unwrap_or_default();
                let visible = current.is_empty() || current == PANE_HIDDEN;
                self.settings
                    .set_string(&key, if visible { PANE_VISIBLE } else { PANE_HIDDEN });
                Ok(ActionEffect::PaneVisibility {
                    pane_id: id,
                    visible,
                })
            }
        }
    }

    /// Resume the second half of a suspended confirmation.
    ///
    /// Cancel short-circuits to a no-op. An over-long comment is rejected
    /// with its length and the suspended state is kept so the prompt can be
    /// shown again.
    pub fn resume(&self, result: ConfirmationResult) -> Result<ActionEffect, WorkboxError> {
        let Some(pending) = PendingConfirmation::load(self.session)? else {
            return Err(WorkboxError::NoPendingConfirmation);
        };
        match result {
            ConfirmationResult::Cancelled => {
                PendingConfirmation::clear(self.session);
                tracing::debug!("confirmation cancelled, deferred command dropped");
                Ok(ActionEffect::NoOp)
            }
            ConfirmationResult::Confirmed(fields) => {
                let max = self.config.commands.comment_max_length;
                if let Some(comment) = fields.get(COMMENTS_FIELD) {
                    let length = comment.chars().count();
                    if length > max {
                        return Err(WorkboxError::CommentTooLong { length, max });
                    }
                }
                let Some(workflow) = self.get_workflow(&pending.workflow) else {
                    PendingConfirmation::clear(self.session);
                    return Ok(ActionEffect::NoOp);
                };
                let effect = self.execute_now(
                    &pending.items,
                    &*workflow,
                    Some(fields),
                    &pending.command,
                    pending.state.as_ref(),
                )?;
                PendingConfirmation::clear(self.session);
                Ok(effect)
            }
        }
    }

    fn send(
        &self,
        item: ItemReference,
        command: CommandId,
        workflow: WorkflowHandle,
    ) -> Result<ActionEffect, WorkboxError> {
        let Some(workflow_impl) = self.get_workflow(&workflow) else {
            return Ok(ActionEffect::NoOp);
        };
        if self.items.get_item(&item).is_none() {
            tracing::debug!(item = %item, "item to send no longer resolves");
            return Ok(ActionEffect::NoOp);
        }
        let skips_prompt = self
            .find_command(&*workflow_impl, &command)
            .is_some_and(|c| c.skips_comment_prompt());
        if skips_prompt {
            return self.execute_now(&[item], &*workflow_impl, None, &command, None);
        }
        self.suspend(vec![item], command, workflow, None)
    }

    fn send_many(
        &self,
        items: Vec<ItemReference>,
        command: CommandId,
        workflow: WorkflowHandle,
        state: StateId,
    ) -> Result<ActionEffect, WorkboxError> {
        let Some(workflow_impl) = self.get_workflow(&workflow) else {
            return Ok(ActionEffect::NoOp);
        };
        if items.is_empty() {
            return Err(WorkboxError::EmptySelection);
        }
        if self.config.commands.single_comment_for_bulk {
            return self.suspend(items, command, workflow, Some(state));
        }
        self.execute_now(&items, &*workflow_impl, None, &command, Some(&state))
    }

    fn suspend(
        &self,
        items: Vec<ItemReference>,
        command: CommandId,
        workflow: WorkflowHandle,
        state: Option<StateId>,
    ) -> Result<ActionEffect, WorkboxError> {
        PendingConfirmation {
            items,
            command,
            workflow,
            state,
        }
        .store(self.session)?;
        Ok(ActionEffect::AwaitingConfirmation)
    }

    fn execute_now(
        &self,
        refs: &[ItemReference],
        workflow: &dyn Workflow,
        fields: Option<FieldMap>,
        command: &CommandId,
        required_state: Option<&StateId>,
    ) -> Result<ActionEffect, WorkboxError> {
        let executor = BatchCommandExecutor::new(self.items);
        let outcome = executor.execute(refs, workflow, fields, command, required_state)?;
        let refresh = match &outcome.pending {
            Some(token) => {
                on_single_item_complete(token, workflow, &self.offsets(), self.page_size())
            }
            None => RefreshPlan::default(),
        };
        Ok(ActionEffect::Executed { outcome, refresh })
    }

    fn get_workflow(&self, handle: &WorkflowHandle) -> Option<Arc<dyn Workflow>> {
        let workflow = self.provider.get_workflow(handle);
        if workflow.is_none() {
            tracing::debug!(workflow = %handle, "workflow not configured, nothing to do");
        }
        workflow
    }

    fn find_command(&self, workflow: &dyn Workflow, id: &CommandId) -> Option<WorkflowCommand> {
        workflow
            .states()
            .iter()
            .flat_map(|state| workflow.commands_for_state(&state.id))
            .find(|command| &command.id == id)
    }
}
