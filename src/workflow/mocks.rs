// Mock implementations for testing - no side effects
//
// In-memory collaborators backed by RefCell. They record the calls made
// against them so tests can assert on interaction patterns, e.g. that
// per-item command computation was skipped for large states.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;

use crate::error::ExecuteError;
use crate::workflow::traits::*;
use crate::workflow::types::*;

/// Mock workflow with a configurable transition table.
pub struct MockWorkflow {
    handle: WorkflowHandle,
    display_name: String,
    icon: String,
    states: Vec<WorkflowState>,
    state_commands: HashMap<StateId, Vec<WorkflowCommand>>,
    next_step: HashMap<(StateId, CommandId), StateId>,
    item_state: RefCell<HashMap<ItemReference, StateId>>,
    state_items: RefCell<HashMap<StateId, Vec<ItemReference>>>,
    history: RefCell<HashMap<ItemReference, Vec<WorkflowEvent>>>,
    hard_failure: RefCell<Option<String>>,
    /// Items for which `commands_for_item` was invoked.
    pub item_command_lookups: RefCell<Vec<ItemReference>>,
    /// States for which `commands_for_state` was invoked.
    pub state_command_lookups: RefCell<Vec<StateId>>,
    /// Every `execute` call, in order.
    pub executed: RefCell<Vec<(ItemReference, CommandId, FieldMap)>>,
}

impl MockWorkflow {
    pub fn new(handle: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            handle: WorkflowHandle(handle.into()),
            display_name: display_name.into(),
            icon: "workflow.png".to_string(),
            states: Vec::new(),
            state_commands: HashMap::new(),
            next_step: HashMap::new(),
            item_state: RefCell::new(HashMap::new()),
            state_items: RefCell::new(HashMap::new()),
            history: RefCell::new(HashMap::new()),
            hard_failure: RefCell::new(None),
            item_command_lookups: RefCell::new(Vec::new()),
            state_command_lookups: RefCell::new(Vec::new()),
            executed: RefCell::new(Vec::new()),
        }
    }

    pub fn add_state(&mut self, id: &str, display_name: &str, is_final: bool) {
        self.states.push(WorkflowState {
            id: StateId::from(id),
            display_name: display_name.to_string(),
            icon: "state.png".to_string(),
            is_final,
        });
    }

    pub fn add_command(&mut self, state: &str, command: WorkflowCommand) {
        self.state_commands
            .entry(StateId::from(state))
            .or_default()
            .push(command);
    }

    /// Declare that `command` moves items from `state` to `next`.
    pub fn add_transition(&mut self, state: &str, command: &str, next: &str) {
        self.next_step.insert(
            (StateId::from(state), CommandId::from(command)),
            StateId::from(next),
        );
    }

    pub fn place_item(&self, reference: &ItemReference, state: &str) {
        let state = StateId::from(state);
        self.item_state
            .borrow_mut()
            .insert(reference.clone(), state.clone());
        self.state_items
            .borrow_mut()
            .entry(state)
            .or_default()
            .push(reference.clone());
    }

    pub fn add_history(&self, reference: &ItemReference, event: WorkflowEvent) {
        self.history
            .borrow_mut()
            .entry(reference.clone())
            .or_default()
            .push(event);
    }

    /// Make every subsequent `execute` fail with a non-transition error.
    pub fn set_hard_failure(&self, message: &str) {
        *self.hard_failure.borrow_mut() = Some(message.to_string());
    }

    fn move_item(&self, reference: &ItemReference, from: &StateId, to: &StateId) {
        self.item_state
            .borrow_mut()
            .insert(reference.clone(), to.clone());
        let mut items = self.state_items.borrow_mut();
        if let Some(list) = items.get_mut(from) {
            list.retain(|r| r != reference);
        }
        items.entry(to.clone()).or_default().push(reference.clone());
    }
}

impl Workflow for MockWorkflow {
    fn handle(&self) -> &WorkflowHandle {
        &self.handle
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn icon(&self) -> &str {
        &self.icon
    }

    fn states(&self) -> Vec<WorkflowState> {
        self.states.clone()
    }

    fn state(&self, id: &StateId) -> Option<WorkflowState> {
        self.states.iter().find(|s| &s.id == id).cloned()
    }

    fn state_of(&self, item: &Item) -> Option<WorkflowState> {
        let id = self.item_state.borrow().get(&item.reference).cloned()?;
        self.state(&id)
    }

    fn commands_for_state(&self, state: &StateId) -> Vec<WorkflowCommand> {
        self.state_command_lookups.borrow_mut().push(state.clone());
        self.state_commands.get(state).cloned().unwrap_or_default()
    }

    fn commands_for_item(&self, item: &Item) -> Vec<WorkflowCommand> {
        self.item_command_lookups
            .borrow_mut()
            .push(item.reference.clone());
        match self.state_of(item) {
            Some(state) => self.state_commands.get(&state.id).cloned().unwrap_or_default(),
            None => Vec::new(),
        }
    }

    fn items(&self, state: &StateId) -> Vec<ItemReference> {
        self.state_items.borrow().get(state).cloned().unwrap_or_default()
    }

    fn item_count(&self, state: &StateId) -> usize {
        self.state_items
            .borrow()
            .get(state)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn history(&self, item: &Item) -> Vec<WorkflowEvent> {
        self.history
            .borrow()
            .get(&item.reference)
            .cloned()
            .unwrap_or_default()
    }

    fn execute(
        &self,
        command: &CommandId,
        item: &Item,
        fields: &FieldMap,
        logged: bool,
    ) -> Result<(), ExecuteError> {
        self.executed
            .borrow_mut()
            .push((item.reference.clone(), command.clone(), fields.clone()));
        if let Some(message) = self.hard_failure.borrow().as_ref() {
            return Err(ExecuteError::Other(anyhow!("{message}")));
        }
        let current = self
            .item_state
            .borrow()
            .get(&item.reference)
            .cloned()
            .ok_or_else(|| ExecuteError::Other(anyhow!("item {} has no workflow state", item.reference)))?;
        let next = self
            .next_step
            .get(&(current.clone(), command.clone()))
            .cloned()
            .ok_or_else(|| ExecuteError::MissingTransition {
                state: current.clone(),
                command: command.clone(),
            })?;
        self.move_item(&item.reference, &current, &next);
        if logged {
            self.history
                .borrow_mut()
                .entry(item.reference.clone())
                .or_default()
                .push(WorkflowEvent {
                    user: "mock".to_string(),
                    old_state: current,
                    new_state: next,
                    text: fields.comment().unwrap_or_default().to_string(),
                    date: Utc::now(),
                });
        }
        Ok(())
    }
}

/// Mock provider returning shared mock workflows in registration order.
#[derive(Default)]
pub struct MockWorkflowProvider {
    order: Vec<WorkflowHandle>,
    workflows: HashMap<WorkflowHandle, Arc<MockWorkflow>>,
}

impl MockWorkflowProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, workflow: MockWorkflow) -> Arc<MockWorkflow> {
        let workflow = Arc::new(workflow);
        self.order.push(workflow.handle().clone());
        self.workflows
            .insert(workflow.handle().clone(), Arc::clone(&workflow));
        workflow
    }
}

impl WorkflowProvider for MockWorkflowProvider {
    fn workflows(&self) -> Vec<WorkflowHandle> {
        self.order.clone()
    }

    fn get_workflow(&self, handle: &WorkflowHandle) -> Option<Arc<dyn Workflow>> {
        self.workflows
            .get(handle)
            .map(|w| Arc::clone(w) as Arc<dyn Workflow>)
    }
}

/// Mock item store; references not added resolve to `None`.
#[derive(Default)]
pub struct MockItemStore {
    items: RefCell<HashMap<ItemReference, Item>>,
}

impl MockItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, item: Item) {
        self.items.borrow_mut().insert(item.reference.clone(), item);
    }

    pub fn remove(&self, reference: &ItemReference) {
        self.items.borrow_mut().remove(reference);
    }
}

impl ItemStore for MockItemStore {
    fn get_item(&self, reference: &ItemReference) -> Option<Item> {
        self.items.borrow().get(reference).cloned()
    }
}

/// Mock command filter: passes everything through except explicitly hidden
/// command ids, and records what it was asked to filter.
#[derive(Default)]
pub struct MockCommandFilter {
    hidden: RefCell<HashSet<CommandId>>,
    /// One entry per call: the item the filter ran for, or `None` for a
    /// state-level filter run.
    pub calls: RefCell<Vec<Option<ItemReference>>>,
}

impl MockCommandFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hide(&self, command: &str) {
        self.hidden.borrow_mut().insert(CommandId::from(command));
    }
}

impl CommandFilter for MockCommandFilter {
    fn filter_visible(
        &self,
        commands: Vec<WorkflowCommand>,
        item: Option<&Item>,
    ) -> Vec<WorkflowCommand> {
        self.calls
            .borrow_mut()
            .push(item.map(|i| i.reference.clone()));
        let hidden = self.hidden.borrow();
        commands
            .into_iter()
            .filter(|c| !hidden.contains(&c.id))
            .collect()
    }
}

/// Mock user settings registry.
#[derive(Default)]
pub struct MockUserSettings {
    values: RefCell<HashMap<String, String>>,
}

impl MockUserSettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserSettings for MockUserSettings {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set_string(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

/// Mock session state store.
#[derive(Default)]
pub struct MockSessionState {
    values: RefCell<HashMap<String, String>>,
}

impl MockSessionState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionState for MockSessionState {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.values.borrow_mut().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

/// Build an item with full access rights.
pub fn sample_item(name: &str) -> Item {
    item_with_access(
        name,
        AccessRights {
            can_read: true,
            can_read_language: true,
            can_write_language: true,
            can_lock: true,
            has_lock: false,
        },
    )
}

/// Build an item with the given access rights.
pub fn item_with_access(name: &str, access: AccessRights) -> Item {
    Item {
        reference: ItemReference::new(ItemId::new(), "en", 1, "master"),
        display_name: name.to_string(),
        icon: "item.png".to_string(),
        access,
    }
}

/// Build a plain command with no UI and no comment suppression.
pub fn command(id: &str, display_name: &str) -> WorkflowCommand {
    WorkflowCommand {
        id: CommandId::from(id),
        display_name: display_name.to_string(),
        icon: "command.png".to_string(),
        has_ui: false,
        suppress_comment: false,
    }
}
