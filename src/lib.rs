// Workbox - workflow transition orchestration with stateful pagination
// This exposes the core components for embedding and testing

pub mod config;
pub mod controller;
pub mod error;
pub mod execution;
pub mod pagination;
pub mod resolver;
pub mod workflow;

// Re-export key types for easy access
pub use config::WorkboxConfig;
pub use controller::{
    pane_id, ActionEffect, ItemRow, StatePane, Workbox, WorkboxAction, WorkflowPane,
};
pub use error::{ExecuteError, WorkboxError};
pub use execution::{
    BatchCommandExecutor, BatchOutcome, CompletionToken, ConfirmationResult, ItemOutcome,
    PendingConfirmation,
};
pub use pagination::{on_single_item_complete, slice_page, Navigator, OffsetStore, RefreshPlan};
pub use resolver::{EmptyStateDisplay, StateItemSet, StateItemSetResolver};
pub use workflow::{
    AccessRights, Actor, CommandFilter, CommandId, FieldMap, Item, ItemId, ItemReference,
    ItemStore, SessionState, StateId, UserSettings, Workflow, WorkflowCommand, WorkflowEvent,
    WorkflowHandle, WorkflowProvider, WorkflowState, COMMENTS_FIELD,
};
