// Workflow domain model and collaborator contracts
//
// The workflow definitions, item store and permission engine live outside
// this crate; everything here is either a value type or a trait seam.

pub mod mocks;
pub mod traits;
pub mod types;

pub use traits::{
    CommandFilter, ItemStore, SessionState, UserSettings, Workflow, WorkflowProvider,
};
pub use types::{
    AccessRights, Actor, CommandId, FieldMap, Item, ItemId, ItemReference, StateId,
    WorkflowCommand, WorkflowEvent, WorkflowHandle, WorkflowState, COMMENTS_FIELD,
};
