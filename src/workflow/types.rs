// Core types for workflows, states, commands and content items

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the field every transition log entry must carry.
pub const COMMENTS_FIELD: &str = "Comments";

/// Identity of a content item, independent of language and version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        ItemId(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifies one version of a content item in one language of one store.
///
/// Equality is structural; two references naming the same (id, language,
/// version, store) are the same item version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemReference {
    pub id: ItemId,
    pub language: String,
    pub version: u32,
    pub store: String,
}

impl ItemReference {
    pub fn new(id: ItemId, language: impl Into<String>, version: u32, store: impl Into<String>) -> Self {
        Self {
            id,
            language: language.into(),
            version,
            store: store.into(),
        }
    }
}

impl fmt::Display for ItemReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:v{} ({})", self.id, self.language, self.version, self.store)
    }
}

/// Opaque identifier for a workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkflowHandle(pub String);

impl WorkflowHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkflowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for WorkflowHandle {
    fn from(value: &str) -> Self {
        WorkflowHandle(value.to_string())
    }
}

/// Stable identifier of a state within a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub String);

impl StateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for StateId {
    fn from(value: &str) -> Self {
        StateId(value.to_string())
    }
}

/// Stable identifier of a transition command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CommandId {
    fn from(value: &str) -> Self {
        CommandId(value.to_string())
    }
}

/// One state of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: StateId,
    pub display_name: String,
    pub icon: String,
    /// A final state holds items whose workflow has run to completion.
    pub is_final: bool,
}

/// A named transition available from a workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowCommand {
    pub id: CommandId,
    pub display_name: String,
    pub icon: String,
    /// The command brings its own UI; the comment prompt is skipped.
    pub has_ui: bool,
    /// The comment prompt is suppressed for this command.
    pub suppress_comment: bool,
}

impl WorkflowCommand {
    /// Whether invoking this command must not go through the comment prompt.
    pub fn skips_comment_prompt(&self) -> bool {
        self.has_ui || self.suppress_comment
    }
}

/// A recorded transition of an item between two workflow states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub user: String,
    pub old_state: StateId,
    pub new_state: StateId,
    pub text: String,
    pub date: DateTime<Utc>,
}

/// Permission and lock surface of a resolved item, as granted to the actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRights {
    pub can_read: bool,
    pub can_read_language: bool,
    pub can_write_language: bool,
    pub can_lock: bool,
    pub has_lock: bool,
}

/// A content item resolved from the item store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub reference: ItemReference,
    pub display_name: String,
    pub icon: String,
    pub access: AccessRights,
}

/// The user on whose behalf a request executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub is_administrator: bool,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_administrator: false,
        }
    }

    pub fn administrator(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_administrator: true,
        }
    }
}

/// Field payload passed to a command execution, e.g. the "Comments" text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The comment text carried by this payload, if any.
    pub fn comment(&self) -> Option<&str> {
        self.get(COMMENTS_FIELD)
    }
}

impl FromIterator<(String, String)> for FieldMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        FieldMap(iter.into_iter().collect())
    }
}
