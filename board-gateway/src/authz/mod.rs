//! Board-scoped authorization.
//!
//! Every permission question is reduced to "may this subject perform this
//! action on a resource type, given the owner and board of the object?" and
//! answered by the authorization service.

pub mod cascade;
pub mod gate;
pub mod permission;
pub mod resolver;

use std::fmt;

use serde::Serialize;

pub use cascade::{BulkPermissionCascade, CascadeSummary, MoveItem};
pub use gate::AuthorizationGate;
pub use permission::{BoardPermissions, PermissionResolver};
pub use resolver::{
    BoardEnvelope, BoardResolver, CardLocator, CategoryLocator, ResourceLocation, ResourceLocator,
    TagLocator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    SaveMember,
    DeleteMember,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::SaveMember => "SAVE_MEMBER",
            Action::DeleteMember => "DELETE_MEMBER",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceType {
    User,
    Board,
    Tag,
    Category,
    Card,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::User => "USER",
            ResourceType::Board => "BOARD",
            ResourceType::Tag => "TAG",
            ResourceType::Category => "CATEGORY",
            ResourceType::Card => "CARD",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The object half of a capability question.
///
/// Encodes as `{"name":..,"owner":..,"ref":..}` with absent parts omitted.
/// An absent owner or ref is distinct from an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityObject {
    pub name: ResourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl CapabilityObject {
    pub fn new(name: ResourceType) -> Self {
        Self {
            name,
            owner: None,
            reference: None,
        }
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
