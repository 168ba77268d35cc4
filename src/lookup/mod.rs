/// Entity Lookup Engine
///
/// Normalizes user-supplied identifiers, resolves them against the shared
/// platform session (accounts first, then chats) and turns the result into
/// uniform, enriched descriptors.

pub mod age;
pub mod datacenter;
pub mod descriptor;
pub mod labels;
pub mod normalize;
pub mod resolver;

pub use age::{Clock, FixedClock, SystemClock};
pub use descriptor::{DescriptorOptions, FlagStyle};
pub use normalize::{normalize, InvalidIdentifier, NormalizedIdentifier};
pub use resolver::{resolve, LookupEngine, LookupEngineConfig};

use crate::error::{WhoisError, WhoisResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Group,
    Supergroup,
    Channel,
    Unknown,
}

/// Trust flags, rendered as one label or as a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Flags {
    Label(&'static str),
    Labels(Vec<&'static str>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountLinks {
    pub android: String,
    pub ios: String,
    pub permanent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupLinks {
    pub join: String,
    pub permanent: String,
}

/// Enriched description of a user or bot
///
/// `account_created` and `account_age` come from interpolating the numeric
/// id between known anchors; they are estimates, not platform data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountDescriptor {
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub id: i64,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub dc_id: Option<i32>,
    pub dc_location: String,
    pub is_premium: bool,
    pub is_verified: bool,
    pub is_bot: bool,
    pub flags: Flags,
    pub status: &'static str,
    pub account_created: String,
    pub account_age: String,
    pub links: AccountLinks,
}

/// Enriched description of a group, supergroup or channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDescriptor {
    #[serde(rename = "type")]
    pub kind: GroupKind,
    pub id: i64,
    pub title: Option<String>,
    pub username: Option<String>,
    pub dc_id: Option<i32>,
    pub dc_location: String,
    pub members_count: Option<u64>,
    pub description: Option<String>,
    pub links: GroupLinks,
}

/// Successfully resolved entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntityDescriptor {
    Account(AccountDescriptor),
    Group(GroupDescriptor),
}

/// Result of one resolution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Account(AccountDescriptor),
    Group(GroupDescriptor),
    /// Identifier was empty after normalization
    InvalidInput,
    /// Neither an account nor a chat matched
    NotFound,
    /// The platform refused access to the chat
    PermissionDenied,
    /// A lookup exceeded its time budget
    Timeout,
    /// Any other platform error
    UpstreamFailure(String),
}

impl ResolutionOutcome {
    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Account(_) => "account",
            Self::Group(_) => "group",
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::Timeout => "timeout",
            Self::UpstreamFailure(_) => "upstream_failure",
        }
    }

    /// Convert into a descriptor or the matching service error
    pub fn into_result(self) -> WhoisResult<EntityDescriptor> {
        match self {
            Self::Account(account) => Ok(EntityDescriptor::Account(account)),
            Self::Group(group) => Ok(EntityDescriptor::Group(group)),
            Self::InvalidInput => Err(WhoisError::InvalidInput(
                "Identifier is empty after normalization".to_string(),
            )),
            Self::NotFound => Err(WhoisError::NotFound(
                "Entity not found or access denied".to_string(),
            )),
            Self::PermissionDenied => Err(WhoisError::PermissionDenied(
                "Access to this chat is denied".to_string(),
            )),
            Self::Timeout => Err(WhoisError::Timeout(
                "Platform lookup timed out".to_string(),
            )),
            Self::UpstreamFailure(message) => Err(WhoisError::Upstream(message)),
        }
    }
}
