/// Platform session boundary
///
/// The lookup engine talks to the messaging platform only through
/// [`PlatformSession`]. Whatever the transport returns is converted once,
/// here, into [`RawAccount`] / [`RawChat`], so nothing downstream has to
/// probe loosely-typed responses for missing attributes.

pub mod bot_api;
pub mod mtproto;

pub use bot_api::{BotApiSession, BotApiSessionConfig};
pub use mtproto::{MtprotoSession, MtprotoSessionConfig};

use async_trait::async_trait;
use thiserror::Error;

/// Error classes a platform lookup can fail with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The identifier does not name an entity of the requested class
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// The platform refused access to the entity
    #[error("Access denied: {0}")]
    PermissionDenied(String),

    /// Anything else reported by the platform or the transport
    #[error("Platform error: {0}")]
    Other(String),
}

/// Presence status as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceStatus {
    Online,
    Offline,
    Recently,
    LastWeek,
    LastMonth,
    LongTimeAgo,
}

/// Chat kind as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Bot,
    Group,
    Supergroup,
    Channel,
}

/// Account (user or bot) as returned by a successful account lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAccount {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub dc_id: Option<i32>,
    pub is_premium: bool,
    pub is_verified: bool,
    pub is_scam: bool,
    pub is_fake: bool,
    pub status: Option<PresenceStatus>,
}

/// Group, supergroup or channel as returned by a successful chat lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChat {
    pub id: i64,
    pub kind: ChatKind,
    pub title: Option<String>,
    pub username: Option<String>,
    pub dc_id: Option<i32>,
    pub members_count: Option<u64>,
    pub description: Option<String>,
}

/// Authenticated, long-lived connection to the messaging platform
///
/// One instance is created at startup and shared by every request, so
/// implementations must tolerate concurrent calls. Callers apply their own
/// timeouts; an implementation does not need to bound its own latency.
#[async_trait]
pub trait PlatformSession: Send + Sync {
    /// Look up a user or bot account
    async fn resolve_account(&self, identifier: &str) -> Result<RawAccount, LookupError>;

    /// Look up a group, supergroup or channel
    async fn resolve_chat(&self, identifier: &str) -> Result<RawChat, LookupError>;

    /// Whether the session is currently authenticated and usable
    fn is_connected(&self) -> bool;

    /// Release the session at shutdown
    async fn close(&self) {}
}
