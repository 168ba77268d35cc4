/// Descriptor synthesis
///
/// Pure functions from a raw lookup result (plus the locality, presence and
/// age tables) to the uniform descriptor returned to callers.
use crate::{
    lookup::{
        age::{self, Clock},
        datacenter,
        labels::{presence_label, TrustFlag},
        AccountDescriptor, AccountKind, AccountLinks, Flags, GroupDescriptor, GroupKind,
        GroupLinks,
    },
    session::{ChatKind, RawAccount, RawChat},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Name used when an account has neither first nor last name
pub const UNKNOWN_NAME: &str = "Unknown";

/// Marker prefixed to internal channel ids
const CHANNEL_ID_PREFIX: &str = "-100";

/// How trust flags are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagStyle {
    /// Single label, e.g. `"Scam"`
    #[default]
    Scalar,
    /// Every applicable label, e.g. `["Scam", "Fake"]`
    List,
}

impl FromStr for FlagStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scalar" => Ok(Self::Scalar),
            "list" => Ok(Self::List),
            other => Err(format!("Unknown flag style: {}", other)),
        }
    }
}

/// Presentation choices for synthesized descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorOptions {
    pub flag_style: FlagStyle,
    /// Message index appended to private `t.me/c/...` links; `None` omits it
    pub private_link_index: Option<u32>,
}

impl Default for DescriptorOptions {
    fn default() -> Self {
        Self {
            flag_style: FlagStyle::Scalar,
            private_link_index: Some(1),
        }
    }
}

/// Build the descriptor for a resolved user or bot
pub fn account_descriptor(
    raw: RawAccount,
    options: &DescriptorOptions,
    clock: &dyn Clock,
) -> AccountDescriptor {
    let estimate = age::estimate(raw.id, clock);

    let flags = match options.flag_style {
        FlagStyle::Scalar => Flags::Label(TrustFlag::from_flags(raw.is_scam, raw.is_fake).label()),
        FlagStyle::List => Flags::Labels(
            TrustFlag::all_from_flags(raw.is_scam, raw.is_fake)
                .into_iter()
                .map(TrustFlag::label)
                .collect(),
        ),
    };

    AccountDescriptor {
        kind: if raw.is_bot {
            AccountKind::Bot
        } else {
            AccountKind::User
        },
        id: raw.id,
        display_name: display_name(raw.first_name.as_deref(), raw.last_name.as_deref()),
        dc_location: datacenter::locality(raw.dc_id.map(i64::from)),
        dc_id: raw.dc_id,
        is_premium: raw.is_premium,
        is_verified: raw.is_verified,
        is_bot: raw.is_bot,
        flags,
        status: presence_label(raw.status),
        account_created: estimate.created_label(),
        account_age: estimate.age.to_string(),
        links: account_links(raw.id),
        first_name: raw.first_name,
        last_name: raw.last_name,
        username: raw.username,
    }
}

/// Build the descriptor for a resolved group, supergroup or channel
pub fn group_descriptor(raw: RawChat, options: &DescriptorOptions) -> GroupDescriptor {
    let links = group_links(raw.id, raw.username.as_deref(), options.private_link_index);

    GroupDescriptor {
        kind: GroupKind::from(raw.kind),
        id: raw.id,
        title: raw.title,
        username: raw.username,
        dc_location: datacenter::locality(raw.dc_id.map(i64::from)),
        dc_id: raw.dc_id,
        members_count: raw.members_count,
        description: raw.description,
        links,
    }
}

impl From<ChatKind> for GroupKind {
    fn from(kind: ChatKind) -> Self {
        match kind {
            ChatKind::Group => Self::Group,
            ChatKind::Supergroup => Self::Supergroup,
            ChatKind::Channel => Self::Channel,
            ChatKind::Private | ChatKind::Bot => Self::Unknown,
        }
    }
}

/// First and last name joined by a space, skipping absent parts
pub fn display_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
    let parts: Vec<&str> = [first_name, last_name].into_iter().flatten().collect();
    if parts.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        parts.join(" ")
    }
}

/// Client deep links for an account id
pub fn account_links(id: i64) -> AccountLinks {
    AccountLinks {
        android: format!("tg://openmessage?user_id={}", id),
        ios: format!("tg://user?id={}", id),
        permanent: format!("tg://user?id={}", id),
    }
}

/// Join and permanent links for a chat
pub fn group_links(id: i64, username: Option<&str>, private_link_index: Option<u32>) -> GroupLinks {
    let link = if let Some(username) = username {
        format!("t.me/{}", username)
    } else if id < 0 {
        let raw_id = id.to_string();
        let internal_id = raw_id.strip_prefix(CHANNEL_ID_PREFIX).unwrap_or(&raw_id);
        match private_link_index {
            Some(index) => format!("t.me/c/{}/{}", internal_id, index),
            None => format!("t.me/c/{}", internal_id),
        }
    } else {
        format!("tg://resolve?domain={}", id)
    };

    GroupLinks {
        join: link.clone(),
        permanent: link,
    }
}
