/// MTProto session - resolves entities through a bot-authorized grammers client
///
/// Unlike the Bot API, MTProto returns the full user object: datacenter (from
/// the profile photo), premium, verification, scam/fake markers, bot flag and
/// presence. Usernames are resolved with `contacts.resolveUsername`; bare
/// numeric ids carry no access hash and are reported as not found.
use crate::{
    error::{WhoisError, WhoisResult},
    metrics,
    session::{ChatKind, LookupError, PlatformSession, PresenceStatus, RawAccount, RawChat},
};
use async_trait::async_trait;
use grammers_client::{types::Chat, Client, Config, InitParams};
use grammers_mtsender::InvocationError;
use grammers_session::Session;
use grammers_tl_types as tl;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Offset applied to channel and supergroup ids in their marked form
const CHANNEL_ID_OFFSET: i64 = 1_000_000_000_000;

/// MTProto session configuration
#[derive(Debug, Clone)]
pub struct MtprotoSessionConfig {
    pub api_id: i32,
    pub api_hash: String,
    pub bot_token: String,
    /// Where the authorization key is persisted; in-memory when unset
    pub session_file: Option<String>,
}

/// Platform session backed by an MTProto client signed in as a bot
pub struct MtprotoSession {
    client: Client,
    session_file: Option<String>,
    connected: AtomicBool,
}

impl MtprotoSession {
    /// Connect to the platform and sign in with the bot token if needed
    pub async fn connect(config: MtprotoSessionConfig) -> WhoisResult<Self> {
        if config.bot_token.is_empty() {
            return Err(WhoisError::Config("Bot token is required".to_string()));
        }

        let session = match &config.session_file {
            Some(path) => Session::load_file_or_create(path)?,
            None => Session::new(),
        };

        let client = Client::connect(Config {
            session,
            api_id: config.api_id,
            api_hash: config.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(|e| WhoisError::Upstream(format!("MTProto connection failed: {}", e)))?;

        let authorized = client
            .is_authorized()
            .await
            .map_err(|e| WhoisError::Upstream(format!("Authorization check failed: {}", e)))?;

        if !authorized {
            let me = client
                .bot_sign_in(&config.bot_token)
                .await
                .map_err(|e| WhoisError::Upstream(format!("Bot sign-in failed: {}", e)))?;
            info!(bot_id = me.raw.id, bot_username = ?me.raw.username, "MTProto bot signed in");

            if let Some(path) = &config.session_file {
                client.session().save_to_file(path)?;
            }
        }

        let session = Self {
            client,
            session_file: config.session_file,
            connected: AtomicBool::new(true),
        };
        metrics::SESSION_CONNECTED.set(1);
        info!("MTProto session ready");

        Ok(session)
    }

    async fn resolve(&self, identifier: &str) -> Result<Chat, LookupError> {
        if identifier.parse::<i64>().is_ok() {
            return Err(LookupError::NotFound(format!(
                "{} is a bare id with no known access hash",
                identifier
            )));
        }

        debug!(identifier, "Resolving username over MTProto");
        self.client
            .resolve_username(identifier)
            .await
            .map_err(classify_invocation_error)?
            .ok_or_else(|| LookupError::NotFound(format!("{} is not occupied", identifier)))
    }

    /// Description and exact member count from `channels.getFullChannel`
    async fn channel_details(&self, channel: &tl::types::Channel) -> (Option<String>, Option<u64>) {
        let Some(access_hash) = channel.access_hash else {
            return (None, None);
        };

        let request = tl::functions::channels::GetFullChannel {
            channel: tl::enums::InputChannel::Channel(tl::types::InputChannel {
                channel_id: channel.id,
                access_hash,
            }),
        };

        match self.client.invoke(&request).await {
            Ok(tl::enums::messages::ChatFull::Full(full)) => match full.full_chat {
                tl::enums::ChatFull::ChannelFull(info) => (
                    Some(info.about).filter(|about| !about.is_empty()),
                    info.participants_count.and_then(|n| u64::try_from(n).ok()),
                ),
                _ => (None, None),
            },
            Err(e) => {
                warn!(channel_id = channel.id, error = %e, "Failed to fetch full channel");
                (None, None)
            }
        }
    }
}

#[async_trait]
impl PlatformSession for MtprotoSession {
    async fn resolve_account(&self, identifier: &str) -> Result<RawAccount, LookupError> {
        match self.resolve(identifier).await? {
            Chat::User(user) => Ok(account_from_user(&user.raw)),
            _ => Err(LookupError::NotFound(format!(
                "{} is a chat, not an account",
                identifier
            ))),
        }
    }

    async fn resolve_chat(&self, identifier: &str) -> Result<RawChat, LookupError> {
        match self.resolve(identifier).await? {
            Chat::User(user) => {
                let account = account_from_user(&user.raw);
                Ok(RawChat {
                    id: account.id,
                    kind: if account.is_bot {
                        ChatKind::Bot
                    } else {
                        ChatKind::Private
                    },
                    title: account.first_name,
                    username: account.username,
                    dc_id: account.dc_id,
                    members_count: None,
                    description: None,
                })
            }
            Chat::Group(group) => match &group.raw {
                tl::enums::Chat::Chat(chat) => Ok(RawChat {
                    id: -chat.id,
                    kind: ChatKind::Group,
                    title: Some(chat.title.clone()),
                    username: None,
                    dc_id: chat_photo_dc(&chat.photo),
                    members_count: u64::try_from(chat.participants_count).ok(),
                    description: None,
                }),
                tl::enums::Chat::Channel(channel) => {
                    let (description, members_count) = self.channel_details(channel).await;
                    Ok(chat_from_channel(channel, description, members_count))
                }
                _ => Err(LookupError::PermissionDenied(format!(
                    "{} is not accessible",
                    identifier
                ))),
            },
            Chat::Channel(channel) => {
                let (description, members_count) = self.channel_details(&channel.raw).await;
                Ok(chat_from_channel(&channel.raw, description, members_count))
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        metrics::SESSION_CONNECTED.set(0);

        if let Some(path) = &self.session_file {
            if let Err(e) = self.client.session().save_to_file(path) {
                warn!(path = %path, error = %e, "Failed to persist MTProto session");
            }
        }
        info!("MTProto session closed");
    }
}

fn account_from_user(user: &tl::types::User) -> RawAccount {
    RawAccount {
        id: user.id,
        is_bot: user.bot,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        dc_id: match &user.photo {
            Some(tl::enums::UserProfilePhoto::Photo(photo)) => Some(photo.dc_id),
            _ => None,
        },
        is_premium: user.premium,
        is_verified: user.verified,
        is_scam: user.scam,
        is_fake: user.fake,
        status: presence(user.status.as_ref()),
    }
}

fn chat_from_channel(
    channel: &tl::types::Channel,
    description: Option<String>,
    members_count: Option<u64>,
) -> RawChat {
    RawChat {
        id: marked_channel_id(channel.id),
        kind: if channel.megagroup {
            ChatKind::Supergroup
        } else {
            ChatKind::Channel
        },
        title: Some(channel.title.clone()),
        username: channel.username.clone(),
        dc_id: chat_photo_dc(&channel.photo),
        members_count: members_count
            .or_else(|| channel.participants_count.and_then(|n| u64::try_from(n).ok())),
        description,
    }
}

/// `-100`-prefixed form used in links and by the Bot API
fn marked_channel_id(id: i64) -> i64 {
    -(CHANNEL_ID_OFFSET + id)
}

fn chat_photo_dc(photo: &tl::enums::ChatPhoto) -> Option<i32> {
    match photo {
        tl::enums::ChatPhoto::Photo(photo) => Some(photo.dc_id),
        _ => None,
    }
}

/// A user with no status shared is "last seen a long time ago"
fn presence(status: Option<&tl::enums::UserStatus>) -> Option<PresenceStatus> {
    use tl::enums::UserStatus;

    status.map(|status| match status {
        UserStatus::Empty => PresenceStatus::LongTimeAgo,
        UserStatus::Online(_) => PresenceStatus::Online,
        UserStatus::Offline(_) => PresenceStatus::Offline,
        UserStatus::Recently(_) => PresenceStatus::Recently,
        UserStatus::LastWeek(_) => PresenceStatus::LastWeek,
        UserStatus::LastMonth(_) => PresenceStatus::LastMonth,
    })
}

fn classify_invocation_error(error: InvocationError) -> LookupError {
    match error {
        InvocationError::Rpc(rpc) => classify_rpc(&rpc.name, rpc.code),
        other => LookupError::Other(other.to_string()),
    }
}

/// Map an RPC error name and code onto a lookup error class
fn classify_rpc(name: &str, code: i32) -> LookupError {
    match name {
        "USERNAME_NOT_OCCUPIED" | "USERNAME_INVALID" | "PEER_ID_INVALID" | "CHANNEL_INVALID"
        | "CHAT_ID_INVALID" => LookupError::NotFound(name.to_string()),
        "CHANNEL_PRIVATE" | "CHAT_ADMIN_REQUIRED" | "CHAT_FORBIDDEN" | "USER_BANNED_IN_CHANNEL" => {
            LookupError::PermissionDenied(name.to_string())
        }
        _ if code == 403 => LookupError::PermissionDenied(name.to_string()),
        _ => LookupError::Other(format!("{} ({})", name, code)),
    }
}
