/// Bot API session - resolves entities through the Telegram Bot HTTP API
///
/// Degraded fallback for deployments without MTProto credentials. `getChat`
/// exposes no datacenter, premium, verification, scam/fake or presence data,
/// and only finds users the bot has already talked to, so account
/// descriptors built from it carry "Unknown" and "Clean" defaults.
use crate::{
    error::{WhoisError, WhoisResult},
    metrics,
    session::{ChatKind, LookupError, PlatformSession, RawAccount, RawChat},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bot API session configuration
#[derive(Debug, Clone)]
pub struct BotApiSessionConfig {
    /// Bot token issued by @BotFather
    pub bot_token: String,
    /// Base URL of the Bot API server
    pub api_url: String,
    /// Transport-level request timeout
    pub http_timeout: Duration,
    /// User-Agent header for HTTP requests
    pub user_agent: String,
}

impl Default for BotApiSessionConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: "https://api.telegram.org".to_string(),
            http_timeout: Duration::from_secs(15),
            user_agent: format!("tg-whois/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Envelope every Bot API method responds with
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<u16>,
    description: Option<String>,
}

/// Subset of `User` returned by `getMe`
#[derive(Debug, Deserialize)]
struct BotUser {
    id: i64,
    username: Option<String>,
}

/// Subset of `ChatFullInfo` returned by `getChat`
#[derive(Debug, Deserialize)]
struct ChatFullInfo {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    title: Option<String>,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    description: Option<String>,
}

/// Platform session backed by the Bot HTTP API
pub struct BotApiSession {
    http_client: reqwest::Client,
    config: BotApiSessionConfig,
    connected: AtomicBool,
}

impl BotApiSession {
    /// Build the HTTP client and authenticate the bot token with `getMe`
    pub async fn connect(config: BotApiSessionConfig) -> WhoisResult<Self> {
        if config.bot_token.is_empty() {
            return Err(WhoisError::Config("Bot token is required".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| WhoisError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let session = Self {
            http_client,
            config,
            connected: AtomicBool::new(false),
        };

        let me: BotUser = session
            .call("getMe", &[])
            .await
            .map_err(|e| WhoisError::Upstream(format!("Bot authentication failed: {}", e)))?;

        info!(bot_id = me.id, bot_username = ?me.username, "Bot API session authenticated");
        session.connected.store(true, Ordering::SeqCst);
        metrics::SESSION_CONNECTED.set(1);

        Ok(session)
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    /// Call a Bot API method and unwrap its response envelope
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, LookupError> {
        debug!(method, "Calling Bot API");

        let response = self
            .http_client
            .get(self.method_url(method))
            .query(params)
            .send()
            .await
            .map_err(|e| LookupError::Other(format!("{} request failed: {}", method, e.without_url())))?;

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| LookupError::Other(format!("Invalid {} response: {}", method, e)))?;

        match envelope {
            ApiEnvelope {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiEnvelope {
                error_code,
                description,
                ..
            } => Err(classify_api_error(
                error_code.unwrap_or_default(),
                description.as_deref().unwrap_or("no description"),
            )),
        }
    }

    async fn get_chat(&self, identifier: &str) -> Result<ChatFullInfo, LookupError> {
        self.call("getChat", &[("chat_id", chat_id_param(identifier))])
            .await
    }

    async fn member_count(&self, chat_id: i64) -> Option<u64> {
        match self
            .call::<u64>("getChatMemberCount", &[("chat_id", chat_id.to_string())])
            .await
        {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(chat_id, error = %e, "Failed to fetch member count");
                None
            }
        }
    }
}

#[async_trait]
impl PlatformSession for BotApiSession {
    async fn resolve_account(&self, identifier: &str) -> Result<RawAccount, LookupError> {
        let chat = self.get_chat(identifier).await?;

        // Groups and channels answer getChat too; they belong to the chat lookup
        if chat_kind(&chat.kind) != Some(ChatKind::Private) {
            return Err(LookupError::NotFound(format!(
                "{} is a {}, not an account",
                identifier, chat.kind
            )));
        }

        Ok(RawAccount {
            id: chat.id,
            first_name: chat.first_name,
            last_name: chat.last_name,
            username: chat.username,
            ..RawAccount::default()
        })
    }

    async fn resolve_chat(&self, identifier: &str) -> Result<RawChat, LookupError> {
        let chat = self.get_chat(identifier).await?;

        let kind = chat_kind(&chat.kind).ok_or_else(|| {
            LookupError::Other(format!("Unsupported chat type: {}", chat.kind))
        })?;

        let members_count = match kind {
            ChatKind::Private | ChatKind::Bot => None,
            _ => self.member_count(chat.id).await,
        };

        Ok(RawChat {
            id: chat.id,
            kind,
            title: chat.title,
            username: chat.username,
            dc_id: None,
            members_count,
            description: chat.description,
        })
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        metrics::SESSION_CONNECTED.set(0);
        info!("Bot API session closed");
    }
}

/// Numeric identifiers are passed through, everything else is a public username
fn chat_id_param(identifier: &str) -> String {
    if identifier.parse::<i64>().is_ok() {
        identifier.to_string()
    } else {
        format!("@{}", identifier)
    }
}

fn chat_kind(kind: &str) -> Option<ChatKind> {
    match kind {
        "private" => Some(ChatKind::Private),
        "group" => Some(ChatKind::Group),
        "supergroup" => Some(ChatKind::Supergroup),
        "channel" => Some(ChatKind::Channel),
        _ => None,
    }
}

/// Map a Bot API error code and description onto a lookup error class
fn classify_api_error(code: u16, description: &str) -> LookupError {
    let lowered = description.to_lowercase();
    let not_found = [
        "not found",
        "username_not_occupied",
        "username_invalid",
        "peer_id_invalid",
        "channel_invalid",
    ];

    match code {
        400 if not_found.iter().any(|marker| lowered.contains(marker)) => {
            LookupError::NotFound(description.to_string())
        }
        400 if lowered.contains("channel_private") => {
            LookupError::PermissionDenied(description.to_string())
        }
        403 => LookupError::PermissionDenied(description.to_string()),
        _ => LookupError::Other(format!("{} ({})", description, code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id_param() {
        assert_eq!(chat_id_param("durov"), "@durov");
        assert_eq!(chat_id_param("123456"), "123456");
        assert_eq!(chat_id_param("-1001234567890"), "-1001234567890");
    }

    #[test]
    fn test_classify_not_found() {
        assert_eq!(
            classify_api_error(400, "Bad Request: chat not found"),
            LookupError::NotFound("Bad Request: chat not found".to_string())
        );
        assert!(matches!(
            classify_api_error(400, "Bad Request: USERNAME_NOT_OCCUPIED"),
            LookupError::NotFound(_)
        ));
        assert!(matches!(
            classify_api_error(400, "Bad Request: PEER_ID_INVALID"),
            LookupError::NotFound(_)
        ));
    }

    #[test]
    fn test_classify_permission_denied() {
        assert!(matches!(
            classify_api_error(403, "Forbidden: bot was kicked from the channel chat"),
            LookupError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_api_error(400, "Bad Request: CHANNEL_PRIVATE"),
            LookupError::PermissionDenied(_)
        ));
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(
            classify_api_error(429, "Too Many Requests: retry after 5"),
            LookupError::Other("Too Many Requests: retry after 5 (429)".to_string())
        );
        assert!(matches!(
            classify_api_error(401, "Unauthorized"),
            LookupError::Other(_)
        ));
    }

    #[test]
    fn test_chat_kind_mapping() {
        assert_eq!(chat_kind("private"), Some(ChatKind::Private));
        assert_eq!(chat_kind("supergroup"), Some(ChatKind::Supergroup));
        assert_eq!(chat_kind("channel"), Some(ChatKind::Channel));
        assert_eq!(chat_kind("secret"), None);
    }

    #[test]
    fn test_envelope_parsing() {
        let body = r#"{"ok":true,"result":{"id":-1001234567890,"type":"channel","title":"Example","username":"ExampleChannel"}}"#;
        let envelope: ApiEnvelope<ChatFullInfo> = serde_json::from_str(body).unwrap();
        let chat = envelope.result.unwrap();
        assert!(envelope.ok);
        assert_eq!(chat.id, -1001234567890);
        assert_eq!(chat.kind, "channel");
        assert_eq!(chat.username.as_deref(), Some("ExampleChannel"));

        let error = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        let envelope: ApiEnvelope<ChatFullInfo> = serde_json::from_str(error).unwrap();
        assert!(!envelope.ok);
        assert!(envelope.result.is_none());
        assert_eq!(envelope.error_code, Some(400));
    }

    #[tokio::test]
    async fn test_connect_requires_token() {
        let result = BotApiSession::connect(BotApiSessionConfig::default()).await;
        assert!(matches!(result, Err(WhoisError::Config(_))));
    }
}
