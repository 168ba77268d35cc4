/// Entity Resolver - Ordered account/chat lookup with timeouts
use crate::{
    lookup::{
        age::{Clock, SystemClock},
        descriptor::{account_descriptor, group_descriptor, DescriptorOptions},
        normalize::normalize,
        ResolutionOutcome,
    },
    metrics,
    session::{LookupError, PlatformSession},
};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Lookup engine configuration
#[derive(Debug, Clone)]
pub struct LookupEngineConfig {
    /// Budget for each individual platform lookup
    pub lookup_timeout: Duration,
    /// Presentation choices for descriptors
    pub descriptor: DescriptorOptions,
}

impl Default for LookupEngineConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(10),
            descriptor: DescriptorOptions::default(),
        }
    }
}

/// How a single bounded lookup ended
enum Attempt<T> {
    Found(T),
    Failed(LookupError),
    TimedOut,
}

/// Resolves identifiers into descriptors
///
/// Resolution order:
/// 1. Account (user/bot) lookup; a not-found answer falls through
/// 2. Chat (group/supergroup/channel) lookup
///
/// Accounts and chats share one namespace, and account lookups are the
/// common case, so they always go first. Each lookup runs at most once and
/// is bounded by `lookup_timeout`; nothing is retried or cached.
#[derive(Clone)]
pub struct LookupEngine {
    config: LookupEngineConfig,
    clock: Arc<dyn Clock>,
}

impl LookupEngine {
    /// Create an engine using the system clock
    pub fn new(config: LookupEngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an engine with an injected clock
    pub fn with_clock(config: LookupEngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Normalize `raw` and resolve it against `session`
    pub async fn resolve(&self, raw: &str, session: &dyn PlatformSession) -> ResolutionOutcome {
        let identifier = match normalize(raw) {
            Ok(identifier) => identifier,
            Err(e) => {
                debug!(error = %e, "Rejected identifier");
                return self.finish(ResolutionOutcome::InvalidInput);
            }
        };

        info!(identifier = %identifier, "Resolving entity");

        match self
            .bounded("account", session.resolve_account(identifier.as_str()))
            .await
        {
            Attempt::Found(account) => {
                let descriptor =
                    account_descriptor(account, &self.config.descriptor, self.clock.as_ref());
                return self.finish(ResolutionOutcome::Account(descriptor));
            }
            Attempt::TimedOut => return self.finish(ResolutionOutcome::Timeout),
            Attempt::Failed(LookupError::NotFound(reason)) => {
                debug!(identifier = %identifier, %reason, "No account, trying chat lookup");
            }
            Attempt::Failed(e) => {
                warn!(identifier = %identifier, error = %e, "Account lookup failed");
                return self.finish(ResolutionOutcome::UpstreamFailure(e.to_string()));
            }
        }

        let outcome = match self
            .bounded("chat", session.resolve_chat(identifier.as_str()))
            .await
        {
            Attempt::Found(chat) => {
                ResolutionOutcome::Group(group_descriptor(chat, &self.config.descriptor))
            }
            Attempt::TimedOut => ResolutionOutcome::Timeout,
            Attempt::Failed(LookupError::NotFound(_)) => ResolutionOutcome::NotFound,
            Attempt::Failed(LookupError::PermissionDenied(reason)) => {
                debug!(identifier = %identifier, %reason, "Chat access denied");
                ResolutionOutcome::PermissionDenied
            }
            Attempt::Failed(e) => {
                warn!(identifier = %identifier, error = %e, "Chat lookup failed");
                ResolutionOutcome::UpstreamFailure(e.to_string())
            }
        };

        self.finish(outcome)
    }

    /// Run one platform lookup under the configured budget
    ///
    /// On timeout the lookup future is dropped; whether the platform request
    /// itself stops depends on the session.
    async fn bounded<T, F>(&self, lookup: &'static str, call: F) -> Attempt<T>
    where
        F: Future<Output = Result<T, LookupError>>,
    {
        let start = Instant::now();
        let attempt = match tokio::time::timeout(self.config.lookup_timeout, call).await {
            Ok(Ok(found)) => Attempt::Found(found),
            Ok(Err(e)) => Attempt::Failed(e),
            Err(_) => Attempt::TimedOut,
        };

        let result = match &attempt {
            Attempt::Found(_) => "found",
            Attempt::Failed(LookupError::NotFound(_)) => "not_found",
            Attempt::Failed(LookupError::PermissionDenied(_)) => "permission_denied",
            Attempt::Failed(LookupError::Other(_)) => "error",
            Attempt::TimedOut => "timeout",
        };
        metrics::record_platform_lookup(lookup, result, start.elapsed().as_secs_f64());

        attempt
    }

    fn finish(&self, outcome: ResolutionOutcome) -> ResolutionOutcome {
        metrics::record_resolution(outcome.label());
        outcome
    }
}

/// Resolve `raw` with default descriptor options and the system clock
pub async fn resolve(
    raw: &str,
    session: &dyn PlatformSession,
    timeout: Duration,
) -> ResolutionOutcome {
    LookupEngine::new(LookupEngineConfig {
        lookup_timeout: timeout,
        ..LookupEngineConfig::default()
    })
    .resolve(raw, session)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{FixedClock, GroupKind};
    use crate::session::{ChatKind, RawAccount, RawChat};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted session answering every identifier the same way
    struct ScriptedSession {
        account: Result<RawAccount, LookupError>,
        chat: Result<RawChat, LookupError>,
        account_delay: Option<Duration>,
        chat_delay: Option<Duration>,
        chat_calls: AtomicUsize,
    }

    impl ScriptedSession {
        fn new(account: Result<RawAccount, LookupError>, chat: Result<RawChat, LookupError>) -> Self {
            Self {
                account,
                chat,
                account_delay: None,
                chat_delay: None,
                chat_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PlatformSession for ScriptedSession {
        async fn resolve_account(&self, _identifier: &str) -> Result<RawAccount, LookupError> {
            if let Some(delay) = self.account_delay {
                tokio::time::sleep(delay).await;
            }
            self.account.clone()
        }

        async fn resolve_chat(&self, _identifier: &str) -> Result<RawChat, LookupError> {
            self.chat_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.chat_delay {
                tokio::time::sleep(delay).await;
            }
            self.chat.clone()
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    fn engine() -> LookupEngine {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        LookupEngine::with_clock(
            LookupEngineConfig {
                lookup_timeout: Duration::from_millis(50),
                ..LookupEngineConfig::default()
            },
            Arc::new(FixedClock(now)),
        )
    }

    fn account() -> RawAccount {
        RawAccount {
            id: 1_273_841_502,
            first_name: Some("Alice".to_string()),
            ..RawAccount::default()
        }
    }

    fn chat() -> RawChat {
        RawChat {
            id: -1001234567890,
            kind: ChatKind::Supergroup,
            title: Some("Chat".to_string()),
            username: None,
            dc_id: None,
            members_count: None,
            description: None,
        }
    }

    fn not_found() -> LookupError {
        LookupError::NotFound("missing".to_string())
    }

    #[tokio::test]
    async fn test_empty_identifier_is_invalid() {
        let session = ScriptedSession::new(Ok(account()), Ok(chat()));
        assert_eq!(engine().resolve(" @ ", &session).await, ResolutionOutcome::InvalidInput);
        assert_eq!(session.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_account_wins_over_chat() {
        let session = ScriptedSession::new(Ok(account()), Ok(chat()));
        let outcome = engine().resolve("alice", &session).await;

        match outcome {
            ResolutionOutcome::Account(descriptor) => {
                assert_eq!(descriptor.id, 1_273_841_502);
                assert_eq!(descriptor.account_created, "August 13, 2020");
            }
            other => panic!("expected account, got {:?}", other),
        }
        assert_eq!(session.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_chat() {
        let session = ScriptedSession::new(Err(not_found()), Ok(chat()));
        let outcome = engine().resolve("some_chat", &session).await;

        match outcome {
            ResolutionOutcome::Group(descriptor) => {
                assert_eq!(descriptor.kind, GroupKind::Supergroup);
                assert_eq!(descriptor.links.join, "t.me/c/1234567890/1");
            }
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_both_missing_is_not_found() {
        let session = ScriptedSession::new(Err(not_found()), Err(not_found()));
        assert_eq!(engine().resolve("ghost", &session).await, ResolutionOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_chat_permission_denied() {
        let session = ScriptedSession::new(
            Err(not_found()),
            Err(LookupError::PermissionDenied("private".to_string())),
        );
        assert_eq!(
            engine().resolve("secret", &session).await,
            ResolutionOutcome::PermissionDenied
        );
    }

    #[tokio::test]
    async fn test_account_error_skips_chat() {
        let session = ScriptedSession::new(
            Err(LookupError::Other("FLOOD_WAIT".to_string())),
            Ok(chat()),
        );
        let outcome = engine().resolve("alice", &session).await;

        assert!(matches!(outcome, ResolutionOutcome::UpstreamFailure(_)));
        assert_eq!(session.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_account_permission_denied_skips_chat() {
        let session = ScriptedSession::new(
            Err(LookupError::PermissionDenied("USER_PRIVACY_RESTRICTED".to_string())),
            Ok(chat()),
        );
        let outcome = engine().resolve("alice", &session).await;

        assert_eq!(
            outcome,
            ResolutionOutcome::UpstreamFailure(
                "Access denied: USER_PRIVACY_RESTRICTED".to_string()
            )
        );
        assert_eq!(session.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_timeout() {
        let mut session = ScriptedSession::new(Err(not_found()), Ok(chat()));
        session.chat_delay = Some(Duration::from_secs(5));

        assert_eq!(engine().resolve("slow_chat", &session).await, ResolutionOutcome::Timeout);
        assert_eq!(session.chat_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_account_timeout_skips_chat() {
        let mut session = ScriptedSession::new(Ok(account()), Ok(chat()));
        session.account_delay = Some(Duration::from_secs(5));

        assert_eq!(engine().resolve("slow", &session).await, ResolutionOutcome::Timeout);
        assert_eq!(session.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_free_function_uses_timeout() {
        let mut session = ScriptedSession::new(Ok(account()), Ok(chat()));
        session.account_delay = Some(Duration::from_secs(5));

        let outcome = resolve("slow", &session, Duration::from_millis(20)).await;
        assert_eq!(outcome, ResolutionOutcome::Timeout);
    }
}
