/// Application context and dependency injection
use crate::{
    config::{ServerConfig, SessionBackend},
    error::{WhoisError, WhoisResult},
    lookup::{LookupEngine, LookupEngineConfig},
    rate_limit::RateLimiter,
    session::{
        BotApiSession, BotApiSessionConfig, MtprotoSession, MtprotoSessionConfig, PlatformSession,
    },
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    /// Single platform session shared by every request
    pub session: Arc<dyn PlatformSession>,
    pub engine: Arc<LookupEngine>,
    pub rate_limiter: Arc<RateLimiter>,
    pub started_at: Instant,
}

impl AppContext {
    /// Create a new application context, authenticating the platform session
    pub async fn new(config: ServerConfig) -> WhoisResult<Self> {
        // Validate configuration
        config.validate()?;

        let session: Arc<dyn PlatformSession> = match config.platform.backend {
            SessionBackend::Mtproto => {
                let (Some(api_id), Some(api_hash)) =
                    (config.platform.api_id, config.platform.api_hash.clone())
                else {
                    return Err(WhoisError::Config("MTProto credentials missing".to_string()));
                };

                tracing::info!("Creating MTProto session");
                Arc::new(
                    MtprotoSession::connect(MtprotoSessionConfig {
                        api_id,
                        api_hash,
                        bot_token: config.platform.bot_token.clone(),
                        session_file: config.platform.session_file.clone(),
                    })
                    .await?,
                )
            }
            SessionBackend::BotApi => {
                tracing::warn!(
                    "Using the Bot API session; account datacenter, premium, flags and presence are unavailable"
                );
                Arc::new(
                    BotApiSession::connect(BotApiSessionConfig {
                        bot_token: config.platform.bot_token.clone(),
                        api_url: config.platform.api_url.clone(),
                        http_timeout: Duration::from_secs(config.platform.http_timeout_secs),
                        ..BotApiSessionConfig::default()
                    })
                    .await?,
                )
            }
        };

        Ok(Self::with_session(config, session))
    }

    /// Create a context around an already-connected session
    pub fn with_session(config: ServerConfig, session: Arc<dyn PlatformSession>) -> Self {
        let engine = LookupEngine::new(LookupEngineConfig {
            lookup_timeout: Duration::from_secs(config.lookup.timeout_secs),
            descriptor: config.lookup.descriptor.clone(),
        });
        let rate_limiter = RateLimiter::new(&config.rate_limit);

        Self {
            config: Arc::new(config),
            session,
            engine: Arc::new(engine),
            rate_limiter: Arc::new(rate_limiter),
            started_at: Instant::now(),
        }
    }

    /// Replace the lookup engine (e.g. to inject a fixed clock)
    pub fn with_engine(mut self, engine: LookupEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
