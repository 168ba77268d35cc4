/// Configuration management for tg-whois
use crate::{
    error::{WhoisError, WhoisResult},
    lookup::{DescriptorOptions, FlagStyle},
};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub platform: PlatformConfig,
    pub lookup: LookupConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Transport used for the platform session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Full user objects over MTProto; needs an API id and hash
    Mtproto,
    /// Bot HTTP API; no datacenter, premium, flags or presence data
    BotApi,
}

impl FromStr for SessionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mtproto" => Ok(Self::Mtproto),
            "botapi" | "bot_api" => Ok(Self::BotApi),
            other => Err(format!("Unknown session backend: {}", other)),
        }
    }
}

/// Platform session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub backend: SessionBackend,
    #[serde(skip_serializing)]
    pub bot_token: String,
    pub api_id: Option<i32>,
    #[serde(skip_serializing)]
    pub api_hash: Option<String>,
    pub session_file: Option<String>,
    pub api_url: String,
    pub http_timeout_secs: u64,
}

/// Lookup engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    pub timeout_secs: u64,
    pub descriptor: DescriptorOptions,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl ServerConfig {
    /// Load configuration from `.env` and environment variables
    pub fn from_env() -> WhoisResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(var: F) -> WhoisResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let hostname = get("WHOIS_HOSTNAME", "0.0.0.0");
        let port = parse_var(&var, "WHOIS_PORT", 5000u16)?;
        let version = get("WHOIS_VERSION", env!("CARGO_PKG_VERSION"));

        let bot_token = var("WHOIS_BOT_TOKEN")
            .ok_or_else(|| WhoisError::Config("WHOIS_BOT_TOKEN is required".to_string()))?;
        let api_id = match var("WHOIS_API_ID") {
            Some(_) => Some(parse_var(&var, "WHOIS_API_ID", 0i32)?),
            None => None,
        };
        let api_hash = var("WHOIS_API_HASH").filter(|hash| !hash.trim().is_empty());
        let session_file = var("WHOIS_SESSION_FILE").filter(|path| !path.trim().is_empty());
        let default_backend = if api_id.is_some() {
            SessionBackend::Mtproto
        } else {
            SessionBackend::BotApi
        };
        let backend = parse_var(&var, "WHOIS_SESSION_BACKEND", default_backend)?;
        let api_url = get("WHOIS_BOT_API_URL", "https://api.telegram.org");
        let http_timeout_secs = parse_var(&var, "WHOIS_HTTP_TIMEOUT_SECS", 15u64)?;

        let timeout_secs = parse_var(&var, "WHOIS_LOOKUP_TIMEOUT_SECS", 10u64)?;
        let flag_style: FlagStyle = get("WHOIS_FLAG_STYLE", "scalar")
            .parse()
            .map_err(WhoisError::Config)?;
        let private_link_index = match get("WHOIS_PRIVATE_LINK_INDEX", "1").trim() {
            "" | "none" => None,
            index => Some(index.parse().map_err(|_| {
                WhoisError::Config(format!("Invalid private link index: {}", index))
            })?),
        };

        let rate_limit_enabled = parse_var(&var, "WHOIS_RATE_LIMITS_ENABLED", true)?;
        let requests_per_second = parse_var(&var, "WHOIS_RATE_LIMIT_RPS", 20u32)?;
        let burst_size = parse_var(&var, "WHOIS_RATE_LIMIT_BURST", 40u32)?;

        let log_level = get("RUST_LOG", "tg_whois=debug,tower_http=debug");
        let log_json = get("LOG_FORMAT", "text").eq_ignore_ascii_case("json");

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            platform: PlatformConfig {
                backend,
                bot_token,
                api_id,
                api_hash,
                session_file,
                api_url,
                http_timeout_secs,
            },
            lookup: LookupConfig {
                timeout_secs,
                descriptor: DescriptorOptions {
                    flag_style,
                    private_link_index,
                },
            },
            rate_limit: RateLimitConfig {
                enabled: rate_limit_enabled,
                requests_per_second,
                burst_size,
            },
            logging: LoggingConfig {
                level: log_level,
                json: log_json,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> WhoisResult<()> {
        if self.service.hostname.is_empty() {
            return Err(WhoisError::Config("Hostname cannot be empty".to_string()));
        }

        if self.service.port == 0 {
            return Err(WhoisError::Config("Port cannot be zero".to_string()));
        }

        if self.platform.bot_token.trim().is_empty() {
            return Err(WhoisError::Config("Bot token cannot be empty".to_string()));
        }

        if self.platform.backend == SessionBackend::Mtproto
            && (self.platform.api_id.is_none() || self.platform.api_hash.is_none())
        {
            return Err(WhoisError::Config(
                "The mtproto backend needs WHOIS_API_ID and WHOIS_API_HASH".to_string(),
            ));
        }

        if self.lookup.timeout_secs == 0 || self.platform.http_timeout_secs == 0 {
            return Err(WhoisError::Config("Timeouts must be positive".to_string()));
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.hostname, self.service.port)
    }
}

/// Parse an optional variable, rejecting values that do not parse
fn parse_var<F, T>(var: &F, key: &str, default: T) -> WhoisResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| WhoisError::Config(format!("Invalid value for {}: {:?}", key, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> WhoisResult<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("WHOIS_BOT_TOKEN", "123:abc")]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.platform.api_url, "https://api.telegram.org");
        assert_eq!(config.lookup.timeout_secs, 10);
        assert_eq!(config.lookup.descriptor, DescriptorOptions::default());
        assert!(config.rate_limit.enabled);
        assert!(!config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_token_required() {
        assert!(matches!(load(&[]), Err(WhoisError::Config(_))));

        let config = load(&[("WHOIS_BOT_TOKEN", "  ")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_backend_selection() {
        let config = load(&[("WHOIS_BOT_TOKEN", "t")]).unwrap();
        assert_eq!(config.platform.backend, SessionBackend::BotApi);

        let config = load(&[
            ("WHOIS_BOT_TOKEN", "t"),
            ("WHOIS_API_ID", "12345"),
            ("WHOIS_API_HASH", "abcdef"),
        ])
        .unwrap();
        assert_eq!(config.platform.backend, SessionBackend::Mtproto);
        assert_eq!(config.platform.api_id, Some(12345));
        assert!(config.validate().is_ok());

        let config = load(&[("WHOIS_BOT_TOKEN", "t"), ("WHOIS_SESSION_BACKEND", "mtproto")]).unwrap();
        assert!(config.validate().is_err());

        assert!(load(&[("WHOIS_BOT_TOKEN", "t"), ("WHOIS_API_ID", "abc")]).is_err());
        assert!(load(&[("WHOIS_BOT_TOKEN", "t"), ("WHOIS_SESSION_BACKEND", "tdlib")]).is_err());
    }

    #[test]
    fn test_descriptor_options() {
        let config = load(&[
            ("WHOIS_BOT_TOKEN", "123:abc"),
            ("WHOIS_FLAG_STYLE", "list"),
            ("WHOIS_PRIVATE_LINK_INDEX", "none"),
        ])
        .unwrap();

        assert_eq!(config.lookup.descriptor.flag_style, FlagStyle::List);
        assert_eq!(config.lookup.descriptor.private_link_index, None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("WHOIS_BOT_TOKEN", "t"), ("WHOIS_PORT", "http")]).is_err());
        assert!(load(&[("WHOIS_BOT_TOKEN", "t"), ("WHOIS_FLAG_STYLE", "csv")]).is_err());
        assert!(load(&[("WHOIS_BOT_TOKEN", "t"), ("WHOIS_PRIVATE_LINK_INDEX", "-1")]).is_err());

        for key in [
            "WHOIS_HTTP_TIMEOUT_SECS",
            "WHOIS_LOOKUP_TIMEOUT_SECS",
            "WHOIS_RATE_LIMIT_RPS",
            "WHOIS_RATE_LIMIT_BURST",
            "WHOIS_RATE_LIMITS_ENABLED",
        ] {
            let result = load(&[("WHOIS_BOT_TOKEN", "t"), (key, "lots")]);
            assert!(
                matches!(result, Err(WhoisError::Config(ref msg)) if msg.contains(key)),
                "{} accepted an invalid value",
                key
            );
        }

        let config = load(&[("WHOIS_BOT_TOKEN", "t"), ("WHOIS_LOOKUP_TIMEOUT_SECS", "0")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_not_serialized() {
        let config = load(&[
            ("WHOIS_BOT_TOKEN", "123:secret"),
            ("WHOIS_API_ID", "1"),
            ("WHOIS_API_HASH", "hashsecret"),
        ])
        .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
