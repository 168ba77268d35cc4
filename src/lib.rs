/// tg-whois - Telegram entity lookup service
///
/// Resolves usernames, numeric ids and t.me links into enriched descriptors
/// of users, bots, groups and channels.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod lookup;
pub mod metrics;
pub mod rate_limit;
pub mod server;
pub mod session;

pub use context::AppContext;
pub use error::{WhoisError, WhoisResult};
