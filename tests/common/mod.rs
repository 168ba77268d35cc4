//! Shared test fixtures: an in-memory platform session
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tg_whois::session::{LookupError, PlatformSession, RawAccount, RawChat};

/// Session answering from fixed tables; unknown identifiers are not found
#[derive(Default)]
pub struct MockSession {
    pub accounts: HashMap<String, Result<RawAccount, LookupError>>,
    pub chats: HashMap<String, Result<RawChat, LookupError>>,
    /// Delay applied to every account lookup
    pub account_delay: Option<Duration>,
    /// Delay applied to every chat lookup
    pub chat_delay: Option<Duration>,
    pub account_calls: AtomicUsize,
    pub chat_calls: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
    pub disconnected: bool,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, identifier: &str, account: RawAccount) -> Self {
        self.accounts.insert(identifier.to_string(), Ok(account));
        self
    }

    pub fn with_account_error(mut self, identifier: &str, error: LookupError) -> Self {
        self.accounts.insert(identifier.to_string(), Err(error));
        self
    }

    pub fn with_chat(mut self, identifier: &str, chat: RawChat) -> Self {
        self.chats.insert(identifier.to_string(), Ok(chat));
        self
    }

    pub fn with_chat_error(mut self, identifier: &str, error: LookupError) -> Self {
        self.chats.insert(identifier.to_string(), Err(error));
        self
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformSession for MockSession {
    async fn resolve_account(&self, identifier: &str) -> Result<RawAccount, LookupError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(identifier.to_string());

        if let Some(delay) = self.account_delay {
            tokio::time::sleep(delay).await;
        }

        self.accounts
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| Err(LookupError::NotFound(format!("no account {}", identifier))))
    }

    async fn resolve_chat(&self, identifier: &str) -> Result<RawChat, LookupError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.chat_delay {
            tokio::time::sleep(delay).await;
        }

        self.chats
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| Err(LookupError::NotFound(format!("no chat {}", identifier))))
    }

    fn is_connected(&self) -> bool {
        !self.disconnected
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}
