//! Slack Web API access
//!
//! Only the handful of methods needed to DM someone as yourself:
//! - `auth.test` to check who the token belongs to
//! - `users.lookupByEmail` to turn an email into a user ID
//! - `conversations.open` to get the DM channel for a user
//! - `chat.postMessage` to send

mod client;
#[cfg(test)]
pub(crate) mod mock;
mod types;

use std::fmt;

pub use client::{SlackApi, SlackClient};
pub use types::{AuthIdentity, PostedMessage};

use crate::error::ConfigError;

/// Env var holding the user token
pub const TOKEN_ENV: &str = "SLACK_TOKEN";

const USER_TOKEN_PREFIXES: [&str; 2] = ["xoxp-", "xoxc-"];
const BOT_TOKEN_PREFIX: &str = "xoxb-";

/// What kind of credential a token string is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    User,
    Bot,
    Unknown,
}

/// Bearer token for the Slack API
///
/// `Debug` is redacted so the secret never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SlackToken(String);

impl SlackToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Read `SLACK_TOKEN` and insist on a user token
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(TOKEN_ENV).unwrap_or_default();
        Self::parse_user_token(&raw)
    }

    /// Validate a raw token string as a user token
    pub fn parse_user_token(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        let token = Self::new(raw);
        match token.kind() {
            TokenKind::User => Ok(token),
            TokenKind::Bot => Err(ConfigError::BotToken),
            TokenKind::Unknown => Err(ConfigError::NotUserToken),
        }
    }

    #[must_use]
    pub fn kind(&self) -> TokenKind {
        if USER_TOKEN_PREFIXES.iter().any(|p| self.0.starts_with(p)) {
            TokenKind::User
        } else if self.0.starts_with(BOT_TOKEN_PREFIX) {
            TokenKind::Bot
        } else {
            TokenKind::Unknown
        }
    }

    pub(crate) fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SlackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(5).collect();
        write!(f, "SlackToken({}***)", prefix)
    }
}
