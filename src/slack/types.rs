//! Slack data returned to callers

use serde::Deserialize;

/// Who a token belongs to, from `auth.test`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AuthIdentity {
    pub user_id: Option<String>,
    pub user: Option<String>,
    pub team: Option<String>,
    /// Present only when the token is a bot token
    pub bot_id: Option<String>,
}

impl AuthIdentity {
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.bot_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// A message accepted by `chat.postMessage`
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: Option<String>,
}
