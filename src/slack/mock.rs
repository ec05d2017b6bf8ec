//! Recording `SlackApi` double for tests

use std::collections::HashMap;
use std::sync::Mutex;

use super::types::{AuthIdentity, PostedMessage};
use super::SlackApi;
use crate::error::SlackError;

/// One call made against the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AuthTest,
    LookupByEmail(String),
    OpenDm(String),
    PostMessage { channel: String, text: String },
}

/// Canned answers plus a log of every call
pub struct MockSlack {
    pub identity: AuthIdentity,
    pub emails: HashMap<String, String>,
    pub lookup_error: Mutex<Option<SlackError>>,
    pub open_dm_error: Mutex<Option<SlackError>>,
    pub post_error: Mutex<Option<SlackError>>,
    pub no_channel: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl Default for MockSlack {
    fn default() -> Self {
        Self {
            identity: AuthIdentity {
                user_id: Some("UME".to_string()),
                user: Some("me".to_string()),
                ..Default::default()
            },
            emails: HashMap::new(),
            lookup_error: Mutex::new(None),
            open_dm_error: Mutex::new(None),
            post_error: Mutex::new(None),
            no_channel: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockSlack {
    pub fn with_email(mut self, email: &str, user_id: &str) -> Self {
        self.emails.insert(email.to_string(), user_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Channel the mock hands out for a user
pub fn dm_channel_for(user_id: &str) -> String {
    format!("D{}", user_id)
}

impl SlackApi for MockSlack {
    async fn auth_test(&self) -> Result<AuthIdentity, SlackError> {
        self.record(Call::AuthTest);
        Ok(self.identity.clone())
    }

    async fn lookup_user_by_email(&self, email: &str) -> Result<Option<String>, SlackError> {
        self.record(Call::LookupByEmail(email.to_string()));
        if let Some(err) = self.lookup_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.emails.get(email).cloned())
    }

    async fn open_dm(&self, user_id: &str) -> Result<Option<String>, SlackError> {
        self.record(Call::OpenDm(user_id.to_string()));
        if let Some(err) = self.open_dm_error.lock().unwrap().take() {
            return Err(err);
        }
        if self.no_channel {
            return Ok(None);
        }
        Ok(Some(dm_channel_for(user_id)))
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<PostedMessage, SlackError> {
        self.record(Call::PostMessage {
            channel: channel_id.to_string(),
            text: text.to_string(),
        });
        if let Some(err) = self.post_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(PostedMessage {
            channel: channel_id.to_string(),
            ts: Some("1700000000.000100".to_string()),
        })
    }
}
