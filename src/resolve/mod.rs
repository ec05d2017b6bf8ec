//! Recipient resolution
//!
//! Turns whatever the user typed (user ID, email, or saved label) into the DM
//! channel to post to.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::LabelStore;
use crate::error::{ConfigError, ResolveError, SlackError};
use crate::slack::SlackApi;


/// Slack user IDs: `U…` for regular workspaces, `W…` for Enterprise Grid
static USER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[UW][A-Z0-9]+$").expect("user ID pattern is valid"));

/// A recipient argument, classified once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    UserId(String),
    Email(String),
    Label(String),
}

impl Recipient {
    /// ID shape wins, then anything with `@`, otherwise a label
    pub fn classify(arg: &str) -> Self {
        let arg = arg.trim();
        if is_user_id(arg) {
            Self::UserId(arg.to_string())
        } else if arg.contains('@') {
            Self::Email(arg.to_string())
        } else {
            Self::Label(arg.to_string())
        }
    }
}

#[must_use]
pub fn is_user_id(value: &str) -> bool {
    USER_ID_RE.is_match(value)
}

/// Check a value is fit to store under a label
pub fn validate_label_value(value: &str) -> Result<(), ConfigError> {
    match Recipient::classify(value) {
        Recipient::UserId(_) | Recipient::Email(_) => Ok(()),
        Recipient::Label(other) if other.is_empty() => Err(ConfigError::EmptyValue),
        Recipient::Label(other) => Err(ConfigError::InvalidValue(other)),
    }
}

/// Check a name can be stored and later looked up as a label
///
/// Names shaped like a user ID or email are classified before the label table
/// is consulted, so they could never be read back.
pub fn validate_label_name(label: &str) -> Result<(), ConfigError> {
    match Recipient::classify(label) {
        Recipient::Label(name) if name.is_empty() => Err(ConfigError::EmptyLabel),
        Recipient::Label(_) => Ok(()),
        Recipient::UserId(name) | Recipient::Email(name) => {
            Err(ConfigError::LabelShadowed(name))
        }
    }
}

/// Where a message will go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub user_id: String,
    pub channel_id: String,
}

/// Resolve a recipient argument all the way to a DM channel
pub async fn resolve(
    client: &impl SlackApi,
    store: &LabelStore,
    arg: &str,
) -> Result<Resolved, ResolveError> {
    let user_id = resolve_user_id(client, store, arg).await?;
    let channel_id = open_dm_channel(client, &user_id).await?;
    Ok(Resolved {
        user_id,
        channel_id,
    })
}

/// Resolve a recipient argument to a Slack user ID
pub async fn resolve_user_id(
    client: &impl SlackApi,
    store: &LabelStore,
    arg: &str,
) -> Result<String, ResolveError> {
    match Recipient::classify(arg) {
        Recipient::UserId(id) => Ok(id),
        Recipient::Email(email) => lookup_email(client, &email).await,
        Recipient::Label(label) => {
            let value = store
                .get(&label)
                .ok_or_else(|| ResolveError::LabelNotFound(label.clone()))?;
            debug!(label = %label, "resolved label");

            match Recipient::classify(value) {
                Recipient::UserId(id) => Ok(id),
                Recipient::Email(email) => lookup_email(client, &email).await,
                Recipient::Label(value) => Err(ResolveError::InvalidLabelValue { label, value }),
            }
        }
    }
}

async fn lookup_email(client: &impl SlackApi, email: &str) -> Result<String, ResolveError> {
    debug!(email, "looking up user by email");
    match client.lookup_user_by_email(email).await {
        Ok(Some(id)) => Ok(id),
        Ok(None) | Err(SlackError::UserNotFound { .. }) => {
            Err(ResolveError::NoUserForEmail(email.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Open (or reuse) the DM channel with a user
pub async fn open_dm_channel(
    client: &impl SlackApi,
    user_id: &str,
) -> Result<String, ResolveError> {
    match client.open_dm(user_id).await {
        Ok(Some(channel)) => {
            debug!(user_id, channel = %channel, "opened DM channel");
            Ok(channel)
        }
        Ok(None) | Err(SlackError::UserNotFound { .. } | SlackError::ChannelNotFound { .. }) => {
            Err(ResolveError::DmOpenFailed(user_id.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
