//! Error types for each layer of the tool
//!
//! Every failure the user can hit maps to one variant with a message that
//! says what to do next. `main` joins them through `anyhow`.

use thiserror::Error;

/// Failures reported by the Slack Web API or the transport underneath it
#[derive(Debug, Error)]
pub enum SlackError {
    #[error("Slack rejected the token ({code}). Check that SLACK_TOKEN is a valid, active user token.")]
    InvalidAuth { code: String },

    #[error("Token is missing the `{needed}` scope required by {method}. Add it to your Slack app and reinstall.")]
    MissingScope { method: String, needed: String },

    #[error("Rate limited by Slack on {method}{}", retry_hint(.retry_after))]
    RateLimited {
        method: String,
        retry_after: Option<u64>,
    },

    #[error("Slack user not found ({method})")]
    UserNotFound { method: String },

    #[error("Slack channel not found ({method})")]
    ChannelNotFound { method: String },

    #[error("auth.test reports this token belongs to a bot. Use a user token (xoxp- or xoxc-).")]
    BotToken,

    #[error("Slack API error ({method}): {code}{}", detail_suffix(.messages))]
    Api {
        method: String,
        code: String,
        messages: Vec<String>,
    },

    #[error("Slack API HTTP {status} ({method}): {body}")]
    Http {
        method: String,
        status: u16,
        body: String,
    },

    #[error("Slack API returned an invalid response for {method}: {reason}")]
    InvalidResponse { method: String, reason: String },

    #[error("Failed to encode request for {method}: {source}")]
    Encode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Network error talking to Slack: {0}")]
    Transport(#[from] reqwest::Error),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!("; retry in {}s", secs),
        None => String::new(),
    }
}

fn detail_suffix(messages: &[String]) -> String {
    if messages.is_empty() {
        String::new()
    } else {
        format!(" ({})", messages.join("; "))
    }
}

/// Problems with the local setup: token, labels, config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing SLACK_TOKEN env var.")]
    MissingToken,

    #[error("SLACK_TOKEN is a bot token (xoxb-). Use a user token (xoxp- or xoxc-).")]
    BotToken,

    #[error("SLACK_TOKEN must be a user token (xoxp- or xoxc-).")]
    NotUserToken,

    #[error("Label cannot be empty.")]
    EmptyLabel,

    #[error("User ID or email cannot be empty.")]
    EmptyValue,

    #[error("Value must be a user ID or email, got '{0}'.")]
    InvalidValue(String),

    #[error("Label '{0}' looks like a user ID or email and would never be used as a label.")]
    LabelShadowed(String),

    #[error("Cannot determine config directory (no home directory)")]
    NoConfigDir,

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures turning a recipient argument into a DM channel
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Label '{0}' not found. Save it with `slack --add-user {0} <user-id-or-email>`.")]
    LabelNotFound(String),

    #[error("Label '{label}' points to '{value}', which is neither a user ID nor an email.")]
    InvalidLabelValue { label: String, value: String },

    #[error("No Slack user found for {0}.")]
    NoUserForEmail(String),

    #[error("Unable to open DM channel with {0}.")]
    DmOpenFailed(String),

    #[error(transparent)]
    Slack(#[from] SlackError),
}

/// Failures while composing a message in an external editor
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Editor not found: {0}")]
    EditorNotFound(String),

    #[error("Failed to run editor {editor}: {source}")]
    Launch {
        editor: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to prepare message file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_without_messages() {
        let err = SlackError::Api {
            method: "chat.postMessage".to_string(),
            code: "is_archived".to_string(),
            messages: vec![],
        };
        assert_eq!(
            err.to_string(),
            "Slack API error (chat.postMessage): is_archived"
        );
    }

    #[test]
    fn api_error_with_messages() {
        let err = SlackError::Api {
            method: "chat.postMessage".to_string(),
            code: "invalid_arguments".to_string(),
            messages: vec!["[ERROR] missing text".to_string(), "second".to_string()],
        };
        assert!(err
            .to_string()
            .ends_with("invalid_arguments ([ERROR] missing text; second)"));
    }

    #[test]
    fn rate_limited_with_retry_after() {
        let err = SlackError::RateLimited {
            method: "conversations.open".to_string(),
            retry_after: Some(30),
        };
        assert!(err.to_string().contains("retry in 30s"));
    }

    #[test]
    fn rate_limited_without_retry_after() {
        let err = SlackError::RateLimited {
            method: "conversations.open".to_string(),
            retry_after: None,
        };
        assert_eq!(err.to_string(), "Rate limited by Slack on conversations.open");
    }

    #[test]
    fn missing_scope_names_scope() {
        let err = SlackError::MissingScope {
            method: "users.lookupByEmail".to_string(),
            needed: "users:read.email".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("users:read.email"));
        assert!(msg.contains("users.lookupByEmail"));
    }

    #[test]
    fn bot_token_messages_name_the_failed_check() {
        assert!(SlackError::BotToken.to_string().contains("auth.test"));
        assert!(ConfigError::BotToken.to_string().contains("xoxb-"));
        assert_ne!(
            SlackError::BotToken.to_string(),
            ConfigError::BotToken.to_string()
        );
    }

    #[test]
    fn encode_error_names_the_request() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SlackError::Encode {
            method: "chat.postMessage".to_string(),
            source,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to encode request for chat.postMessage"));
        assert!(!msg.contains("response"));
    }

    #[test]
    fn label_not_found_suggests_add_user() {
        let err = ResolveError::LabelNotFound("mom".to_string());
        assert!(err.to_string().contains("--add-user mom"));
    }

    #[test]
    fn resolve_error_is_transparent_over_slack_error() {
        let err = ResolveError::from(SlackError::BotToken);
        assert_eq!(err.to_string(), SlackError::BotToken.to_string());
    }
}
