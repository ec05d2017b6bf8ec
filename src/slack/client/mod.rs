//! Slack HTTP client
//!
//! One request per call, no retries. Every response is checked twice: HTTP
//! status first, then Slack's own `ok` flag.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::types::{AuthIdentity, PostedMessage};
use super::SlackToken;
use crate::error::SlackError;


pub const SLACK_API_URL: &str = "https://slack.com/api";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Slack API operations (enables mocking in tests)
pub trait SlackApi: Send + Sync {
    /// Identify the token owner
    fn auth_test(&self) -> impl Future<Output = Result<AuthIdentity, SlackError>> + Send;

    /// Find a user ID by email (needs `users:read.email`)
    fn lookup_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<String>, SlackError>> + Send;

    /// Open (or reuse) the DM channel with a user
    fn open_dm(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<String>, SlackError>> + Send;

    /// Post a message to a channel
    fn post_message(
        &self,
        channel_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<PostedMessage, SlackError>> + Send;
}

/// Slack Web API client
pub struct SlackClient {
    http: Client,
    token: SlackToken,
    base_url: String,
}

#[derive(Deserialize)]
struct LookupByEmailResponse {
    user: Option<IdOnly>,
}

#[derive(Deserialize)]
struct OpenConversationResponse {
    channel: Option<IdOnly>,
}

#[derive(Deserialize)]
struct IdOnly {
    id: Option<String>,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    channel: Option<String>,
    ts: Option<String>,
    message: Option<PostedMessageBody>,
}

#[derive(Deserialize)]
struct PostedMessageBody {
    ts: Option<String>,
}

/// Request payload shapes Slack accepts
enum Payload<'a> {
    Json(Value),
    Form(&'a [(&'a str, &'a str)]),
}

impl SlackClient {
    /// Create a client for the public Slack API
    pub fn new(token: SlackToken) -> Result<Self, SlackError> {
        Self::with_base_url(token, SLACK_API_URL)
    }

    /// Create a client pointed at another base URL
    pub fn with_base_url(token: SlackToken, base_url: impl Into<String>) -> Result<Self, SlackError> {
        let http = Client::builder()
            .user_agent(concat!("slack-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: Payload<'_>,
    ) -> Result<T, SlackError> {
        let url = format!("{}/{}", self.base_url, method);
        debug!(method, "calling Slack API");

        let request = self
            .http
            .post(&url)
            .bearer_auth(self.token.secret())
            .header("Accept", "application/json");

        let request = match payload {
            Payload::Json(body) => request
                .header("Content-Type", "application/json; charset=utf-8")
                .body(serde_json::to_string(&body).map_err(|source| {
                    SlackError::Encode {
                        method: method.to_string(),
                        source,
                    }
                })?),
            Payload::Form(fields) => request.form(fields),
        };

        let response = request.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        let text = response.text().await?;

        debug!(method, status = status.as_u16(), "Slack API responded");
        parse_response(method, status, retry_after, &text)
    }
}

impl SlackApi for SlackClient {
    async fn auth_test(&self) -> Result<AuthIdentity, SlackError> {
        self.call("auth.test", Payload::Json(serde_json::json!({})))
            .await
    }

    async fn lookup_user_by_email(&self, email: &str) -> Result<Option<String>, SlackError> {
        let response: LookupByEmailResponse = self
            .call("users.lookupByEmail", Payload::Form(&[("email", email)]))
            .await?;
        Ok(response.user.and_then(|u| u.id).filter(|id| !id.is_empty()))
    }

    async fn open_dm(&self, user_id: &str) -> Result<Option<String>, SlackError> {
        let body = serde_json::json!({ "users": user_id });
        let response: OpenConversationResponse =
            self.call("conversations.open", Payload::Json(body)).await?;
        Ok(response
            .channel
            .and_then(|c| c.id)
            .filter(|id| !id.is_empty()))
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<PostedMessage, SlackError> {
        let body = serde_json::json!({
            "channel": channel_id,
            "text": text,
        });
        let response: PostMessageResponse =
            self.call("chat.postMessage", Payload::Json(body)).await?;

        Ok(PostedMessage {
            channel: response.channel.unwrap_or_else(|| channel_id.to_string()),
            ts: response.message.and_then(|m| m.ts).or(response.ts),
        })
    }
}

/// Check HTTP status and Slack's `ok` flag, then decode the body
fn parse_response<T: DeserializeOwned>(
    method: &str,
    status: StatusCode,
    retry_after: Option<u64>,
    text: &str,
) -> Result<T, SlackError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SlackError::RateLimited {
            method: method.to_string(),
            retry_after,
        });
    }

    if !status.is_success() {
        return Err(SlackError::Http {
            method: method.to_string(),
            status: status.as_u16(),
            body: text.trim().to_string(),
        });
    }

    let invalid = |reason: String| SlackError::InvalidResponse {
        method: method.to_string(),
        reason,
    };

    let value: Value = serde_json::from_str(text).map_err(|e| {
        let snippet: String = text.chars().take(200).collect();
        invalid(format!("{}: {}", e, snippet))
    })?;

    if value.get("ok").and_then(Value::as_bool) != Some(true) {
        return Err(api_error(method, &value, retry_after));
    }

    serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
}

/// Translate an `ok: false` body into a specific failure
fn api_error(method: &str, value: &Value, retry_after: Option<u64>) -> SlackError {
    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error");
    let method = method.to_string();

    match code {
        "invalid_auth" | "not_authed" | "account_inactive" | "token_revoked"
        | "token_expired" => SlackError::InvalidAuth {
            code: code.to_string(),
        },
        "missing_scope" => {
            let needed = value
                .get("needed")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| default_scope(&method).to_string());
            SlackError::MissingScope { method, needed }
        }
        "ratelimited" => SlackError::RateLimited {
            method,
            retry_after,
        },
        "users_not_found" | "user_not_found" => SlackError::UserNotFound { method },
        "channel_not_found" => SlackError::ChannelNotFound { method },
        _ => {
            let messages = value
                .pointer("/response_metadata/messages")
                .and_then(Value::as_array)
                .map(|msgs| {
                    msgs.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            SlackError::Api {
                method,
                code: code.to_string(),
                messages,
            }
        }
    }
}

/// Scope Slack documents for each method, used when the response omits `needed`
fn default_scope(method: &str) -> &'static str {
    match method {
        "users.lookupByEmail" => "users:read.email",
        "conversations.open" => "im:write",
        "chat.postMessage" => "chat:write",
        _ => "unknown",
    }
}
