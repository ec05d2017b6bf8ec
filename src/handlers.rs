use anyhow::{Context, Result};
use clap::CommandFactory;
use tracing::debug;

use crate::cli::{Action, Cli, MessageSource};
use crate::compose::{self, Composed};
use crate::config::{config_path, LabelStore};
use crate::error::{ComposeError, SlackError};
use crate::resolve;
use crate::slack::{SlackApi, SlackClient, SlackToken};
use crate::upgrade;

/// Result of a send attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent {
        user_id: String,
        channel_id: String,
        ts: Option<String>,
    },
    Cancelled,
}

/// Run one action (CLI entry point - formats and prints), returning the exit code
#[cfg(not(tarpaulin_include))]
pub async fn run(action: Action, config_override: Option<&str>) -> Result<i32> {
    match action {
        Action::Help => {
            Cli::command().print_help()?;
            println!();
            Ok(0)
        }
        Action::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Action::Upgrade => upgrade::run().await,
        Action::AddUser { label, value } => {
            let mut store = LabelStore::load(config_path(config_override)?);
            println!("{}", add_user(&mut store, &label, &value)?);
            Ok(0)
        }
        Action::Send { recipient, message } => {
            // Token first: nothing touches the network without it
            let token = SlackToken::from_env()?;
            let store = LabelStore::load(config_path(config_override)?);
            let client = SlackClient::new(token)?;

            let outcome = send_dm(&client, &store, &recipient, || match message {
                MessageSource::Text(text) => Ok(Composed::Message(text)),
                MessageSource::Editor => compose::compose_in_editor(),
            })
            .await?;

            match outcome {
                SendOutcome::Cancelled => eprintln!("{}", format_outcome(&outcome)),
                SendOutcome::Sent { .. } => println!("{}", format_outcome(&outcome)),
            }
            Ok(0)
        }
    }
}

/// Save a label, returning the line to show the user
pub fn add_user(store: &mut LabelStore, label: &str, value: &str) -> Result<String> {
    resolve::validate_label_name(label)?;
    resolve::validate_label_value(value)?;
    store.add_label(label, value)?;
    store.save()?;
    Ok(format!(
        "Saved label '{}' in {}",
        label.trim(),
        store.path().display()
    ))
}

/// Verify the token, resolve the recipient, compose, then post
///
/// `compose` runs after the DM channel is known so a bad recipient fails
/// before the user writes anything.
pub async fn send_dm<F>(
    client: &impl SlackApi,
    store: &LabelStore,
    recipient: &str,
    compose: F,
) -> Result<SendOutcome>
where
    F: FnOnce() -> Result<Composed, ComposeError>,
{
    let identity = client.auth_test().await?;
    if identity.is_bot() {
        return Err(SlackError::BotToken.into());
    }
    debug!(user_id = ?identity.user_id, user = ?identity.user, team = ?identity.team, "token verified");

    let target = resolve::resolve(client, store, recipient).await?;

    let text = match compose()? {
        Composed::Message(text) => text,
        Composed::Cancelled => return Ok(SendOutcome::Cancelled),
    };

    let posted = client
        .post_message(&target.channel_id, &text)
        .await
        .with_context(|| format!("Failed to send DM to {}", recipient))?;

    Ok(SendOutcome::Sent {
        user_id: target.user_id,
        channel_id: posted.channel,
        ts: posted.ts,
    })
}

/// Line printed for a finished send
#[must_use]
pub fn format_outcome(outcome: &SendOutcome) -> String {
    match outcome {
        SendOutcome::Sent {
            user_id,
            channel_id,
            ts: Some(ts),
        } => format!("DM sent. user={} channel={} ts={}", user_id, channel_id, ts),
        SendOutcome::Sent {
            user_id,
            channel_id,
            ts: None,
        } => format!("DM sent. user={} channel={}", user_id, channel_id),
        SendOutcome::Cancelled => "No content; cancelled.".to_string(),
    }
}
