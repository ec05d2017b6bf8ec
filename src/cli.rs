use clap::error::ErrorKind;
use clap::Parser;
use thiserror::Error;

use crate::compose;

#[derive(Parser, Debug)]
#[command(name = "slack")]
#[command(about = "Send a Slack direct message as yourself.", long_about = None)]
#[command(disable_version_flag = true)]
#[command(after_help = "\x1b[2mExamples:\x1b[0m
    slack U0123ABCD \"lunch?\"                \x1b[2m# DM by user ID\x1b[0m
    slack someone@example.com \"hi\"          \x1b[2m# DM by email (needs users:read.email)\x1b[0m
    slack -au mom U0123ABCD                  \x1b[2m# Save a label\x1b[0m
    slack mom \"on my way\"                     \x1b[2m# DM by label\x1b[0m
    slack -e mom                             \x1b[2m# Compose in $EDITOR\x1b[0m

\x1b[2mThe token is read from SLACK_TOKEN (xoxp- or xoxc- user token).\x1b[0m")]
pub struct Cli {
    /// User ID (U...), email, or label
    pub recipient: Option<String>,

    /// Message text to send
    pub text: Vec<String>,

    /// Path to config.json for labels
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Open $EDITOR to compose the message
    #[arg(short, long)]
    pub edit: bool,

    /// Save a label pointing to a Slack user ID or email (short: -au)
    #[arg(long = "add-user", num_args = 2, value_names = ["LABEL", "USER_ID_OR_EMAIL"])]
    pub add_user: Option<Vec<String>>,

    /// Show version and exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Upgrade to the latest version
    #[arg(short, long)]
    pub upgrade: bool,
}

/// Where the message body comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    Text(String),
    Editor,
}

/// What a single invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Help,
    Version,
    Upgrade,
    AddUser { label: String, value: String },
    Send {
        recipient: String,
        message: MessageSource,
    },
}

/// Flag combinations clap cannot express on its own
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Use -u by itself to upgrade.")]
    UpgradeNotAlone,
    #[error("Use --add-user by itself.")]
    AddUserNotAlone,
    #[error("Use either -e or provide text, not both.")]
    EditWithText,
    #[error("A recipient is required.")]
    MissingRecipient,
    #[error("Message text is required (or use -e to open an editor).")]
    MissingText,
}

impl UsageError {
    /// Matching clap error kind, for its usage output and exit code
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UpgradeNotAlone | Self::AddUserNotAlone | Self::EditWithText => {
                ErrorKind::ArgumentConflict
            }
            Self::MissingRecipient | Self::MissingText => ErrorKind::MissingRequiredArgument,
        }
    }
}

impl Cli {
    /// Collapse parsed flags into one action
    pub fn action(&self) -> Result<Action, UsageError> {
        if self.version {
            return Ok(Action::Version);
        }

        let has_send_args = self.recipient.is_some() || !self.text.is_empty() || self.edit;

        if self.upgrade {
            if has_send_args || self.add_user.is_some() {
                return Err(UsageError::UpgradeNotAlone);
            }
            return Ok(Action::Upgrade);
        }

        if let Some(pair) = &self.add_user {
            if has_send_args {
                return Err(UsageError::AddUserNotAlone);
            }
            // num_args = 2 guarantees both values
            let label = pair.first().cloned().unwrap_or_default();
            let value = pair.get(1).cloned().unwrap_or_default();
            return Ok(Action::AddUser { label, value });
        }

        if self.edit && !self.text.is_empty() {
            return Err(UsageError::EditWithText);
        }

        let Some(recipient) = self.recipient.clone() else {
            if self.edit {
                return Err(UsageError::MissingRecipient);
            }
            return Ok(Action::Help);
        };

        let message = if self.edit {
            MessageSource::Editor
        } else {
            let text = compose::from_words(&self.text);
            if text.is_empty() {
                return Err(UsageError::MissingText);
            }
            MessageSource::Text(text)
        };

        Ok(Action::Send { recipient, message })
    }
}

/// Rewrite the two-letter `-au` short form to `--add-user`
///
/// clap short flags are single characters. Arguments after `--` are left alone.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            match arg.as_str() {
                "--" => {
                    passthrough = true;
                    arg
                }
                "-au" => "--add-user".to_string(),
                _ => arg,
            }
        })
        .collect()
}
