//! Message composition
//!
//! Text comes straight from the command line, or from `$EDITOR` working on a
//! temp file that is removed however the session ends.

use std::fs;
use std::io::{ErrorKind, Write};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::ComposeError;


const DEFAULT_EDITOR: &str = "vim";

/// Outcome of a compose step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composed {
    Message(String),
    /// Nothing but whitespace came back
    Cancelled,
}

/// Join positional words into one message
#[must_use]
pub fn from_words(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}

/// Editor command line from `$EDITOR`, split on whitespace
///
/// Quotes are not interpreted, so an editor path containing spaces must be
/// reached through a wrapper script or a symlink on `PATH`.
#[must_use]
pub fn editor_command(raw: Option<&str>) -> Vec<String> {
    let parts: Vec<String> = raw
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if parts.is_empty() {
        vec![DEFAULT_EDITOR.to_string()]
    } else {
        parts
    }
}

/// Open the user's editor on an empty message
pub fn compose_in_editor() -> Result<Composed, ComposeError> {
    let editor = editor_command(std::env::var("EDITOR").ok().as_deref());
    compose_with(&editor, "")
}

/// Run `editor` on a temp file seeded with `seed` and read back the result
///
/// Blocks until the editor exits.
pub fn compose_with(editor: &[String], seed: &str) -> Result<Composed, ComposeError> {
    let (program, args) = match editor.split_first() {
        Some((program, args)) => (program.as_str(), args),
        None => (DEFAULT_EDITOR, &[][..]),
    };

    // Removed on drop, including every early return below
    let mut file = tempfile::Builder::new()
        .prefix("slack-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(seed.as_bytes())?;
    file.flush()?;

    debug!(editor = program, path = %file.path().display(), "launching editor");
    let status = Command::new(program)
        .args(args)
        .arg(file.path())
        .status()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => ComposeError::EditorNotFound(program.to_string()),
            _ => ComposeError::Launch {
                editor: program.to_string(),
                source: e,
            },
        })?;

    if !status.success() {
        warn!(editor = program, %status, "editor exited unsuccessfully");
    }

    let text = match fs::read_to_string(file.path()) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let text = text.trim();
    if text.is_empty() {
        Ok(Composed::Cancelled)
    } else {
        Ok(Composed::Message(text.to_string()))
    }
}
