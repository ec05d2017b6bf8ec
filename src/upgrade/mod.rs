//! Self-upgrade via GitHub releases
//!
//! Compares the running version with the latest release tag and, when newer
//! (or unknown), pipes the install script into bash.

use std::io::ErrorKind;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::debug;


pub const INSTALL_URL: &str = "https://raw.githubusercontent.com/ryangerardwilson/slack/main/install.sh";
pub const LATEST_RELEASE_API: &str =
    "https://api.github.com/repos/ryangerardwilson/slack/releases/latest";
const LOOKUP_TIMEOUT_SECS: u64 = 5;
const UNKNOWN_VERSION: &str = "0.0.0";

/// What `--upgrade` should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradePlan {
    UpToDate { current: String },
    Install {
        from: Option<String>,
        to: Option<String>,
    },
}

/// Numeric components of a version string: `v1.2.3-rc1` → `[1, 2, 3]`
///
/// Stops at the first segment without a leading digit.
#[must_use]
pub fn version_tuple(version: &str) -> Vec<u64> {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);

    let mut parts = Vec::new();
    for segment in version.split('.') {
        let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
        match digits.parse::<u64>() {
            Ok(n) => parts.push(n),
            Err(_) => break,
        }
    }

    if parts.is_empty() {
        vec![0]
    } else {
        parts
    }
}

/// Is `candidate` strictly newer than `current`
#[must_use]
pub fn is_newer(candidate: &str, current: &str) -> bool {
    let mut cand = version_tuple(candidate);
    let mut curr = version_tuple(current);
    let len = cand.len().max(curr.len());
    cand.resize(len, 0);
    curr.resize(len, 0);
    cand > curr
}

/// Decide between "already latest" and "run the installer"
#[must_use]
pub fn plan(current: &str, latest: Option<&str>) -> UpgradePlan {
    let known_current = (!current.is_empty() && current != UNKNOWN_VERSION).then_some(current);

    match (known_current, latest) {
        (Some(current), Some(latest)) if !is_newer(latest, current) => UpgradePlan::UpToDate {
            current: current.to_string(),
        },
        _ => UpgradePlan::Install {
            from: known_current.map(str::to_string),
            to: latest.map(str::to_string),
        },
    }
}

/// Latest release tag, or `None` when it cannot be determined
pub async fn latest_version(url: &str) -> Option<String> {
    let http = reqwest::Client::builder()
        .user_agent("slack-updater")
        .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
        .build()
        .ok()?;

    let response = match http.get(url).send().await {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            debug!(status = r.status().as_u16(), "release lookup failed");
            return None;
        }
        Err(e) => {
            debug!(error = %e, "release lookup failed");
            return None;
        }
    };

    let payload: Value = response.json().await.ok()?;
    ["tag_name", "name"]
        .iter()
        .filter_map(|key| payload.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|tag| !tag.is_empty())
        .map(str::to_string)
}

/// Handle `--upgrade`, returning the process exit code
#[cfg(not(tarpaulin_include))]
pub async fn run() -> Result<i32> {
    let current = env!("CARGO_PKG_VERSION");
    let latest = latest_version(LATEST_RELEASE_API).await;

    match plan(current, latest.as_deref()) {
        UpgradePlan::UpToDate { current } => {
            println!("Already running the latest version ({}).", current);
            Ok(0)
        }
        UpgradePlan::Install { from, to } => {
            match (from, to) {
                (_, None) => eprintln!("Unable to determine latest version; attempting upgrade…"),
                (Some(from), Some(to)) => println!("Upgrading from {} to {}…", from, to),
                (None, Some(to)) => println!("Upgrading to {}…", to),
            }
            run_installer()
        }
    }
}

/// `curl -fsSL <install.sh> | bash`
#[cfg(not(tarpaulin_include))]
fn run_installer() -> Result<i32> {
    let mut curl = match Command::new("curl")
        .args(["-fsSL", INSTALL_URL])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => bail!("Upgrade requires curl"),
        Err(e) => return Err(e).context("Failed to start curl"),
    };

    let script = curl
        .stdout
        .take()
        .context("curl stdout was not captured")?;

    let bash_status = match Command::new("bash").stdin(Stdio::from(script)).status() {
        Ok(status) => status,
        Err(e) => {
            let _ = curl.kill();
            let _ = curl.wait();
            if e.kind() == ErrorKind::NotFound {
                bail!("Upgrade requires bash");
            }
            return Err(e).context("Failed to start bash");
        }
    };

    let curl_output = curl.wait_with_output().context("Failed to wait for curl")?;
    if !curl_output.status.success() {
        let stderr = String::from_utf8_lossy(&curl_output.stderr);
        if !stderr.is_empty() {
            eprint!("{}", stderr);
        }
        return Ok(curl_output.status.code().unwrap_or(1));
    }

    Ok(bash_status.code().unwrap_or(1))
}
