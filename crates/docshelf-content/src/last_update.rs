//! Last-update provenance from the git log.

use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// When and by whom a doc was last touched, when tracked in git. Fields
/// are populated only when the matching `show_last_update_*` flag is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastUpdateData {
    /// Epoch seconds of the last commit touching the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_last_updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<String>,
}

static GIT_DEGRADED_LOGGED: AtomicBool = AtomicBool::new(false);

fn log_git_degraded(detail: &str) {
    if !GIT_DEGRADED_LOGGED.swap(true, Ordering::Relaxed) {
        tracing::warn!("last-update metadata disabled: {detail}");
    }
}

/// Timestamp and author of the last commit touching `path`.
///
/// Returns `None` for untracked files, when git is missing, or when the
/// file sits outside a work tree; the degraded condition is logged once
/// per run rather than per file.
#[must_use]
pub fn file_last_update(path: &Path) -> Option<(u64, String)> {
    let dir = path.parent()?;
    let output = Command::new("git")
        .args(["log", "-1", "--format=%ct,%an", "--"])
        .arg(path)
        .current_dir(dir)
        .output();
    let output = match output {
        Ok(output) => output,
        Err(e) => {
            log_git_degraded(&format!("failed to run git: {e}"));
            return None;
        }
    };
    if !output.status.success() {
        log_git_degraded(&format!(
            "git log failed with exit code {}: {}",
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.trim();
    if line.is_empty() {
        // tracked repo, untracked file
        return None;
    }
    let (timestamp, author) = line.split_once(',')?;
    let timestamp = timestamp.parse::<u64>().ok()?;
    Some((timestamp, author.to_string()))
}

fn format_timestamp(timestamp: u64) -> Option<String> {
    let secs = i64::try_from(timestamp).ok()?;
    let date = chrono::DateTime::<chrono::Utc>::from_timestamp(secs, 0)?;
    Some(date.format("%-m/%-d/%Y").to_string())
}

/// Gather the flag-gated last-update fields for one doc.
#[must_use]
pub fn read_last_update(path: &Path, show_time: bool, show_author: bool) -> LastUpdateData {
    if !show_time && !show_author {
        return LastUpdateData::default();
    }
    let Some((timestamp, author)) = file_last_update(path) else {
        return LastUpdateData::default();
    };
    let mut data = LastUpdateData::default();
    if show_time {
        data.last_updated_at = Some(timestamp);
        data.formatted_last_updated_at = format_timestamp(timestamp);
    }
    if show_author {
        data.last_updated_by = Some(author);
    }
    data
}
