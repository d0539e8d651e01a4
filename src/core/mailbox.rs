// The error mailbox: a handful of one-line files in /tmp that the shell hooks
// write and the CLI reads.
//
// Last write wins, no history. Slots are separate files so a reader can see a
// torn update (new command, old error). We live with that; each single slot
// write from Rust is at least atomic (temp file + rename).

use crate::error::Result;
use crate::shell::Shell;
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

pub const DEFAULT_MAILBOX_DIR: &str = "/tmp";
pub const DEFAULT_MAILBOX_PREFIX: &str = "aicmd_";

/// Exit status shells use for "command not found"
pub const NOT_FOUND_EXIT_CODE: i32 = 127;

/// One named slot of the mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    LastError,
    LastCommand,
    LastExitCode,
    SimpleError,
    CurrentCommand,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::LastError,
        Slot::LastCommand,
        Slot::LastExitCode,
        Slot::SimpleError,
        Slot::CurrentCommand,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Slot::LastError => "last_error",
            Slot::LastCommand => "last_command",
            Slot::LastExitCode => "last_exit_code",
            Slot::SimpleError => "simple_error",
            Slot::CurrentCommand => "current_command",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Where the slot files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxPaths {
    dir: PathBuf,
    prefix: String,
}

impl Default for MailboxPaths {
    fn default() -> Self {
        Self::new(DEFAULT_MAILBOX_DIR, DEFAULT_MAILBOX_PREFIX)
    }
}

impl MailboxPaths {
    pub fn new<P: Into<PathBuf>>(dir: P, prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.to_string(),
        }
    }

    /// Full path of a slot, e.g. `/tmp/aicmd_last_error`
    pub fn slot_path(&self, slot: Slot) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, slot.name()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Snapshot of the last captured failure
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub command: Option<String>,
    pub exit_code: Option<i32>,
    pub error_text: String,
    pub simple_text: Option<String>,
    pub captured_at: Option<DateTime<Local>>,
}

impl ErrorReport {
    pub fn is_not_found(&self) -> bool {
        self.exit_code == Some(NOT_FOUND_EXIT_CODE)
    }

    /// Text handed to the AI provider for `fix`
    ///
    /// The error line, plus the full command when the error line does not
    /// already contain it.
    pub fn to_prompt_text(&self) -> String {
        let mut text = self.error_text.clone();
        if let Some(cmd) = &self.command {
            if !cmd.is_empty() && !text.contains(cmd.as_str()) {
                text.push_str(&format!("\nFailed command: {}", cmd));
            }
        }
        text
    }

    /// Age relative to `now`; unknown capture time counts as fresh
    fn age(&self, now: DateTime<Local>) -> Duration {
        self.captured_at
            .and_then(|at| (now - at).to_std().ok())
            .unwrap_or_default()
    }
}

/// Message a not-found handler writes to `simple_error`
pub fn simple_not_found_message(name: &str) -> String {
    format!("Command '{}' not found", name)
}

/// Message a post-exec handler writes to `last_error`
pub fn failure_message(command: &str, exit_code: i32) -> String {
    format!("Command '{}' failed with exit code {}", command, exit_code)
}

/// Hint printed when the auto-suggest toggle is on
pub fn hint_line() -> &'static str {
    "💡 Run 'aicmd fix' to diagnose this error"
}

/// Reader (and test-time writer) for the mailbox files
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    paths: MailboxPaths,
}

impl Mailbox {
    pub fn new(paths: MailboxPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &MailboxPaths {
        &self.paths
    }

    /// Read the most recent failure, if `last_error` exists
    ///
    /// # Returns
    /// * `Ok(Some(ErrorReport))` - A failure was captured
    /// * `Ok(None)` - No recent failure (not an error)
    pub fn read_last_error(&self) -> Result<Option<ErrorReport>> {
        let error_text = match self.read(Slot::LastError)? {
            Some(text) => text,
            None => return Ok(None),
        };

        let captured_at = fs::metadata(self.paths.slot_path(Slot::LastError))
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Local>::from);

        let exit_code = match self.read(Slot::LastExitCode)? {
            Some(raw) => match raw.trim().parse::<i32>() {
                Ok(code) => Some(code),
                Err(_) => {
                    warn!(value = %raw, "ignoring malformed exit code in mailbox");
                    None
                }
            },
            None => None,
        };

        Ok(Some(ErrorReport {
            command: self.read(Slot::LastCommand)?,
            exit_code,
            error_text,
            simple_text: self.read(Slot::SimpleError)?,
            captured_at,
        }))
    }

    /// Like `read_last_error`, but reports older than `max_age` count as absent
    pub fn read_recent(&self, max_age: Option<Duration>) -> Result<Option<ErrorReport>> {
        let report = match self.read_last_error()? {
            Some(report) => report,
            None => return Ok(None),
        };

        if let Some(max_age) = max_age {
            let age = report.age(Local::now());
            if age > max_age {
                debug!(age_secs = age.as_secs(), "mailbox report is stale, skipping");
                return Ok(None);
            }
        }

        Ok(Some(report))
    }

    /// Read one slot; missing or blank files are `None`
    pub fn read(&self, slot: Slot) -> Result<Option<String>> {
        match fs::read_to_string(self.paths.slot_path(slot)) {
            Ok(content) => {
                let value = content.trim_end_matches(['\n', '\r']).to_string();
                Ok(if value.trim().is_empty() { None } else { Some(value) })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite one slot with a single line
    pub fn write(&self, slot: Slot, value: &str) -> Result<()> {
        let path = self.paths.slot_path(slot);
        let line = value.replace(['\n', '\r'], " ");

        let tmp = path.with_extension(format!("{}.tmp", std::process::id()));
        fs::write(&tmp, format!("{}\n", line))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        Ok(())
    }

    /// Record a command-not-found event the way the shell hooks do
    pub fn record_not_found(&self, shell: Shell, name: &str, args: &[&str]) -> Result<()> {
        let mut parts = vec![name];
        parts.extend_from_slice(args);
        let full_command = parts.join(" ");

        self.write(Slot::LastCommand, &full_command)?;
        self.write(Slot::LastError, &shell.not_found_message(name))?;
        self.write(Slot::LastExitCode, &NOT_FOUND_EXIT_CODE.to_string())?;
        self.write(Slot::SimpleError, &simple_not_found_message(name))?;
        Ok(())
    }

    /// Record a post-exec failure; zero exit codes and empty commands are ignored
    ///
    /// # Returns
    /// * `Ok(true)` if the mailbox was written
    pub fn record_failure(&self, command: &str, exit_code: i32) -> Result<bool> {
        if exit_code == 0 || command.trim().is_empty() {
            return Ok(false);
        }

        self.write(Slot::LastError, &failure_message(command, exit_code))?;
        self.write(Slot::LastCommand, command)?;
        self.write(Slot::LastExitCode, &exit_code.to_string())?;
        Ok(true)
    }

    /// Delete every slot. Missing slots are fine.
    pub fn clear(&self) -> Result<()> {
        let mut first_error = None;

        for slot in Slot::ALL {
            let path = self.paths.slot_path(slot);
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed mailbox slot"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not remove mailbox slot");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Which slots currently exist, with their age
    pub fn inventory(&self) -> Vec<(Slot, Option<Duration>)> {
        Slot::ALL
            .iter()
            .filter_map(|slot| {
                let meta = fs::metadata(self.paths.slot_path(*slot)).ok()?;
                let age = meta
                    .modified()
                    .ok()
                    .and_then(|m| SystemTime::now().duration_since(m).ok());
                Some((*slot, age))
            })
            .collect()
    }
}
