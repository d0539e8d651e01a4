/// Mailbox diagnostics
///
/// Backs `aicmd doctor`: checks that the mailbox directory is writable,
/// lists which slots exist, and can plant a fake `lls` failure to test the
/// `fix` path end to end without breaking anything in the shell.

use crate::core::mailbox::{ErrorReport, Mailbox, Slot};
use crate::error::Result;
use crate::shell::{HookInstaller, Shell};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Command name used by the simulated failure
pub const SIMULATED_COMMAND: &str = "lls";

/// Everything `doctor` reports
#[derive(Debug, Clone)]
pub struct DoctorReport {
    pub mailbox_dir: PathBuf,
    pub mailbox_writable: bool,
    pub slots: Vec<(Slot, Option<Duration>)>,
    pub last_error: Option<ErrorReport>,
    /// Whether `fix` would pick the last error up right now
    pub last_error_fresh: bool,
    pub hooks: Vec<(Shell, bool)>,
    pub auto_suggest: bool,
}

/// Collect diagnostics
///
/// # Arguments
/// * `mailbox` - Mailbox to inspect
/// * `installer` - Used to check each shell's integration
/// * `max_age` - Freshness window `fix` applies
/// * `auto_suggest` - Resolved toggle of this process
pub fn diagnose(
    mailbox: &Mailbox,
    installer: &HookInstaller,
    max_age: Option<Duration>,
    auto_suggest: bool,
) -> Result<DoctorReport> {
    let mailbox_dir = mailbox.paths().dir().to_path_buf();
    let last_error = mailbox.read_last_error()?;
    let last_error_fresh = last_error.is_some() && mailbox.read_recent(max_age)?.is_some();

    Ok(DoctorReport {
        mailbox_writable: probe_writable(&mailbox_dir),
        mailbox_dir,
        slots: mailbox.inventory(),
        last_error,
        last_error_fresh,
        hooks: Shell::ALL
            .iter()
            .map(|shell| (*shell, installer.is_installed(*shell)))
            .collect(),
        auto_suggest,
    })
}

/// Write the same slots a shell would for an unknown `lls`
pub fn simulate_not_found(mailbox: &Mailbox, shell: Shell) -> Result<()> {
    debug!(shell = %shell, "simulating command-not-found");
    mailbox.record_not_found(shell, SIMULATED_COMMAND, &[])
}

/// Whether a file can be created and removed in `dir`
pub fn probe_writable(dir: &Path) -> bool {
    let probe = dir.join(format!(".aicmd_probe_{}", std::process::id()));

    match fs::write(&probe, b"probe") {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "mailbox directory not writable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mailbox::MailboxPaths;
    use tempfile::TempDir;

    fn setup() -> (Mailbox, HookInstaller, TempDir) {
        let temp = TempDir::new().unwrap();
        let paths = MailboxPaths::new(temp.path().join("mbox"), "aicmd_");
        fs::create_dir_all(paths.dir()).unwrap();

        let installer = HookInstaller::new(
            temp.path().to_path_buf(),
            temp.path().join(".aicmd"),
            paths.clone(),
        );
        (Mailbox::new(paths), installer, temp)
    }

    #[test]
    fn test_diagnose_empty_mailbox() {
        let (mailbox, installer, _temp) = setup();

        let report = diagnose(&mailbox, &installer, Some(Duration::from_secs(30)), false).unwrap();

        assert!(report.mailbox_writable);
        assert!(report.slots.is_empty());
        assert!(report.last_error.is_none());
        assert!(!report.last_error_fresh);
        assert_eq!(report.hooks.len(), 3);
        assert!(report.hooks.iter().all(|(_, installed)| !installed));
    }

    #[test]
    fn test_simulate_then_diagnose() {
        let (mailbox, installer, _temp) = setup();
        installer.install(Shell::Zsh).unwrap();

        simulate_not_found(&mailbox, Shell::Zsh).unwrap();
        let report = diagnose(&mailbox, &installer, Some(Duration::from_secs(30)), true).unwrap();

        let last = report.last_error.unwrap();
        assert_eq!(last.error_text, "zsh: command not found: lls");
        assert_eq!(last.command.as_deref(), Some("lls"));
        assert_eq!(last.exit_code, Some(127));
        assert_eq!(last.simple_text.as_deref(), Some("Command 'lls' not found"));
        assert!(report.last_error_fresh);
        assert_eq!(report.slots.len(), 4);
        assert!(report.hooks.contains(&(Shell::Zsh, true)));
        assert!(report.auto_suggest);
    }

    #[test]
    fn test_probe_missing_directory() {
        let temp = TempDir::new().unwrap();
        assert!(probe_writable(temp.path()));
        assert!(!probe_writable(&temp.path().join("missing")));
    }
}
