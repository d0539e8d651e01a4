/// Hook installer
///
/// Writes the generated integration script and makes sure the shell's
/// startup file loads it. Existing startup files are never edited: if one
/// exists without our block, the user gets the exact line to add.

use crate::core::mailbox::MailboxPaths;
use crate::error::{AicmdError, Result};
use crate::shell::emitter::emitter_for;
use crate::shell::{Shell, ShellDetector};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// First line of the block we append to startup files
pub const BLOCK_START: &str = "# >>> aicmd shell integration >>>";
/// Last line of the block we append to startup files
pub const BLOCK_END: &str = "# <<< aicmd shell integration <<<";

/// What happened to the startup file during install
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupFile {
    /// File did not exist; created with our block
    Created,
    /// File already loads the integration; left untouched
    AlreadyConfigured,
    /// File exists without our block; user must add `line` by hand
    ManualStepRequired { line: String },
}

/// Result of installing one shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub shell: Shell,
    pub script_path: PathBuf,
    pub rc_path: PathBuf,
    pub startup: StartupFile,
}

/// Hook installer
pub struct HookInstaller {
    config_dir: PathBuf,
    home_dir: PathBuf,
    mailbox: MailboxPaths,
}

impl HookInstaller {
    /// Create a new hook installer
    ///
    /// # Arguments
    /// * `home_dir` - Home directory holding the startup files
    /// * `config_dir` - Where integration scripts are written (`~/.aicmd`)
    /// * `mailbox` - Mailbox paths baked into the generated scripts
    pub fn new(home_dir: PathBuf, config_dir: PathBuf, mailbox: MailboxPaths) -> Self {
        Self {
            config_dir,
            home_dir,
            mailbox,
        }
    }

    /// Install hooks for `requested`, or for the shell named in `$SHELL`
    ///
    /// Unsupported names are rejected before anything is written.
    ///
    /// # Arguments
    /// * `requested` - Shell name or path given by the user, if any
    ///
    /// # Returns
    /// * `Ok(InstallReport)` - What was written
    /// * `Err(AicmdError)` - If detection or installation fails
    pub fn install_auto(&self, requested: Option<&str>) -> Result<InstallReport> {
        let shell = match requested {
            Some(name) => name.parse::<Shell>()?,
            None => ShellDetector::detect()?,
        };
        self.install(shell)
    }

    /// Install hooks for a specific shell
    ///
    /// Always rewrites the integration script. Only creates the startup file
    /// when it is missing.
    pub fn install(&self, shell: Shell) -> Result<InstallReport> {
        fs::create_dir_all(&self.config_dir).map_err(|source| AicmdError::SetupIo {
            path: self.config_dir.clone(),
            source,
        })?;

        let script_path = self.script_path(shell);
        emitter_for(shell).emit_to(&self.mailbox, &script_path)?;
        info!(shell = %shell, path = %script_path.display(), "wrote integration script");

        let rc_path = shell.rc_file_path(&self.home_dir);
        let startup = self.update_rc_file(shell, &rc_path, &script_path)?;

        Ok(InstallReport {
            shell,
            script_path,
            rc_path,
            startup,
        })
    }

    /// Install hooks for every shell that looks configured in the home directory
    ///
    /// # Returns
    /// * `Ok(Vec<InstallReport>)` - One report per shell that succeeded
    pub fn install_all(&self) -> Result<Vec<InstallReport>> {
        let shells = ShellDetector::detect_all(&self.home_dir);
        let mut installed = Vec::new();

        for shell in shells {
            match self.install(shell) {
                Ok(report) => installed.push(report),
                Err(e) => {
                    warn!(shell = %shell, error = %e, "failed to install hook");
                }
            }
        }

        if installed.is_empty() {
            return Err(AicmdError::Config(
                "No shells could be configured".to_string(),
            ));
        }

        Ok(installed)
    }

    /// Uninstall hooks for a specific shell
    ///
    /// Removes our block from the startup file and deletes the script.
    pub fn uninstall(&self, shell: Shell) -> Result<()> {
        let script_path = self.script_path(shell);
        let rc_path = shell.rc_file_path(&self.home_dir);

        if rc_path.exists() {
            let content = fs::read_to_string(&rc_path)?;
            if let Some(stripped) = strip_managed_block(&content) {
                fs::write(&rc_path, stripped)?;
                debug!(path = %rc_path.display(), "removed managed block");
            }
        }

        if script_path.exists() {
            fs::remove_file(&script_path)?;
        }

        Ok(())
    }

    /// Check if hooks are installed for a shell
    ///
    /// # Returns
    /// * `true` if the script exists and the startup file loads it
    pub fn is_installed(&self, shell: Shell) -> bool {
        let script_path = self.script_path(shell);
        if !script_path.exists() {
            return false;
        }

        fs::read_to_string(shell.rc_file_path(&self.home_dir))
            .map(|content| references_integration(&content, &shell.source_command(&script_path)))
            .unwrap_or(false)
    }

    /// Path of the integration script for a shell
    pub fn script_path(&self, shell: Shell) -> PathBuf {
        self.config_dir.join(shell.integration_filename())
    }

    /// Create the startup file with our block, or report what to do
    fn update_rc_file(
        &self,
        shell: Shell,
        rc_path: &Path,
        script_path: &Path,
    ) -> Result<StartupFile> {
        let source_cmd = shell.source_command(script_path);

        if rc_path.exists() {
            let content = fs::read_to_string(rc_path).map_err(|source| AicmdError::SetupIo {
                path: rc_path.to_path_buf(),
                source,
            })?;

            if references_integration(&content, &source_cmd) {
                warn!(path = %rc_path.display(), "startup file already configured for aicmd");
                return Ok(StartupFile::AlreadyConfigured);
            }

            debug!(path = %rc_path.display(), "startup file exists, leaving it to the user");
            return Ok(StartupFile::ManualStepRequired { line: source_cmd });
        }

        let startup_error = |source| AicmdError::StartupFileWrite {
            path: rc_path.to_path_buf(),
            line: source_cmd.clone(),
            source,
        };

        if let Some(parent) = rc_path.parent() {
            fs::create_dir_all(parent).map_err(startup_error)?;
        }

        append_block(rc_path, &source_cmd).map_err(startup_error)?;
        info!(path = %rc_path.display(), "created startup file");

        Ok(StartupFile::Created)
    }
}

/// Append the managed block; the handle is flushed and closed before returning
fn append_block(rc_path: &Path, source_cmd: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(rc_path)?;

    file.write_all(managed_block(source_cmd).as_bytes())?;
    file.sync_all()
}

/// The lines we own in a startup file
pub fn managed_block(source_cmd: &str) -> String {
    format!("{}\n{}\n{}\n", BLOCK_START, source_cmd, BLOCK_END)
}

/// Whether startup file content already loads the integration
///
/// Either our marker or the exact source line counts. A bare mention of the
/// tool's name (say, in a comment) does not.
pub fn references_integration(content: &str, source_cmd: &str) -> bool {
    content.contains(BLOCK_START) || content.lines().any(|line| line.trim() == source_cmd)
}

/// Content with our block removed, or `None` if there was no block
fn strip_managed_block(content: &str) -> Option<String> {
    let start = content.find(BLOCK_START)?;
    let end = content[start..]
        .find(BLOCK_END)
        .map(|i| start + i + BLOCK_END.len())?;

    let mut stripped = String::with_capacity(content.len());
    stripped.push_str(&content[..start]);
    stripped.push_str(content[end..].strip_prefix('\n').unwrap_or(&content[end..]));
    Some(stripped)
}
