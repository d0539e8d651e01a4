/// Shell detection logic
///
/// Detects which shell the user is running and provides shell-specific
/// configuration paths, file names and native messages.

use crate::error::{AicmdError, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported shell dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    pub const ALL: [Shell; 3] = [Shell::Bash, Shell::Zsh, Shell::Fish];

    /// Get the shell name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
        }
    }

    /// Extension of the generated integration script
    pub fn script_extension(&self) -> &'static str {
        match self {
            Shell::Bash => "sh",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
        }
    }

    /// Integration script file name, e.g. `bash_integration.sh`
    pub fn integration_filename(&self) -> String {
        format!("{}_integration.{}", self.name(), self.script_extension())
    }

    /// Get the startup file for this shell under `home`
    ///
    /// Returns the file that should source the integration script.
    pub fn rc_file_path(&self, home: &Path) -> PathBuf {
        match self {
            Shell::Bash => {
                // Prefer .bashrc, fallback to an existing .bash_profile
                let bashrc = home.join(".bashrc");
                let profile = home.join(".bash_profile");
                if !bashrc.exists() && profile.exists() {
                    profile
                } else {
                    bashrc
                }
            }
            Shell::Zsh => home.join(".zshrc"),
            Shell::Fish => home.join(".config").join("fish").join("config.fish"),
        }
    }

    /// Get the source command for this shell
    ///
    /// Returns the line to add to the startup file to load the integration.
    pub fn source_command(&self, script_path: &Path) -> String {
        match self {
            Shell::Bash | Shell::Zsh => {
                format!(
                    "[ -f \"{}\" ] && source \"{}\"",
                    script_path.display(),
                    script_path.display()
                )
            }
            Shell::Fish => {
                format!(
                    "test -f \"{}\"; and source \"{}\"",
                    script_path.display(),
                    script_path.display()
                )
            }
        }
    }

    /// The message this shell prints for an unknown command
    pub fn not_found_message(&self, name: &str) -> String {
        match self {
            Shell::Bash => format!("bash: {}: command not found", name),
            Shell::Zsh => format!("zsh: command not found: {}", name),
            Shell::Fish => format!("fish: Unknown command: {}", name),
        }
    }

    /// Command that reloads the startup file in a running session
    pub fn reload_hint(&self, home: &Path) -> String {
        format!("source {}", self.rc_file_path(home).display())
    }
}

impl FromStr for Shell {
    type Err = AicmdError;

    /// Accepts a bare name or a path like `/usr/bin/zsh`
    fn from_str(s: &str) -> Result<Self> {
        let name = s
            .trim()
            .rsplit('/')
            .next()
            .unwrap_or("")
            .to_lowercase();

        match name.as_str() {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "fish" => Ok(Shell::Fish),
            _ => Err(AicmdError::UnsupportedShell(s.trim().to_string())),
        }
    }
}

impl std::fmt::Display for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Shell detector
pub struct ShellDetector;

impl ShellDetector {
    /// Detect the current shell from `$SHELL`
    ///
    /// # Returns
    /// * `Ok(Shell)` - The detected shell
    /// * `Err(AicmdError)` - If `$SHELL` is unset or names an unsupported shell
    pub fn detect() -> Result<Shell> {
        match env::var("SHELL") {
            Ok(shell_path) if !shell_path.trim().is_empty() => shell_path.parse(),
            _ => Err(AicmdError::Config(
                "Could not detect shell. Please set $SHELL or pass --shell.".to_string(),
            )),
        }
    }

    /// Detect all shells that look configured under `home`
    ///
    /// A shell counts when its startup file, or that file's directory, exists.
    pub fn detect_all(home: &Path) -> Vec<Shell> {
        Shell::ALL
            .iter()
            .copied()
            .filter(|shell| {
                let rc_path = shell.rc_file_path(home);
                rc_path.exists()
                    || (*shell == Shell::Fish
                        && rc_path.parent().map(|p| p.exists()).unwrap_or(false))
            })
            .collect()
    }
}
