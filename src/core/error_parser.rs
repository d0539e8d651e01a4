/// Error text analysis
///
/// Categorises shell error output and pulls the failing command back out of
/// it, so prompts can name the command even when the user pasted only the
/// error line.

use regex::Regex;
use std::fmt;

/// Broad kind of error recognised in error text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    CommandNotFound,
    FileNotFound,
    PermissionDenied,
    NetworkError,
    ConnectionRefused,
    PackageNotFound,
    NotGitRepo,
    GitPathspec,
    DockerDaemon,
    Docker,
    PythonModuleNotFound,
    PythonSyntax,
    NodeModuleNotFound,
    Npm,
    CommandFailed,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::CommandNotFound => "command_not_found",
            ErrorCategory::FileNotFound => "file_not_found",
            ErrorCategory::PermissionDenied => "permission_denied",
            ErrorCategory::NetworkError => "network_error",
            ErrorCategory::ConnectionRefused => "connection_refused",
            ErrorCategory::PackageNotFound => "package_not_found",
            ErrorCategory::NotGitRepo => "not_git_repo",
            ErrorCategory::GitPathspec => "git_pathspec_error",
            ErrorCategory::DockerDaemon => "docker_daemon_error",
            ErrorCategory::Docker => "docker_error",
            ErrorCategory::PythonModuleNotFound => "python_module_not_found",
            ErrorCategory::PythonSyntax => "python_syntax_error",
            ErrorCategory::NodeModuleNotFound => "node_module_not_found",
            ErrorCategory::Npm => "npm_error",
            ErrorCategory::CommandFailed => "command_failed",
            ErrorCategory::Unknown => "unknown_error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Checked in order; the first match wins
const CATEGORY_PATTERNS: &[(&str, ErrorCategory)] = &[
    (r"bash: (.+): command not found", ErrorCategory::CommandNotFound),
    (r"zsh: command not found: (.+)", ErrorCategory::CommandNotFound),
    (r"fish: Unknown command[: ]*(.+)", ErrorCategory::CommandNotFound),
    (r"Command '(.+)' not found", ErrorCategory::CommandNotFound),
    (r"Command '.+' failed with exit code (\d+)", ErrorCategory::CommandFailed),
    (r"No such file or directory[: ]*(.*)", ErrorCategory::FileNotFound),
    (r"cannot access[: ]*(.+)", ErrorCategory::FileNotFound),
    (r"Permission denied[: ]*(.*)", ErrorCategory::PermissionDenied),
    (r"curl: \(\d+\) (.+)", ErrorCategory::NetworkError),
    (r"Connection refused", ErrorCategory::ConnectionRefused),
    (r"E: Unable to locate package (.+)", ErrorCategory::PackageNotFound),
    (r"No package '(.+)' found", ErrorCategory::PackageNotFound),
    (r"fatal: not a git repository", ErrorCategory::NotGitRepo),
    (r"error: pathspec '(.+)' did not match any file", ErrorCategory::GitPathspec),
    (r"Cannot connect to the Docker daemon", ErrorCategory::DockerDaemon),
    (r"docker: Error response from daemon: (.+)", ErrorCategory::Docker),
    (r"ModuleNotFoundError: No module named '(.+)'", ErrorCategory::PythonModuleNotFound),
    (r"SyntaxError: (.+)", ErrorCategory::PythonSyntax),
    (r"Error: Cannot find module '(.+)'", ErrorCategory::NodeModuleNotFound),
    (r"npm ERR! (.+)", ErrorCategory::Npm),
];

// Formats that carry the command itself
const COMMAND_PATTERNS: &[&str] = &[
    r"Command '(.+)' failed",
    r"Command '(.+)' not found",
    r"bash: (.+): command not found",
    r"zsh: command not found: (.+)",
    r"fish: Unknown command[: ]*(.+)",
    r"Failed to execute: (.+)",
];

/// A categorised error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub category: ErrorCategory,
    /// First capture of the matching pattern, if it had one
    pub detail: Option<String>,
}

/// Regex-based error text parser
pub struct ErrorParser {
    category_regex: Vec<(Regex, ErrorCategory)>,
    command_regex: Vec<Regex>,
    prompt_regex: Option<Regex>,
}

impl ErrorParser {
    pub fn new() -> Self {
        let category_regex = CATEGORY_PATTERNS
            .iter()
            .filter_map(|(pattern, category)| {
                Regex::new(&format!("(?i){}", pattern))
                    .ok()
                    .map(|re| (re, *category))
            })
            .collect();

        let command_regex = COMMAND_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            category_regex,
            command_regex,
            prompt_regex: Regex::new(r"^\$\s+(.+)$").ok(),
        }
    }

    /// Categorise error text
    ///
    /// # Returns
    /// * `Diagnosis` - `ErrorCategory::Unknown` when nothing matched
    pub fn categorize(&self, error_text: &str) -> Diagnosis {
        for (re, category) in &self.category_regex {
            if let Some(caps) = re.captures(error_text) {
                let detail = caps
                    .get(1)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty());
                return Diagnosis {
                    category: *category,
                    detail,
                };
            }
        }

        Diagnosis {
            category: ErrorCategory::Unknown,
            detail: None,
        }
    }

    /// Recover the failing command from error text
    ///
    /// Tries the known message formats first, then a `$ cmd` prompt line.
    pub fn extract_command(&self, error_text: &str) -> Option<String> {
        for re in &self.command_regex {
            if let Some(caps) = re.captures(error_text) {
                let command = caps[1].trim();
                if !command.is_empty() {
                    return Some(command.to_string());
                }
            }
        }

        let prompt_regex = self.prompt_regex.as_ref()?;
        error_text
            .lines()
            .filter_map(|line| prompt_regex.captures(line.trim()))
            .map(|caps| caps[1].trim().to_string())
            .next()
    }
}

impl Default for ErrorParser {
    fn default() -> Self {
        Self::new()
    }
}
