/// System context for prompts
///
/// Collects what the assistant should know about the user's machine: OS,
/// shell, working directory, git branch, project type and which common
/// tools are on `$PATH`.

use crate::error::Result;
use git2::Repository;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

// Looked up on $PATH; only the ones present are reported
const COMMON_TOOLS: &[&str] = &[
    "git", "docker", "kubectl", "python3", "pip3", "node", "npm", "yarn", "pnpm", "go",
    "cargo", "java", "make", "cmake", "gcc", "curl", "wget", "ssh", "rsync", "jq", "tar",
    "systemctl", "brew", "apt", "dnf", "pacman", "tmux", "vim",
];

/// Project type detected from marker files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Node,   // package.json
    Rust,   // Cargo.toml
    Python, // requirements.txt, setup.py, pyproject.toml
    Go,     // go.mod
    Java,   // pom.xml, build.gradle
    Ruby,   // Gemfile
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectType::Node => "node",
            ProjectType::Rust => "rust",
            ProjectType::Python => "python",
            ProjectType::Go => "go",
            ProjectType::Java => "java",
            ProjectType::Ruby => "ruby",
        };
        write!(f, "{}", s)
    }
}

/// Snapshot of the environment the user is working in
#[derive(Debug, Clone, PartialEq)]
pub struct SystemContext {
    pub os: String,
    pub shell: String,
    pub cwd: PathBuf,
    pub user: String,
    pub git_branch: Option<String>,
    pub project_type: Option<ProjectType>,
    pub available_tools: Vec<String>,
}

impl SystemContext {
    /// Detect the context of the current process
    pub fn detect() -> Result<Self> {
        let cwd = env::current_dir()?;

        let shell = env::var("SHELL")
            .ok()
            .and_then(|s| s.rsplit('/').next().map(str::to_string))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let user = env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());

        let context = Self {
            os: format!("{} ({})", env::consts::OS, env::consts::ARCH),
            shell,
            git_branch: detect_git_branch(&cwd),
            project_type: detect_project_type(&cwd),
            available_tools: available_tools(env::var_os("PATH").as_deref()),
            cwd,
            user,
        };

        debug!(?context, "detected system context");
        Ok(context)
    }

    /// Render as the bullet list used in prompts
    pub fn to_prompt_block(&self) -> String {
        let mut block = format!(
            "- OS: {}\n- Shell: {}\n- Current Directory: {}\n- User: {}\n",
            self.os,
            self.shell,
            self.cwd.display(),
            self.user
        );

        if let Some(branch) = &self.git_branch {
            block.push_str(&format!("- Git Branch: {}\n", branch));
        }
        if let Some(project) = self.project_type {
            block.push_str(&format!("- Project Type: {}\n", project));
        }
        if !self.available_tools.is_empty() {
            block.push_str(&format!(
                "- Available Tools: {}\n",
                self.available_tools.join(", ")
            ));
        }

        block
    }
}

/// Current branch of the repository containing `dir`
///
/// Returns `None` outside a repository and on a detached HEAD.
pub fn detect_git_branch(dir: &Path) -> Option<String> {
    let repo = Repository::discover(dir).ok()?;
    let head = repo.head().ok()?;

    if !head.is_branch() {
        return None;
    }

    head.shorthand().map(str::to_string)
}

/// Detect project type from marker files in `dir`
pub fn detect_project_type(dir: &Path) -> Option<ProjectType> {
    if dir.join("package.json").exists() {
        Some(ProjectType::Node)
    } else if dir.join("Cargo.toml").exists() {
        Some(ProjectType::Rust)
    } else if ["requirements.txt", "setup.py", "pyproject.toml"]
        .iter()
        .any(|m| dir.join(m).exists())
    {
        Some(ProjectType::Python)
    } else if dir.join("go.mod").exists() {
        Some(ProjectType::Go)
    } else if dir.join("pom.xml").exists() || dir.join("build.gradle").exists() {
        Some(ProjectType::Java)
    } else if dir.join("Gemfile").exists() {
        Some(ProjectType::Ruby)
    } else {
        None
    }
}

/// Common tools found in the given `PATH` value
pub fn available_tools(path_var: Option<&std::ffi::OsStr>) -> Vec<String> {
    let dirs: Vec<PathBuf> = match path_var {
        Some(value) => env::split_paths(value).collect(),
        None => return Vec::new(),
    };

    COMMON_TOOLS
        .iter()
        .filter(|tool| dirs.iter().any(|dir| dir.join(tool).is_file()))
        .map(|tool| tool.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detect_context() {
        let context = SystemContext::detect().unwrap();
        assert!(context.cwd.is_absolute());
        assert!(!context.os.is_empty());
    }

    #[test]
    fn test_project_type_markers() {
        let temp = TempDir::new().unwrap();
        assert_eq!(detect_project_type(temp.path()), None);

        fs::write(temp.path().join("pyproject.toml"), "").unwrap();
        assert_eq!(detect_project_type(temp.path()), Some(ProjectType::Python));

        fs::write(temp.path().join("Cargo.toml"), "").unwrap();
        assert_eq!(detect_project_type(temp.path()), Some(ProjectType::Rust));
    }

    #[test]
    fn test_git_branch() {
        let temp = TempDir::new().unwrap();
        assert_eq!(detect_git_branch(temp.path()), None);

        let repo = Repository::init(temp.path()).unwrap();
        let sig = git2::Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let commit = repo
            .commit(None, &sig, &sig, "init", &tree, &[])
            .unwrap();
        repo.branch("feature/hooks", &repo.find_commit(commit).unwrap(), false)
            .unwrap();
        repo.set_head("refs/heads/feature/hooks").unwrap();

        let nested = temp.path().join("src");
        fs::create_dir(&nested).unwrap();
        assert_eq!(detect_git_branch(&nested), Some("feature/hooks".to_string()));
    }

    #[test]
    fn test_available_tools_from_path() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("git"), "").unwrap();
        fs::write(temp.path().join("jq"), "").unwrap();
        fs::write(temp.path().join("not-a-tool"), "").unwrap();

        let path = env::join_paths([temp.path()]).unwrap();
        assert_eq!(
            available_tools(Some(path.as_os_str())),
            vec!["git".to_string(), "jq".to_string()]
        );
        assert!(available_tools(None).is_empty());
    }

    #[test]
    fn test_prompt_block() {
        let context = SystemContext {
            os: "linux (x86_64)".to_string(),
            shell: "zsh".to_string(),
            cwd: PathBuf::from("/work/app"),
            user: "dev".to_string(),
            git_branch: Some("main".to_string()),
            project_type: Some(ProjectType::Node),
            available_tools: vec!["git".to_string(), "npm".to_string()],
        };

        let block = context.to_prompt_block();
        assert!(block.contains("- Shell: zsh\n"));
        assert!(block.contains("- Git Branch: main\n"));
        assert!(block.contains("- Project Type: node\n"));
        assert!(block.contains("- Available Tools: git, npm\n"));
    }
}
