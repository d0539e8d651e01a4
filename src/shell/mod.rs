/// Shell integration module
///
/// Detects shells, renders the hook scripts that feed the mailbox, and wires
/// them into startup files.

pub mod emitter;
pub mod hook_installer;
pub mod shell_detector;

pub use emitter::{emitter_for, HookEmitter};
pub use hook_installer::{HookInstaller, InstallReport, StartupFile};
pub use shell_detector::{Shell, ShellDetector};
