/// Core functionality modules
///
/// The error mailbox shared with the shell hooks, plus what the CLI needs
/// around it: error text analysis, system context, history search and
/// diagnostics.

pub mod context;
pub mod doctor;
pub mod error_parser;
pub mod mailbox;
pub mod searcher;

pub use context::SystemContext;
pub use error_parser::{Diagnosis, ErrorCategory, ErrorParser};
pub use mailbox::{ErrorReport, Mailbox, MailboxPaths, Slot};
pub use searcher::Searcher;
