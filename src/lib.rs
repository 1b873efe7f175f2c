// Library surface for the binary and integration tests.
pub mod app_dirs;
pub mod error;
pub mod install;
pub mod session;
pub mod store;
pub mod view;

pub use error::{AgentError, Result};
pub use install::{find_writable_target, install, InstallResult};
pub use session::{SessionPhase, SessionRecord, SessionStatus};
pub use store::{FileSessionStore, SessionStore};
