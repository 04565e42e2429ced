pub mod collector;
pub mod discovery;
pub mod error;
pub mod launch;
pub mod prompt;
pub mod session;

pub use collector::{resolve_threshold, Collector};
pub use discovery::{discover_references, ReferenceChoice};
pub use error::CollectError;
pub use launch::{InProcessLauncher, RunLauncher, SubprocessLauncher};
pub use prompt::{Interrupt, InterruptibleInput, Prompter, TerminalPrompter};
pub use session::{run_session, SessionOutcome};
