mod dispatcher;
mod dry_run_launcher;
mod shell_launcher;
mod r#trait;

pub use self::dispatcher::{CommandDispatcher, FireOutcome};
pub use self::r#trait::create_launcher;
#[cfg(test)]
pub use self::r#trait::{ChildHandle, ChildStatus, CommandLauncher};
#[cfg(test)]
pub use self::shell_launcher::ShellLauncher;
