//! External command execution.

pub mod command;
pub mod mock;
pub mod platform;

pub use command::{execute, CommandResult, CommandRunner, CommandSpec, SystemRunner};
pub use mock::MockRunner;
pub use platform::{find_in_path, is_elevated};
