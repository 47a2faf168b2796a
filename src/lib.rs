pub mod add_host;
mod app;
pub mod cli;
mod error;
pub mod known_hosts;
pub mod launch;
mod paths;
pub mod prompt;
pub mod runner;
pub mod select;
mod select_box;
pub mod sshconfig;
mod terminal;

pub use app::{App, PickerOptions};
pub use error::{exit_code_of, Error, Result};
pub use paths::Paths;
pub use sshconfig::*;
