use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Connect,
    Transfer,
}

impl Mode {
    pub fn program(self) -> &'static str {
        match self {
            Mode::Connect => "ssh",
            Mode::Transfer => "sftp",
        }
    }
}

/// Program and arguments for reaching `alias`. Passthrough arguments only
/// apply to `ssh`.
pub fn connection_command(alias: &str, mode: Mode, passthrough: &[String]) -> (&'static str, Vec<String>) {
    let mut args = vec![alias.to_string()];
    if mode == Mode::Connect {
        args.extend_from_slice(passthrough);
    }
    (mode.program(), args)
}

/// Runs the connection in the foreground with inherited stdio and returns
/// its exit code. A child killed by a signal counts as 1.
pub fn launch(alias: &str, mode: Mode, passthrough: &[String]) -> Result<i32> {
    let (program, args) = connection_command(alias, mode, passthrough);
    debug!("launching {program} {}", args.join(" "));

    let status = Command::new(program)
        .args(&args)
        .status()
        .map_err(|source| Error::Launch {
            program: program.to_string(),
            source,
        })?;

    Ok(status.code().unwrap_or(1))
}
