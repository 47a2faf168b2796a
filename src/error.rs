use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no hosts found")]
    NoHosts,

    #[error("invalid choice")]
    InvalidChoice,

    #[error("No host selected.")]
    NoHostSelected,

    /// The fuzzy finder exited non-zero or could not be driven.
    #[error("host selection failed: {0}")]
    Selection(String),

    #[error("No readable SSH config at {}", .0.display())]
    ConfigUnreadable(PathBuf),

    #[error("Host \"{alias}\" already exists in {}. Use -f to overwrite.", .path.display())]
    Conflict { alias: String, path: PathBuf },

    #[error("port must be a number between 1 and 65535 (got {0:?})")]
    InvalidPort(String),

    #[error("host alias must not contain whitespace (got {0:?})")]
    InvalidAlias(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Process exit status for this error. A conflicting alias is reported
    /// with 2 so scripts can tell it apart from real failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Conflict { .. } => 2,
            _ => 1,
        }
    }
}

/// Exit status for an error surfaced through `anyhow` in the binaries.
pub fn exit_code_of(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<Error>().map_or(1, Error::exit_code)
}
