use std::process::ExitCode;

use clap::{ArgAction, Parser};

use crate::{add_host::HostDraft, app::PickerOptions, launch::Mode};

/// Pick a host from your SSH config and connect to it.
#[derive(Parser, Debug)]
#[command(
    name = "ssh-menu",
    version,
    after_help = "Examples:\n  ssh-menu\n  ssh-menu --sftp\n  ssh-menu -- -L 8080:localhost:80"
)]
pub struct MenuArgs {
    /// Open sftp instead of ssh
    #[arg(long)]
    pub sftp: bool,

    /// Just print the chosen host
    #[arg(long)]
    pub print: bool,

    /// Use the built-in picker instead of fzf or the numbered menu
    #[arg(long)]
    pub tui: bool,

    /// Extra arguments for ssh; flags after them are still parsed
    #[arg(value_name = "ARG")]
    pub extra: Vec<String>,

    /// Arguments after `--`, passed to ssh verbatim
    #[arg(last = true, value_name = "SSH_ARGS")]
    pub passthrough: Vec<String>,
}

impl From<MenuArgs> for PickerOptions {
    fn from(args: MenuArgs) -> Self {
        Self {
            mode: if args.sftp { Mode::Transfer } else { Mode::Connect },
            print_only: args.print,
            tui: args.tui,
            passthrough: args.extra.into_iter().chain(args.passthrough).collect(),
        }
    }
}

/// Append a Host entry to your SSH config. Prompts for any missing fields.
#[derive(Parser, Debug)]
#[command(name = "ssh-add-host", version, disable_help_flag = true)]
pub struct AddHostArgs {
    /// Overwrite existing Host alias if it exists
    #[arg(short = 'f')]
    pub force: bool,

    /// Host alias (e.g., web-prod)
    #[arg(short = 'a', value_name = "alias")]
    pub alias: Option<String>,

    /// HostName (IP or DNS)
    #[arg(short = 'h', value_name = "hostname")]
    pub hostname: Option<String>,

    /// SSH user (e.g., ubuntu)
    #[arg(short = 'u', value_name = "user")]
    pub user: Option<String>,

    /// Port (default: 22)
    #[arg(short = 'p', value_name = "port")]
    pub port: Option<String>,

    /// Path to private key (e.g., ~/.ssh/id_ed25519)
    #[arg(short = 'i', value_name = "identityfile")]
    pub identity_file: Option<String>,

    /// ProxyJump (e.g., bastion)
    #[arg(short = 'P', value_name = "proxyjump")]
    pub proxy_jump: Option<String>,

    /// Run ssh-keyscan to pre-populate known_hosts (default: yes)
    #[arg(long = "add-known-hosts", value_name = "yes|no", value_parser = ["yes", "no"], ignore_case = true)]
    pub add_known_hosts: Option<String>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl From<AddHostArgs> for HostDraft {
    fn from(args: AddHostArgs) -> Self {
        Self {
            force: args.force,
            alias: args.alias,
            hostname: args.hostname,
            user: args.user,
            port: args.port,
            identity_file: args.identity_file,
            proxy_jump: args.proxy_jump,
            add_known_hosts: args.add_known_hosts,
        }
    }
}

/// Parses the command line. Usage errors exit 1 because 2 is reserved for
/// an existing alias; `--help` and `--version` exit 0.
pub fn parse<T: Parser>() -> Result<T, ExitCode> {
    T::try_parse().map_err(|err| {
        let _ = err.print();
        if err.use_stderr() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    })
}
