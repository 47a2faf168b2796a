use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::Context;
use log::info;

use crate::{
    error::{Error, Result},
    known_hosts,
    paths::Paths,
    prompt::Prompter,
    runner::CommandRunner,
    sshconfig::{ConfigFile, HostEntry, DEFAULT_PORT},
};

/// Host fields as given on the command line; unset ones get prompted for.
#[derive(Clone, Debug, Default)]
pub struct HostDraft {
    pub force: bool,
    pub alias: Option<String>,
    pub hostname: Option<String>,
    pub user: Option<String>,
    pub port: Option<String>,
    pub identity_file: Option<String>,
    pub proxy_jump: Option<String>,
    pub add_known_hosts: Option<String>,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct Added {
    pub alias: String,
    pub config: PathBuf,
    pub backup: Option<PathBuf>,
    pub known_hosts_updated: bool,
}

pub fn parse_port(port: &str) -> Result<u16> {
    match port.trim().parse::<u16>() {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(Error::InvalidPort(port.to_string())),
    }
}

fn required(value: String, field: &'static str) -> Result<String> {
    if value.is_empty() {
        Err(Error::MissingField(field))
    } else {
        Ok(value)
    }
}

impl HostDraft {
    /// Prompts for whatever is unset, then validates. Returns the entry and
    /// whether known_hosts should be populated.
    pub fn complete<R: BufRead, W: Write>(
        mut self,
        prompter: &mut Prompter<R, W>,
        default_user: &str,
    ) -> Result<(HostEntry, bool)> {
        let alias = prompter.fill(&mut self.alias, "Host alias (unique, no spaces)", "")?;
        let hostname = prompter.fill(&mut self.hostname, "HostName (DNS or IP)", "")?;
        let user = prompter.fill(&mut self.user, "User", default_user)?;
        let port = prompter.fill(&mut self.port, "Port", &DEFAULT_PORT.to_string())?;
        let identity_file = prompter.fill(
            &mut self.identity_file,
            "IdentityFile path (optional, blank to skip)",
            "",
        )?;
        let proxy_jump =
            prompter.fill(&mut self.proxy_jump, "ProxyJump (optional, blank to skip)", "")?;
        let add_known = prompter.fill(
            &mut self.add_known_hosts,
            "Add to known_hosts via ssh-keyscan? yes/no",
            "yes",
        )?;

        let alias = required(alias, "alias")?;
        if alias.contains(char::is_whitespace) {
            return Err(Error::InvalidAlias(alias));
        }
        let entry = HostEntry {
            alias,
            hostname: required(hostname, "hostname")?,
            user: required(user, "user")?,
            port: parse_port(&required(port, "port")?)?,
            identity_file,
            proxy_jump,
        };

        let add_known = matches!(add_known.to_ascii_lowercase().as_str(), "yes" | "y");
        Ok((entry, add_known))
    }
}

/// Completes the draft, writes the block and optionally scans host keys.
pub fn add_host<R: BufRead, W: Write>(
    draft: HostDraft,
    paths: &Paths,
    runner: &impl CommandRunner,
    prompter: &mut Prompter<R, W>,
    default_user: &str,
) -> anyhow::Result<Added> {
    let force = draft.force;
    let (entry, add_known) = draft.complete(prompter, default_user)?;

    let config = ConfigFile::new(&paths.config);
    config
        .ensure_exists()
        .with_context(|| format!("preparing {}", paths.config.display()))?;
    let backup = config.add_host(&entry, force)?;

    let known_hosts_updated =
        add_known && known_hosts::populate(runner, &paths.known_hosts, &entry.hostname, entry.port);
    if known_hosts_updated {
        info!("updated {}", paths.known_hosts.display());
    }

    Ok(Added {
        alias: entry.alias,
        config: paths.config.clone(),
        backup,
        known_hosts_updated,
    })
}
