use std::{
    collections::BTreeSet,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use log::{debug, info};
use regex::Regex;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 22;

const INDENT: &str = "    ";
const BACKUP_STAMP: &str = "%Y%m%d-%H%M%S";

/// A host block as the appender writes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostEntry {
    pub alias: String,
    pub hostname: String,
    pub user: String,
    pub port: u16,
    pub identity_file: String,
    pub proxy_jump: String,
}

impl HostEntry {
    /// Renders the block appended to the config, leading blank line included.
    pub fn render(&self) -> String {
        let mut block = format!(
            "\nHost {}\n{INDENT}HostName {}\n{INDENT}User {}\n",
            self.alias, self.hostname, self.user
        );
        if self.port != DEFAULT_PORT {
            block.push_str(&format!("{INDENT}Port {}\n", self.port));
        }
        if !self.identity_file.is_empty() {
            block.push_str(&format!("{INDENT}IdentityFile {}\n", self.identity_file));
        }
        if !self.proxy_jump.is_empty() {
            block.push_str(&format!("{INDENT}ProxyJump {}\n", self.proxy_jump));
        }
        block
    }
}

/// Returns the tokens after the directive if `line` is a `Host` line.
///
/// Comments and blank lines are never host lines. The returned list may be
/// empty for a bare `Host` with no patterns.
pub fn host_patterns(line: &str) -> Option<Vec<&str>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut fields = line.split_whitespace();
    match fields.next() {
        Some(directive) if directive.eq_ignore_ascii_case("host") => Some(fields.collect()),
        _ => None,
    }
}

fn is_pattern(token: &str) -> bool {
    token.contains(['*', '?', '!'])
}

/// Sorted, de-duplicated literal aliases declared in `content`.
pub fn list_hosts(content: &str) -> Vec<String> {
    let hosts: BTreeSet<&str> = content
        .lines()
        .filter_map(host_patterns)
        .flatten()
        .filter(|token| !is_pattern(token))
        .collect();

    hosts.into_iter().map(String::from).collect()
}

pub fn retrieve_hosts<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let content = fs::read_to_string(path.as_ref())?;
    let hosts = list_hosts(&content);
    debug!("found {} hosts in {}", hosts.len(), path.as_ref().display());
    Ok(hosts)
}

/// Whether some `Host` line lists `alias` as a whole token. Only the
/// directive is matched case-insensitively, the alias must match exactly.
pub fn alias_exists(content: &str, alias: &str) -> Result<bool> {
    let re = Regex::new(&format!(
        r"(?m)^[ \t]*(?i:host)[ \t]+(?:\S+[ \t]+)*{}(?:[ \t\r]|$)",
        regex::escape(alias)
    ))?;
    Ok(re.is_match(content))
}

/// Line-by-line state for dropping the blocks that belong to one alias.
///
/// A block runs from a matching `Host` line up to the next `Host` line.
pub struct BlockFilter<'a> {
    alias: &'a str,
    inside_matched_block: bool,
}

impl<'a> BlockFilter<'a> {
    pub fn new(alias: &'a str) -> Self {
        Self {
            alias,
            inside_matched_block: false,
        }
    }

    /// Feeds the next line; returns whether it survives.
    pub fn keep(&mut self, line: &str) -> bool {
        if let Some(patterns) = host_patterns(line) {
            self.inside_matched_block = patterns.iter().any(|p| *p == self.alias);
        }
        !self.inside_matched_block
    }
}

/// `content` with every block declaring `alias` removed. Other lines are
/// kept byte for byte.
pub fn remove_alias(content: &str, alias: &str) -> String {
    let mut filter = BlockFilter::new(alias);
    content
        .split('\n')
        .filter(|line| filter.keep(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<config>.<stamp>.bak`, or `<config>.<stamp>.<n>.bak` for `n > 0`.
pub fn backup_path(config: &Path, stamp: &str, n: u32) -> PathBuf {
    let mut name = config.as_os_str().to_os_string();
    if n == 0 {
        name.push(format!(".{stamp}.bak"));
    } else {
        name.push(format!(".{stamp}.{n}.bak"));
    }
    PathBuf::from(name)
}

fn private_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

pub(crate) fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = private_options().create(true).truncate(true).open(path)?;
    file.write_all(data)
}

/// Writes `data` next to `config` under a fresh backup name; an existing
/// backup is never overwritten.
pub fn write_backup(config: &Path, data: &[u8]) -> Result<PathBuf> {
    let stamp = Local::now().format(BACKUP_STAMP).to_string();
    let mut n = 0;
    loop {
        let path = backup_path(config, &stamp, n);
        match private_options().create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(data)?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// The on-disk client config. Parsed fresh on every call.
#[derive(Clone, Debug)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and an empty config if either is missing.
    pub fn ensure_exists(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(parent, fs::Permissions::from_mode(0o700))?;
                }
            }
        }
        if !self.path.exists() {
            write_private(&self.path, b"")?;
        }
        Ok(())
    }

    pub fn hosts(&self) -> Result<Vec<String>> {
        retrieve_hosts(&self.path)
    }

    /// Appends `entry`, replacing an existing block for the same alias when
    /// `force` is set. Returns the backup path if the file was rewritten.
    ///
    /// Without `force` an existing alias yields [`Error::Conflict`] and the
    /// file is left untouched.
    pub fn add_host(&self, entry: &HostEntry, force: bool) -> Result<Option<PathBuf>> {
        let content = fs::read_to_string(&self.path)?;

        let mut backup = None;
        if alias_exists(&content, &entry.alias)? {
            if !force {
                return Err(Error::Conflict {
                    alias: entry.alias.clone(),
                    path: self.path.clone(),
                });
            }
            let path = write_backup(&self.path, content.as_bytes())?;
            info!("backed up {} to {}", self.path.display(), path.display());
            write_private(&self.path, remove_alias(&content, &entry.alias).as_bytes())?;
            backup = Some(path);
        }

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(entry.render().as_bytes())?;
        debug!("appended host {} to {}", entry.alias, self.path.display());

        Ok(backup)
    }
}
