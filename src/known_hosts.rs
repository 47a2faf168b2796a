use std::{
    collections::BTreeSet,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};

use log::debug;

use crate::{runner::CommandRunner, sshconfig::write_private, sshconfig::DEFAULT_PORT};

const KEYSCAN: &str = "ssh-keyscan";
const KEYSCAN_TIMEOUT_SECS: u32 = 5;

pub fn keyscan_args(hostname: &str, port: u16) -> Vec<String> {
    let mut args = vec!["-T".to_string(), KEYSCAN_TIMEOUT_SECS.to_string()];
    if port != DEFAULT_PORT {
        args.push("-p".to_string());
        args.push(port.to_string());
    }
    args.push(hostname.to_string());
    args
}

/// Sorted unique non-blank lines of `content`, newline terminated.
pub fn dedup_lines(content: &str) -> String {
    let lines: BTreeSet<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    let mut out = String::with_capacity(content.len());
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Scans `hostname` and merges its keys into `known_hosts`.
///
/// Best effort: a failed or timed out scan leaves the file alone and is only
/// reported at debug level. Returns whether anything was written.
pub fn populate(
    runner: &impl CommandRunner,
    known_hosts: &Path,
    hostname: &str,
    port: u16,
) -> bool {
    let scanned = match runner.capture(KEYSCAN, &keyscan_args(hostname, port), None) {
        Ok(out) if out.success => out.stdout,
        Ok(out) => {
            debug!("{KEYSCAN} for {hostname} exited with {:?}", out.code);
            return false;
        }
        Err(e) => {
            debug!("{KEYSCAN} for {hostname} failed: {e}");
            return false;
        }
    };

    match merge(known_hosts, &scanned) {
        Ok(()) => true,
        Err(e) => {
            debug!("updating {} failed: {e}", known_hosts.display());
            false
        }
    }
}

/// Appends `scanned` to the file, then rewrites it sorted and de-duplicated.
pub fn merge(known_hosts: &Path, scanned: &str) -> io::Result<()> {
    if let Some(parent) = known_hosts.parent() {
        fs::create_dir_all(parent)?;
    }
    {
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(known_hosts)?;
        file.write_all(b"\n")?;
        file.write_all(scanned.as_bytes())?;
    }

    let content = fs::read_to_string(known_hosts)?;
    write_private(known_hosts, dedup_lines(&content).as_bytes())
}
