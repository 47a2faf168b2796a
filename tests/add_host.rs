use std::{cell::Cell, fs, io, io::Cursor, path::Path};

use sshhosts::{
    add_host::{add_host, HostDraft},
    exit_code_of, list_hosts,
    prompt::Prompter,
    runner::{Captured, CommandRunner},
    Error, Paths,
};
use tempfile::TempDir;

const EXISTING: &str = "\
# managed by hand
Host *
    ServerAliveInterval 30

Host web
    HostName 10.0.0.1
    User deploy

Host web-prod
    HostName 10.0.0.2
    User deploy
";

/// Answers every ssh-keyscan call with a fixed key line.
struct Keyscan {
    calls: Cell<usize>,
}

impl CommandRunner for Keyscan {
    fn is_available(&self, _program: &str) -> bool {
        true
    }

    fn capture(&self, program: &str, args: &[String], _input: Option<&str>) -> io::Result<Captured> {
        assert_eq!(program, "ssh-keyscan");
        self.calls.set(self.calls.get() + 1);
        let host = args.last().cloned().unwrap_or_default();
        Ok(Captured {
            success: true,
            code: Some(0),
            stdout: format!("{host} ssh-ed25519 AAAAC3Nz\n"),
        })
    }
}

fn setup() -> (TempDir, Paths) {
    let dir = TempDir::new().unwrap();
    let paths = Paths {
        config: dir.path().join("config"),
        known_hosts: dir.path().join("known_hosts"),
    };
    fs::write(&paths.config, EXISTING).unwrap();
    (dir, paths)
}

fn draft(alias: &str, force: bool) -> HostDraft {
    HostDraft {
        force,
        alias: Some(alias.to_string()),
        hostname: Some("192.168.1.5".to_string()),
        user: Some("ubuntu".to_string()),
        port: Some("22".to_string()),
        identity_file: Some(String::new()),
        proxy_jump: Some(String::new()),
        add_known_hosts: Some("no".to_string()),
    }
}

fn quiet() -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
    Prompter::new(Cursor::new(Vec::new()), Vec::new())
}

fn backups(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".bak"))
        .collect()
}

#[test]
fn new_alias_is_appended_once() {
    let (dir, paths) = setup();
    let runner = Keyscan { calls: Cell::new(0) };

    let added = add_host(draft("db", false), &paths, &runner, &mut quiet(), "me").unwrap();
    assert!(added.backup.is_none());
    assert_eq!(runner.calls.get(), 0);

    let after = fs::read_to_string(&paths.config).unwrap();
    assert!(after.starts_with(EXISTING));
    assert!(after.ends_with("\nHost db\n    HostName 192.168.1.5\n    User ubuntu\n"));
    assert_eq!(list_hosts(&after), vec!["db", "web", "web-prod"]);
    assert!(backups(dir.path()).is_empty());
}

#[test]
fn existing_alias_without_force_is_a_conflict() {
    let (dir, paths) = setup();
    let runner = Keyscan { calls: Cell::new(0) };

    let err = add_host(draft("web", false), &paths, &runner, &mut quiet(), "me").unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Conflict { .. })));
    assert_eq!(exit_code_of(&err), 2);

    assert_eq!(fs::read_to_string(&paths.config).unwrap(), EXISTING);
    assert!(backups(dir.path()).is_empty());
}

#[test]
fn force_replaces_only_the_matching_block() {
    let (dir, paths) = setup();
    let runner = Keyscan { calls: Cell::new(0) };

    let added = add_host(draft("web", true), &paths, &runner, &mut quiet(), "me").unwrap();
    let backup = added.backup.unwrap();
    assert_eq!(fs::read_to_string(&backup).unwrap(), EXISTING);
    assert_eq!(backups(dir.path()).len(), 1);

    let after = fs::read_to_string(&paths.config).unwrap();
    assert_eq!(after.matches("Host web\n").count(), 1);
    assert!(!after.contains("10.0.0.1"));
    assert!(after.contains("Host web-prod\n    HostName 10.0.0.2\n"));
    assert!(after.contains("Host *\n    ServerAliveInterval 30\n"));
    assert_eq!(list_hosts(&after), vec!["web", "web-prod"]);
}

#[test]
fn known_hosts_is_populated_and_deduplicated() {
    let (_dir, paths) = setup();
    fs::write(&paths.known_hosts, "zeta ssh-rsa AAAA\n\n192.168.1.5 ssh-ed25519 AAAAC3Nz\n").unwrap();
    let runner = Keyscan { calls: Cell::new(0) };

    let mut d = draft("db", false);
    d.add_known_hosts = Some("yes".to_string());
    let added = add_host(d, &paths, &runner, &mut quiet(), "me").unwrap();

    assert!(added.known_hosts_updated);
    assert_eq!(runner.calls.get(), 1);
    assert_eq!(
        fs::read_to_string(&paths.known_hosts).unwrap(),
        "192.168.1.5 ssh-ed25519 AAAAC3Nz\nzeta ssh-rsa AAAA\n"
    );
}

#[test]
fn missing_config_is_created() {
    let dir = TempDir::new().unwrap();
    let paths = Paths {
        config: dir.path().join(".ssh").join("config"),
        known_hosts: dir.path().join(".ssh").join("known_hosts"),
    };
    let runner = Keyscan { calls: Cell::new(0) };

    add_host(draft("db", false), &paths, &runner, &mut quiet(), "me").unwrap();
    assert_eq!(
        fs::read_to_string(&paths.config).unwrap(),
        "\nHost db\n    HostName 192.168.1.5\n    User ubuntu\n"
    );
}

#[test]
fn invalid_port_fails_before_touching_the_config() {
    let (_dir, paths) = setup();
    let runner = Keyscan { calls: Cell::new(0) };

    let mut d = draft("db", false);
    d.port = Some("0".to_string());
    let err = add_host(d, &paths, &runner, &mut quiet(), "me").unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidPort(_))));
    assert_eq!(exit_code_of(&err), 1);
    assert_eq!(fs::read_to_string(&paths.config).unwrap(), EXISTING);
}
