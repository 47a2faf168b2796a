use std::{
    env,
    ffi::OsStr,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use log::debug;

/// Captured result of a finished child process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Captured {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
}

/// Runs helper programs whose output we need (fzf, ssh-keyscan).
pub trait CommandRunner {
    /// Whether `program` can be found on the search path.
    fn is_available(&self, program: &str) -> bool;

    /// Runs `program` to completion, feeding `input` on stdin when given.
    /// Stderr is inherited so interactive tools can draw.
    fn capture(&self, program: &str, args: &[String], input: Option<&str>) -> io::Result<Captured>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn is_available(&self, program: &str) -> bool {
        find_in_path(program, env::var_os("PATH").as_deref()).is_some()
    }

    fn capture(&self, program: &str, args: &[String], input: Option<&str>) -> io::Result<Captured> {
        debug!("running {program} {}", args.join(" "));
        let mut child = Command::new(program)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin.write_all(input.as_bytes())?;
            // stdin is dropped here so the child sees EOF
        }

        let output = child.wait_with_output()?;
        Ok(Captured {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Looks `program` up in a `PATH`-style list of directories.
pub fn find_in_path(program: &str, path: Option<&OsStr>) -> Option<PathBuf> {
    if program.contains(std::path::MAIN_SEPARATOR) {
        let candidate = PathBuf::from(program);
        return is_executable(&candidate).then_some(candidate);
    }
    env::split_paths(path?)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    match path.metadata() {
        #[cfg(unix)]
        Ok(meta) => {
            use std::os::unix::fs::PermissionsExt;
            meta.is_file() && meta.permissions().mode() & 0o111 != 0
        }
        #[cfg(not(unix))]
        Ok(meta) => meta.is_file(),
        Err(_) => false,
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::{cell::RefCell, collections::VecDeque};

    use super::*;

    /// Records invocations and replays canned results.
    #[derive(Default)]
    pub struct FakeRunner {
        pub available: Vec<String>,
        pub results: RefCell<VecDeque<io::Result<Captured>>>,
        pub calls: RefCell<Vec<(String, Vec<String>, Option<String>)>>,
    }

    impl FakeRunner {
        pub fn with(available: &[&str], results: Vec<io::Result<Captured>>) -> Self {
            Self {
                available: available.iter().map(|s| s.to_string()).collect(),
                results: RefCell::new(results.into()),
                calls: RefCell::default(),
            }
        }

        pub fn ok(stdout: &str) -> io::Result<Captured> {
            Ok(Captured {
                success: true,
                code: Some(0),
                stdout: stdout.to_string(),
            })
        }

        pub fn failed(code: i32) -> io::Result<Captured> {
            Ok(Captured {
                success: false,
                code: Some(code),
                stdout: String::new(),
            })
        }
    }

    impl CommandRunner for FakeRunner {
        fn is_available(&self, program: &str) -> bool {
            self.available.iter().any(|p| p == program)
        }

        fn capture(
            &self,
            program: &str,
            args: &[String],
            input: Option<&str>,
        ) -> io::Result<Captured> {
            self.calls.borrow_mut().push((
                program.to_string(),
                args.to_vec(),
                input.map(String::from),
            ));
            self.results
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(io::Error::new(io::ErrorKind::NotFound, program)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_find_in_path_requires_exec_bit() {
        use std::{fs, os::unix::fs::PermissionsExt};

        let dir = TempDir::new().unwrap();
        let tool = dir.path().join("fzf");
        fs::write(&tool, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o644)).unwrap();

        let path = env::join_paths([dir.path()]).unwrap();
        assert_eq!(find_in_path("fzf", Some(path.as_os_str())), None);

        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(find_in_path("fzf", Some(path.as_os_str())), Some(tool));
    }

    #[test]
    fn test_find_in_path_without_path() {
        assert_eq!(find_in_path("fzf", None), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_feeds_stdin() {
        let out = SystemRunner
            .capture("cat", &[], Some("a\nb\n"))
            .unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "a\nb\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_reports_failure() {
        let out = SystemRunner.capture("false", &[], None).unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(1));
    }
}
