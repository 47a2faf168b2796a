use std::{env, ffi::OsString, path::PathBuf};

use crate::error::{Error, Result};

pub const CONFIG_ENV: &str = "SSH_CONFIG";

/// Locations of the two files these tools read and rewrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paths {
    pub config: PathBuf,
    pub known_hosts: PathBuf,
}

impl Paths {
    pub fn from_env() -> Result<Self> {
        Self::from_parts(dirs::home_dir(), env::var_os(CONFIG_ENV))
    }

    /// An empty `ssh_config` counts as unset.
    pub fn from_parts(home: Option<PathBuf>, ssh_config: Option<OsString>) -> Result<Self> {
        let ssh_dir = home.map(|home| home.join(".ssh")).ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cannot determine home directory",
            ))
        })?;
        let config = match ssh_config {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => ssh_dir.join("config"),
        };

        Ok(Self {
            config,
            known_hosts: ssh_dir.join("known_hosts"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_under_home() {
        let paths = Paths::from_parts(Some(PathBuf::from("/home/u")), None).unwrap();
        assert_eq!(paths.config, PathBuf::from("/home/u/.ssh/config"));
        assert_eq!(paths.known_hosts, PathBuf::from("/home/u/.ssh/known_hosts"));
    }

    #[test]
    fn test_ssh_config_overrides_config_only() {
        let paths = Paths::from_parts(
            Some(PathBuf::from("/home/u")),
            Some(OsString::from("/etc/ssh/alt_config")),
        )
        .unwrap();
        assert_eq!(paths.config, PathBuf::from("/etc/ssh/alt_config"));
        assert_eq!(paths.known_hosts, PathBuf::from("/home/u/.ssh/known_hosts"));
    }

    #[test]
    fn test_empty_ssh_config_falls_back() {
        let paths =
            Paths::from_parts(Some(PathBuf::from("/home/u")), Some(OsString::new())).unwrap();
        assert_eq!(paths.config, PathBuf::from("/home/u/.ssh/config"));
    }

    #[test]
    fn test_no_home_directory() {
        let err = Paths::from_parts(None, Some(OsString::from("/tmp/config"))).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
