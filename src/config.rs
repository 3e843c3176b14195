use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional connection defaults from `~/.config/pveadm/config.toml`.
/// Flags and environment always win over the file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub host: Option<String>,
    pub user: Option<String>,
}

impl Config {
    /// Load the config file if one exists; a missing file is not an error.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid config in {}", path.display()))
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("pveadm").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_host_and_user() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"pve1\"\nuser = \"automation\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.host.as_deref(), Some("pve1"));
        assert_eq!(config.user.as_deref(), Some("automation"));
    }

    #[test]
    fn fields_are_optional() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"pve1\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.host.as_deref(), Some("pve1"));
        assert!(config.user.is_none());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = [unclosed").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}
