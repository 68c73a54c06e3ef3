use crate::{
    command::{Encoding, ProcessOptions},
    error::{Error, Result},
    runner::{Echo, OnException, Runs},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file names, in lookup order within one directory
pub const CONFIG_FILE_NAMES: [&str; 2] = [".runs.json", "runs.json"];

/// A setting that is either switched on/off or carries a prefix string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle {
    Enabled(bool),
    Prefix(String),
}

impl From<Toggle> for Echo {
    fn from(toggle: Toggle) -> Self {
        match toggle {
            Toggle::Enabled(enabled) => Echo::from(enabled),
            Toggle::Prefix(prefix) => Echo::Prefix(prefix),
        }
    }
}

impl From<Toggle> for OnException {
    fn from(toggle: Toggle) -> Self {
        match toggle {
            Toggle::Enabled(suppress) => OnException::from(suppress),
            Toggle::Prefix(prefix) => OnException::Prefix(prefix),
        }
    }
}

/// Defaults for running blocks, read from `.runs.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo: Option<Toggle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_exception: Option<Toggle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default)]
    pub shell: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl RunsConfig {
    /// Load a config file. A relative `cwd` is resolved against the file's directory.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {}: {e}", path.display())))?;

        if let Some(cwd) = config.cwd.take() {
            config.cwd = Some(match path.parent() {
                Some(parent) if cwd.is_relative() => parent.join(cwd),
                _ => cwd,
            });
        }
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Load the nearest config at or above `start_path`, or the defaults.
    pub fn discover(start_path: &Path) -> Result<Self> {
        match Self::find_config_file(start_path) {
            Some(path) => {
                debug!("Using config file: {}", path.display());
                Self::load_from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Layer these settings onto `runs`.
    pub fn apply(&self, runs: Runs) -> Result<Runs> {
        let mut runs = runs;
        if let Some(echo) = &self.echo {
            runs = runs.echo(echo.clone());
        }
        if let Some(policy) = &self.on_exception {
            runs = runs.on_exception(policy.clone());
        }
        if let Some(encoding) = &self.encoding {
            runs = runs.encoding(encoding.parse::<Encoding>()?);
        }

        let mut options: ProcessOptions = runs.process_options().clone();
        options.shell |= self.shell;
        if let Some(cwd) = &self.cwd {
            options.cwd = Some(cwd.clone());
        }
        options
            .env
            .extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));

        Ok(runs.options(options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Primitive;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_parsing() {
        let config: RunsConfig = serde_json::from_str(
            r#"{
                "echo": "+",
                "on_exception": true,
                "encoding": "utf8-lossy",
                "shell": true,
                "env": {"A": "1"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.echo, Some(Toggle::Prefix("+".to_string())));
        assert_eq!(config.on_exception, Some(Toggle::Enabled(true)));
        assert!(config.shell);
        assert_eq!(config.env.get("A").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: RunsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RunsConfig::default());
    }

    #[test]
    fn test_apply() {
        let config = RunsConfig {
            echo: Some(Toggle::Enabled(true)),
            on_exception: Some(Toggle::Prefix("!".to_string())),
            encoding: Some("bytes".to_string()),
            shell: true,
            cwd: Some(PathBuf::from("/tmp")),
            env: BTreeMap::from([("K".to_string(), "V".to_string())]),
        };

        let runs = config.apply(Runs::new(Primitive::CheckOutput)).unwrap();
        assert_eq!(runs.primitive(), Primitive::CheckOutput);
        assert_eq!(runs.encoding_kind(), Encoding::Bytes);
        assert!(runs.process_options().shell);
        assert_eq!(runs.process_options().cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(
            runs.process_options().env,
            vec![("K".to_string(), "V".to_string())]
        );
        let rendered = format!("{runs:?}");
        assert!(rendered.contains("echo: Marker"));
        assert!(rendered.contains("on_exception: Prefix(\"!\")"));
    }

    #[test]
    fn test_bad_encoding_is_misuse() {
        let config = RunsConfig {
            encoding: Some("ebcdic".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.apply(Runs::default()), Err(Error::Misuse(_))));
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(RunsConfig::find_config_file(&nested), None);

        fs::write(root.join(".runs.json"), r#"{"shell": true, "cwd": "work"}"#).unwrap();
        assert_eq!(
            RunsConfig::find_config_file(&nested),
            Some(root.join(".runs.json"))
        );

        let config = RunsConfig::discover(&nested).unwrap();
        assert!(config.shell);
        assert_eq!(config.cwd, Some(root.join("work")));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("runs.json");
        let config = RunsConfig {
            echo: Some(Toggle::Enabled(false)),
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();
        assert_eq!(RunsConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".runs.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            RunsConfig::load_from_file(&path),
            Err(Error::ConfigError(_))
        ));
    }
}
