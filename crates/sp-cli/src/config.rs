//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Directory `sp export` writes to when no `--output` is given.
    /// Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("sp.db"),
            export_dir: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, the user config file, `config_path`,
    /// then `SP_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("SP_"));

        figment.extract()
    }

    /// Where an export named `file_name` goes by default.
    pub fn export_path(&self, file_name: &str) -> PathBuf {
        self.export_dir
            .as_deref()
            .unwrap_or(Path::new("."))
            .join(file_name)
    }
}

/// Returns the platform-specific config directory for sp.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sp"))
}

/// Returns the platform-specific data directory for sp.
///
/// On Linux: `~/.local/share/sp`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sp"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_sp() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "sp");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("sp.db"));
    }

    #[test]
    fn test_config_file_overrides_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_path = \"/tmp/elsewhere/plan.db\"").unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/elsewhere/plan.db"));
    }

    #[test]
    fn test_missing_config_file_keeps_default() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load_from(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(config.database_path.file_name().unwrap(), "sp.db");
        assert_eq!(config.export_dir, None);
    }

    #[test]
    fn test_export_path_uses_configured_dir() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "export_dir = \"/tmp/plans\"").unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(
            config.export_path("study_plan.xlsx"),
            PathBuf::from("/tmp/plans/study_plan.xlsx")
        );
        assert_eq!(
            Config::default().export_path("study_plan.html"),
            PathBuf::from("./study_plan.html")
        );
    }
}
