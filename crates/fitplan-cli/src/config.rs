//! Configuration file management for fitplan.
//!
//! Provides a TOML-based config file at `~/.config/fitplan/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use fitplan_core::policy::LifetimePolicy;
use fitplan_db::config::DbConfig;
use fitplan_db::models::PlanKind;

/// Overrides the generator command (program and arguments, whitespace
/// separated).
pub const GENERATOR_ENV_VAR: &str = "FITPLAN_GENERATOR_COMMAND";
/// Overrides the catalog file path.
pub const CATALOG_ENV_VAR: &str = "FITPLAN_CATALOG";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogSection>,
    #[serde(default)]
    pub policy: PolicySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

/// External plan generator: a command that reads a prompt on stdin and
/// writes the plan JSON to stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSection {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Recorded as the plan's generator; defaults to the command name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Recorded as the plan's generator version.
    #[serde(default = "default_generator_version")]
    pub version: String,
    /// Kill the command if it runs longer than this.
    #[serde(default = "default_generator_timeout")]
    pub timeout_secs: u64,
}

fn default_generator_version() -> String {
    "1".to_owned()
}

fn default_generator_timeout() -> u64 {
    120
}

impl GeneratorSection {
    /// Parse `"program arg1 arg2"` as given in the environment.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_owned);
        let command = parts.next()?;
        Some(Self {
            command,
            args: parts.collect(),
            name: None,
            version: default_generator_version(),
            timeout_secs: default_generator_timeout(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSection {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySection {
    /// Plan kinds a user may generate only once.
    pub once_per_lifetime: Vec<PlanKind>,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            once_per_lifetime: vec![PlanKind::Workout],
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the fitplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/fitplan` or `~/.config/fitplan`.
/// We intentionally ignore the platform-specific `dirs::config_dir()`
/// (which returns `~/Library/Application Support` on macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("fitplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fitplan")
}

/// Return the path to the fitplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix, since the database URL may carry
/// a password.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct FitplanConfig {
    pub db_config: DbConfig,
    pub generator: Option<GeneratorSection>,
    pub catalog_path: Option<PathBuf>,
    pub policy: LifetimePolicy,
}

impl FitplanConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `FITPLAN_DATABASE_URL` env > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Generator: `FITPLAN_GENERATOR_COMMAND` env > `[generator]` > none
    /// - Catalog: `cli_catalog` > `FITPLAN_CATALOG` env > `catalog.path` > built-in
    /// - Policy: `policy.once_per_lifetime` > workout only
    ///
    /// A missing config file is not an error; a malformed one is.
    pub fn resolve(cli_db_url: Option<&str>, cli_catalog: Option<&str>) -> Result<Self> {
        let file_config = if config_path().exists() {
            Some(load_config()?)
        } else {
            None
        };

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let generator = match std::env::var(GENERATOR_ENV_VAR) {
            Ok(line) => GeneratorSection::from_command_line(&line),
            Err(_) => file_config.as_ref().and_then(|c| c.generator.clone()),
        };

        let catalog_path = if let Some(path) = cli_catalog {
            Some(PathBuf::from(path))
        } else if let Ok(path) = std::env::var(CATALOG_ENV_VAR) {
            Some(PathBuf::from(path))
        } else {
            file_config
                .as_ref()
                .and_then(|c| c.catalog.as_ref())
                .map(|c| c.path.clone())
        };

        let policy = file_config
            .map(|c| c.policy)
            .unwrap_or_default()
            .once_per_lifetime;

        Ok(Self {
            db_config: DbConfig::new(db_url),
            generator,
            catalog_path,
            policy: LifetimePolicy::new(policy),
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::lock_env;

    /// Point XDG_CONFIG_HOME at a fresh temp dir and clear fitplan env vars.
    /// Returns the dir, which must outlive the test.
    fn isolated_env() -> tempfile::TempDir {
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };
        unsafe { std::env::remove_var(DbConfig::ENV_VAR) };
        unsafe { std::env::remove_var(GENERATOR_ENV_VAR) };
        unsafe { std::env::remove_var(CATALOG_ENV_VAR) };
        tmp
    }

    fn sample() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "postgresql://filehost:5432/filedb".to_string(),
            },
            generator: Some(GeneratorSection {
                command: "llm-plan".to_string(),
                args: vec!["--json".to_string()],
                name: Some("gpt-4.1-mini".to_string()),
                version: "prompt-2".to_string(),
                timeout_secs: 30,
            }),
            catalog: None,
            policy: PolicySection {
                once_per_lifetime: vec![PlanKind::Meal, PlanKind::Workout],
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let _tmp = isolated_env();

        save_config(&sample()).unwrap();
        assert_eq!(load_config().unwrap(), sample());
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let _tmp = isolated_env();

        save_config(&sample()).unwrap();
        let meta = std::fs::metadata(config_path()).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn minimal_file_gets_default_policy() {
        let config: ConfigFile = toml::from_str("[database]\nurl = \"postgresql://x/y\"\n").unwrap();
        assert_eq!(config.generator, None);
        assert_eq!(config.policy.once_per_lifetime, [PlanKind::Workout]);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        save_config(&sample()).unwrap();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };

        let config = FitplanConfig::resolve(Some("postgresql://cli:5432/clidb"), None).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");

        unsafe { std::env::remove_var(DbConfig::ENV_VAR) };
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        save_config(&sample()).unwrap();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };
        unsafe { std::env::set_var(GENERATOR_ENV_VAR, "other-gen --fast") };

        let config = FitplanConfig::resolve(None, None).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://env:5432/envdb");
        let generator = config.generator.unwrap();
        assert_eq!(generator.command, "other-gen");
        assert_eq!(generator.args, ["--fast"]);

        unsafe { std::env::remove_var(DbConfig::ENV_VAR) };
        unsafe { std::env::remove_var(GENERATOR_ENV_VAR) };
    }

    #[test]
    fn resolve_reads_config_file() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        save_config(&sample()).unwrap();

        let config = FitplanConfig::resolve(None, Some("/etc/fitplan/catalog.toml")).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://filehost:5432/filedb");
        assert_eq!(config.generator.unwrap().name.as_deref(), Some("gpt-4.1-mini"));
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/fitplan/catalog.toml"))
        );
        assert!(config.policy.is_limited(PlanKind::Meal));
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        let _tmp = isolated_env();

        let config = FitplanConfig::resolve(None, None).unwrap();
        assert_eq!(config.db_config.database_url, DbConfig::DEFAULT_URL);
        assert!(config.generator.is_none());
        assert!(config.catalog_path.is_none());
        assert_eq!(config.policy, LifetimePolicy::default());
    }

    #[test]
    fn resolve_rejects_malformed_file() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        std::fs::create_dir_all(config_dir()).unwrap();
        std::fs::write(config_path(), "database = 5").unwrap();

        let err = FitplanConfig::resolve(None, None).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("fitplan/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
