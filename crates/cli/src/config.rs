//! Configuration file loading and environment variable handling.
//!
//! Precedence: CLI args > Environment vars > Config file > Defaults

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use normcheck_core::registry::{DEFAULT_DATA_DIR, DEFAULT_EXCLUDED};

/// Default config file content for `--config-init`.
pub const DEFAULT_CONFIG: &str = r#"# normcheck configuration
# See: normcheck --help for all options

# Directory holding <lang>.txt fixture files
data_dir = "data/test_cases"

# External normalizer program. It receives the input on stdin and
# NORMCHECK_LANG / NORMCHECK_CATEGORY in its environment, and prints
# the normalized text on stdout.
# normalizer = "python3"
# normalizer_args = ["-m", "my_normalizer"]

# Per-case normalizer timeout in seconds
timeout_secs = 30

# Fail cases that have no expected output field
strict = false

# Disable colored output
no_color = false

# Languages that are never run, even when a fixture file exists
exclude_langs = ["en_kaggle"]
"#;

/// Default per-case timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration loaded from file and environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub normalizer: Option<String>,
    pub normalizer_args: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub strict: Option<bool>,
    pub no_color: Option<bool>,
    pub exclude_langs: Option<Vec<String>>,
}

impl Config {
    /// Get the config file path.
    ///
    /// `NORMCHECK_CONFIG` overrides the location. Otherwise:
    /// - Linux/macOS: `~/.config/normcheck/config.toml`
    /// - Windows: `%APPDATA%\normcheck\config.toml`
    pub fn path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os("NORMCHECK_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|p| p.join("normcheck").join("config.toml"))
    }

    /// Load config from file. Returns default if file doesn't exist.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };

        let Ok(contents) = fs::read_to_string(&path) else {
            return Self::default();
        };

        toml::from_str(&contents).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Read value from environment variable.
    fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
        std::env::var(name).ok()?.parse().ok()
    }

    /// Get data_dir with precedence: env > config > default.
    pub fn data_dir(&self) -> PathBuf {
        std::env::var_os("NORMCHECK_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// Get normalizer program with precedence: env > config.
    pub fn normalizer(&self) -> Option<String> {
        std::env::var("NORMCHECK_NORMALIZER")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.normalizer.clone())
    }

    /// Arguments for the normalizer program (config only).
    pub fn normalizer_args(&self) -> Vec<String> {
        self.normalizer_args.clone().unwrap_or_default()
    }

    /// Read a boolean flag from an environment variable.
    ///
    /// Accepts `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`, any case.
    /// Anything else is ignored.
    fn env_flag(name: &str) -> Option<bool> {
        let value = std::env::var(name).ok()?;
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    /// Get timeout_secs with precedence: env > config > default.
    ///
    /// A zero timeout from either source is ignored.
    pub fn timeout_secs(&self) -> u64 {
        Self::env_var("NORMCHECK_TIMEOUT")
            .filter(|&t| t > 0)
            .or(self.timeout_secs.filter(|&t| t > 0))
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Get strict with precedence: env > config > default.
    pub fn strict(&self) -> bool {
        Self::env_flag("NORMCHECK_STRICT")
            .or(self.strict)
            .unwrap_or(false)
    }

    /// Get no_color with precedence: env > config > default.
    ///
    /// Respects the `NO_COLOR` standard (https://no-color.org/).
    pub fn no_color(&self) -> bool {
        // NO_COLOR is a standard - presence means disable color
        if std::env::var("NO_COLOR").is_ok() {
            return true;
        }
        Self::env_flag("NORMCHECK_NO_COLOR")
            .or(self.no_color)
            .unwrap_or(false)
    }

    /// Languages never run (config > default).
    pub fn exclude_langs(&self) -> Vec<String> {
        self.exclude_langs.clone().unwrap_or_else(|| {
            DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect()
        })
    }
}

/// Create a default config file at the standard location.
pub fn init_config() -> Result<PathBuf, String> {
    let path = Config::path().ok_or("Cannot determine config directory")?;

    if path.exists() {
        return Err(format!("Config file already exists: {}", path.display()));
    }

    // Create parent directory
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create directory: {}", e))?;
    }

    fs::write(&path, DEFAULT_CONFIG).map_err(|e| format!("Failed to write config: {}", e))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid_toml() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).expect("DEFAULT_CONFIG should parse");
        assert_eq!(config.data_dir, Some(PathBuf::from("data/test_cases")));
        assert_eq!(config.normalizer, None);
        assert_eq!(config.timeout_secs, Some(30));
        assert_eq!(config.strict, Some(false));
        assert_eq!(config.no_color, Some(false));
        assert_eq!(config.exclude_langs, Some(vec!["en_kaggle".to_string()]));
    }

    #[test]
    #[serial]
    fn test_partial_config() {
        let toml = r#"
normalizer = "python3"
normalizer_args = ["-m", "indic_norm"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.normalizer(), Some("python3".to_string()));
        assert_eq!(config.normalizer_args(), vec!["-m", "indic_norm"]);

        // Getters should use defaults for missing values
        assert_eq!(config.timeout_secs(), 30);
        assert!(!config.strict());
        assert_eq!(config.data_dir(), PathBuf::from("data/test_cases"));
        assert_eq!(config.exclude_langs(), vec!["en_kaggle".to_string()]);
    }

    #[test]
    #[serial]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.timeout_secs(), DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.normalizer(), None);
        assert!(config.normalizer_args().is_empty());
    }

    #[test]
    #[serial]
    fn test_env_overrides_config() {
        let config: Config = toml::from_str("timeout_secs = 5\nnormalizer = \"from-file\"").unwrap();

        std::env::set_var("NORMCHECK_TIMEOUT", "9");
        std::env::set_var("NORMCHECK_NORMALIZER", "from-env");
        std::env::set_var("NORMCHECK_STRICT", "true");
        let timeout = config.timeout_secs();
        let normalizer = config.normalizer();
        let strict = config.strict();
        std::env::remove_var("NORMCHECK_TIMEOUT");
        std::env::remove_var("NORMCHECK_NORMALIZER");
        std::env::remove_var("NORMCHECK_STRICT");

        assert_eq!(timeout, 9);
        assert_eq!(normalizer, Some("from-env".to_string()));
        assert!(strict);
    }

    #[test]
    #[serial]
    fn test_unparseable_env_falls_back() {
        let config: Config = toml::from_str("timeout_secs = 5").unwrap();
        std::env::set_var("NORMCHECK_TIMEOUT", "soon");
        let timeout = config.timeout_secs();
        std::env::remove_var("NORMCHECK_TIMEOUT");
        assert_eq!(timeout, 5);
    }

    #[test]
    #[serial]
    fn test_zero_timeout_ignored() {
        let config: Config = toml::from_str("timeout_secs = 0").unwrap();
        assert_eq!(config.timeout_secs(), DEFAULT_TIMEOUT_SECS);

        let config: Config = toml::from_str("timeout_secs = 7").unwrap();
        std::env::set_var("NORMCHECK_TIMEOUT", "0");
        let timeout = config.timeout_secs();
        std::env::remove_var("NORMCHECK_TIMEOUT");
        assert_eq!(timeout, 7);
    }

    #[test]
    #[serial]
    fn test_flag_env_values() {
        let config: Config = toml::from_str("strict = true\nno_color = true").unwrap();
        std::env::remove_var("NO_COLOR");

        let mut seen = Vec::new();
        for value in ["1", "YES", "on", "0", "false", "Off", "maybe"] {
            std::env::set_var("NORMCHECK_STRICT", value);
            std::env::set_var("NORMCHECK_NO_COLOR", value);
            seen.push((config.strict(), config.no_color()));
        }
        std::env::remove_var("NORMCHECK_STRICT");
        std::env::remove_var("NORMCHECK_NO_COLOR");

        // Unrecognized values fall back to the config file.
        assert_eq!(
            seen,
            vec![
                (true, true),
                (true, true),
                (true, true),
                (false, false),
                (false, false),
                (false, false),
                (true, true),
            ]
        );
    }

    #[test]
    #[serial]
    fn test_init_config_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        std::env::set_var("NORMCHECK_CONFIG", &path);

        let created = init_config();
        let again = init_config();
        std::env::remove_var("NORMCHECK_CONFIG");

        assert_eq!(created.unwrap(), path);
        assert!(again.unwrap_err().contains("already exists"));
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
