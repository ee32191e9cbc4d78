use calc_engine::CalculatorSettings;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub calculator: CalculatorSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub format: LoggingFormatConfig,
    #[serde(default)]
    pub levels: LoggingLevelsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingFormatConfig {
    #[serde(default)]
    pub json: bool,
    #[serde(default = "true_default")]
    pub show_time: bool,
    #[serde(default)]
    pub location: LoggingLocationConfig,
}

impl Default for LoggingFormatConfig {
    fn default() -> Self {
        Self {
            json: false,
            show_time: true,
            location: LoggingLocationConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingLocationConfig {
    #[serde(default)]
    pub show_file: bool,
    #[serde(default)]
    pub show_line: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingLevelsConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub info: bool,
    #[serde(default = "true_default")]
    pub warning: bool,
    #[serde(default = "true_default")]
    pub error: bool,
    #[serde(default = "true_default")]
    pub critical: bool,
}

impl Default for LoggingLevelsConfig {
    fn default() -> Self {
        Self {
            debug: false,
            info: false,
            warning: true,
            error: true,
            critical: true,
        }
    }
}

impl LoggingLevelsConfig {
    /// The most verbose level enabled, as an `EnvFilter` directive.
    pub fn directive(&self) -> &'static str {
        let mut level = "off";
        if self.critical || self.error {
            level = "error";
        }
        if self.warning {
            level = "warn";
        }
        if self.info {
            level = "info";
        }
        if self.debug {
            level = "debug";
        }
        level
    }
}

fn true_default() -> bool {
    true
}

/// Base configuration, built into the binary.
const GLOBAL_CONFIG: &str = include_str!("../global_config.yaml");

/// Resolve a config file next to the CLI manifest, falling back to the
/// repo-root relative location.
fn locate(name: &str) -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let base_path = Path::new(&manifest_dir);
    if base_path.join(name).exists() {
        base_path.join(name)
    } else {
        Path::new("crates").join("cli").join(name)
    }
}

/// Load configuration. Later sources win:
/// `global_config.yaml` < `.global_config.yaml` < `extra` < `CALC__*` env.
pub fn load_config(extra: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .add_source(File::from_str(GLOBAL_CONFIG, FileFormat::Yaml))
        .add_source(File::from(locate(".global_config.yaml")).required(false));

    if let Some(path) = extra {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder
        // Map nested env vars like CALC__CALCULATOR__MAX_INPUT_LENGTH=30
        .add_source(Environment::with_prefix("CALC").separator("__"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_engine::operator::SymbolStyle;
    use serial_test::serial;
    use std::env;

    struct EnvGuard(&'static str);
    impl EnvGuard {
        fn new(key: &'static str, val: &str) -> Self {
            env::set_var(key, val);
            Self(key)
        }
    }
    impl Drop for EnvGuard {
        fn drop(&mut self) {
            env::remove_var(self.0);
        }
    }

    #[test]
    #[serial]
    fn test_load_config() {
        let config = load_config(None);
        assert!(config.is_ok(), "Failed to load config: {:?}", config.err());

        let config = config.unwrap();
        assert_eq!(config.calculator.max_input_length, 25);
        assert_eq!(config.calculator.history_symbols, SymbolStyle::Ascii);
        assert_eq!(config.logging.levels.directive(), "warn");
    }

    #[test]
    #[serial]
    fn test_env_var_override_precedence() {
        let _guard = EnvGuard::new("CALC__CALCULATOR__MAX_INPUT_LENGTH", "30");
        let _guard2 = EnvGuard::new("CALC__CALCULATOR__HISTORY_SYMBOLS", "visual");

        let config = load_config(None).expect("Should load config");
        assert_eq!(config.calculator.max_input_length, 30);
        assert_eq!(config.calculator.history_symbols, SymbolStyle::Visual);
    }

    #[test]
    #[serial]
    fn test_type_coercion_boolean() {
        {
            let _guard = EnvGuard::new("CALC__LOGGING__LEVELS__DEBUG", "true");
            let config = load_config(None).expect("Should load config");
            assert_eq!(config.logging.levels.directive(), "debug");
        }

        {
            let _guard = EnvGuard::new("CALC__LOGGING__FORMAT__JSON", "1");
            let config = load_config(None).expect("Should load config");
            assert!(config.logging.format.json);
        }
    }

    #[test]
    #[serial]
    fn test_extra_file_overrides_defaults() {
        let path = env::temp_dir().join("calcctl_test_config.yaml");
        std::fs::write(&path, "calculator:\n  max_input_length: 12\n").unwrap();

        let config = load_config(Some(&path)).expect("Should load config");
        assert_eq!(config.calculator.max_input_length, 12);
        assert_eq!(config.calculator.history_symbols, SymbolStyle::Ascii);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    #[serial]
    fn test_base_config_outside_repo() {
        let cwd = env::current_dir().unwrap();
        let elsewhere = env::temp_dir().join("calcctl_test_cwd");
        std::fs::create_dir_all(&elsewhere).unwrap();
        env::set_current_dir(&elsewhere).unwrap();
        let manifest = env::var("CARGO_MANIFEST_DIR").ok();
        env::remove_var("CARGO_MANIFEST_DIR");

        let config = load_config(None);

        if let Some(dir) = manifest {
            env::set_var("CARGO_MANIFEST_DIR", dir);
        }
        env::set_current_dir(cwd).unwrap();

        let config = config.expect("built-in config should load anywhere");
        assert_eq!(config.calculator.max_input_length, 25);
        assert!(config.logging.format.show_time);
    }

    #[test]
    fn test_level_directive() {
        let mut levels = LoggingLevelsConfig::default();
        assert_eq!(levels.directive(), "warn");
        levels.info = true;
        assert_eq!(levels.directive(), "info");
        let silent = LoggingLevelsConfig {
            debug: false,
            info: false,
            warning: false,
            error: false,
            critical: false,
        };
        assert_eq!(silent.directive(), "off");
    }
}
