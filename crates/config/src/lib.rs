//! NpcScript Configuration Management
//!
//! Loads engine settings from `config/engine.txt`, a plain `key = value`
//! file with `#` comments. Missing files and unknown keys fall back to
//! defaults.

use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the engine config file
pub const DEFAULT_CONFIG_PATH: &str = "config/engine.txt";

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Directory scanned for scripts (from "scripts_dir", default: scripts)
    pub scripts_dir: PathBuf,
    /// Script file extension without the dot (from "script_extension", default: npc)
    pub script_extension: String,
    /// Block holding NPC stats (from "data_block", default: data)
    pub data_block: String,
    /// Fail on native calls the host does not handle (from "strict_natives")
    pub strict_natives: bool,
    /// Limit for nested `run` calls (from "max_call_depth", default: 64)
    pub max_call_depth: usize,
    /// Log filter used when RUST_LOG is unset (from "log_level", default: info)
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("scripts"),
            script_extension: "npc".into(),
            data_block: "data".into(),
            strict_natives: false,
            max_call_depth: 64,
            log_level: "info".into(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse config file content
    pub fn parse(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                config.parse_option(key.trim(), value.trim());
            }
        }

        if config.script_extension.is_empty() {
            return Err("script_extension must not be empty".into());
        }
        if config.data_block.is_empty() {
            return Err("data_block must not be empty".into());
        }

        Ok(config)
    }

    fn parse_option(&mut self, key: &str, value: &str) {
        match key {
            "scripts_dir" => self.scripts_dir = PathBuf::from(value),
            "script_extension" => {
                self.script_extension = value.trim_start_matches('.').into();
            }
            "data_block" => self.data_block = value.into(),
            "strict_natives" => {
                self.strict_natives = value.parse().unwrap_or(false);
            }
            "max_call_depth" => {
                self.max_call_depth = value.parse().unwrap_or(64);
            }
            "log_level" => self.log_level = value.into(),
            _ => {
                tracing::debug!("Unknown config option: {} = {}", key, value);
            }
        }
    }

    /// Display configuration summary
    pub fn display(&self) {
        tracing::info!("Engine configuration:");
        tracing::info!("  Scripts: {}/*.{}", self.scripts_dir.display(), self.script_extension);
        tracing::info!("  Data block: #{}", self.data_block);
        tracing::info!("  Strict natives: {}", self.strict_natives);
        tracing::info!("  Max call depth: {}", self.max_call_depth);
        tracing::info!("  Log level: {}", self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.scripts_dir, PathBuf::from("scripts"));
        assert_eq!(config.script_extension, "npc");
        assert_eq!(config.data_block, "data");
        assert!(!config.strict_natives);
        assert_eq!(config.max_call_depth, 64);
    }

    #[test]
    fn test_parse_simple_config() {
        let config_text = r#"
# engine settings
scripts_dir = data/npcs
script_extension = .npc
data_block = dane
strict_natives = true
max_call_depth = 16
log_level = debug
"#;
        let config = EngineConfig::parse(config_text).unwrap();
        assert_eq!(config.scripts_dir, PathBuf::from("data/npcs"));
        assert_eq!(config.script_extension, "npc");
        assert_eq!(config.data_block, "dane");
        assert!(config.strict_natives);
        assert_eq!(config.max_call_depth, 16);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = EngineConfig::parse("max_call_depth = lots\nstrict_natives = maybe\nfoo = bar\n").unwrap();
        assert_eq!(config.max_call_depth, 64);
        assert!(!config.strict_natives);
    }

    #[test]
    fn test_empty_extension_rejected() {
        assert!(EngineConfig::parse("script_extension =\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_block = stats").unwrap();

        let config = EngineConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.data_block, "stats");

        let missing = file.path().with_extension("missing");
        assert!(EngineConfig::load_from_file(&missing).is_err());
        assert_eq!(EngineConfig::load_or_default(&missing).unwrap(), EngineConfig::default());
    }
}
