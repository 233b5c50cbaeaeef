// Mon Oct 19 2026 - Alex

use crate::elf::{ElfScanOptions, DEFAULT_NAME_MAX_LEN};
use crate::memory::MemOp;
use crate::utils::system_page_size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mem_op: MemOp,
    pub page_size: Option<u64>,
    pub symbol_name_max_len: usize,
    pub hexdump_row_size: usize,
    pub hexdump_ascii: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mem_op: MemOp::Syscall,
            page_size: None,
            symbol_name_max_len: DEFAULT_NAME_MAX_LEN,
            hexdump_row_size: 16,
            hexdump_ascii: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mem_op(mut self, op: MemOp) -> Self {
        self.mem_op = op;
        self
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_symbol_name_max_len(mut self, len: usize) -> Self {
        self.symbol_name_max_len = len;
        self
    }

    pub fn with_log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }

    /// Explicit page size, or the OS value when unset.
    pub fn resolved_page_size(&self) -> u64 {
        self.page_size.unwrap_or_else(system_page_size)
    }

    pub fn elf_options(&self) -> ElfScanOptions {
        ElfScanOptions::default()
            .with_page_size(self.resolved_page_size())
            .with_name_max_len(self.symbol_name_max_len)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        check_json(path)?;

        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        check_json(path)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("using default config ({})", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(page_size) = self.page_size {
            if !page_size.is_power_of_two() {
                return Err(ConfigError::Validation(format!(
                    "page_size must be a non-zero power of two, got {}",
                    page_size
                )));
            }
        }
        if self.symbol_name_max_len == 0 {
            return Err(ConfigError::Validation("symbol_name_max_len must be > 0".to_string()));
        }
        if self.hexdump_row_size == 0 {
            return Err(ConfigError::Validation("hexdump_row_size must be > 0".to_string()));
        }
        Ok(())
    }
}

fn check_json(path: &Path) -> Result<(), ConfigError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    if ext.eq_ignore_ascii_case("json") {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedFormat(ext.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mem_op, MemOp::Syscall);
        assert_eq!(config.symbol_name_max_len, 1024);
        assert_eq!(config.resolved_page_size(), system_page_size());
    }

    #[test]
    fn test_validate_page_size() {
        assert!(Config::new().with_page_size(0x1000).validate().is_ok());
        assert!(matches!(Config::new().with_page_size(0).validate(), Err(ConfigError::Validation(_))));
        assert!(matches!(Config::new().with_page_size(3000).validate(), Err(ConfigError::Validation(_))));
        assert!(Config::new().with_symbol_name_max_len(0).validate().is_err());
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scanner.json");
        let config = Config::new()
            .with_mem_op(MemOp::File)
            .with_page_size(0x4000)
            .with_log_level("debug");

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.elf_options().page_size, 0x4000);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "mem_op": "file" }"#).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.mem_op, MemOp::File);
        assert_eq!(loaded.hexdump_row_size, 16);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Config::load(dir.path().join("missing.json")), Err(ConfigError::NotFound(_))));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse(_))));
        assert_eq!(Config::load_or_default(&bad), Config::default());

        let toml = dir.path().join("cfg.toml");
        fs::write(&toml, "").unwrap();
        assert!(matches!(Config::load(&toml), Err(ConfigError::UnsupportedFormat(_))));
    }
}
