// Configuration management
//
// Emulator settings persisted as TOML next to the binary. Missing or
// malformed files fall back to defaults with a warning, so a bare
// checkout runs without any setup.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use log::warn;

/// Default configuration file path
const CONFIG_FILE: &str = "famicore.toml";

/// Emulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// Execution settings
    pub execution: ExecutionConfig,
}

/// Execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Treat stack pointer wrap as a fatal error instead of logging and
    /// wrapping the way the hardware does
    pub strict_stack: bool,

    /// Emit a trace line per executed instruction
    pub trace: bool,

    /// Stop a trace run after this many instructions (0 = unlimited)
    pub max_trace_instructions: u64,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            execution: ExecutionConfig {
                strict_stack: false,
                trace: false,
                max_trace_instructions: 0,
            },
        }
    }
}

impl EmulatorConfig {
    /// Load the configuration from the default path, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load_or_default() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load the configuration from a specific path with the same
    /// fallback behavior.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!(
                        "ignoring malformed config {}: {}",
                        path.display(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                warn!("could not read config {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Serialize the configuration to the default path.
    pub fn save(&self) -> io::Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        fs::write(CONFIG_FILE, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_lenient() {
        let config = EmulatorConfig::default();
        assert!(!config.execution.strict_stack);
        assert!(!config.execution.trace);
        assert_eq!(config.execution.max_trace_instructions, 0);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = EmulatorConfig::load_from("does-not-exist.toml");
        assert!(!config.execution.strict_stack);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = EmulatorConfig::default();
        config.execution.strict_stack = true;
        config.execution.trace = true;
        config.execution.max_trace_instructions = 5003;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: EmulatorConfig = toml::from_str(&serialized).unwrap();

        assert!(parsed.execution.strict_stack);
        assert!(parsed.execution.trace);
        assert_eq!(parsed.execution.max_trace_instructions, 5003);
    }

    #[test]
    fn test_partial_toml_is_rejected_to_defaults() {
        // A file missing required keys is malformed, not partially applied
        let config: Result<EmulatorConfig, _> = toml::from_str("[execution]\ntrace = true\n");
        assert!(config.is_err());
    }
}
