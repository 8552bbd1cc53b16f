use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const AST_FILE_EXTENSION: &str = "json";
pub const IR_FILE_EXTENSION: &str = "ollir";
pub const JASMIN_FILE_EXTENSION: &str = "j";
pub const CONFIG_FILE_NAME: &str = "jmm.toml";

// Generated temporaries are this prefix plus a counter, skipping any declared name
pub const TEMP_VAR_PREFIX: &str = "t";
pub const DEFAULT_SUPERCLASS: &str = "java/lang/Object";
pub const MAIN_METHOD_NAME: &str = "main";

/// Project settings from `jmm.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Run the store/load peephole pass over the assembly
    pub optimize: bool,

    /// Where `.j` (and `.ollir`) files go. Empty means next to the input.
    pub output_dir: PathBuf,

    pub emit_ir: bool,
    pub show_warnings: bool,
    pub warnings_as_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            optimize: false,
            output_dir: PathBuf::new(),
            emit_ir: false,
            show_warnings: true,
            warnings_as_errors: false,
        }
    }
}

impl Config {
    /// Reads `jmm.toml` from `dir`. A missing file gives the defaults.
    pub fn load_from_dir(dir: &Path) -> Result<Self, CompilerError> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if !config_path.is_file() {
            return Ok(Config::default());
        }

        let source = fs::read_to_string(&config_path).map_err(|e| {
            CompilerError::file_error(&config_path, format!("Could not read the config file: {e}"))
        })?;

        Config::from_toml(&source, &config_path)
    }

    pub fn from_toml(source: &str, config_path: &Path) -> Result<Self, CompilerError> {
        toml::from_str(source).map_err(|e| {
            CompilerError::config_error(config_path, format!("Invalid {CONFIG_FILE_NAME}: {e}"))
        })
    }

    /// The output directory for a unit read from `input_path`
    pub fn output_dir_for(&self, input_path: &Path) -> PathBuf {
        if !self.output_dir.as_os_str().is_empty() {
            return self.output_dir.to_owned();
        }

        match input_path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::new(),
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
