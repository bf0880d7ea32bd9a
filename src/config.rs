//! Generator configuration loaded from `validation-gen.toml`.
//!
//! The file is optional. When `--config` is not given, a `validation-gen.toml`
//! sitting next to the input file is picked up automatically; otherwise the
//! built-in defaults apply. Command-line flags are layered on top by the CLI.
//!
//! ```toml
//! directive = "//go:generate"
//! suffix = "_gen"
//! tool_name = "validation-gen"
//!
//! [format]
//! gofmt = true
//! gofmt_bin = "/usr/local/go/bin/gofmt"
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::generator::{FormatOptions, DEFAULT_DIRECTIVE, DEFAULT_SUFFIX};

/// File name looked up next to the input.
pub const CONFIG_FILE_NAME: &str = "validation-gen.toml";

/// Overrides the `gofmt` binary from the config file.
pub const GOFMT_BIN_ENV: &str = "VALIDATION_GEN_GOFMT_BIN";

/// Tool name written into the generated header.
pub const DEFAULT_TOOL_NAME: &str = "validation-gen";

// The suffix becomes part of a file name.
#[allow(clippy::unwrap_used)]
static SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Text a doc comment must contain to select a struct
    pub directive: String,
    /// Appended to the input stem to name the output file
    pub suffix: String,
    /// Name used in the "Code generated by" header
    pub tool_name: String,
    pub format: FormatConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            directive: DEFAULT_DIRECTIVE.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
            tool_name: DEFAULT_TOOL_NAME.to_string(),
            format: FormatConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Run `gofmt` after the built-in formatter
    pub gofmt: bool,
    /// Binary to run instead of `gofmt` from `PATH`
    pub gofmt_bin: Option<String>,
}

impl FormatConfig {
    /// The `gofmt` command to run, if enabled.
    ///
    /// `VALIDATION_GEN_GOFMT_BIN` wins over `gofmt_bin`, which wins over plain
    /// `gofmt`.
    pub fn gofmt_command(&self) -> Option<String> {
        if !self.gofmt {
            return None;
        }
        let bin = env::var(GOFMT_BIN_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.gofmt_bin.clone())
            .unwrap_or_else(|| "gofmt".to_string());
        Some(bin)
    }
}

impl GeneratorConfig {
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            gofmt_bin: self.format.gofmt_command(),
        }
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::Invalid {
            path: path.to_path_buf(),
            message: message.to_string(),
        };
        if self.directive.trim().is_empty() {
            return Err(invalid("directive must not be empty"));
        }
        if self.tool_name.trim().is_empty() {
            return Err(invalid("tool_name must not be empty"));
        }
        if self.tool_name.contains('\n') {
            return Err(invalid("tool_name must be a single line"));
        }
        if !SUFFIX_RE.is_match(&self.suffix) {
            return Err(invalid(
                "suffix must be non-empty and may only contain letters, digits, '_', '-' and '.'",
            ));
        }
        Ok(())
    }
}

/// Load and validate a config file that must exist.
pub fn load_config(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GeneratorConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate(path)?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Load `validation-gen.toml` from the input's directory, if present.
pub fn discover_config(input: &Path) -> Result<Option<GeneratorConfig>, ConfigError> {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.is_file() {
        return Ok(None);
    }
    load_config(&path).map(Some)
}
