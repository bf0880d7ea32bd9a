//! Errors surfaced by a generation run.
//!
//! Every failure names the stage it happened in so the CLI can print a single
//! line that tells the user where to look.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::generator::FormatError;
use crate::syntax::ParseError;

/// Pipeline stages in the order a run passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    Parsed,
    Extracted,
    Rendered,
    Formatted,
    Written,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Parsed => "parsed",
            Stage::Extracted => "extracted",
            Stage::Rendered => "rendered",
            Stage::Formatted => "formatted",
            Stage::Written => "written",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("reading input file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing file: {0}")]
    Parse(#[from] ParseError),
    #[error("no structs with {directive} directive found in {path}")]
    NoMatch { path: String, directive: String },
    #[error("generating code: {0}")]
    Render(#[from] askama::Error),
    #[error("formatting generated code: {0}")]
    Format(#[from] FormatError),
    #[error("writing output file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GenerateError {
    /// Last stage the run completed before this error stopped it.
    ///
    /// Nothing is written for any error, so the result is never
    /// [`Stage::Written`].
    pub fn stage(&self) -> Stage {
        match self {
            GenerateError::Read { .. } | GenerateError::Parse(_) => Stage::Idle,
            GenerateError::NoMatch { .. } => Stage::Parsed,
            GenerateError::Render(_) => Stage::Extracted,
            GenerateError::Format(_) => Stage::Rendered,
            GenerateError::Write { .. } => Stage::Formatted,
        }
    }
}
