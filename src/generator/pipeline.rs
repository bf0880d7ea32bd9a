use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::error::{GenerateError, Stage};
use crate::syntax::parse_file;

use super::extract::extract_structs;
use super::format::format_generated;
use super::templates::render_file;
use super::write::{derive_output_path, same_file, write_output, WriteOutcome};

/// Formatted output for one input, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub package: String,
    /// Names of the structs that were generated, in source order
    pub structs: Vec<String>,
    pub source: String,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub input: PathBuf,
    pub output: PathBuf,
    pub structs: Vec<String>,
    pub outcome: WriteOutcome,
}

/// One generation run for one input file.
///
/// ```no_run
/// use validation_gen::generator::{Generator, WriteOutcome};
///
/// let generation = Generator::new("service.go").with_force(true).generate()?;
/// assert_eq!(generation.outcome, WriteOutcome::Written);
/// # Ok::<(), validation_gen::GenerateError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    input: PathBuf,
    output: Option<PathBuf>,
    force: bool,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            force: false,
            config: GeneratorConfig::default(),
        }
    }

    /// Write here instead of `<stem><suffix>.<ext>` next to the input.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derive_output_path(&self.input, &self.config.suffix))
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Read, parse, extract, render and format without touching the output.
    pub fn render(&self) -> Result<Rendered, GenerateError> {
        let source = fs::read_to_string(&self.input).map_err(|source| GenerateError::Read {
            path: self.input.clone(),
            source,
        })?;
        generate_source(&self.input.display().to_string(), &source, &self.config)
    }

    /// Full run. The output file is only created once every earlier stage has
    /// succeeded.
    pub fn generate(&self) -> Result<Generation, GenerateError> {
        let rendered = self.render()?;
        let output = self.output();
        if same_file(&self.input, &output) {
            return Err(GenerateError::Write {
                path: output,
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "output path is the input file",
                ),
            });
        }
        let outcome =
            write_output(&output, &rendered.source, self.force).map_err(|source| {
                GenerateError::Write {
                    path: output.clone(),
                    source,
                }
            })?;
        if outcome == WriteOutcome::Written {
            info!(
                stage = %Stage::Written,
                input = %self.input.display(),
                output = %output.display(),
                structs = rendered.structs.len(),
                "generation complete"
            );
        }
        Ok(Generation {
            input: self.input.clone(),
            output,
            structs: rendered.structs,
            outcome,
        })
    }
}

/// Run every in-memory stage over `source`. `label` names the input in errors.
pub fn generate_source(
    label: &str,
    source: &str,
    config: &GeneratorConfig,
) -> Result<Rendered, GenerateError> {
    let file = parse_file(label, source)?;
    debug!(stage = %Stage::Parsed, input = label, types = file.type_decls.len());

    let structs = extract_structs(&file, &config.directive);
    if structs.is_empty() {
        return Err(GenerateError::NoMatch {
            path: label.to_string(),
            directive: config.directive.clone(),
        });
    }
    debug!(stage = %Stage::Extracted, input = label, structs = structs.len());

    let raw = render_file(&config.tool_name, &file.package, &structs)?;
    debug!(stage = %Stage::Rendered, input = label, bytes = raw.len());

    let formatted = format_generated(&raw, &config.format_options())?;
    debug!(stage = %Stage::Formatted, input = label, bytes = formatted.len());

    Ok(Rendered {
        package: file.package,
        structs: structs.into_iter().map(|s| s.name).collect(),
        source: formatted,
    })
}
