use std::path::PathBuf;

use anyhow::Result;
use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::Parser;
use tracing::debug;

use crate::config::{discover_config, load_config, GeneratorConfig};
use crate::generator::{Generator, WriteOutcome};

/// Generate validated constructors for Go structs marked with a directive
#[derive(Parser, Debug, Clone)]
#[command(name = "validation-gen", version)]
#[command(about = "Generate Params structs and validated constructors for marked Go structs", long_about = None)]
pub struct Cli {
    /// Path to the input Go file [default: ./example.go]
    #[arg(
        short,
        long,
        env = "GOFILE",
        value_parser = OsStringValueParser::new().map(PathBuf::from)
    )]
    pub input: Option<PathBuf>,

    /// Path to the output Go file (default: <input stem>_gen.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it already exists
    #[arg(short, long, default_value_t = false)]
    pub force: bool,

    /// Print the generated code instead of writing it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Run gofmt over the generated code
    #[arg(long, default_value_t = false)]
    pub gofmt: bool,

    /// Path to a validation-gen.toml (default: auto-detect next to the input)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Input used when neither `--input` nor `GOFILE` names one.
pub const DEFAULT_INPUT: &str = "./example.go";

impl Cli {
    /// `--input`, then `GOFILE`, then `./example.go`. Empty values count as unset.
    pub fn input_path(&self) -> PathBuf {
        match &self.input {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => PathBuf::from(DEFAULT_INPUT),
        }
    }
}

/// What a CLI run did, for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// `--dry-run`: the code that would have been written
    Printed(String),
    Written { input: PathBuf, output: PathBuf },
    Skipped { output: PathBuf },
}

/// Config file (explicit or discovered) with command-line overrides applied.
pub fn resolve_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => discover_config(&cli.input_path())?.unwrap_or_default(),
    };
    if cli.gofmt {
        config.format.gofmt = true;
    }
    debug!(?config, "resolved config");
    Ok(config)
}

/// Execute one invocation and print its result line on stdout.
pub fn run_cli(cli: &Cli) -> Result<RunOutcome> {
    let config = resolve_config(cli)?;
    let mut generator = Generator::new(cli.input_path())
        .with_config(config)
        .with_force(cli.force);
    if let Some(output) = &cli.output {
        generator = generator.with_output(output);
    }

    if cli.dry_run {
        let rendered = generator.render()?;
        print!("{}", rendered.source);
        return Ok(RunOutcome::Printed(rendered.source));
    }

    let generation = generator.generate()?;
    let outcome = match generation.outcome {
        WriteOutcome::Written => {
            println!(
                "Successfully generated {} from {}",
                generation.output.display(),
                generation.input.display()
            );
            RunOutcome::Written {
                input: generation.input,
                output: generation.output,
            }
        }
        WriteOutcome::Skipped => {
            println!(
                "Skipped existing {} (use --force to overwrite)",
                generation.output.display()
            );
            RunOutcome::Skipped {
                output: generation.output,
            }
        }
    };
    Ok(outcome)
}
