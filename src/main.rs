use std::process::ExitCode;

use clap::Parser;
use validation_gen::cli::{run_cli, Cli};
use validation_gen::logging::{init_logging, LogConfig};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too and are not failures.
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            err.print().ok();
            return code;
        }
    };

    if let Err(err) = init_logging(&LogConfig::from_env().with_verbose(cli.verbose)) {
        eprintln!("Warning: {err:#}");
    }

    match run_cli(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
