//! # CLI Module
//!
//! Command-line front end for `validation-gen`. Meant to be invoked by
//! `go generate`, which sets `GOFILE` to the file holding the directive:
//!
//! ```go
//! //go:generate validation-gen
//! type Service struct {
//!     Client *http.Client
//! }
//! ```
//!
//! Options:
//! - `--input <FILE>` - Go source to read (default `$GOFILE`, then `./example.go`)
//! - `--output <FILE>` - Output path (default `<stem>_gen.<ext>` next to the input)
//! - `--force` - Overwrite an existing output file
//! - `--dry-run` - Print the generated code to stdout instead of writing it
//! - `--gofmt` - Pipe the generated code through `gofmt`
//! - `--config <FILE>` - Explicit `validation-gen.toml`
//! - `--verbose` - Debug logging on stderr
//!
//! Any failure prints `Error: <message>` on stderr and exits with status 1.

mod commands;


pub use commands::{resolve_config, run_cli, Cli, RunOutcome, DEFAULT_INPUT};
