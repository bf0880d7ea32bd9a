//! # validation-gen
//!
//! Code generator for Go that gives marked structs a parameter object, a
//! validating constructor and a validator.
//!
//! ## Overview
//!
//! A struct opts in through a directive in the doc comment of its `type`
//! declaration:
//!
//! ```go
//! //go:generate validation-gen
//! type Service struct {
//!     Client  *http.Client
//!     Timeout int
//! }
//! ```
//!
//! Running the generator on that file writes `service_gen.go` next to it with a
//! `ServiceParams` struct, `NewService(params ServiceParams) (*Service, error)`
//! and `isValidServiceParams`, which reports every nil pointer field.
//!
//! ## Architecture
//!
//! - **[`syntax`]** - Go tokenizer and declaration-level parser
//! - **[`generator`]** - Struct extraction, templates, formatting and output
//! - **[`config`]** - Optional `validation-gen.toml`
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - Command-line front end
//!
//! ## Library use
//!
//! ```rust
//! use validation_gen::config::GeneratorConfig;
//! use validation_gen::generator::generate_source;
//!
//! let src = "package svc\n\n//go:generate validation-gen\ntype S struct {\n\tDB *DB\n}\n";
//! let rendered = generate_source("svc.go", src, &GeneratorConfig::default()).unwrap();
//! assert!(rendered.source.contains("errors.New(\"DB is required\")"));
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod syntax;

pub use config::GeneratorConfig;
pub use error::{GenerateError, Stage};
pub use generator::{generate_source, Generation, Generator, WriteOutcome};
