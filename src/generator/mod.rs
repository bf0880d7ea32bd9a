//! # Generator Module
//!
//! Turns marked Go structs into a companion `_gen.go` file.
//!
//! ## Pipeline
//!
//! 1. **Parse** the input with [`crate::syntax`]
//! 2. **Extract** structs whose `type` declaration doc carries the directive
//!    (`//go:generate` by default) into [`StructRecord`]s
//! 3. **Render** the askama template (`templates/params.go.txt`)
//! 4. **Format** the result with the built-in layout pass, optionally followed
//!    by `gofmt`
//! 5. **Write** the output atomically, skipping an existing file unless forced
//!
//! For every selected struct `S` the output contains:
//!
//! - `SParams`, a struct with the exported fields of `S`
//! - `NewS(params SParams) (*S, error)`, which validates and copies fields over
//! - `isValidSParams(params SParams) error`, which reports every nil pointer
//!   field as `"<Field> is required"` through `errors.Join`
//!
//! Generic structs keep their type parameters: the declaration form
//! `[K comparable, V any]` on every declaration and the instantiation form
//! `[K, V]` at every use.

mod extract;
mod format;
mod marker;
mod pipeline;
mod templates;
mod type_params;
mod types;
mod write;


pub use extract::{extract_structs, is_exported, FieldRecord, StructRecord};
pub use format::{format_generated, format_source, run_gofmt, FormatError, FormatOptions};
pub use marker::{has_directive, DEFAULT_DIRECTIVE};
pub use pipeline::{generate_source, Generation, Generator, Rendered};
pub use templates::{render_file, ParamsFileTemplate};
pub use type_params::{TypeParam, TypeParams};
pub use types::render_type;
pub use write::{derive_output_path, same_file, write_output, WriteOutcome, DEFAULT_SUFFIX};
