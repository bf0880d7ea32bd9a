//! # Go Syntax
//!
//! A small Go front end: tokenizer, AST, and a declaration-level parser.
//!
//! It understands enough of the language to walk any well-formed Go file and
//! produce full type expressions for every `type` declaration. Statement and
//! expression syntax inside function bodies and initialisers is skipped by
//! bracket balancing; the generator never needs it.
//!
//! ```rust
//! use validation_gen::syntax::{parse_file, TypeExpr};
//!
//! let file = parse_file("svc.go", "package svc\n\ntype S struct{ C *int }\n").unwrap();
//! assert_eq!(file.package, "svc");
//! assert!(matches!(file.type_decls[0].specs[0].ty, TypeExpr::Struct(_)));
//! ```

pub mod ast;
mod error;
pub mod lexer;
mod parser;

pub use ast::{
    ChanDir, CommentBlock, FieldDecl, FuncType, SourceFile, StructType, TypeDecl, TypeExpr,
    TypeParamGroup, TypeSpec,
};
pub use error::{ParseError, Position};
pub use parser::{parse_file, parse_type_expr};
