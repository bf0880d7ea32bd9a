//! Canonical layout for generated Go source.
//!
//! The built-in pass re-parses the rendered text, rebuilds every line from its
//! tokens, indents with tabs by bracket depth and aligns struct field types and
//! composite literal values into columns the way `gofmt` does. Lines that sit
//! inside a multi-line raw string or block comment are copied untouched.
//!
//! An external `gofmt` binary can run afterwards for byte-exact output.

use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use thiserror::Error;
use tracing::debug;

use crate::syntax::lexer::{tokenize, Span, TokenKind};
use crate::syntax::{parse_file, ParseError};

/// Label used for diagnostics about the generator's own output.
const GENERATED_LABEL: &str = "<generated>";

/// Error raised while formatting generated code.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("generated code does not parse: {0}")]
    Syntax(#[from] ParseError),
    #[error("failed to run {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: io::Error,
    },
    #[error("{bin} exited with {status}: {stderr}")]
    Gofmt {
        bin: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// How generated code is formatted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Pipe the result through this `gofmt` binary after the built-in pass
    pub gofmt_bin: Option<String>,
}

/// Run the built-in pass, then `gofmt` when configured.
pub fn format_generated(src: &str, options: &FormatOptions) -> Result<String, FormatError> {
    let formatted = format_source(src)?;
    match &options.gofmt_bin {
        Some(bin) => run_gofmt(bin, &formatted),
        None => Ok(formatted),
    }
}

/// Built-in `gofmt`-style layout. Fails if `src` is not a valid Go file.
pub fn format_source(src: &str) -> Result<String, FormatError> {
    parse_file(GENERATED_LABEL, src)?;
    let lexed = tokenize(GENERATED_LABEL, src)?;

    let mut items: Vec<Item<'_>> = lexed
        .tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Eof && !t.is_auto_semicolon())
        .map(|t| Item {
            text: t.text,
            span: t.span,
            line: t.pos.line,
            end_line: t.end_line,
            kind: Some(t.kind),
        })
        .collect();
    items.extend(lexed.comments.iter().flat_map(|g| &g.comments).map(|c| Item {
        text: c.text,
        span: c.span,
        line: c.pos.line,
        end_line: c.end_line,
        kind: None,
    }));
    items.sort_by_key(|item| item.span.start);

    let raw_lines: Vec<&str> = src.split('\n').collect();
    let mut layout = vec![LineLayout::default(); raw_lines.len() + 1];
    for item in &items {
        if item.end_line > item.line {
            for line in item.line..=item.end_line.min(raw_lines.len()) {
                layout[line].verbatim = true;
            }
        }
    }

    let mut stack: Vec<Block> = Vec::new();
    let mut prev_token: Option<Item<'_>> = None;
    let mut current_line = 0;
    for item in items {
        if item.line != current_line {
            current_line = item.line;
            let depth = stack.len().saturating_sub(usize::from(item.is_closer()));
            let entry = &mut layout[item.line];
            entry.depth = depth;
            entry.in_struct = stack.last() == Some(&Block::Struct);
        }
        layout[item.line].items.push(item);
        if item.kind.is_none() {
            continue;
        }
        if item.is_op("{") {
            let opens_struct = prev_token
                .is_some_and(|p| p.kind == Some(TokenKind::Keyword) && p.text == "struct");
            stack.push(if opens_struct {
                Block::Struct
            } else {
                Block::Other
            });
        } else if item.is_op("(") || item.is_op("[") {
            stack.push(Block::Other);
        } else if item.is_closer() {
            stack.pop();
        }
        prev_token = Some(item);
    }

    let mut lines: Vec<OutLine> = raw_lines
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let entry = &layout[idx + 1];
            if entry.verbatim {
                OutLine::verbatim(raw)
            } else if entry.items.is_empty() {
                OutLine::blank()
            } else {
                OutLine::code(src, entry)
            }
        })
        .collect();

    align_columns(&mut lines);
    let out = collapse_blank_lines(&lines);
    debug!(bytes = out.len(), "formatted generated source");
    Ok(out)
}

/// Pipe `src` through an external formatter reading stdin and writing stdout.
pub fn run_gofmt(bin: &str, src: &str) -> Result<String, FormatError> {
    let spawn_error = |source| FormatError::Spawn {
        bin: bin.to_string(),
        source,
    };
    let mut child = Command::new(bin)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_error)?;

    // Feed stdin from a separate thread so a full stdout pipe cannot block us.
    let writer = child.stdin.take().map(|mut stdin| {
        let input = src.as_bytes().to_vec();
        thread::spawn(move || stdin.write_all(&input))
    });
    let output = child.wait_with_output().map_err(spawn_error)?;
    if let Some(handle) = writer {
        match handle.join() {
            Ok(result) => result.map_err(spawn_error)?,
            Err(_) => {
                return Err(spawn_error(io::Error::other("stdin writer panicked")));
            }
        }
    }

    if !output.status.success() {
        return Err(FormatError::Gofmt {
            bin: bin.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    debug!(bin, "formatted with external gofmt");
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Struct,
    Other,
}

// A token or comment placed on a line. `kind` is `None` for comments.
#[derive(Debug, Clone, Copy)]
struct Item<'s> {
    text: &'s str,
    span: Span,
    line: usize,
    end_line: usize,
    kind: Option<TokenKind>,
}

impl Item<'_> {
    fn is_op(&self, text: &str) -> bool {
        self.kind == Some(TokenKind::Operator) && self.text == text
    }

    fn is_closer(&self) -> bool {
        self.is_op(")") || self.is_op("]") || self.is_op("}")
    }

    fn is_ident(&self) -> bool {
        self.kind == Some(TokenKind::Ident)
    }
}

#[derive(Debug, Clone, Default)]
struct LineLayout<'s> {
    items: Vec<Item<'s>>,
    depth: usize,
    in_struct: bool,
    verbatim: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    /// `Name Type` inside a struct body
    Field,
    /// `Key: value` inside a composite literal
    KeyValue,
}

#[derive(Debug, Clone)]
struct Cells {
    column: Column,
    head: String,
    tail: String,
}

#[derive(Debug, Clone)]
struct OutLine {
    text: String,
    depth: usize,
    cells: Option<Cells>,
    blank: bool,
}

impl OutLine {
    fn verbatim(raw: &str) -> Self {
        Self {
            text: raw.to_string(),
            depth: 0,
            cells: None,
            blank: false,
        }
    }

    fn blank() -> Self {
        Self {
            text: String::new(),
            depth: 0,
            cells: None,
            blank: true,
        }
    }

    fn code(src: &str, layout: &LineLayout<'_>) -> Self {
        let items = &layout.items;
        let cells = if layout.in_struct {
            split_field(src, items).map(|(head, tail)| Cells {
                column: Column::Field,
                head,
                tail,
            })
        } else {
            split_key_value(src, items).map(|(head, tail)| Cells {
                column: Column::KeyValue,
                head,
                tail,
            })
        };
        Self {
            text: format!("{}{}", indent(layout.depth), join_items(src, items)),
            depth: layout.depth,
            cells,
            blank: false,
        }
    }
}

fn indent(depth: usize) -> String {
    "\t".repeat(depth)
}

// Items are joined with one space wherever the source had any whitespace.
fn join_items(src: &str, items: &[Item<'_>]) -> String {
    let mut out = String::new();
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            let gap = src.get(items[idx - 1].span.end..item.span.start);
            if gap.is_some_and(|g| !g.is_empty()) {
                out.push(' ');
            }
        }
        out.push_str(item.text);
    }
    out
}

// `A, B Type tag` -> ("A, B", "Type tag"). Embedded fields have no column.
fn split_field(src: &str, items: &[Item<'_>]) -> Option<(String, String)> {
    if !items.first()?.is_ident() {
        return None;
    }
    let mut last_name = 0;
    while last_name + 2 < items.len()
        && items[last_name + 1].is_op(",")
        && items[last_name + 2].is_ident()
    {
        last_name += 2;
    }
    let rest = &items[last_name + 1..];
    let first = rest.first()?;
    if first.is_op(".") || first.kind == Some(TokenKind::String) || first.kind.is_none() {
        return None;
    }
    Some((
        join_items(src, &items[..=last_name]),
        join_items(src, rest),
    ))
}

// `Key: value,` -> ("Key:", "value,")
fn split_key_value(src: &str, items: &[Item<'_>]) -> Option<(String, String)> {
    if items.len() < 3 || !items[1].is_op(":") {
        return None;
    }
    let key_like = matches!(
        items[0].kind,
        Some(TokenKind::Ident | TokenKind::String | TokenKind::Int | TokenKind::Char)
    );
    if !key_like {
        return None;
    }
    Some((join_items(src, &items[..2]), join_items(src, &items[2..])))
}

// Consecutive lines of the same column kind at the same depth form a section;
// the second cell of every line in a section starts at the same offset.
fn align_columns(lines: &mut [OutLine]) {
    let mut start = 0;
    while start < lines.len() {
        let Some(key) = section_key(&lines[start]) else {
            start += 1;
            continue;
        };
        let mut end = start + 1;
        while end < lines.len() && section_key(&lines[end]) == Some(key) {
            end += 1;
        }
        let width = lines[start..end]
            .iter()
            .filter_map(|l| l.cells.as_ref())
            .map(|c| c.head.chars().count())
            .max()
            .unwrap_or(0);
        for line in &mut lines[start..end] {
            if let Some(cells) = &line.cells {
                let pad = width - cells.head.chars().count() + 1;
                line.text = format!(
                    "{}{}{}{}",
                    indent(line.depth),
                    cells.head,
                    " ".repeat(pad),
                    cells.tail
                );
            }
        }
        start = end;
    }
}

fn section_key(line: &OutLine) -> Option<(Column, usize)> {
    line.cells.as_ref().map(|c| (c.column, line.depth))
}

fn collapse_blank_lines(lines: &[OutLine]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut prev_blank = true;
    for line in lines {
        if line.blank {
            if !prev_blank {
                out.push("");
            }
            prev_blank = true;
        } else {
            out.push(&line.text);
            prev_blank = false;
        }
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    let mut text = out.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_reindents_and_aligns() {
        let src = "package p\n\n\n\ntype S struct {\n  A int\n    Longer *string\n}\n\nfunc f() *S {\nreturn &S{\n A: 1,\n        Longer: nil,\n   }\n}\n\n\n";
        let want = "package p\n\ntype S struct {\n\tA      int\n\tLonger *string\n}\n\nfunc f() *S {\n\treturn &S{\n\t\tA:      1,\n\t\tLonger: nil,\n\t}\n}\n";
        assert_eq!(format_source(src).unwrap(), want);
    }

    #[test]
    fn test_already_formatted_is_unchanged() {
        let src = "// Header.\n\npackage p\n\nimport (\n\t\"errors\"\n)\n\n// S is a thing\ntype S struct {\n\tName, Alias string\n\tTagged      int `json:\"tagged\"`\n}\n\nfunc check(s S) error {\n\tvar errs []error\n\tif s.Name == \"\" {\n\t\terrs = append(errs, errors.New(\"Name is required\"))\n\t}\n\treturn errors.Join(errs...)\n}\n";
        assert_eq!(format_source(src).unwrap(), src);
    }

    #[test]
    fn test_embedded_field_breaks_alignment_section() {
        let src = "package p\n\ntype S struct {\n\tA int\n\tBase\n\tLonger string\n}\n";
        let out = format_source(src).unwrap();
        assert!(out.contains("\tA int\n\tBase\n\tLonger string\n"));
    }

    #[test]
    fn test_raw_string_lines_kept_verbatim() {
        let src = "package p\n\nvar q = `first\n   second  \nthird`\n\nvar x = 1\n";
        let out = format_source(src).unwrap();
        assert!(out.contains("`first\n   second  \nthird`"));
        assert!(out.ends_with("var x = 1\n"));
    }

    #[test]
    fn test_single_trailing_newline() {
        let out = format_source("package p").unwrap();
        assert_eq!(out, "package p\n");
    }

    #[test]
    fn test_invalid_source_is_rejected() {
        let err = format_source("package p\n\ntype S struct {\n").unwrap_err();
        assert!(matches!(err, FormatError::Syntax(_)));
        assert!(err.to_string().starts_with("generated code does not parse: <generated>:"));
    }

    #[test]
    fn test_format_generated_without_gofmt() {
        let opts = FormatOptions::default();
        let out = format_generated("package p\n\n\n\nvar x = 1", &opts).unwrap();
        assert_eq!(out, "package p\n\nvar x = 1\n");
    }

    #[test]
    fn test_missing_gofmt_binary() {
        let err = run_gofmt("/nonexistent/validation-gen-gofmt", "package p\n").unwrap_err();
        assert!(matches!(err, FormatError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/validation-gen-gofmt"));
    }

    #[cfg(unix)]
    fn stub_script(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("gofmt-stub.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[test]
    fn test_gofmt_stub_output_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let bin = stub_script(dir.path(), "cat >/dev/null\nprintf 'package stub\\n'");
        let opts = FormatOptions {
            gofmt_bin: Some(bin),
        };
        let out = format_generated("package p\n", &opts).unwrap();
        assert_eq!(out, "package stub\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_gofmt_failure_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let bin = stub_script(dir.path(), "cat >/dev/null\necho 'bad input' >&2\nexit 2");
        let err = run_gofmt(&bin, "package p\n").unwrap_err();
        match err {
            FormatError::Gofmt { stderr, .. } => assert_eq!(stderr, "bad input"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
