use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Appended to the input file stem to name the output.
pub const DEFAULT_SUFFIX: &str = "_gen";

/// What the writer did with the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The file already existed and `force` was not set
    Skipped,
}

/// `dir/service.go` becomes `dir/service_gen.go`.
///
/// The input extension is kept; an input without one gets `.go`.
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "go".to_string());
    input.with_file_name(format!("{stem}{suffix}.{ext}"))
}

/// Whether `a` and `b` name the same file, following symlinks when both exist.
pub fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Write `contents` to `path` atomically.
///
/// An existing file is left untouched unless `force` is set. The bytes go to a
/// temporary file in the same directory first and are renamed into place, so a
/// failed write never leaves a truncated output behind.
pub fn write_output(path: &Path, contents: &str, force: bool) -> io::Result<WriteOutcome> {
    if path.exists() && !force {
        info!(path = %path.display(), "output exists, skipping");
        return Ok(WriteOutcome::Skipped);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".validation-gen")
        .suffix(".tmp")
        .tempfile_in(&dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))?;
    }
    tmp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(WriteOutcome::Written)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("svc.go");
        fs::write(&input, "package p\n").unwrap();

        assert!(same_file(&input, &derive_output_path(&input, "")));
        assert!(same_file(&input, &dir.path().join(".").join("svc.go")));
        assert!(!same_file(&input, &derive_output_path(&input, DEFAULT_SUFFIX)));
    }

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path(Path::new("pkg/service.go"), DEFAULT_SUFFIX),
            PathBuf::from("pkg/service_gen.go")
        );
        assert_eq!(
            derive_output_path(Path::new("./example.go"), DEFAULT_SUFFIX),
            PathBuf::from("./example_gen.go")
        );
        assert_eq!(
            derive_output_path(Path::new("service"), DEFAULT_SUFFIX),
            PathBuf::from("service_gen.go")
        );
        assert_eq!(
            derive_output_path(Path::new("service.go.tmpl"), "_params"),
            PathBuf::from("service.go_params.tmpl")
        );
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out_gen.go");
        let outcome = write_output(&path, "package p\n", false).unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "package p\n");
    }

    #[test]
    fn test_existing_file_skipped_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out_gen.go");
        fs::write(&path, "// hand edited\n").unwrap();

        let outcome = write_output(&path, "package p\n", false).unwrap();
        assert_eq!(outcome, WriteOutcome::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), "// hand edited\n");

        let outcome = write_output(&path, "package p\n", true).unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "package p\n");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out_gen.go");
        write_output(&path, "package p\n", false).unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["out_gen.go".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_output_mode_is_0644() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out_gen.go");
        write_output(&path, "package p\n", false).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
