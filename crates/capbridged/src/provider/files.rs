//! Capture file discovery.

use std::fs;
use std::path::Path;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::errors::ProviderError;
use super::types::CaptureFile;

/// Lists the files in `directory` whose extension is one of `extensions`
/// (compared case-insensitively), sorted by file name.
///
/// # Errors
///
/// Returns [`ProviderError::DirectoryNotFound`] when `directory` is not a
/// directory and [`ProviderError::Io`] when it cannot be read.
pub fn list_capture_files(
    directory: &Path,
    extensions: &[&str],
) -> Result<Vec<CaptureFile>, ProviderError> {
    let directory_text = directory.display().to_string();
    if !directory.is_dir() {
        return Err(ProviderError::DirectoryNotFound { path: directory_text });
    }

    let entries =
        fs::read_dir(directory).map_err(|source| ProviderError::io(&directory_text, source))?;
    let mut captures = Vec::new();
    for entry in entries {
        let file = entry.map_err(|source| ProviderError::io(&directory_text, source))?;
        let path = file.path();
        if !has_extension(&path, extensions) {
            continue;
        }
        let metadata = file
            .metadata()
            .map_err(|source| ProviderError::io(path.display().to_string(), source))?;
        if !metadata.is_file() {
            continue;
        }
        let modified_time = metadata
            .modified()
            .ok()
            .and_then(|time| OffsetDateTime::from(time).format(&Rfc3339).ok())
            .unwrap_or_default();
        captures.push(CaptureFile {
            filename: file.file_name().to_string_lossy().into_owned(),
            path: path.display().to_string(),
            size_bytes: metadata.len(),
            modified_time,
        });
    }
    captures.sort_by(|left, right| left.filename.cmp(&right.filename));
    Ok(captures)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted)))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;

    #[fixture]
    fn capture_dir() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("b_frame.rdc"), b"rdc").expect("write rdc");
        fs::write(dir.path().join("a_frame.JSON"), b"{}").expect("write json");
        fs::write(dir.path().join("notes.txt"), b"ignored").expect("write txt");
        fs::create_dir(dir.path().join("nested.rdc")).expect("create dir");
        dir
    }

    #[rstest]
    fn lists_matching_files_sorted(capture_dir: TempDir) {
        let captures =
            list_capture_files(capture_dir.path(), &["json", "rdc"]).expect("list captures");
        let names: Vec<_> = captures.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, ["a_frame.JSON", "b_frame.rdc"]);
        assert_eq!(captures[1].size_bytes, 3);
        assert!(captures[1].modified_time.ends_with('Z'));
    }

    #[rstest]
    fn filters_by_extension(capture_dir: TempDir) {
        let captures = list_capture_files(capture_dir.path(), &["rdc"]).expect("list captures");
        assert_eq!(captures.len(), 1);
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("absent");
        let error = list_capture_files(&missing, &["rdc"]).expect_err("missing dir");
        assert!(matches!(error, ProviderError::DirectoryNotFound { .. }));
        assert!(error.to_string().starts_with("Directory not found: "));
    }
}
