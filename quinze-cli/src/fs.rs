//! Capability-based file access for CLI inputs.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path using ambient authority.
pub(crate) fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Return whether `path` exists and is a regular file.
pub(crate) fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "path has no file name"))?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.metadata(name).map(|meta| meta.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    fn distinguishes_files_directories_and_missing_paths() {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 path");
        let file = root.join("request.json");
        std::fs::write(&file, b"{}").expect("write file");
        assert!(file_is_file(&file).expect("inspect file"));

        let dir = root.join("nested");
        std::fs::create_dir(&dir).expect("create dir");

        assert!(!file_is_file(&dir).expect("inspect dir"));
        let missing = file_is_file(&root.join("absent.json")).expect_err("missing file");
        assert_eq!(missing.kind(), io::ErrorKind::NotFound);
    }
}
