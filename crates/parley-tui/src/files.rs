use std::fs;
use std::path::{Path, PathBuf};

use parley_core::capability::is_accepted_file;
use parley_core::error::Result;
use parley_core::{ChatError, FilePicker, SelectedFile};

/// Resolves a typed path against the local filesystem. Only metadata is read.
pub struct PathFilePicker;

impl PathFilePicker {
    fn expand(path: &Path) -> PathBuf {
        match path.strip_prefix("~") {
            Ok(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| path.to_path_buf()),
            Err(_) => path.to_path_buf(),
        }
    }
}

impl FilePicker for PathFilePicker {
    fn pick(&self, path: &Path) -> Result<SelectedFile> {
        let path = Self::expand(path);
        let metadata = fs::metadata(&path)
            .map_err(|e| ChatError::FileUnavailable(format!("{}: {}", path.display(), e)))?;

        if !metadata.is_file() {
            return Err(ChatError::FileUnavailable(format!("{} is not a file", path.display())));
        }
        if !is_accepted_file(&path) {
            return Err(ChatError::UnsupportedFile(path.display().to_string()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(SelectedFile {
            name,
            path,
            size: metadata.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_pick_existing_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"hello").unwrap();

        let picked = PathFilePicker.pick(&path).unwrap();
        assert_eq!(picked.name, "notes.txt");
        assert_eq!(picked.size, 5);
    }

    #[test]
    fn test_pick_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PathFilePicker.pick(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, ChatError::FileUnavailable(_)));
    }

    #[test]
    fn test_pick_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = PathFilePicker.pick(dir.path()).unwrap_err();
        assert!(matches!(err, ChatError::FileUnavailable(_)));
    }

    #[test]
    fn test_pick_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.exe");
        fs::File::create(&path).unwrap();
        let err = PathFilePicker.pick(&path).unwrap_err();
        assert!(matches!(err, ChatError::UnsupportedFile(_)));
    }
}
