//! File system helpers shared by the executor, backup, and rollback paths

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Copy a directory tree recursively.
///
/// With `overwrite` false, files already present at the destination are kept;
/// the legacy migration relies on this so a newer current-layout file is
/// never clobbered by its legacy counterpart.
pub fn copy_dir_recursive(src: &Path, dst: &Path, overwrite: bool) -> io::Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let entry_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if entry_path.is_dir() {
            copy_dir_recursive(&entry_path, &dst_path, overwrite)?;
        } else if overwrite || !dst_path.exists() {
            fs::copy(&entry_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Remove a file or directory tree. Missing paths are not an error.
pub fn remove_path_all(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Total size in bytes of all files under a path. Unreadable entries are
/// skipped, matching the probe's degrade-to-absent policy.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| entry.metadata().ok())
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_recursive_copies_nested_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.txt"), "a").unwrap();
        fs::write(src.join("nested/b.txt"), "b").unwrap();

        copy_dir_recursive(&src, &dst, true).unwrap();

        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dst.join("nested/b.txt")).unwrap(), "b");
    }

    #[test]
    fn test_copy_dir_recursive_without_overwrite_keeps_existing() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("a.txt"), "legacy").unwrap();
        fs::write(dst.join("a.txt"), "current").unwrap();

        copy_dir_recursive(&src, &dst, false).unwrap();

        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "current");
    }

    #[test]
    fn test_remove_path_all_handles_files_dirs_and_missing() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f.txt");
        let dir = temp.path().join("d");
        fs::write(&file, "x").unwrap();
        fs::create_dir_all(dir.join("inner")).unwrap();

        remove_path_all(&file).unwrap();
        remove_path_all(&dir).unwrap();
        remove_path_all(&temp.path().join("missing")).unwrap();

        assert!(!file.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_dir_size_sums_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a"), [0u8; 10]).unwrap();
        fs::create_dir_all(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub/b"), [0u8; 5]).unwrap();

        assert_eq!(dir_size(temp.path()), 15);
    }
}
