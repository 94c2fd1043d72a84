//! File-system helpers shared by the pipeline stages.

use crate::error::BuildError;
use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Regular files directly inside `dir` whose names pass `accept`, sorted by name.
///
/// A symlink counts as a file unless it points at a directory. Dangling links
/// are listed too, so copying them fails for that file alone.
/// Sub-directories are never descended into.
pub fn list_files(dir: &Path, accept: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, BuildError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            BuildError::fs(path, io::Error::from(err))
        })?;

        let file_type = entry.file_type();
        let is_file = file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir());
        if is_file && accept(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Copy `src` into `dest_dir`, keeping its file name.
pub fn copy_into(src: &Path, dest_dir: &Path) -> Result<PathBuf, BuildError> {
    let name = src.file_name().unwrap_or(OsStr::new(""));
    let dest = dest_dir.join(name);
    fs::copy(src, &dest).map_err(|err| BuildError::fs(src, err))?;
    Ok(dest)
}

/// Remove `dir` recursively. A missing directory is not an error.
///
/// Returns whether anything was removed.
pub fn remove_dir_if_exists(dir: &Path) -> Result<bool, BuildError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(BuildError::fs(dir, err)),
    }
}

/// File name of `path` as text, for log lines.
pub fn display_name(path: &Path) -> std::borrow::Cow<'_, str> {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.js"), "b").unwrap();
        fs::write(dir.path().join("a.js"), "a").unwrap();
        fs::write(dir.path().join("notes.txt"), "n").unwrap();
        fs::create_dir(dir.path().join("templates")).unwrap();
        fs::write(dir.path().join("templates").join("nested.js"), "n").unwrap();

        let files = list_files(dir.path(), |name| name.ends_with(".js")).unwrap();
        let names: Vec<_> = files.iter().map(|p| display_name(p).into_owned()).collect();
        assert_eq!(names, vec!["a.js", "b.js"]);
    }

    #[test]
    fn test_list_files_skips_directories_matching_filter() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("old.html")).unwrap();
        fs::write(dir.path().join("index.html"), "<p>").unwrap();

        let files = list_files(dir.path(), |name| name.ends_with(".html")).unwrap();
        assert_eq!(files, vec![dir.path().join("index.html")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_files_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        fs::write(target.path().join("real.css"), "a{}").unwrap();
        symlink(target.path().join("real.css"), dir.path().join("linked.css")).unwrap();
        symlink(target.path(), dir.path().join("linked_dir")).unwrap();
        symlink(dir.path().join("gone.css"), dir.path().join("dangling.css")).unwrap();

        let files = list_files(dir.path(), |_| true).unwrap();
        let names: Vec<_> = files.iter().map(|p| display_name(p).into_owned()).collect();
        assert_eq!(names, vec!["dangling.css", "linked.css"]);

        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        assert_eq!(fs::read_to_string(copy_into(&files[1], &out).unwrap()).unwrap(), "a{}");
        assert!(matches!(copy_into(&files[0], &out), Err(BuildError::FileSystem { .. })));
    }

    #[test]
    fn test_list_files_missing_dir_is_error() {
        let dir = TempDir::new().unwrap();
        let result = list_files(&dir.path().join("absent"), |_| true);
        assert!(matches!(result, Err(BuildError::FileSystem { .. })));
    }

    #[test]
    fn test_copy_into_keeps_name_and_bytes() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("logo.png");
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(&src, [0u8, 159, 146, 150]).unwrap();

        let dest = copy_into(&src, &out).unwrap();
        assert_eq!(dest, out.join("logo.png"));
        assert_eq!(fs::read(dest).unwrap(), vec![0u8, 159, 146, 150]);
    }

    #[test]
    fn test_copy_into_missing_dest_dir() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("app.js");
        fs::write(&src, "var x=1;").unwrap();

        let err = copy_into(&src, &dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, BuildError::FileSystem { path, .. } if path == src));
    }

    #[test]
    fn test_remove_dir_if_exists() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("output");
        fs::create_dir_all(target.join("js")).unwrap();
        fs::write(target.join("js").join("app.js"), "x").unwrap();

        assert!(remove_dir_if_exists(&target).unwrap());
        assert!(!target.exists());
        assert!(!remove_dir_if_exists(&target).unwrap());
    }
}
