// src/pipeline/sources.rs

use std::path::{Path, PathBuf};

use globset::GlobSet;
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{BuildError, Result};

/// Expand the source pattern into the ordered source file set.
///
/// Paths are returned relative to `root`, sorted lexically; the order is
/// significant because concatenation preserves it. An empty result is not an
/// error (it yields an empty artifact).
pub fn resolve_sources(root: &Path, matcher: &GlobSet) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            let source = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem walk error"));
            BuildError::fs(path, source)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        if matcher.is_match(&rel_str) {
            files.push(rel.to_path_buf());
        }
    }

    files.sort();
    debug!(count = files.len(), "resolved source file set");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use globset::{Glob, GlobSetBuilder};

    use super::*;

    fn matcher(pattern: &str) -> GlobSet {
        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new(pattern).unwrap());
        builder.build().unwrap()
    }

    #[test]
    fn resolution_is_lexical_and_relative() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/less")).unwrap();
        fs::write(dir.path().join("src/less/b.less"), ".b{}").unwrap();
        fs::write(dir.path().join("src/less/a.less"), ".a{}").unwrap();
        fs::write(dir.path().join("src/less/notes.txt"), "x").unwrap();

        let files = resolve_sources(dir.path(), &matcher("src/less/*.less")).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("src/less/a.less"),
                PathBuf::from("src/less/b.less")
            ]
        );
    }

    #[test]
    fn no_matches_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = resolve_sources(dir.path(), &matcher("src/less/*.less")).unwrap();
        assert!(files.is_empty());
    }
}
