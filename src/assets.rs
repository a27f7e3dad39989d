//! Static asset copying.
//!
//! ```text
//! public/**            →  dist/assets/**
//! assets/fonts/**      →  dist/assets/fonts/**
//! assets/<file>        →  dist/assets/<file>     (top level only)
//! ```
//!
//! Files are copied byte for byte. A missing source directory is not an
//! error; the caller decides whether to warn.

use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// What one copy step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub bytes: u64,
}

/// Recursively copy `src` into `dst`. Returns `Ok(None)` if `src` does not exist.
pub fn copy_dir(src: &Path, dst: &Path) -> io::Result<Option<CopyStats>> {
    if !src.is_dir() {
        return Ok(None);
    }
    let mut stats = CopyStats::default();
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            stats.bytes += fs::copy(entry.path(), &target)?;
            stats.files += 1;
        }
    }
    Ok(Some(stats))
}

/// Copy only the regular files directly inside `src`.
pub fn copy_top_level_files(src: &Path, dst: &Path) -> io::Result<Option<CopyStats>> {
    if !src.is_dir() {
        return Ok(None);
    }
    fs::create_dir_all(dst)?;
    let mut stats = CopyStats::default();
    let mut files: Vec<_> = fs::read_dir(src)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    for path in files {
        if let Some(name) = path.file_name() {
            stats.bytes += fs::copy(&path, dst.join(name))?;
            stats.files += 1;
        }
    }
    Ok(Some(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copy_dir_preserves_structure_and_bytes() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("public");
        fs::create_dir_all(src.join("img/icons")).unwrap();
        let binary: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
        fs::write(src.join("img/icons/logo.png"), &binary).unwrap();
        fs::write(src.join("robots.txt"), "User-agent: *\n").unwrap();

        let dst = tmp.path().join("dist/assets");
        let stats = copy_dir(&src, &dst).unwrap().unwrap();

        assert_eq!(stats.files, 2);
        assert_eq!(stats.bytes, 1024 + 14);
        assert_eq!(fs::read(dst.join("img/icons/logo.png")).unwrap(), binary);
        assert_eq!(fs::read_to_string(dst.join("robots.txt")).unwrap(), "User-agent: *\n");
    }

    #[test]
    fn copy_dir_missing_source_is_none() {
        let tmp = TempDir::new().unwrap();
        let result = copy_dir(&tmp.path().join("nope"), &tmp.path().join("out")).unwrap();
        assert!(result.is_none());
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn copy_top_level_skips_directories() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("assets");
        fs::create_dir_all(src.join("fonts")).unwrap();
        fs::write(src.join("fonts/inter.woff2"), b"font").unwrap();
        fs::write(src.join("favicon.svg"), b"<svg/>").unwrap();

        let dst = tmp.path().join("out");
        let stats = copy_top_level_files(&src, &dst).unwrap().unwrap();
        assert_eq!(stats.files, 1);
        assert!(dst.join("favicon.svg").exists());
        assert!(!dst.join("fonts").exists());
    }
}
