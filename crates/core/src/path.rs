//! Path handling for archive entries: safety-checked normalization on
//! extraction, and archive-format preservation on write (§4.4 Path safety).

use std::path::{Component, Path, PathBuf};

use crate::error::{PakError, Result};

/// Normalizes an entry's archive path into a safe relative path, stripping
/// leading separators and rejecting absolute paths or `..` components.
pub fn normalize_for_extraction(archive_path: &str) -> Result<PathBuf> {
    let unified = archive_path.replace('\\', "/");
    let mut out = PathBuf::new();
    for part in unified.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PakError::UnsafePath(PathBuf::from(archive_path)));
        }
        out.push(part);
    }
    if out.as_os_str().is_empty() {
        return Err(PakError::UnsafePath(PathBuf::from(archive_path)));
    }
    Ok(out)
}

/// Encodes a filesystem-relative path the way the archive stores it
/// (backslash separators, as the source format historically uses, §6).
pub fn to_archive_format(path: &Path) -> String {
    path.to_string_lossy().replace('/', "\\")
}

/// Rejects absolute paths and `..` segments without touching separator
/// style; used by the packer to validate paths collected from `walkdir`.
pub fn sanitize_relative(path: &Path) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => clean.push(name),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                return Err(PakError::UnsafePath(path.to_path_buf()));
            }
        }
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_separators() {
        let p = normalize_for_extraction("\\textures\\ui\\icon.png").unwrap();
        assert_eq!(p, Path::new("textures/ui/icon.png"));
    }

    #[test]
    fn rejects_parent_dir() {
        assert!(normalize_for_extraction("../../etc/passwd").is_err());
        assert!(normalize_for_extraction("a/../../b").is_err());
    }

    #[test]
    fn rejects_absolute_after_strip_if_empty() {
        assert!(normalize_for_extraction("/").is_err());
        assert!(normalize_for_extraction("").is_err());
    }

    #[test]
    fn to_archive_format_uses_backslashes() {
        assert_eq!(to_archive_format(Path::new("a/b/c.txt")), "a\\b\\c.txt");
    }
}
