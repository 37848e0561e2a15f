//! Merge planner (§4.6): layers N unpacked mod directories into one.
//! §4.6's formula `k = max{i : p ∈ Mᵢ}` and §8 scenario 6 both require the
//! *last* directory in the priority list to win on overlap, so mods are
//! copied in list order and later copies overwrite earlier ones.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;
use crate::progress::{NullProgress, Progress};

#[derive(Debug, Default)]
pub struct MergeReport {
    pub copied: usize,
    /// Mod directories referenced in the priority list but missing on disk;
    /// the planner skips them rather than invoking the reader on demand.
    pub skipped: Vec<PathBuf>,
}

/// `mods` is ordered with the last element taking priority on overlap
/// (§4.6: `k = max{i : p ∈ Mᵢ}`). The planner copies in list order, so the
/// last directory is written last and overwrites any earlier copy of the
/// same relative path.
pub fn merge(mods: &[PathBuf], dest_dir: impl AsRef<Path>) -> Result<MergeReport> {
    merge_with_progress(mods, dest_dir, &NullProgress)
}

pub fn merge_with_progress(
    mods: &[PathBuf],
    dest_dir: impl AsRef<Path>,
    progress: &dyn Progress,
) -> Result<MergeReport> {
    let dest_dir = dest_dir.as_ref();
    std::fs::create_dir_all(dest_dir)?;

    let mut report = MergeReport::default();

    for mod_dir in mods.iter() {
        if !mod_dir.is_dir() {
            progress.on_log(&format!("skipping missing mod directory {}", mod_dir.display()));
            report.skipped.push(mod_dir.clone());
            continue;
        }
        progress.on_status(&format!("merging {}", mod_dir.display()));

        for entry in WalkDir::new(mod_dir) {
            let entry = entry.map_err(|e| crate::error::PakError::Io(std::io::Error::other(e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(mod_dir).unwrap_or(entry.path());
            let dest_path = dest_dir.join(relative);
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &dest_path)?;
            report.copied += 1;
        }
    }

    Ok(report)
}

/// Filters out disabled mods before merging, matching the GUI's
/// `mod_enabled` flag (§4.6: "Disabled mods are filtered out before this
/// computation").
pub fn enabled_mods(mods: &[PathBuf], enabled: &std::collections::HashMap<PathBuf, bool>) -> Vec<PathBuf> {
    mods.iter()
        .filter(|m| *enabled.get(*m).unwrap_or(&true))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn idempotent_for_single_mod() {
        let m1 = tempfile::tempdir().unwrap();
        write(m1.path(), "a/x.txt", "one");
        write(m1.path(), "b/y.txt", "A");

        let dest = tempfile::tempdir().unwrap();
        let report = merge(&[m1.path().to_path_buf()], dest.path()).unwrap();
        assert_eq!(report.copied, 2);
        assert_eq!(std::fs::read_to_string(dest.path().join("a/x.txt")).unwrap(), "one");
        assert_eq!(std::fs::read_to_string(dest.path().join("b/y.txt")).unwrap(), "A");
    }

    #[test]
    fn last_in_list_wins_on_overlap() {
        let m1 = tempfile::tempdir().unwrap();
        write(m1.path(), "a/x.txt", "one");
        write(m1.path(), "b/y.txt", "A");

        let m2 = tempfile::tempdir().unwrap();
        write(m2.path(), "a/x.txt", "two");

        let dest = tempfile::tempdir().unwrap();
        // [M1, M2]: §4.6's k = max{i : p in Mi} makes M2, the last entry,
        // win the overlap on a/x.txt.
        let mods = vec![m1.path().to_path_buf(), m2.path().to_path_buf()];
        merge(&mods, dest.path()).unwrap();

        assert_eq!(std::fs::read_to_string(dest.path().join("a/x.txt")).unwrap(), "two");
        assert_eq!(std::fs::read_to_string(dest.path().join("b/y.txt")).unwrap(), "A");
    }

    #[test]
    fn missing_mod_directory_is_skipped_with_warning() {
        let dest = tempfile::tempdir().unwrap();
        let missing = PathBuf::from("/nonexistent/mod/path/for/pak-tool/tests");
        let report = merge(&[missing.clone()], dest.path()).unwrap();
        assert_eq!(report.skipped, vec![missing]);
        assert_eq!(report.copied, 0);
    }
}
