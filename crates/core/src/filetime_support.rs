//! Windows FILETIME handling (§9 Design Notes: "FILETIME on non-Windows
//! hosts"). The codec stores and returns the integer faithfully on every
//! platform; restoring it to the filesystem is exposed behind a trait with
//! a no-op default.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;

/// 100-ns intervals between the FILETIME epoch (1601-01-01) and the Unix
/// epoch (1970-01-01).
const FILETIME_TO_UNIX_EPOCH_100NS: u64 = 116_444_736_000_000_000;

/// Converts a Windows FILETIME value into a `SystemTime`.
pub fn filetime_to_system_time(filetime: u64) -> SystemTime {
    let since_unix_100ns = filetime.saturating_sub(FILETIME_TO_UNIX_EPOCH_100NS);
    UNIX_EPOCH + std::time::Duration::from_nanos(since_unix_100ns * 100)
}

/// Converts a `SystemTime` into a Windows FILETIME value.
pub fn system_time_to_filetime(time: SystemTime) -> u64 {
    let since_unix = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or(std::time::Duration::ZERO);
    (since_unix.as_nanos() / 100) as u64 + FILETIME_TO_UNIX_EPOCH_100NS
}

/// Restores a file's creation time from an archive's FILETIME value. A
/// no-op default is used on platforms without creation-time support
/// (silently skipped per §4.4 `extract_all`).
pub trait FileTimeRestorer: Send + Sync {
    fn restore_creation_time(&self, _path: &Path, _filetime: u64) -> Result<()> {
        Ok(())
    }
}

/// Default restorer. `filetime` (already a workspace dependency) exposes
/// atime/mtime setters on every platform but no portable creation-time
/// setter, so on Unix we set mtime as the closest available analogue and
/// leave creation time untouched; on Windows, true creation-time restore
/// needs the Win32 `SetFileTime` API, outside this crate's dependency set,
/// so it stays a no-op extension point behind this trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformFileTimeRestorer;

impl FileTimeRestorer for PlatformFileTimeRestorer {
    #[cfg(unix)]
    fn restore_creation_time(&self, path: &Path, filetime: u64) -> Result<()> {
        let ft = filetime::FileTime::from_system_time(filetime_to_system_time(filetime));
        filetime::set_file_mtime(path, ft)?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn restore_creation_time(&self, _path: &Path, _filetime: u64) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filetime_roundtrips_to_system_time() {
        let original: u64 = 132_223_104_000_000_000; // 2020-01-01T00:00:00Z-ish
        let st = filetime_to_system_time(original);
        let back = system_time_to_filetime(st);
        // Sub-100ns rounding only; must match within one 100ns tick.
        assert!(back.abs_diff(original) <= 1);
    }
}
