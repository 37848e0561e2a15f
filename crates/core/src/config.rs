//! Optional sidecar config loading (§6): lets library callers override
//! `PackOptions` from a `pak-tool.toml` file without adding CLI flags,
//! using the same `toml::from_str` over `fs::read_to_string` idiom the
//! teacher's `pack::do_pack` uses for its archive config.

use std::path::Path;

use crate::error::{PakError, Result};
use crate::writer::PackOptions;

/// Reads `path` as TOML and deserializes it into `PackOptions`. Missing
/// fields fall back to `PackOptions::default()` via `#[serde(default)]`.
pub fn load_pack_options(path: impl AsRef<Path>) -> Result<PackOptions> {
    let text = std::fs::read_to_string(path)?;
    toml::from_str(&text).map_err(|e| PakError::Corrupt(format!("invalid pak-tool.toml: {e}")))
}

/// Looks for `pak-tool.toml` next to `source_dir` and loads it if present,
/// otherwise returns the default options.
pub fn load_pack_options_for(source_dir: impl AsRef<Path>) -> Result<PackOptions> {
    let sidecar = source_dir.as_ref().with_file_name("pak-tool.toml");
    if sidecar.is_file() {
        load_pack_options(sidecar)
    } else {
        Ok(PackOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sidecar_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("mod_dir");
        std::fs::create_dir_all(&source).unwrap();
        let opts = load_pack_options_for(&source).unwrap();
        assert!(opts.compress);
    }

    #[test]
    fn sidecar_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pak-tool.toml"),
            "compress = false\nuncompressed_suffixes = [\".bik\"]\nmetadata_zlib_level = 9\n",
        )
        .unwrap();
        let source = dir.path().join("mod_dir");
        std::fs::create_dir_all(&source).unwrap();

        let opts = load_pack_options_for(&source).unwrap();
        assert!(!opts.compress);
        assert_eq!(opts.metadata_zlib_level, 9);
        assert_eq!(opts.uncompressed_suffixes, vec![".bik".to_string()]);
    }

    #[test]
    fn malformed_sidecar_is_corrupt_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pak-tool.toml"), "not valid toml =====").unwrap();
        let source = dir.path().join("mod_dir");
        std::fs::create_dir_all(&source).unwrap();

        assert!(matches!(
            load_pack_options_for(&source),
            Err(PakError::Corrupt(_))
        ));
    }
}
