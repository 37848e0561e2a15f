//! Integration round-trip tests covering the scenarios in spec §8.

use std::path::Path;

use pak_core::reader::Unpacker;
use pak_core::writer::{pack, PackOptions};

fn write_tree(dir: &Path, files: &[(&str, &[u8])]) {
    for (rel, content) in files {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
}

fn collect_tree(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.unwrap();
        if entry.file_type().is_file() {
            let rel = entry
                .path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            out.push((rel, std::fs::read(entry.path()).unwrap()));
        }
    }
    out.sort();
    out
}

#[test]
fn unpack_of_pack_reproduces_source_tree() {
    let src = tempfile::tempdir().unwrap();
    write_tree(
        src.path(),
        &[
            ("hello.txt", b"HELLO\nWORLD"),
            ("textures/a.bik", b"not really compressible bink data"),
            ("nested/deep/file.dat", &[0u8; 65537]),
        ],
    );

    let dest = tempfile::tempdir().unwrap();
    let archive = dest.path().join("out.pak");
    pack(src.path(), &archive, &PackOptions::default()).unwrap();

    let unpacker = Unpacker::open(&archive).unwrap();
    let extracted = dest.path().join("extracted");
    let report = unpacker.extract_all(&extracted).unwrap();
    assert_eq!(report.failures().count(), 0);

    assert_eq!(collect_tree(src.path()), collect_tree(&extracted));
}

#[test]
fn header_is_stable() {
    let src = tempfile::tempdir().unwrap();
    write_tree(src.path(), &[("a.txt", b"x")]);
    let dest = tempfile::tempdir().unwrap();
    let archive = dest.path().join("out.pak");
    pack(src.path(), &archive, &PackOptions::default()).unwrap();

    let bytes = std::fs::read(&archive).unwrap();
    assert_eq!(&bytes[0..4], b"PAK!");
    assert_eq!(&bytes[4..8], &4u32.to_le_bytes());
    let trailer_off = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    assert!((trailer_off as usize) < bytes.len());
}

#[test]
fn bik_suffix_is_always_stored() {
    let src = tempfile::tempdir().unwrap();
    // Highly compressible content that would otherwise shrink under LZO.
    write_tree(src.path(), &[("clip.bik", &vec![0u8; 4096])]);
    let dest = tempfile::tempdir().unwrap();
    let archive = dest.path().join("out.pak");
    pack(src.path(), &archive, &PackOptions::default()).unwrap();

    let unpacker = Unpacker::open(&archive).unwrap();
    assert_eq!(unpacker.entries.len(), 1);
    assert!(unpacker.entries[0].chunks[0].is_stored());
}

#[test]
fn unsafe_paths_are_rejected_during_extraction() {
    use pak_core::path::normalize_for_extraction;
    assert!(normalize_for_extraction("../escape.txt").is_err());
    assert!(normalize_for_extraction("/etc/passwd").is_ok()); // leading separators are stripped, not rejected
}
