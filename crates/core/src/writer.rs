//! Archive writer (§4.5): walks a source tree deterministically and streams
//! each file through the chunk codec, single-threaded and sequential (§5 —
//! chunk ordering is part of the on-disk contract).

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::SystemTime;

use byteorder::{LittleEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::chunk::encode_chunk;
use crate::directory::encode_directory;
use crate::error::{PakError, Result};
use crate::filetime_support::system_time_to_filetime;
use crate::format::{is_uncompressed_suffix, CHUNK_SIZE, HEADER_LEN, MAGIC, VERSION};
use crate::model::Entry;
use crate::path::{sanitize_relative, to_archive_format};
use crate::progress::{NullProgress, Progress};

/// Options controlling packer behavior (§4.5 `pack` Options). Deserializable
/// so callers can load overrides from a sidecar `pak-tool.toml` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackOptions {
    pub compress: bool,
    pub uncompressed_suffixes: Vec<String>,
    pub metadata_zlib_level: u32,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            compress: true,
            uncompressed_suffixes: crate::format::DEFAULT_UNCOMPRESSED_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            metadata_zlib_level: 1,
        }
    }
}

/// Packs `source_dir` into a new archive at `dest_path` (§4.5).
pub fn pack(source_dir: impl AsRef<Path>, dest_path: impl AsRef<Path>, options: &PackOptions) -> Result<()> {
    pack_with_progress(source_dir, dest_path, options, &NullProgress)
}

pub fn pack_with_progress(
    source_dir: impl AsRef<Path>,
    dest_path: impl AsRef<Path>,
    options: &PackOptions,
    progress: &dyn Progress,
) -> Result<()> {
    let source_dir = source_dir.as_ref();
    let mut relative_paths = collect_relative_paths(source_dir)?;
    relative_paths.sort();

    progress.on_status(&format!("packing {} files", relative_paths.len()));

    let out_file = File::create(dest_path.as_ref())?;
    let mut out = BufWriter::new(out_file);

    out.write_u32::<LittleEndian>(MAGIC)?;
    out.write_u32::<LittleEndian>(VERSION)?;
    out.write_u32::<LittleEndian>(0)?; // trailer offset placeholder, patched below
    let mut cursor: u32 = HEADER_LEN as u32;

    let mut entries = Vec::with_capacity(relative_paths.len());

    for (i, rel) in relative_paths.iter().enumerate() {
        let full_path = source_dir.join(rel);
        let archive_path = to_archive_format(rel);
        let entry = write_file(&mut out, &full_path, &archive_path, cursor, options)?;
        cursor = entry
            .file_offset
            .checked_add(entry_body_len(&entry))
            .ok_or_else(|| PakError::Corrupt("archive exceeds u32 addressing".into()))?;
        entries.push(entry);
        progress.on_progress((((i + 1) * 100) / relative_paths.len().max(1)) as u8);
    }

    let trailer_offset = cursor as u64;
    let directory_bytes = encode_directory(&entries, options.metadata_zlib_level)?;
    out.write_all(&directory_bytes)?;
    out.flush()?;

    // Patch the one fixed slot: the trailer offset at byte 8 (§4.5 write-order invariant).
    let mut file = out.into_inner().map_err(|e| PakError::Io(e.into_error()))?;
    file.seek(SeekFrom::Start(8))?;
    file.write_u32::<LittleEndian>(trailer_offset as u32)?;
    file.flush()?;

    progress.on_status("pack complete");
    Ok(())
}

fn entry_body_len(entry: &Entry) -> u32 {
    entry
        .chunks
        .iter()
        .map(|c| {
            if c.is_stored() {
                c.stored_body_len()
            } else {
                c.lzo_body_len()
            }
        })
        .sum()
}

/// Empty files are skipped entirely, matching `pak_tool.py`'s `pack_pak`
/// (its `first_chunk` flag never flips for a zero-byte file, so no
/// metadata record is ever written for one). Keeping them would emit an
/// entry whose `file_offset` never advances the cursor, colliding with
/// whatever entry follows it and violating the strictly-increasing
/// `file_offset` invariant checked in `Unpacker::open`.
fn collect_relative_paths(source_dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(source_dir).into_iter() {
        let entry = entry.map_err(|e| PakError::Io(std::io::Error::other(e)))?;
        if entry.file_type().is_file() {
            let metadata = entry.metadata().map_err(|e| PakError::Io(std::io::Error::other(e)))?;
            if metadata.len() == 0 {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(source_dir)
                .unwrap_or(entry.path())
                .to_path_buf();
            let sanitized = sanitize_relative(&relative)?;
            paths.push(sanitized);
        }
    }
    Ok(paths)
}

fn write_file(
    out: &mut impl Write,
    full_path: &Path,
    archive_path: &str,
    file_offset: u32,
    options: &PackOptions,
) -> Result<Entry> {
    let metadata = std::fs::metadata(full_path)?;
    let file_size = metadata.len();
    if file_size > u32::MAX as u64 {
        return Err(PakError::Corrupt(format!(
            "{archive_path} exceeds the 4 GiB entry size limit"
        )));
    }
    let file_size = file_size as u32;
    let filetime = system_time_to_filetime(metadata.created().unwrap_or(SystemTime::now()));
    let path_hash = crc32fast::hash(archive_path.as_bytes());

    let force_stored = !options.compress
        || is_uncompressed_suffix(archive_path, &options.uncompressed_suffixes);

    let mut chunks = Vec::new();
    if file_size > 0 {
        let mut reader = BufReader::new(File::open(full_path)?);
        let mut remaining = file_size;
        while remaining > 0 {
            let take = remaining.min(CHUNK_SIZE);
            let mut window = vec![0u8; take as usize];
            reader.read_exact(&mut window)?;
            let (header, body) = encode_chunk(&window, force_stored);
            out.write_all(&body)?;
            chunks.push(header);
            remaining -= take;
        }
    }

    Ok(Entry {
        path: archive_path.to_string(),
        file_size,
        path_hash,
        filetime,
        file_offset,
        chunks,
    })
}
