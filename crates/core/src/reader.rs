//! Archive reader (§4.4): validates the header, decodes the directory, and
//! drives parallel extraction.

use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use byteorder::{LittleEndian, ReadBytesExt};
use rayon::prelude::*;

use crate::chunk::{inflated_len, read_chunk_body};
use crate::directory::decode_directory;
use crate::error::{PakError, Result};
use crate::filetime_support::{FileTimeRestorer, PlatformFileTimeRestorer};
use crate::format::{HEADER_LEN, MAGIC, VERSION};
use crate::model::Entry;
use crate::path::normalize_for_extraction;
use crate::progress::{NullProgress, Progress};

/// Outcome of one entry's extraction attempt.
#[derive(Debug)]
pub struct EntryResult {
    pub path: String,
    pub outcome: std::result::Result<(), String>,
}

/// Aggregated result of `extract_all`: per-entry errors are collected here
/// rather than aborting the whole extraction (§4.4, §7).
#[derive(Debug, Default)]
pub struct ExtractReport {
    pub results: Vec<EntryResult>,
}

impl ExtractReport {
    pub fn failures(&self) -> impl Iterator<Item = &EntryResult> {
        self.results.iter().filter(|r| r.outcome.is_err())
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_ok()).count()
    }
}

/// A validated, open archive, ready for extraction.
pub struct Unpacker {
    path: PathBuf,
    pub entries: Vec<Entry>,
}

impl Unpacker {
    /// Validates magic/version and decodes the directory (§4.4 `open`).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let mut reader = BufReader::new(file);

        let magic = reader.read_u32::<LittleEndian>()?;
        if magic != MAGIC {
            return Err(PakError::NotPak);
        }
        let version = reader.read_u32::<LittleEndian>()?;
        if version != VERSION {
            return Err(PakError::UnsupportedVersion(version));
        }
        let trailer_offset = reader.read_u32::<LittleEndian>()?;

        let file_len = reader.seek(SeekFrom::End(0))?;
        if (trailer_offset as u64) < HEADER_LEN || trailer_offset as u64 >= file_len {
            return Err(PakError::Truncated(format!(
                "trailer offset {trailer_offset} outside file of length {file_len}"
            )));
        }

        let entries = decode_directory(&mut reader, trailer_offset as u64)?;

        let mut prev_offset = 0u32;
        for (i, e) in entries.iter().enumerate() {
            if i > 0 && e.file_offset <= prev_offset {
                return Err(PakError::Corrupt(format!(
                    "entry {i} file_offset {} is not strictly increasing",
                    e.file_offset
                )));
            }
            prev_offset = e.file_offset;
        }

        Ok(Self { path, entries })
    }

    /// Extracts every entry to `dest_dir`. Parallelism policy per §4.4: when
    /// there are more than 4 entries, dispatch across
    /// `min(entries, hardware_parallelism)` workers via rayon; otherwise run
    /// sequentially (rayon's own pool already behaves this way for small
    /// inputs, so no special-casing is needed beyond the iterator choice).
    pub fn extract_all(&self, dest_dir: impl AsRef<Path>) -> Result<ExtractReport> {
        self.extract_all_with(dest_dir, &NullProgress, &PlatformFileTimeRestorer, None)
    }

    pub fn extract_all_with(
        &self,
        dest_dir: impl AsRef<Path>,
        progress: &dyn Progress,
        restorer: &dyn FileTimeRestorer,
        cancel: Option<&AtomicBool>,
    ) -> Result<ExtractReport> {
        let dest_dir = dest_dir.as_ref();
        std::fs::create_dir_all(dest_dir)?;
        progress.on_status(&format!("extracting {} entries", self.entries.len()));

        let run_one = |entry: &Entry| -> EntryResult {
            let outcome = self.extract_one(dest_dir, entry, restorer, cancel);
            EntryResult {
                path: entry.path.clone(),
                outcome: outcome.map_err(|e| e.to_string()),
            }
        };

        let results: Vec<EntryResult> = if self.entries.len() > 4 {
            self.entries.par_iter().map(run_one).collect()
        } else {
            self.entries.iter().map(run_one).collect()
        };

        progress.on_status("extraction complete");
        Ok(ExtractReport { results })
    }

    fn extract_one(
        &self,
        dest_dir: &Path,
        entry: &Entry,
        restorer: &dyn FileTimeRestorer,
        cancel: Option<&AtomicBool>,
    ) -> Result<()> {
        let relative = normalize_for_extraction(&entry.path)?;
        let dest_path = dest_dir.join(&relative);
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Each worker opens its own handle; no position sharing across threads.
        let mut source = BufReader::new(File::open(&self.path)?);
        source.seek(SeekFrom::Start(entry.file_offset as u64))?;

        let out_file = File::create(&dest_path)?;
        let mut writer = BufWriter::new(out_file);

        let chunk_count = entry.chunks.len();
        for (i, &header) in entry.chunks.iter().enumerate() {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                drop(writer);
                let _ = std::fs::remove_file(&dest_path);
                return Ok(());
            }
            let expected = inflated_len(entry.file_size, chunk_count, i);
            let body = read_chunk_body(&mut source, header, expected)?;
            writer.write_all(&body)?;
        }
        writer.flush()?;
        drop(writer);

        let _ = restorer.restore_creation_time(&dest_path, entry.filetime);
        Ok(())
    }
}
