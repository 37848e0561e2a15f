//! Metadata codec (§4.3): encodes/decodes the zlib-chunked directory block.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::chunk::{read_chunk_header, write_chunk_header};
use crate::error::{PakError, Result};
use crate::format::{ChunkHeader, CHUNK_SIZE, DIRECTORY_MARKER, SIDE_TABLE_FLAG};
use crate::model::Entry;

/// Builds the logical (uncompressed) directory block: fixed records followed
/// by variable-length tails (§3 DirectoryBlock).
fn build_logical_block(entries: &[Entry]) -> Result<Vec<u8>> {
    let mut fixed = Vec::new();
    let mut tails = Vec::new();

    for e in entries {
        fixed.write_u32::<LittleEndian>(e.file_offset)?;
        fixed.write_u32::<LittleEndian>(e.file_size)?;
        fixed.write_u32::<LittleEndian>(e.path_hash)?;
        for c in &e.chunks {
            write_chunk_header(&mut fixed, *c)?;
        }
    }

    for e in entries {
        let path_bytes = e.path.as_bytes();
        tails.write_u64::<LittleEndian>(e.filetime)?;
        tails.push(path_bytes.len() as u8);
        tails.extend_from_slice(path_bytes);
    }

    let mut block = Vec::with_capacity(5 + fixed.len() + tails.len());
    block.push(DIRECTORY_MARKER);
    block.write_u32::<LittleEndian>(entries.len() as u32)?;
    block.extend_from_slice(&fixed);
    block.extend_from_slice(&tails);
    Ok(block)
}

/// Encodes the directory and returns the bytes to append to the archive,
/// starting at the trailer offset (§6: `size_prefix`, compressed bytes,
/// `record_count`, side-table records).
pub fn encode_directory(entries: &[Entry], zlib_level: u32) -> Result<Vec<u8>> {
    let logical = build_logical_block(entries)?;

    let mut compressed = Vec::new();
    // Sentinel record: decompressed size 0, offset 4 (past the size_prefix).
    let mut side_table = Vec::new();
    write_side_record(&mut side_table, 0, 4)?;
    let mut end_offset: u32 = 4;
    let mut decompressed_so_far: u32 = 0;
    let mut record_count: u32 = 1;

    for window in logical.chunks(CHUNK_SIZE as usize) {
        decompressed_so_far += window.len() as u32;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(zlib_level));
        encoder
            .write_all(window)
            .map_err(|e| PakError::Zlib(e.to_string()))?;
        let piece = encoder
            .finish()
            .map_err(|e| PakError::Zlib(e.to_string()))?;
        end_offset += piece.len() as u32;
        compressed.extend_from_slice(&piece);
        write_side_record(&mut side_table, decompressed_so_far, end_offset)?;
        record_count += 1;
    }

    let mut out = Vec::with_capacity(4 + compressed.len() + 4 + side_table.len());
    out.write_u32::<LittleEndian>(compressed.len() as u32 + 4)?;
    out.extend_from_slice(&compressed);
    out.write_u32::<LittleEndian>(record_count)?;
    out.extend_from_slice(&side_table);
    Ok(out)
}

fn write_side_record(out: &mut Vec<u8>, decompressed_size: u32, end_offset: u32) -> Result<()> {
    out.write_u32::<LittleEndian>(decompressed_size)?;
    let offset_bytes = end_offset.to_le_bytes();
    out.extend_from_slice(&offset_bytes[..3]);
    out.push(SIDE_TABLE_FLAG);
    Ok(())
}

fn read_side_record(input: &mut impl Read) -> Result<(u32, u32)> {
    let decompressed_size = input.read_u32::<LittleEndian>()?;
    let mut offset_buf = [0u8; 4];
    input.read_exact(&mut offset_buf)?;
    let end_offset = u32::from_le_bytes([offset_buf[0], offset_buf[1], offset_buf[2], 0]);
    Ok((decompressed_size, end_offset))
}

/// Decodes the directory given a reader positioned anywhere and the
/// absolute trailer offset from the archive header (§4.3 Decoding).
pub fn decode_directory<R: Read + Seek>(reader: &mut R, trailer_offset: u64) -> Result<Vec<Entry>> {
    reader.seek(SeekFrom::Start(trailer_offset))?;
    let size_prefix = reader.read_u32::<LittleEndian>()?;

    reader.seek(SeekFrom::Start(trailer_offset + size_prefix as u64))?;
    let record_count = reader.read_u32::<LittleEndian>()?;

    let mut records = Vec::with_capacity(record_count as usize);
    for _ in 0..record_count {
        records.push(read_side_record(reader)?);
    }

    // Tolerate an absent or present leading sentinel (§9 Open Questions).
    let has_sentinel = records.first().is_some_and(|&(d, o)| d == 0 && o == 4);
    let windows = if has_sentinel { &records[1..] } else { &records[..] };

    let mut logical = Vec::new();
    let mut prev_end = 4u32;
    reader.seek(SeekFrom::Start(trailer_offset + 4))?;
    for &(_decompressed_size, end_offset) in windows {
        if end_offset < prev_end {
            return Err(PakError::Corrupt(
                "side-table offsets are not monotone".into(),
            ));
        }
        let compressed_len = (end_offset - prev_end) as usize;
        let mut compressed = vec![0u8; compressed_len];
        reader.read_exact(&mut compressed)?;
        let mut decoder = ZlibDecoder::new(compressed.as_slice());
        decoder
            .read_to_end(&mut logical)
            .map_err(|e| PakError::Zlib(e.to_string()))?;
        prev_end = end_offset;
    }

    parse_logical_block(&logical)
}

fn parse_logical_block(logical: &[u8]) -> Result<Vec<Entry>> {
    let mut cur = logical;
    let marker = cur
        .read_u8()
        .map_err(|_| PakError::Truncated("directory marker".into()))?;
    if marker != DIRECTORY_MARKER {
        return Err(PakError::Corrupt(format!(
            "unexpected directory marker {marker}"
        )));
    }
    let file_count = cur
        .read_u32::<LittleEndian>()
        .map_err(|_| PakError::Truncated("file_count".into()))?;

    struct Fixed {
        file_offset: u32,
        file_size: u32,
        path_hash: u32,
        chunks: Vec<ChunkHeader>,
    }

    let mut fixed = Vec::with_capacity(file_count as usize);
    for _ in 0..file_count {
        let file_offset = cur.read_u32::<LittleEndian>()?;
        let file_size = cur.read_u32::<LittleEndian>()?;
        let path_hash = cur.read_u32::<LittleEndian>()?;
        let chunk_count = Entry::expected_chunk_count(file_size);
        let mut chunks = Vec::with_capacity(chunk_count);
        for _ in 0..chunk_count {
            chunks.push(read_chunk_header(&mut cur)?);
        }
        fixed.push(Fixed {
            file_offset,
            file_size,
            path_hash,
            chunks,
        });
    }

    let mut entries = Vec::with_capacity(file_count as usize);
    for f in fixed {
        let filetime = cur.read_u64::<LittleEndian>()?;
        let path_len = cur.read_u8()?;
        let mut path_buf = vec![0u8; path_len as usize];
        cur.read_exact(&mut path_buf)?;
        let path = String::from_utf8(path_buf)
            .map_err(|e| PakError::Corrupt(format!("non-utf8 path: {e}")))?;
        entries.push(Entry {
            path,
            file_size: f.file_size,
            path_hash: f.path_hash,
            filetime,
            file_offset: f.file_offset,
            chunks: f.chunks,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_entries() -> Vec<Entry> {
        vec![
            Entry {
                path: "a/x.txt".into(),
                file_size: 3,
                path_hash: crc32fast::hash(b"a/x.txt"),
                filetime: 0,
                file_offset: 12,
                chunks: vec![ChunkHeader::stored(3)],
            },
            Entry {
                path: "b/y.txt".into(),
                file_size: 0,
                path_hash: crc32fast::hash(b"b/y.txt"),
                filetime: 0,
                file_offset: 15,
                chunks: vec![],
            },
        ]
    }

    #[test]
    fn directory_roundtrips() {
        let entries = sample_entries();
        let encoded = encode_directory(&entries, 6).unwrap();

        // Simulate the archive layout: header(12) + payload(3 bytes) + trailer.
        let mut archive = vec![0u8; 15];
        archive.extend_from_slice(&encoded);
        let trailer_offset = 15u64;

        let mut cursor = Cursor::new(archive);
        let decoded = decode_directory(&mut cursor, trailer_offset).unwrap();

        assert_eq!(decoded.len(), entries.len());
        for (a, b) in decoded.iter().zip(entries.iter()) {
            assert_eq!(a.path, b.path);
            assert_eq!(a.file_size, b.file_size);
            assert_eq!(a.path_hash, b.path_hash);
            assert_eq!(a.file_offset, b.file_offset);
        }
    }

    #[test]
    fn empty_directory_roundtrips() {
        let entries: Vec<Entry> = Vec::new();
        let encoded = encode_directory(&entries, 6).unwrap();
        let mut archive = vec![0u8; 12];
        archive.extend_from_slice(&encoded);
        let mut cursor = Cursor::new(archive);
        let decoded = decode_directory(&mut cursor, 12).unwrap();
        assert!(decoded.is_empty());
    }
}
