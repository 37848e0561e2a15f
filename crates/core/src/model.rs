use crate::format::ChunkHeader;

/// One logical file inside an archive.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Relative path using the source separator byte-for-byte as encoded in the archive.
    pub path: String,
    pub file_size: u32,
    pub path_hash: u32,
    /// Windows FILETIME: 100-ns intervals since 1601-01-01 UTC.
    pub filetime: u64,
    /// Absolute byte offset of the entry's first chunk body.
    pub file_offset: u32,
    pub chunks: Vec<ChunkHeader>,
}

impl Entry {
    pub fn expected_chunk_count(file_size: u32) -> usize {
        if file_size == 0 {
            0
        } else {
            file_size.div_ceil(crate::format::CHUNK_SIZE) as usize
        }
    }
}
