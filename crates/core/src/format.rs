//! On-disk constants for the PAK! v4 container.

/// `PAK!` in little-endian bytes.
pub const MAGIC: u32 = 0x214B_4150;
pub const VERSION: u32 = 4;

pub const HEADER_LEN: u64 = 12;

/// Size of a payload window; every chunk but the last inflates to exactly this.
pub const CHUNK_SIZE: u32 = 65536;

/// Marker byte at the start of the decoded directory block.
pub const DIRECTORY_MARKER: u8 = 1;

/// Flag value marking a chunk as stored verbatim.
pub const FLAG_STORED: u16 = 0xFFFF;
/// Flag value marking a chunk as LZO1X-compressed.
pub const FLAG_LZO: u16 = 0;

/// Flag byte of a side-table record (always 128 as emitted by the writer).
pub const SIDE_TABLE_FLAG: u8 = 128;

/// File suffixes (case-insensitive) that are always stored, never LZO-compressed.
pub const DEFAULT_UNCOMPRESSED_SUFFIXES: [&str; 4] = [".vso", ".pso", ".rs", ".bik"];

/// One `(size_field, flag)` pair preceding a chunk body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub size_field: u16,
    pub flag: u16,
}

impl ChunkHeader {
    pub fn is_stored(&self) -> bool {
        self.flag == FLAG_STORED
    }

    pub fn is_lzo(&self) -> bool {
        self.flag == FLAG_LZO
    }

    /// Byte length of the body on disk, given `size_field`'s "0 means `CHUNK_SIZE`" convention.
    pub fn stored_body_len(&self) -> u32 {
        debug_assert!(self.is_stored());
        if self.size_field == 0 {
            CHUNK_SIZE
        } else {
            CHUNK_SIZE - self.size_field as u32
        }
    }

    /// Byte length of an LZO-compressed body, same "0 means `CHUNK_SIZE`" convention.
    pub fn lzo_body_len(&self) -> u32 {
        debug_assert!(self.is_lzo());
        if self.size_field == 0 {
            CHUNK_SIZE
        } else {
            self.size_field as u32
        }
    }

    pub fn stored(stored_len: u32) -> Self {
        let field = (CHUNK_SIZE - stored_len) % CHUNK_SIZE;
        Self {
            size_field: field as u16,
            flag: FLAG_STORED,
        }
    }

    pub fn lzo(compressed_len: u32) -> Self {
        let field = compressed_len % CHUNK_SIZE;
        Self {
            size_field: field as u16,
            flag: FLAG_LZO,
        }
    }
}

pub fn is_uncompressed_suffix(path: &str, suffixes: &[String]) -> bool {
    let lower = path.to_ascii_lowercase();
    suffixes.iter().any(|s| lower.ends_with(s.as_str()))
}
