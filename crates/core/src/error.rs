use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, PakError>;

#[derive(Debug, thiserror::Error)]
pub enum PakError {
    #[error("not a PAK archive (bad magic)")]
    NotPak,

    #[error("unsupported PAK version {0}, expected 4")]
    UnsupportedVersion(u32),

    #[error("archive truncated: {0}")]
    Truncated(String),

    #[error("corrupt archive: {0}")]
    Corrupt(String),

    #[error("LZO1X primitive failed: {0}")]
    Lzo(String),

    #[error("zlib failure: {0}")]
    Zlib(String),

    #[error("unsafe extraction path: {0}")]
    UnsafePath(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
