pub mod chunk;
pub mod config;
pub mod directory;
pub mod error;
pub mod filetime_support;
pub mod format;
pub mod lzo;
pub mod merge;
pub mod model;
pub mod path;
pub mod progress;
pub mod reader;
pub mod writer;

pub use error::{PakError, Result};
pub use model::Entry;
pub use reader::{EntryResult, ExtractReport, Unpacker};
pub use writer::{pack, PackOptions};
