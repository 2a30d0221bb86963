//! High-level crate for reading and writing MIFARE Classic NFC tags
//! through a libnfc-driven USB reader.

pub mod cmd;
pub mod demo;
pub mod error;
pub mod reader;
pub mod tag;

pub use cmd::{Command, KeyType, MAX_FRAME_LEN};
pub use error::{Error, Result};
pub use reader::{hex_pairs, Reader, TagInfo};
pub use tag::MifareClassic;

/// MIFARE Classic 1K memory mapping.
pub mod mem {
    use std::ops::Range;

    /// Total number of blocks.
    pub const BLOCK_COUNT: usize = 64;
    /// Size of a single block in bytes.
    pub const BLOCK_SIZE: usize = 16;
    /// Blocks per sector; the last one is the sector trailer.
    pub const SECTOR_BLOCKS: usize = 4;

    /// Manufacturer block plus the rest of sector 0.
    pub const SECTOR0: Range<usize> = Range { start: 0, end: 4 };
    /// Blocks addressable without touching the manufacturer sector.
    pub const DATA: Range<usize> = Range {
        start: 4,
        end: BLOCK_COUNT,
    };
}
