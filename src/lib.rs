//! A read-only parser for the outer container of TrueType/OpenType font
//! files: the offset table, the table directory, and the `cmap` and `head`
//! tables. Everything else in the file is surfaced as an opaque directory
//! entry. See the [Apple TrueType Reference Manual](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6.html)
//! for the formats decoded here.
//!
//! The input is untrusted: every offset and length coming out of the file
//! is bounds-checked before use, and malformed input turns into a
//! [`ParseError`] rather than a panic.

use std::io;

use thiserror::Error;

use buffer::OutOfBounds;
use tables::tag_name;

pub mod buffer;
pub mod font;
pub mod tables;

pub use font::Font;
pub use tables::{TableBody, TableEntry};

/// Everything that can go wrong while parsing a font file.
///
/// `UnsupportedCmapFormat` is the one non-fatal kind: the cmap decoder
/// catches it, keeps the subtable preamble, and moves on to the next
/// subtable. Every other variant aborts the parse.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be opened or fully read.
    #[error("failed to read font file: {0}")]
    IoFailure(#[from] io::Error),

    /// The buffer ended in the middle of a fixed-size structure.
    #[error("font data is truncated: {0}")]
    Truncated(#[from] OutOfBounds),

    /// The scaler type at offset 0 is neither 0x00010000 (TrueType) nor
    /// 0x74727565 ("true").
    #[error("not a TrueType font: unrecognized scaler type {0:#010x}")]
    InvalidMagic(u32),

    /// A directory entry claims bytes past the end of the file.
    #[error("table '{}' extends past the end of the file", tag_name(*.tag))]
    TableOutOfBounds { tag: u32 },

    /// A cmap subtable's derived extent runs past its enclosing table.
    #[error("cmap subtable (format {format}) extends past the end of the cmap table")]
    SubtableOutOfBounds { format: u16 },

    /// A cmap subtable format outside {0, 2, 4, 6, 8}.
    #[error("unsupported cmap subtable format {format}")]
    UnsupportedCmapFormat { format: u16 },
}
