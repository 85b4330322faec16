use crate::{ParseError, buffer::ByteReader};

pub mod cmap;
pub mod head;

pub use cmap::{CmapGroup, CmapMapping, CmapSubHeader, CmapSubtable, CmapTable};
pub use head::{HEAD_MAGIC, HeadTable};

/// Scaler type for TrueType outlines.
pub const SCALER_TRUETYPE: u32 = 0x00010000;
/// Scaler type `'true'`, historically produced on macOS.
pub const SCALER_TRUE: u32 = 0x74727565;

/// The packed tag of the 'cmap' table.
pub const CMAP: u32 = u32::from_be_bytes(*b"cmap");
/// The packed tag of the 'head' table.
pub const HEAD: u32 = u32::from_be_bytes(*b"head");

/// Unpacks a 32-bit table tag into its four ASCII characters
/// ('cmap', 'head', 'OS/2', ...). Always yields exactly 4 characters,
/// even for tags that carry non-printable bytes.
pub fn tag_name(tag: u32) -> String {
    tag.to_be_bytes().iter().map(|&b| char::from(b)).collect()
}

/// The offset table, the 12 bytes at the start of every TrueType file.
/// It carries the scaler type and the sizing of the table directory
/// that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    /// Must be [`SCALER_TRUETYPE`] or [`SCALER_TRUE`].
    pub scaler_type: u32,

    /// Number of entries in the table directory.
    pub num_tables: u16,

    /// (maximum power of 2 <= numTables) * 16, carried verbatim.
    pub search_range: u16,

    /// log2(maximum power of 2 <= numTables), carried verbatim.
    pub entry_selector: u16,

    /// numTables * 16 - searchRange, carried verbatim.
    pub range_shift: u16,
}

impl OffsetTable {
    /// Decodes the offset table at the start of the buffer.
    ///
    /// Fails with [`ParseError::Truncated`] if the buffer holds fewer
    /// than 12 bytes and with [`ParseError::InvalidMagic`] if the scaler
    /// type is not one this crate knows. The binary-search hint fields
    /// are not cross-checked against `num_tables`; broken hints are the
    /// font editor's problem, not a parse failure.
    pub fn from_reader(reader: &ByteReader<'_>) -> Result<Self, ParseError> {
        let scaler_type = reader.read_u32(0)?;

        if scaler_type != SCALER_TRUETYPE && scaler_type != SCALER_TRUE {
            return Err(ParseError::InvalidMagic(scaler_type));
        }

        Ok(Self {
            scaler_type,
            num_tables: reader.read_u16(4)?,
            search_range: reader.read_u16(6)?,
            entry_selector: reader.read_u16(8)?,
            range_shift: reader.read_u16(10)?,
        })
    }
}

/// One 16-byte entry of the table directory: where a table lives in the
/// file and what it claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    /// 4 packed ASCII bytes, big-endian. See [`tag_name`].
    pub tag: u32,

    /// Checksum for the table. Preserved, never verified.
    pub checksum: u32,

    /// Offset of the table from the beginning of the file.
    pub offset: u32,

    /// Length of the table in bytes, without any trailing padding.
    pub length: u32,
}

impl TableRecord {
    /// Decodes the directory entry at an absolute buffer offset and
    /// checks that the extent it claims actually lies inside the file.
    /// The arithmetic is done in `usize` so `offset + length` cannot
    /// wrap in the 32-bit domain.
    pub fn from_reader(reader: &ByteReader<'_>, at: usize) -> Result<Self, ParseError> {
        let record = Self {
            tag: reader.read_u32(at)?,
            checksum: reader.read_u32(at + 4)?,
            offset: reader.read_u32(at + 8)?,
            length: reader.read_u32(at + 12)?,
        };

        if record.offset as usize + record.length as usize > reader.len() {
            return Err(ParseError::TableOutOfBounds { tag: record.tag });
        }

        Ok(record)
    }
}

/// A directory entry together with its decoded payload. Entries keep
/// the on-disk directory order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub tag: u32,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
    pub body: TableBody,
}

impl TableEntry {
    pub(crate) fn new(record: TableRecord, body: TableBody) -> Self {
        Self {
            tag: record.tag,
            checksum: record.checksum,
            offset: record.offset,
            length: record.length,
            body,
        }
    }

    /// The entry's tag as a 4-character string.
    pub fn tag_name(&self) -> String {
        tag_name(self.tag)
    }
}

/// The decoded payload of a directory entry. Tables this crate does not
/// decode stay in the directory as [`TableBody::Unknown`]; their bytes
/// are still addressable through the entry's offset and length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Cmap(CmapTable),
    Head(HeadTable),
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_name_unpacks_ascii() {
        assert_eq!(tag_name(CMAP), "cmap");
        assert_eq!(tag_name(HEAD), "head");
        assert_eq!(tag_name(0x4F532F32), "OS/2");
    }

    #[test]
    fn tag_name_is_always_four_chars() {
        for tag in [0u32, 0x00FF00FF, u32::MAX, CMAP] {
            assert_eq!(tag_name(tag).chars().count(), 4);
        }
    }

    #[test]
    fn offset_table_rejects_short_buffers() {
        let reader = ByteReader::new(&[0u8; 11]);

        assert!(matches!(
            OffsetTable::from_reader(&reader),
            Err(ParseError::Truncated(_))
        ));
    }

    #[test]
    fn offset_table_rejects_bad_magic() {
        let mut buf = [0u8; 12];
        buf[..4].copy_from_slice(&0xDEADBEEFu32.to_be_bytes());
        let reader = ByteReader::new(&buf);

        assert!(matches!(
            OffsetTable::from_reader(&reader),
            Err(ParseError::InvalidMagic(0xDEADBEEF))
        ));
    }

    #[test]
    fn offset_table_accepts_both_scaler_types() {
        for magic in [SCALER_TRUETYPE, SCALER_TRUE] {
            let mut buf = [0u8; 12];
            buf[..4].copy_from_slice(&magic.to_be_bytes());
            buf[4..6].copy_from_slice(&3u16.to_be_bytes());
            let reader = ByteReader::new(&buf);

            let table = OffsetTable::from_reader(&reader).unwrap();
            assert_eq!(table.scaler_type, magic);
            assert_eq!(table.num_tables, 3);
        }
    }

    #[test]
    fn record_extent_must_fit_the_file() {
        // 16-byte record claiming 8 bytes at offset 28 of a 32-byte file.
        let mut buf = vec![0u8; 32];
        buf[0..4].copy_from_slice(b"xyz ");
        buf[8..12].copy_from_slice(&28u32.to_be_bytes());
        buf[12..16].copy_from_slice(&8u32.to_be_bytes());
        let reader = ByteReader::new(&buf);

        match TableRecord::from_reader(&reader, 0) {
            Err(ParseError::TableOutOfBounds { tag }) => assert_eq!(tag_name(tag), "xyz "),
            other => panic!("expected TableOutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn record_decodes_all_fields() {
        let mut buf = vec![0u8; 64];
        buf[0..4].copy_from_slice(b"glyf");
        buf[4..8].copy_from_slice(&0x12345678u32.to_be_bytes());
        buf[8..12].copy_from_slice(&48u32.to_be_bytes());
        buf[12..16].copy_from_slice(&16u32.to_be_bytes());
        let reader = ByteReader::new(&buf);

        let record = TableRecord::from_reader(&reader, 0).unwrap();
        assert_eq!(tag_name(record.tag), "glyf");
        assert_eq!(record.checksum, 0x12345678);
        assert_eq!(record.offset, 48);
        assert_eq!(record.length, 16);
    }
}
