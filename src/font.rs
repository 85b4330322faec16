use std::{fs, path::Path};

use crate::{
    ParseError,
    buffer::ByteReader,
    tables::{self, CmapTable, HeadTable, OffsetTable, TableBody, TableEntry, TableRecord},
};

/// A parsed TrueType/OpenType container: the offset table fields plus
/// one [`TableEntry`] per directory entry, in on-disk order.
///
/// A `Font` owns all of its data; the buffer it was parsed from can be
/// dropped once parsing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    /// 0x00010000 for TrueType outlines, 0x74727565 ('true') for
    /// fonts historically produced on macOS.
    pub scaler_type: u32,

    /// Number of directory entries, as stated by the offset table.
    pub num_tables: u16,

    /// Binary-search hint, carried verbatim from the header.
    pub search_range: u16,

    /// Binary-search hint, carried verbatim from the header.
    pub entry_selector: u16,

    /// Binary-search hint, carried verbatim from the header.
    pub range_shift: u16,

    /// The directory entries with their decoded payloads.
    pub tables: Vec<TableEntry>,
}

impl Font {
    /// Reads a font file into memory and parses it. The file is read
    /// exactly once; no I/O happens after this returns.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let buf = fs::read(path)?;

        Self::parse(&buf)
    }

    /// Parses a font from an in-memory buffer: offset table, then the
    /// table directory, then each table's payload. Fonts don't only
    /// arrive as files on disk, so the buffer entry point is public.
    ///
    /// `cmap` and `head` entries are decoded; every other tag becomes
    /// [`TableBody::Unknown`] with its directory fields intact. Tags
    /// are matched on their packed 32-bit value, never as strings.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let reader = ByteReader::new(data);
        let header = OffsetTable::from_reader(&reader)?;

        let mut entries = Vec::with_capacity(header.num_tables as usize);
        for i in 0..header.num_tables as usize {
            // 16-byte directory entries follow the 12-byte offset table
            let record = TableRecord::from_reader(&reader, 12 + i * 16)?;

            let body = match record.tag {
                tables::CMAP => TableBody::Cmap(CmapTable::from_reader(&reader, &record)?),
                tables::HEAD => TableBody::Head(HeadTable::from_reader(&reader, &record)?),
                _ => TableBody::Unknown,
            };

            entries.push(TableEntry::new(record, body));
        }

        Ok(Self {
            scaler_type: header.scaler_type,
            num_tables: header.num_tables,
            search_range: header.search_range,
            entry_selector: header.entry_selector,
            range_shift: header.range_shift,
            tables: entries,
        })
    }

    /// Looks up a directory entry by its packed tag, e.g.
    /// `font.table(tables::HEAD)`. Returns the first match in
    /// directory order.
    pub fn table(&self, tag: u32) -> Option<&TableEntry> {
        self.tables.iter().find(|entry| entry.tag == tag)
    }

    /// The decoded cmap table, if the font has one.
    pub fn cmap(&self) -> Option<&CmapTable> {
        self.table(tables::CMAP).and_then(|entry| match &entry.body {
            TableBody::Cmap(cmap) => Some(cmap),
            _ => None,
        })
    }

    /// The decoded head table, if the font has one.
    pub fn head(&self) -> Option<&HeadTable> {
        self.table(tables::HEAD).and_then(|entry| match &entry.body {
            TableBody::Head(head) => Some(head),
            _ => None,
        })
    }
}
