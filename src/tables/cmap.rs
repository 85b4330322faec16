use crate::{
    ParseError,
    buffer::{ByteReader, OutOfBounds},
    tables::TableRecord,
};

/// A representation of the [cmap table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html):
/// the table header plus one decoded subtable per encoding record.
/// Subtable formats 0, 2, 4, 6 and 8 are decoded; anything else keeps
/// its preamble and is carried as [`CmapMapping::Unsupported`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmapTable {
    /// The version of the cmap table, defined to be zero.
    pub version: u16,

    /// The number of encoding subtables.
    pub num_subtables: u16,

    /// The subtables, in encoding-record order.
    pub subtables: Vec<CmapSubtable>,
}

/// One cmap [subtable](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html):
/// the fields of its encoding record, its header preamble, and the
/// format-specific mapping data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmapSubtable {
    /// The platform identifier
    /// (0 Unicode, 1 Macintosh, 2 reserved, 3 Microsoft).
    pub platform_id: u16,

    /// The platform-specific encoding identifier.
    pub encoding_id: u16,

    /// Byte offset of the subtable from the beginning of the cmap table.
    pub sub_offset: u32,

    /// The format discriminator.
    pub format: u16,

    /// Length in bytes of the subtable, including its header. Zero for
    /// format 8, which carries a 32-bit length in its payload instead.
    pub length: u16,

    /// Language code, or zero if language-independent. Zero for format 8,
    /// which carries a 32-bit language code in its payload instead.
    pub language: u16,

    /// The format-specific mapping data.
    pub mapping: CmapMapping,
}

/// A subHeader of a format 2 (high-byte mapping) subtable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmapSubHeader {
    /// First character code covered.
    pub first_code: u16,

    /// Number of character codes covered.
    pub entry_count: u16,

    /// Delta applied to the glyph index.
    pub id_delta: i16,

    /// Byte offset into the glyph index array, or zero.
    pub id_range_offset: u16,
}

/// One grouping of a format 8 (mixed 16/32-bit) subtable: a contiguous
/// character-code range mapped onto consecutive glyph codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmapGroup {
    /// First character code in this group.
    pub start_char_code: u32,

    /// Last character code in this group.
    pub end_char_code: u32,

    /// Glyph index corresponding to the starting character code.
    pub start_glyph_code: u32,
}

/// The format-specific payload of a cmap subtable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmapMapping {
    /// Format 0, byte encoding table: one glyph index per byte code.
    Format0 {
        /// `length - 6` glyph indices, one per character code.
        glyph_index_array: Vec<u8>,
    },

    /// Format 2, high-byte mapping through subHeaders.
    Format2 {
        /// Maps high bytes to subHeaders; each value is a subHeader
        /// index times 8.
        sub_header_keys: Vec<u16>,
        sub_headers: Vec<CmapSubHeader>,
        /// The glyph index array the subHeaders point into.
        glyph_index_array: Vec<u16>,
    },

    /// Format 4, segment mapping to delta values.
    Format4 {
        /// 2 * segCount.
        seg_count_x2: u16,
        search_range: u16,
        entry_selector: u16,
        range_shift: u16,
        /// Ending character code for each segment, last = 0xFFFF.
        end_code: Vec<u16>,
        /// Should be zero.
        reserved_pad: u16,
        /// Starting character code for each segment.
        start_code: Vec<u16>,
        /// Delta for all character codes in the segment.
        id_delta: Vec<u16>,
        /// Byte offset into the glyph index array, or zero.
        id_range_offset: Vec<u16>,
        /// Whatever fits between the segment arrays and the declared
        /// end of the subtable.
        glyph_id_array: Vec<u16>,
    },

    /// Format 6, trimmed table mapping of a single subrange.
    Format6 {
        /// First character code of the subrange.
        first_code: u16,
        /// Number of character codes in the subrange.
        entry_count: u16,
        glyph_index_array: Vec<u16>,
    },

    /// Format 8, mixed 16-bit and 32-bit coverage.
    Format8 {
        /// Set to zero.
        reserved: u16,
        /// Length in bytes of the subtable, including its header.
        length: u32,
        /// Language code, or zero if language-independent.
        language: u32,
        /// One bit per high-byte pair: set when the pair is the start
        /// of a 32-bit character code.
        is32: Box<[u8; 8192]>,
        /// Number of groupings which follow.
        n_groups: u32,
        groups: Vec<CmapGroup>,
    },

    /// A format outside {0, 2, 4, 6, 8}; only the preamble on the
    /// enclosing [`CmapSubtable`] is kept.
    Unsupported,
}

impl CmapTable {
    /// Decodes a cmap table from the directory entry that names it.
    ///
    /// A subtable with an unrecognized format keeps its preamble and
    /// does not stop the remaining subtables from being decoded; a
    /// subtable whose derived extent escapes the cmap table aborts
    /// with [`ParseError::SubtableOutOfBounds`].
    pub fn from_reader(reader: &ByteReader<'_>, record: &TableRecord) -> Result<Self, ParseError> {
        let base = record.offset as usize;
        let version = reader.read_u16(base)?;
        let num_subtables = reader.read_u16(base + 2)?;

        let mut subtables = Vec::with_capacity(num_subtables as usize);
        for i in 0..num_subtables as usize {
            // 8-byte encoding records follow the 4-byte table header
            let at = base + 4 + i * 8;
            let platform_id = reader.read_u16(at)?;
            let encoding_id = reader.read_u16(at + 2)?;
            let sub_offset = reader.read_u32(at + 4)?;

            subtables.push(Self::decode_subtable(
                reader,
                record,
                platform_id,
                encoding_id,
                sub_offset,
            )?);
        }

        Ok(Self {
            version,
            num_subtables,
            subtables,
        })
    }

    fn decode_subtable(
        reader: &ByteReader<'_>,
        record: &TableRecord,
        platform_id: u16,
        encoding_id: u16,
        sub_offset: u32,
    ) -> Result<CmapSubtable, ParseError> {
        // all subtable offsets are relative to the cmap table itself
        let base = record.offset as usize + sub_offset as usize;
        let format = reader.read_u16(base)?;

        // Format 8 replaces the 16-bit length/language preamble with
        // 32-bit fields, so it never goes through the shared path.
        if format == 8 {
            return Ok(CmapSubtable {
                platform_id,
                encoding_id,
                sub_offset,
                format,
                length: 0,
                language: 0,
                mapping: Self::decode_format8(reader, record, sub_offset, base)?,
            });
        }

        let length = reader.read_u16(base + 2)?;
        let language = reader.read_u16(base + 4)?;

        let mapping = match Self::decode_mapping(reader, record, sub_offset, base, format, length)
        {
            Ok(mapping) => mapping,
            // Non-fatal: keep the preamble and carry on with the rest
            // of the font.
            Err(ParseError::UnsupportedCmapFormat { .. }) => CmapMapping::Unsupported,
            Err(err) => return Err(err),
        };

        Ok(CmapSubtable {
            platform_id,
            encoding_id,
            sub_offset,
            format,
            length,
            language,
            mapping,
        })
    }

    fn decode_mapping(
        reader: &ByteReader<'_>,
        record: &TableRecord,
        sub_offset: u32,
        base: usize,
        format: u16,
        length: u16,
    ) -> Result<CmapMapping, ParseError> {
        if !matches!(format, 0 | 2 | 4 | 6) {
            return Err(ParseError::UnsupportedCmapFormat { format });
        }

        // The declared extent must stay inside the cmap table; every
        // array below is then checked against the declared length.
        if sub_offset as usize + length as usize > record.length as usize {
            return Err(ParseError::SubtableOutOfBounds { format });
        }

        let oob = |_: OutOfBounds| ParseError::SubtableOutOfBounds { format };
        let length = length as usize;

        match format {
            0 => {
                let count = length
                    .checked_sub(6)
                    .ok_or(ParseError::SubtableOutOfBounds { format })?;

                Ok(CmapMapping::Format0 {
                    glyph_index_array: reader.slice(base + 6, count).map_err(oob)?.to_vec(),
                })
            }
            2 => {
                // 256 subHeaderKeys right after the preamble
                if length < 6 + 512 {
                    return Err(ParseError::SubtableOutOfBounds { format });
                }
                let sub_header_keys = read_u16_array(reader, base + 6, 256).map_err(oob)?;

                // keys are subHeader indices premultiplied by 8
                let max_key = sub_header_keys.iter().copied().max().unwrap_or(0);
                let n_sub_headers = 1 + max_key as usize / 8;
                let headers_end = 6 + 512 + 8 * n_sub_headers;
                if headers_end > length {
                    return Err(ParseError::SubtableOutOfBounds { format });
                }

                let mut sub_headers = Vec::with_capacity(n_sub_headers);
                for j in 0..n_sub_headers {
                    let at = base + 6 + 512 + j * 8;
                    sub_headers.push(CmapSubHeader {
                        first_code: reader.read_u16(at).map_err(oob)?,
                        entry_count: reader.read_u16(at + 2).map_err(oob)?,
                        id_delta: reader.read_i16(at + 4).map_err(oob)?,
                        id_range_offset: reader.read_u16(at + 6).map_err(oob)?,
                    });
                }

                // the rest of the subtable is the shared glyph index array
                let glyph_count = (length - headers_end) / 2;
                let glyph_index_array =
                    read_u16_array(reader, base + headers_end, glyph_count).map_err(oob)?;

                Ok(CmapMapping::Format2 {
                    sub_header_keys,
                    sub_headers,
                    glyph_index_array,
                })
            }
            4 => {
                if length < 14 {
                    return Err(ParseError::SubtableOutOfBounds { format });
                }
                let seg_count_x2 = reader.read_u16(base + 6).map_err(oob)?;
                let search_range = reader.read_u16(base + 8).map_err(oob)?;
                let entry_selector = reader.read_u16(base + 10).map_err(oob)?;
                let range_shift = reader.read_u16(base + 12).map_err(oob)?;

                let seg_count = seg_count_x2 as usize / 2;
                // endCode, reservedPad, startCode, idDelta, idRangeOffset
                let arrays_end = 16 + 8 * seg_count;
                if arrays_end > length {
                    return Err(ParseError::SubtableOutOfBounds { format });
                }

                let end_code = read_u16_array(reader, base + 14, seg_count).map_err(oob)?;
                let reserved_pad = reader.read_u16(base + 14 + 2 * seg_count).map_err(oob)?;
                let start_code =
                    read_u16_array(reader, base + 16 + 2 * seg_count, seg_count).map_err(oob)?;
                let id_delta =
                    read_u16_array(reader, base + 16 + 4 * seg_count, seg_count).map_err(oob)?;
                let id_range_offset =
                    read_u16_array(reader, base + 16 + 6 * seg_count, seg_count).map_err(oob)?;

                let glyph_count = (length - arrays_end) / 2;
                let glyph_id_array =
                    read_u16_array(reader, base + arrays_end, glyph_count).map_err(oob)?;

                Ok(CmapMapping::Format4 {
                    seg_count_x2,
                    search_range,
                    entry_selector,
                    range_shift,
                    end_code,
                    reserved_pad,
                    start_code,
                    id_delta,
                    id_range_offset,
                    glyph_id_array,
                })
            }
            6 => {
                if length < 10 {
                    return Err(ParseError::SubtableOutOfBounds { format });
                }
                let first_code = reader.read_u16(base + 6).map_err(oob)?;
                let entry_count = reader.read_u16(base + 8).map_err(oob)?;

                if 10 + 2 * entry_count as usize > length {
                    return Err(ParseError::SubtableOutOfBounds { format });
                }
                let glyph_index_array =
                    read_u16_array(reader, base + 10, entry_count as usize).map_err(oob)?;

                Ok(CmapMapping::Format6 {
                    first_code,
                    entry_count,
                    glyph_index_array,
                })
            }
            _ => unreachable!("guarded above"),
        }
    }

    /// Format 8 header: format u16, reserved u16, length u32,
    /// language u32, then the 8192-byte is32 bitmap, nGroups, and the
    /// 12-byte groups.
    fn decode_format8(
        reader: &ByteReader<'_>,
        record: &TableRecord,
        sub_offset: u32,
        base: usize,
    ) -> Result<CmapMapping, ParseError> {
        let oob = |_: OutOfBounds| ParseError::SubtableOutOfBounds { format: 8 };

        let reserved = reader.read_u16(base + 2).map_err(oob)?;
        let length = reader.read_u32(base + 4).map_err(oob)?;
        let language = reader.read_u32(base + 8).map_err(oob)?;

        if sub_offset as u64 + length as u64 > record.length as u64 {
            return Err(ParseError::SubtableOutOfBounds { format: 8 });
        }

        // header (12) + is32 bitmap (8192) + nGroups (4)
        const GROUPS_START: usize = 12 + 8192 + 4;
        if (GROUPS_START as u64) > length as u64 {
            return Err(ParseError::SubtableOutOfBounds { format: 8 });
        }

        // the bitmap is multi-kilobyte; one boxed copy, no growth
        let is32: Box<[u8; 8192]> = reader
            .slice(base + 12, 8192)
            .map_err(oob)?
            .try_into()
            .map(Box::new)
            .unwrap();

        let n_groups = reader.read_u32(base + 12 + 8192).map_err(oob)?;
        if GROUPS_START as u64 + 12 * n_groups as u64 > length as u64 {
            return Err(ParseError::SubtableOutOfBounds { format: 8 });
        }

        let mut groups = Vec::with_capacity(n_groups as usize);
        for k in 0..n_groups as usize {
            let at = base + GROUPS_START + k * 12;
            groups.push(CmapGroup {
                start_char_code: reader.read_u32(at).map_err(oob)?,
                end_char_code: reader.read_u32(at + 4).map_err(oob)?,
                start_glyph_code: reader.read_u32(at + 8).map_err(oob)?,
            });
        }

        Ok(CmapMapping::Format8 {
            reserved,
            length,
            language,
            is32,
            n_groups,
            groups,
        })
    }
}

/// Reads `count` consecutive big-endian u16 values starting at `offset`.
fn read_u16_array(
    reader: &ByteReader<'_>,
    offset: usize,
    count: usize,
) -> Result<Vec<u16>, OutOfBounds> {
    let bytes = reader.slice(offset, count * 2)?;

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes(pair.try_into().unwrap()))
        .collect())
}
