use crate::{ParseError, buffer::ByteReader, tables::TableRecord};

/// The value `magic_number` is supposed to hold.
pub const HEAD_MAGIC: u32 = 0x5F0F3CF5;

/// A representation of the [head table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6head.html),
/// the fixed 54-byte record of global font metrics and flags.
///
/// All fields are carried verbatim: the magic number is not verified
/// (callers may compare against [`HEAD_MAGIC`] as a sanity signal) and
/// the dates stay raw longDateTime values, signed seconds since
/// 1904-01-01 00:00 UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadTable {
    /// 0x00010000 for version 1.0.
    pub version: u32,

    /// Fixed-point 16.16 revision set by the font manufacturer.
    pub font_revision: u32,

    /// To compute: set it to 0, sum the entire font as u32, then store
    /// 0xB1B0AFBA - sum.
    pub checksum_adjustment: u32,

    /// Always set to 0x5F0F3CF5.
    pub magic_number: u32,

    /// Layout flags, bit 0 = y value of 0 specifies baseline.
    pub flags: u16,

    /// Units per em, ranges from 64 to 16384.
    pub units_per_em: u16,

    /// Date the font was created, as a raw longDateTime.
    pub created: i64,

    /// Date the font was last modified, as a raw longDateTime.
    pub modified: i64,

    /// Minimum x over all glyph bounding boxes.
    pub x_min: i16,

    /// Minimum y over all glyph bounding boxes.
    pub y_min: i16,

    /// Maximum x over all glyph bounding boxes.
    pub x_max: i16,

    /// Maximum y over all glyph bounding boxes.
    pub y_max: i16,

    /// Style bits: bold, italic, underline, outline, shadow,
    /// condensed, extended.
    pub mac_style: u16,

    /// Smallest readable size in pixels.
    pub lowest_rec_ppem: u16,

    /// 0 mixed, 1/2 left-to-right, -1/-2 right-to-left.
    pub font_direction_hint: i16,

    /// 0 for short 'loca' offsets, 1 for long.
    pub index_to_loc_format: i16,

    /// 0 for the current glyph data format.
    pub glyph_data_format: i16,
}

impl HeadTable {
    /// Decodes the 54-byte head record at the entry's offset. A record
    /// cut off by the end of the file fails with
    /// [`ParseError::Truncated`].
    pub fn from_reader(reader: &ByteReader<'_>, record: &TableRecord) -> Result<Self, ParseError> {
        let base = record.offset as usize;

        Ok(Self {
            version: reader.read_u32(base)?,
            font_revision: reader.read_u32(base + 4)?,
            checksum_adjustment: reader.read_u32(base + 8)?,
            magic_number: reader.read_u32(base + 12)?,
            flags: reader.read_u16(base + 16)?,
            units_per_em: reader.read_u16(base + 18)?,
            created: reader.read_i64(base + 20)?,
            modified: reader.read_i64(base + 28)?,
            x_min: reader.read_i16(base + 36)?,
            y_min: reader.read_i16(base + 38)?,
            x_max: reader.read_i16(base + 40)?,
            y_max: reader.read_i16(base + 42)?,
            mac_style: reader.read_u16(base + 44)?,
            lowest_rec_ppem: reader.read_u16(base + 46)?,
            font_direction_hint: reader.read_i16(base + 48)?,
            index_to_loc_format: reader.read_i16(base + 50)?,
            glyph_data_format: reader.read_i16(base + 52)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tables;

    fn head_bytes(head: &HeadTable) -> Vec<u8> {
        let mut buf = Vec::with_capacity(54);
        buf.extend(head.version.to_be_bytes());
        buf.extend(head.font_revision.to_be_bytes());
        buf.extend(head.checksum_adjustment.to_be_bytes());
        buf.extend(head.magic_number.to_be_bytes());
        buf.extend(head.flags.to_be_bytes());
        buf.extend(head.units_per_em.to_be_bytes());
        buf.extend(head.created.to_be_bytes());
        buf.extend(head.modified.to_be_bytes());
        buf.extend(head.x_min.to_be_bytes());
        buf.extend(head.y_min.to_be_bytes());
        buf.extend(head.x_max.to_be_bytes());
        buf.extend(head.y_max.to_be_bytes());
        buf.extend(head.mac_style.to_be_bytes());
        buf.extend(head.lowest_rec_ppem.to_be_bytes());
        buf.extend(head.font_direction_hint.to_be_bytes());
        buf.extend(head.index_to_loc_format.to_be_bytes());
        buf.extend(head.glyph_data_format.to_be_bytes());
        buf
    }

    fn record_for(buf: &[u8]) -> TableRecord {
        TableRecord {
            tag: tables::HEAD,
            checksum: 0,
            offset: 0,
            length: buf.len() as u32,
        }
    }

    #[test]
    fn decodes_every_field() {
        let head = HeadTable {
            version: 0x00010000,
            font_revision: 0x00015000,
            checksum_adjustment: 0xB1B0AFBA,
            magic_number: HEAD_MAGIC,
            flags: 0b1011,
            units_per_em: 2048,
            created: 3_500_000_000,
            modified: 3_600_000_000,
            x_min: -120,
            y_min: -300,
            x_max: 2000,
            y_max: 1900,
            mac_style: 0b11,
            lowest_rec_ppem: 9,
            font_direction_hint: 2,
            index_to_loc_format: 1,
            glyph_data_format: 0,
        };
        let buf = head_bytes(&head);
        let reader = ByteReader::new(&buf);

        let decoded = HeadTable::from_reader(&reader, &record_for(&buf)).unwrap();
        assert_eq!(decoded, head);
        assert_eq!(decoded.magic_number, HEAD_MAGIC);
        assert_eq!(decoded.units_per_em, 2048);
        assert_eq!(decoded.index_to_loc_format, 1);
    }

    #[test]
    fn dates_before_the_epoch_stay_negative() {
        let head = HeadTable {
            version: 0x00010000,
            font_revision: 0,
            checksum_adjustment: 0,
            magic_number: HEAD_MAGIC,
            flags: 0,
            units_per_em: 1000,
            created: -86_400,
            modified: -1,
            x_min: 0,
            y_min: 0,
            x_max: 0,
            y_max: 0,
            mac_style: 0,
            lowest_rec_ppem: 0,
            font_direction_hint: 0,
            index_to_loc_format: 0,
            glyph_data_format: 0,
        };
        let buf = head_bytes(&head);
        let reader = ByteReader::new(&buf);

        let decoded = HeadTable::from_reader(&reader, &record_for(&buf)).unwrap();
        assert_eq!(decoded.created, -86_400);
        assert_eq!(decoded.modified, -1);
    }

    #[test]
    fn truncated_record_is_an_error() {
        let buf = vec![0u8; 53];
        let reader = ByteReader::new(&buf);

        assert!(matches!(
            HeadTable::from_reader(&reader, &record_for(&buf)),
            Err(ParseError::Truncated(_))
        ));
    }
}
