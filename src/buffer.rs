use thiserror::Error;

macro_rules! impl_read {
    ($fn_name:ident, $typ:ty) => {
        pub fn $fn_name(&self, offset: usize) -> Result<$typ, OutOfBounds> {
            let bytes = self.slice(offset, size_of::<$typ>())?;

            Ok(<$typ>::from_be_bytes(bytes.try_into().unwrap()))
        }
    };
}

/// The error produced when a read would run past the end of the buffer.
///
/// Carries the offending offset and width so callers can report exactly
/// which structure was cut short.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("read of {len} bytes at offset {offset} exceeds buffer of {buffer_len} bytes")]
pub struct OutOfBounds {
    pub offset: usize,
    pub len: usize,
    pub buffer_len: usize,
}

/// A positional, bounds-checked view over an immutable byte buffer.
///
/// Every accessor takes an absolute offset and decodes big-endian, since
/// that's the only byte order the TrueType container uses. There is no
/// cursor on purpose: directory entries and cmap encoding records jump
/// all over the file, so callers always know the offset they want and a
/// cursor would only hide mistakes.
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// The total length of the underlying buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the sub-slice `[offset, offset + len)`, or `OutOfBounds`
    /// if it doesn't fit. The addition is checked so a hostile offset
    /// near `usize::MAX` can't wrap around.
    ///
    /// # Examples
    ///
    /// ```
    /// use fontprobe::buffer::ByteReader;
    ///
    /// let data = [0xDE, 0xAD, 0xBE, 0xEF];
    /// let reader = ByteReader::new(&data);
    ///
    /// assert_eq!(reader.slice(1, 2).unwrap(), &[0xAD, 0xBE]);
    /// assert!(reader.slice(3, 2).is_err());
    /// ```
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], OutOfBounds> {
        let end = offset.checked_add(len).ok_or(OutOfBounds {
            offset,
            len,
            buffer_len: self.data.len(),
        })?;

        self.data.get(offset..end).ok_or(OutOfBounds {
            offset,
            len,
            buffer_len: self.data.len(),
        })
    }

    impl_read!(read_u8, u8);
    impl_read!(read_i8, i8);
    impl_read!(read_u16, u16);
    impl_read!(read_i16, i16);
    impl_read!(read_u32, u32);
    impl_read!(read_i32, i32);
    impl_read!(read_u64, u64);
    impl_read!(read_i64, i64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_reads_are_big_endian() {
        let data = [0x00, 0x01, 0x00, 0x00, 0xFF, 0xFE];
        let reader = ByteReader::new(&data);

        assert_eq!(reader.read_u32(0).unwrap(), 0x00010000);
        assert_eq!(reader.read_u16(0).unwrap(), 0x0001);
        assert_eq!(reader.read_u16(4).unwrap(), 0xFFFE);
        assert_eq!(reader.read_i16(4).unwrap(), -2);
        assert_eq!(reader.read_u8(4).unwrap(), 0xFF);
    }

    #[test]
    fn signed_64_bit_reads_preserve_sign() {
        let data = (-5i64).to_be_bytes();
        let reader = ByteReader::new(&data);

        assert_eq!(reader.read_i64(0).unwrap(), -5);
        assert_eq!(reader.read_u64(0).unwrap(), (-5i64) as u64);
    }

    #[test]
    fn reads_past_the_end_fail() {
        let data = [0u8; 4];
        let reader = ByteReader::new(&data);

        assert!(reader.read_u32(0).is_ok());
        assert!(reader.read_u32(1).is_err());
        assert!(reader.read_u8(4).is_err());
        assert_eq!(
            reader.read_u16(3),
            Err(OutOfBounds {
                offset: 3,
                len: 2,
                buffer_len: 4
            })
        );
    }

    #[test]
    fn slice_offset_overflow_is_an_error_not_a_panic() {
        let data = [0u8; 4];
        let reader = ByteReader::new(&data);

        assert!(reader.slice(usize::MAX, 2).is_err());
        assert!(reader.slice(2, usize::MAX).is_err());
    }

    #[test]
    fn empty_slices_are_fine_anywhere_in_bounds() {
        let data = [0u8; 4];
        let reader = ByteReader::new(&data);

        assert_eq!(reader.slice(4, 0).unwrap(), &[] as &[u8]);
        assert!(reader.slice(5, 0).is_err());
    }
}
