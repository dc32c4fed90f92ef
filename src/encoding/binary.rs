//! Binary encoding primitives
//!
//! Format of each primitive:
//!
//! ```text
//! boolean        1 byte, 0x00 or 0x01
//! int, long      zig-zag, then base-128 varint (7 bits per byte, LSB first)
//! float          4 bytes, IEEE 754, little-endian
//! double         8 bytes, IEEE 754, little-endian
//! bytes, string  long length, then raw bytes (UTF-8 for strings)
//! fixed          raw bytes, no length
//! ```
//!
//! Unsigned varints (no zig-zag) are used for registry schema IDs.

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Appends `value` as an unsigned base-128 varint.
pub fn write_varint_u64(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Encodes `value` as an unsigned base-128 varint.
pub fn encode_varint_u64(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);
    write_varint_u64(&mut out, value);
    out
}

/// Number of bytes the unsigned varint encoding of `value` takes.
pub fn varint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        len += 1;
        value >>= 7;
    }
    len
}

/// Maps signed to unsigned so small magnitudes encode short.
#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Writer appending encoded primitives to a byte buffer.
#[derive(Debug)]
pub struct BinaryEncoder<'a> {
    out: &'a mut Vec<u8>,
}

impl<'a> BinaryEncoder<'a> {
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out }
    }

    pub fn write_boolean(&mut self, value: bool) {
        self.out.push(u8::from(value));
    }

    pub fn write_int(&mut self, value: i32) {
        self.write_long(i64::from(value));
    }

    pub fn write_long(&mut self, value: i64) {
        write_varint_u64(self.out, zigzag_encode(value));
    }

    pub fn write_float(&mut self, value: f32) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_double(&mut self, value: f64) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, value: &[u8]) {
        self.write_long(value.len() as i64);
        self.out.extend_from_slice(value);
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    pub fn write_fixed(&mut self, value: &[u8]) {
        self.out.extend_from_slice(value);
    }

    /// Writes a collection block count, or the terminating zero.
    pub fn write_block_count(&mut self, count: usize) {
        self.write_long(count as i64);
    }

    pub fn write_union_index(&mut self, index: usize) {
        self.write_long(index as i64);
    }

    pub fn write_enum(&mut self, ordinal: usize) {
        self.write_long(ordinal as i64);
    }

    /// Bytes written so far to the underlying buffer.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(f: impl FnOnce(&mut BinaryEncoder<'_>)) -> Vec<u8> {
        let mut buf = Vec::new();
        f(&mut BinaryEncoder::new(&mut buf));
        buf
    }

    #[test]
    fn test_varint_known_values() {
        assert_eq!(encode_varint_u64(0), vec![0x00]);
        assert_eq!(encode_varint_u64(1), vec![0x01]);
        assert_eq!(encode_varint_u64(127), vec![0x7F]);
        assert_eq!(encode_varint_u64(128), vec![0x80, 0x01]);
        assert_eq!(encode_varint_u64(300), vec![0xAC, 0x02]);
        assert_eq!(encode_varint_u64(16384), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode_varint_u64(u64::MAX).len(), MAX_VARINT_LEN);
    }

    #[test]
    fn test_varint_len_matches_encoding() {
        for value in [0u64, 1, 127, 128, 16383, 16384, u32::MAX as u64, u64::MAX] {
            assert_eq!(varint_len(value), encode_varint_u64(value).len());
        }
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
        assert_eq!(zigzag_encode(42), 84);
        assert_eq!(zigzag_encode(i64::MAX), u64::MAX - 1);
        assert_eq!(zigzag_encode(i64::MIN), u64::MAX);
    }

    #[test]
    fn test_int_and_long() {
        assert_eq!(encoded(|e| e.write_int(42)), vec![0x54]);
        assert_eq!(encoded(|e| e.write_int(-64)), vec![0x7F]);
        assert_eq!(encoded(|e| e.write_int(64)), vec![0x80, 0x01]);
        assert_eq!(encoded(|e| e.write_long(-1)), vec![0x01]);
    }

    #[test]
    fn test_floats_little_endian() {
        assert_eq!(encoded(|e| e.write_float(1.0)), vec![0x00, 0x00, 0x80, 0x3F]);
        assert_eq!(
            encoded(|e| e.write_double(1.0)),
            vec![0, 0, 0, 0, 0, 0, 0xF0, 0x3F]
        );
    }

    #[test]
    fn test_string_and_bytes() {
        assert_eq!(encoded(|e| e.write_string("hi")), vec![0x04, b'h', b'i']);
        assert_eq!(encoded(|e| e.write_bytes(&[])), vec![0x00]);
        assert_eq!(encoded(|e| e.write_fixed(&[1, 2, 3])), vec![1, 2, 3]);
    }

    #[test]
    fn test_boolean() {
        assert_eq!(encoded(|e| e.write_boolean(true)), vec![0x01]);
        assert_eq!(encoded(|e| e.write_boolean(false)), vec![0x00]);
    }
}
