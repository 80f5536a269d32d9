//! Byte/text conversion for cartridge source.
//!
//! Cartridge code is an 8-bit character set, not UTF-8. Every byte is
//! carried as the `char` with the same code point so that token text can be
//! handled as `String` and still written back byte-for-byte.

/// Decode a raw source buffer into text, one `char` per byte.
pub fn decode_source(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode text produced by [`decode_source`] back into bytes.
///
/// Characters above U+00FF cannot come from a decoded buffer; they are
/// written as `?`.
pub fn encode_source(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
