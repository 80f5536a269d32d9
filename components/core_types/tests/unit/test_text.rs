//! Unit tests for the byte/text mapping

use core_types::{decode_source, encode_source};

#[test]
fn test_ascii_is_unchanged() {
    assert_eq!(decode_source(b"x += 1"), "x += 1");
}

#[test]
fn test_glyph_bytes_survive() {
    let source = b"print(\"\x8e\x97\")";
    let text = decode_source(source);
    assert_eq!(text.chars().count(), 11);
    assert_eq!(encode_source(&text), source.to_vec());
}
