//! Text/binary classification for filesystem entries.
//!
//! A file is indexable when every byte is either 7-bit ASCII (other than
//! NUL) or falls in the Latin-1 letter range `0xC0..=0xFF`. A NUL byte or
//! a byte in `0x80..=0xBF` marks the content as binary. The whole buffer
//! is scanned; there is no sampling window, so callers classifying large
//! files pay for a full read.

/// Returns `true` when `bytes` look like text that can be embedded.
///
/// The empty buffer is text.
///
/// ```rust
/// use lit::classify::is_indexable;
///
/// assert!(is_indexable(b"hello world\n"));
/// assert!(is_indexable(b""));
/// assert!(!is_indexable(b"ELF\x00\x01"));
/// ```
pub fn is_indexable(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b != 0 && (b < 0x80 || is_printable(b)))
}

fn is_printable(b: u8) -> bool {
    matches!(b, 0x20..=0x7E | 0xC0..=0xFF)
}
