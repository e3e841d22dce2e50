//! Byte-dump helpers shared by builders, error displays, and tests

use std::fmt::Write;

/// Formats a sequence of bytes as a `String` containing a hexadecimal blob
///
/// # Examples
///
/// ```
/// # use vercodec::util::hex_of_bytes;
/// assert_eq!(hex_of_bytes(vec![0xde, 0xad, 0xbe, 0xef]), String::from("deadbeef"));
/// ```
#[must_use]
pub fn hex_of_bytes<T>(val: T) -> String
where
    T: AsRef<[u8]>,
{
    let bytes = val.as_ref();
    let mut hex: String = String::with_capacity(bytes.len() * 2);
    // writing into a String cannot fail
    let _ = write_all_hex(bytes, &mut hex);
    hex
}

pub(crate) fn write_all_hex(bytes: &[u8], tgt: &mut impl Write) -> std::fmt::Result {
    for &byte in bytes {
        write!(tgt, "{byte:02x}")?
    }
    Ok(())
}
