//! Unversioned codecs for scalar values
//!
//! Integers and floats are written big-endian at their natural width, with
//! `usize` and `isize` widened to 64 bits so that the layout does not depend
//! on the platform. Booleans use `0xff`/`0x00`, a `char` is its `u32` scalar
//! value, and a `String` is a `u64` byte-length followed by its UTF-8 bytes.

use crate::conv::{target::Target, Decode, Encode};
use crate::error::LengthError;
use crate::parse::error::{ExternalError, ParseError};
use crate::parse::{ParseResult, Parser};

impl Encode for () {
    #[inline(always)]
    fn write_to<U: Target>(&self, _: &mut U) -> usize {
        0
    }

    #[inline(always)]
    fn write_to_vec(&self, _: &mut Vec<u8>) {}
}

impl Decode for () {
    #[inline]
    fn parse<P: Parser>(_: &mut P) -> ParseResult<()> {
        Ok(())
    }
}

impl Encode for bool {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_one(match *self {
            true => 0xff,
            false => 0x00,
        }) + crate::resolve_zero!(buf)
    }
}

impl Decode for bool {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_bool()
    }
}

macro_rules! impl_fixed_width {
    ( $( $t:ty => $take:ident ),+ $(,)? ) => {
        $(
            impl Encode for $t {
                #[inline]
                fn write_to<U: Target>(&self, buf: &mut U) -> usize {
                    buf.push_many(self.to_be_bytes()) + crate::resolve_zero!(buf)
                }
            }

            impl Decode for $t {
                #[inline]
                fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
                    p.$take()
                }
            }
        )+
    };
}

impl_fixed_width!(
    u8 => take_u8,
    i8 => take_i8,
    u16 => take_u16,
    i16 => take_i16,
    u32 => take_u32,
    i32 => take_i32,
    u64 => take_u64,
    i64 => take_i64,
    u128 => take_u128,
    i128 => take_i128,
    f32 => take_f32,
    f64 => take_f64,
);

impl Encode for usize {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        (*self as u64).write_to(buf)
    }
}

impl Decode for usize {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        usize::try_from(p.take_u64()?).map_err(ParseError::reify)
    }
}

impl Encode for isize {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        (*self as i64).write_to(buf)
    }
}

impl Decode for isize {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        isize::try_from(p.take_i64()?).map_err(ParseError::reify)
    }
}

impl Encode for char {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        u32::from(*self).write_to(buf)
    }
}

impl Decode for char {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let raw = p.take_u32()?;
        char::from_u32(raw).ok_or(ParseError::External(ExternalError::InvalidChar(raw)))
    }
}

impl Encode for str {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        let bytes = self.as_bytes();
        buf.anticipate(8 + bytes.len());
        (bytes.len() as u64).write_to(buf) + buf.push_all(bytes) + crate::resolve_zero!(buf)
    }
}

impl Encode for String {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.as_str().write_to(buf)
    }
}

impl Decode for String {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let len = LengthError::restrict(p.take_u64()?)?;
        let bytes = p.take_dynamic(len)?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::error::TokenError;

    #[test]
    fn unit_is_empty() {
        assert_eq!((), <()>::decode(Vec::<u8>::new()));
        assert!(().to_bytes().is_empty());
    }

    #[test]
    fn widths_and_order() {
        assert_eq!(0x0102u16.to_bytes(), vec![0x01, 0x02]);
        assert_eq!((-1i32).to_bytes(), vec![0xff; 4]);
        assert_eq!(7usize.to_bytes(), vec![0, 0, 0, 0, 0, 0, 0, 7]);
        assert_eq!('A'.to_bytes(), vec![0, 0, 0, 0x41]);
        assert_eq!(u128::decode(u128::MAX.to_bytes()), u128::MAX);
        assert_eq!(f64::decode(1.5f64.to_bytes()), 1.5);
    }

    #[test]
    fn string_layout() {
        let bytes = "hé".to_string().to_bytes();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 0, 0, 3, b'h', 0xc3, 0xa9]);
        assert_eq!(String::decode(bytes), "hé");
    }

    #[test]
    fn rejects_bad_scalars() {
        assert!(matches!(
            char::try_decode::<_, crate::ByteParser>(vec![0x00u8, 0x00, 0xd8, 0x00]),
            Err(crate::DecodeError::Parse(ParseError::External(
                ExternalError::InvalidChar(0xd800)
            )))
        ));
        assert!(matches!(
            bool::try_decode::<_, crate::ByteParser>(vec![0x02u8]),
            Err(crate::DecodeError::Parse(ParseError::Token(
                TokenError::InvalidBoolean(0x02)
            )))
        ));
        assert!(matches!(
            String::try_decode::<_, crate::ByteParser>(vec![0u8, 0, 0, 0, 0, 0, 0, 1, 0xff]),
            Err(crate::DecodeError::Parse(ParseError::External(
                ExternalError::UncoercableString(_)
            )))
        ));
    }
}
