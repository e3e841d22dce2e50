//! Primitive codec layer
//!
//! This module defines `Encode` and `Decode`, the unversioned transcoding
//! traits that the versioned [`SafeCopy`](crate::SafeCopy) contract is built
//! on. An `Encode`/`Decode` pair describes how a single scalar is laid out on
//! the wire; it carries no version information and knows nothing about
//! migrations. Scalars and a handful of runtime-internal values (such as
//! [`Version`](crate::Version) itself) implement these traits directly, and
//! their `SafeCopy` instances delegate to them.
//!
//! The submodule [`target`] defines [`Target`], the write-side dual of
//! [`Parser`]; [`error`] defines the error returned by top-level decoding.

use crate::parse::{ParseResult, Parser, TryIntoParser};

use self::target::Target;

pub mod error;
pub mod target;

pub use error::{DecodeError, DecodeResult};

/// Appends several encodable values to one target, returning the byte-count
#[macro_export]
macro_rules! write_all_to {
    ($($x:expr),* $(,)? => $tgt:expr) => {
        { $( $x.write_to($tgt) + )* $crate::conv::target::Target::resolve_zero($tgt) }
    };
}

/// Trait for values with a fixed, unversioned binary layout
///
/// Implementing [`Encode`] only requires [`write_to`](Encode::write_to); the
/// remaining methods are conveniences over it and may be overridden when a
/// more efficient route exists, as long as they produce identical bytes.
pub trait Encode {
    /// Appends the serialized bytes of this value to `buf`, returning the
    /// exact number of bytes written.
    fn write_to<U: Target>(&self, buf: &mut U) -> usize;

    /// Appends the serialized bytes of this value to a `Vec<u8>`.
    #[inline]
    fn write_to_vec(&self, buf: &mut Vec<u8>) {
        let _ = self.write_to(buf);
    }

    /// Creates a new target and fills it with the serialized bytes of this value.
    #[must_use]
    #[inline]
    fn encode<U: Target>(&self) -> U {
        let mut buf: U = U::create();
        let _ = self.write_to::<U>(&mut buf);
        buf
    }

    /// Creates a `Vec<u8>` holding the serialized bytes of this value.
    #[must_use]
    #[inline]
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_to_vec(&mut buf);
        buf
    }

    /// Computes the serialized length without allocating, by writing into
    /// a [`ByteCounter`](target::ByteCounter).
    #[must_use]
    #[inline]
    fn enc_len(&self) -> usize {
        self.write_to(&mut std::io::sink())
    }
}

/// Trait for values that can be read back from the layout written by [`Encode`]
///
/// # Example
///
/// ```
/// use vercodec::{Decode, ParseResult, Parser};
///
/// #[derive(Debug, PartialEq)]
/// struct Point { x: u16, y: u16 }
///
/// impl Decode for Point {
///     fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
///         Ok(Point { x: u16::parse(p)?, y: u16::parse(p)? })
///     }
/// }
///
/// assert_eq!(Point::decode(vec![0x00, 0x01, 0x00, 0x02]), Point { x: 1, y: 2 });
/// ```
pub trait Decode {
    /// Attempts to consume and interpret a value of type `Self` from `p`.
    ///
    /// # Errors
    ///
    /// Errors are almost always propagated from the underlying [`Parser`]
    /// calls; implementations may additionally reject well-formed bytes that
    /// map to no legal value.
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self>
    where
        Self: Sized;

    /// Builds a parser of type `P` over `input` and parses one `Self` from it.
    ///
    /// # Errors
    ///
    /// Propagates failures of parser construction and of [`parse`](Decode::parse).
    /// With the feature `check_complete_parse`, bytes left unconsumed after the
    /// value are reported as [`DecodeError::NonEmpty`].
    fn try_decode<U, P>(input: U) -> DecodeResult<Self>
    where
        Self: Sized,
        P: Parser,
        U: TryIntoParser<P>,
        DecodeError: From<U::Error>,
    {
        let mut p: P = input.try_into_parser()?;
        let ret = Self::parse(&mut p)?;
        error::finish(p)?;
        Ok(ret)
    }

    /// Decodes a value of type `Self` using the default parser.
    ///
    /// # Panics
    ///
    /// Panics if [`try_decode`](Decode::try_decode) fails.
    fn decode<U>(inp: U) -> Self
    where
        Self: Sized,
        U: TryIntoParser,
        DecodeError: From<U::Error>,
    {
        Self::try_decode(inp).unwrap_or_else(|err| {
            panic!(
                "<{} as Decode>::decode encountered error: {}",
                std::any::type_name::<Self>(),
                err
            )
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{Builder, Encode, StrictBuilder};

    #[test]
    fn write_all_to_sums() {
        let mut buf: Vec<u8> = Vec::new();
        let n = crate::write_all_to!(1u8, 2u16, true => &mut buf);
        assert_eq!(n, 4);
        assert_eq!(buf, vec![0x01, 0x00, 0x02, 0xff]);
    }

    #[test]
    fn encode_into_builder() {
        assert_eq!(0x2au8.encode::<StrictBuilder>().into_hex(), "2a");
        assert_eq!(0xbeefu16.enc_len(), 2);
    }
}
