//! Custom parsing model with byte-level precision
//!
//! This module provides the fundamental definitions for processing raw
//! sequences of binary data into the leaf values of an arbitrarily complex
//! user-defined type. For type-aware parsing see [`Decode`](crate::Decode)
//! and [`SafeCopy`](crate::SafeCopy), both of which are built on top of
//! the [`Parser`] trait defined here.
//!
//! # Layout
//!
//!   * `error` defines the hierarchy of error cases that can be returned when
//!     something goes wrong during a call to a `Parser` method.
//!   * `buffer` defines [`VecBuffer`], the owned buffer of [`ByteParser`].
//!   * `byteparser` defines [`ByteParser`], the provided `Parser`.

pub mod buffer;
pub mod byteparser;
pub mod error;

pub use buffer::VecBuffer;
pub use byteparser::ByteParser;
pub use error::ParseResult;
use error::{ParseError, TokenError};

/// # Parser
///
/// Abstraction over a stateful parse-object, with default implementations for
/// the monomorphic `take_*` functions and query operations on the offset.
///
/// ## Model
///
/// * The Parser-object is constructed over an immutable byte-buffer.
/// * All parsing is non-backtracking with zero lookahead; a byte can only be
///   viewed by consuming it, after every preceding byte has been consumed.
///
/// The following properties hold of each implementation:
///
/// * A fresh parser has `offset() == 0` and `len()` equal to the buffer length
/// * `remainder()` is the largest `n` for which `consume(n)` succeeds
/// * A failed `consume` leaves the offset where it was
pub trait Parser {
    /// Buffer type a new `Parser` object can be infallibly instantiated from
    type Buffer;

    /// Constructs an initialized `Parser` value over a buffer
    fn from_buffer(buf: Self::Buffer) -> Self;

    /// Length of the Parser's buffer.
    fn len(&self) -> usize;

    /// Computes the current value of the offset into the Parser's buffer.
    fn offset(&self) -> usize;

    /// Computes the remaining number of bytes that can be consumed.
    fn remainder(&self) -> usize {
        self.len() - self.offset()
    }

    /// Consumes and returns a single byte from the current offset position.
    fn consume_byte(&mut self) -> ParseResult<u8>;

    /// Attempt to consume and return a slice of length `nbytes`.
    ///
    /// # Invariants
    ///
    /// This method **MUST** return `Ok(s)` when and only when no bounds
    /// were violated, in which case `s.len() == nbytes`. When it returns
    /// `Err(_)`, no bytes are consumed.
    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]>;

    /// Disposes of the parser, returning the number of bytes that were never
    /// consumed.
    fn cleanup(self) -> usize
    where
        Self: Sized,
    {
        self.remainder()
    }

    /// Consumes `N` bytes and returns them in array-form
    fn consume_arr<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        error::coerce_slice(self.consume(N)?)
    }

    /// Consumes one byte and returns it as a `u8` value
    #[inline]
    fn take_u8(&mut self) -> ParseResult<u8> {
        self.consume_byte()
    }

    /// Consumes one byte and returns it as an `i8` value
    #[inline]
    fn take_i8(&mut self) -> ParseResult<i8> {
        Ok(self.consume_byte()? as i8)
    }

    /// Consumes two bytes and returns the corresponding `u16` value
    ///
    /// As with all fixed-width multi-byte numeric `take_X` methods,
    /// this method performs an implicitly big-endian conversion.
    #[inline]
    fn take_u16(&mut self) -> ParseResult<u16> {
        self.consume_arr::<2>().map(u16::from_be_bytes)
    }

    #[inline]
    fn take_i16(&mut self) -> ParseResult<i16> {
        self.consume_arr::<2>().map(i16::from_be_bytes)
    }

    #[inline]
    fn take_u32(&mut self) -> ParseResult<u32> {
        self.consume_arr::<4>().map(u32::from_be_bytes)
    }

    #[inline]
    fn take_i32(&mut self) -> ParseResult<i32> {
        self.consume_arr::<4>().map(i32::from_be_bytes)
    }

    #[inline]
    fn take_u64(&mut self) -> ParseResult<u64> {
        self.consume_arr::<8>().map(u64::from_be_bytes)
    }

    #[inline]
    fn take_i64(&mut self) -> ParseResult<i64> {
        self.consume_arr::<8>().map(i64::from_be_bytes)
    }

    #[inline]
    fn take_u128(&mut self) -> ParseResult<u128> {
        self.consume_arr::<16>().map(u128::from_be_bytes)
    }

    #[inline]
    fn take_i128(&mut self) -> ParseResult<i128> {
        self.consume_arr::<16>().map(i128::from_be_bytes)
    }

    #[inline]
    fn take_f32(&mut self) -> ParseResult<f32> {
        self.consume_arr::<4>().map(f32::from_be_bytes)
    }

    #[inline]
    fn take_f64(&mut self) -> ParseResult<f64> {
        self.consume_arr::<8>().map(f64::from_be_bytes)
    }

    /// Consumes a single byte and returns the boolean value it represents
    ///
    /// The only valid boolean encodings are `0xff` for `true` and `0x00` for
    /// `false`; any other byte is reported as `InvalidBoolean`.
    #[inline]
    fn take_bool(&mut self) -> ParseResult<bool> {
        match self.consume_byte()? {
            0xff => Ok(true),
            0x00 => Ok(false),
            byte => Err(ParseError::Token(TokenError::InvalidBoolean(byte))),
        }
    }

    /// Consumes and returns a `Vec<u8>` of length `nbytes`, following
    /// the same behavioral guarantees as [`consume`](Parser::consume).
    #[inline]
    fn take_dynamic(&mut self, nbytes: usize) -> ParseResult<Vec<u8>> {
        self.consume(nbytes).map(Vec::from)
    }

    /// Consumes bytes until the predicate `is_terminal` is satisfied,
    /// returning every byte consumed up to and including the first one
    /// that satisfied it.
    ///
    /// If no more bytes can be legally consumed before the predicate is
    /// satisfied, returns `NonTerminating`.
    fn take_self_terminating<F>(&mut self, is_terminal: F) -> ParseResult<Vec<u8>>
    where
        F: Fn(u8) -> bool,
    {
        let mut ret: Vec<u8> = Vec::new();
        loop {
            match self.consume_byte() {
                Ok(byte) => {
                    ret.push(byte);
                    if is_terminal(byte) {
                        break Ok(ret);
                    }
                }
                Err(_) => break Err(ParseError::from(TokenError::NonTerminating(ret))),
            }
        }
    }
}

/// Conversion into a `Parser` value, possibly failing
///
/// Implemented for every type that converts into the parser's buffer; such
/// conversions never fail, hence `Error = Infallible`.
pub trait TryIntoParser<P = ByteParser>
where
    P: Parser,
{
    type Error;

    /// Constructs a parser over `self`.
    fn try_into_parser(self) -> Result<P, Self::Error>;
}

impl<P, T> TryIntoParser<P> for T
where
    P: Parser,
    T: Into<P::Buffer>,
{
    type Error = std::convert::Infallible;

    fn try_into_parser(self) -> Result<P, Self::Error> {
        Ok(P::from_buffer(self.into()))
    }
}
