//! Finalizable write buffers
//!
//! A [`Builder`] is a [`Target`] that is eventually frozen into an owned byte
//! sequence. [`safe_encode`](crate::safe_encode) and the hex-dumping helpers
//! used in tests are both written against this trait, with
//! [`StrictBuilder`](strict::StrictBuilder) as the provided implementation.

use crate::conv::target::Target;
use crate::util::hex_of_bytes;

/// `Target` extension trait for buffers that are built once and then read
///
/// `Final` is the frozen form of a builder; it must hold the same bytes in
/// the same order, but may have a different layout.
pub trait Builder
where
    Self: Target + Sized,
{
    /// Type suitable for presenting the finalized contents of a `Builder`
    type Final: Into<Vec<u8>>;

    /// Creates a builder holding the single byte `b`.
    fn word(b: u8) -> Self;

    /// Creates a builder holding the bytes of `arr`.
    fn words<const N: usize>(arr: [u8; N]) -> Self;

    /// Freezes the builder.
    fn finalize(self) -> Self::Final;

    /// Consumes the builder and returns its contents as a vector
    fn into_vec(self) -> Vec<u8> {
        self.finalize().into()
    }

    /// Consumes the builder and returns its contents as lowercase hex
    fn into_hex(self) -> String {
        hex_of_bytes(self.into_vec())
    }

    /// Returns a builder containing zero bytes
    fn empty() -> Self {
        Self::words([])
    }

    /// Number of bytes written so far
    fn len(&self) -> usize;

    /// Returns `true` if nothing has been written
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub mod strict;
