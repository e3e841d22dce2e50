//! Write-side primitive of the codec layer
//!
//! Every serializer in this crate, derived or hand-written, bottoms out in
//! calls to the `push_*` methods of a [`Target`].

/// Byte-oriented sink with infallible, append-only writes
///
/// `Target` plays the role of [`std::io::Write`] for encoders, except that
/// every `push_*` method is total: the returned `usize` is the number of bytes
/// appended and exists for book-keeping only, never as a signal of partial
/// success.
pub trait Target {
    /// Hints that roughly `extra` more bytes are about to be written.
    ///
    /// May be a no-op; for growable buffers this reserves capacity.
    fn anticipate(&mut self, extra: usize);

    /// Returns a fresh, empty `Self`.
    fn create() -> Self;

    /// Appends a single byte and returns `1`.
    fn push_one(&mut self, b: u8) -> usize;

    /// Appends every byte of a fixed-length array and returns `N`.
    ///
    /// Must be indistinguishable from `N` consecutive calls to `push_one`.
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize;

    /// Appends every byte of a slice and returns its length.
    ///
    /// Must be indistinguishable from calling `push_one` on each byte in order.
    fn push_all(&mut self, buf: &[u8]) -> usize;

    /// Marks the end of a logical unit of writes.
    ///
    /// Purely informational; must not alter the bytes written so far.
    #[inline(always)]
    fn resolve(&mut self) {}

    /// Calls [`Target::resolve`] and returns `0`, for use as the terminal
    /// summand of a chain of `push_*` calls.
    #[inline]
    fn resolve_zero(&mut self) -> usize {
        self.resolve();
        0
    }
}

/// Expression form of [`Target::resolve_zero`] used by generated code
#[macro_export]
macro_rules! resolve_zero {
    ( $buf:expr ) => {{
        $crate::conv::target::Target::resolve($buf);
        0usize
    }};
}

/// Zero-allocation `Target` that only counts the bytes it is given
pub type ByteCounter = std::io::Sink;

impl Target for ByteCounter {
    #[inline(always)]
    fn anticipate(&mut self, _: usize) {}

    #[inline]
    fn create() -> Self {
        std::io::sink()
    }

    #[inline(always)]
    fn push_one(&mut self, _: u8) -> usize {
        1
    }

    #[inline(always)]
    fn push_many<const N: usize>(&mut self, _: [u8; N]) -> usize {
        N
    }

    #[inline(always)]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        buf.len()
    }
}

impl Target for Vec<u8> {
    #[inline]
    fn anticipate(&mut self, extra: usize) {
        self.reserve(extra)
    }

    #[inline]
    fn create() -> Self {
        Self::new()
    }

    #[inline]
    fn push_one(&mut self, b: u8) -> usize {
        self.push(b);
        1
    }

    #[inline]
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.extend_from_slice(&arr);
        N
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.extend_from_slice(buf);
        buf.len()
    }
}
