//! Buffer types for `Parser` implementors

/// Immutable owned byte-buffer underlying a [`ByteParser`](super::ByteParser)
///
/// This newtype signals the intended role of a `Vec<u8>` as a parse-buffer;
/// none of its inherent methods mutate its contents.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct VecBuffer(Vec<u8>);

impl VecBuffer {
    /// Returns the number of bytes in a `VecBuffer`
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the buffer contains zero bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the `len` bytes starting at index `ix`, or `None` if any of
    /// them is out of bounds.
    pub fn get_slice(&self, ix: usize, len: usize) -> Option<&[u8]> {
        self.0.get(ix..ix.checked_add(len)?)
    }

    /// Returns the byte at the specified index, or `None` if it is out of bounds.
    pub fn get_byte(&self, ix: usize) -> Option<u8> {
        self.0.get(ix).copied()
    }

    /// Borrows the bytes from `ix` to the end of the buffer.
    pub fn tail(&self, ix: usize) -> &[u8] {
        self.0.get(ix..).unwrap_or_default()
    }
}

impl std::fmt::Debug for VecBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Vec<u8> as std::fmt::Debug>::fmt(&self.0, f)
    }
}

impl From<&[u8]> for VecBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_owned())
    }
}

impl From<Vec<u8>> for VecBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&Vec<u8>> for VecBuffer {
    fn from(bytes: &Vec<u8>) -> Self {
        Self(bytes.clone())
    }
}

impl<const N: usize> From<[u8; N]> for VecBuffer {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl<const N: usize> From<&'_ [u8; N]> for VecBuffer {
    fn from(bytes: &'_ [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<crate::StrictBuilder> for VecBuffer {
    fn from(builder: crate::StrictBuilder) -> Self {
        Self(builder.into())
    }
}
