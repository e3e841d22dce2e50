//! Builder type implemented as a newtype around `Vec<u8>`

use std::borrow::Borrow;

use crate::conv::target::Target;

/// Newtype around `Vec<u8>` used as the default [`Builder`](super::Builder)
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug, Default)]
#[repr(transparent)]
pub struct StrictBuilder(Vec<u8>);

impl Borrow<[u8]> for StrictBuilder {
    fn borrow(&self) -> &[u8] {
        self.0.borrow()
    }
}

impl AsRef<[u8]> for StrictBuilder {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl From<StrictBuilder> for Vec<u8> {
    fn from(val: StrictBuilder) -> Self {
        val.0
    }
}

impl From<Vec<u8>> for StrictBuilder {
    fn from(buf: Vec<u8>) -> StrictBuilder {
        StrictBuilder(buf)
    }
}

impl From<&[u8]> for StrictBuilder {
    fn from(buf: &[u8]) -> StrictBuilder {
        StrictBuilder(buf.into())
    }
}

impl Target for StrictBuilder {
    fn anticipate(&mut self, extra: usize) {
        self.0.anticipate(extra)
    }

    fn create() -> Self {
        Self(Vec::create())
    }

    fn push_one(&mut self, b: u8) -> usize {
        self.0.push_one(b)
    }

    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.0.push_many(arr)
    }

    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.0.push_all(buf)
    }

    fn resolve(&mut self) {
        self.0.resolve()
    }
}

impl super::Builder for StrictBuilder {
    /// Finalized contents are handed out as a bare vector, so that frozen
    /// and unfrozen buffers cannot be confused
    type Final = Vec<u8>;

    fn word(b: u8) -> Self {
        vec![b].into()
    }

    fn words<const N: usize>(arr: [u8; N]) -> Self {
        arr.to_vec().into()
    }

    fn finalize(self) -> Self::Final {
        self.0
    }

    fn len(&self) -> usize {
        Vec::len(&self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Builder;

    #[test]
    fn words_then_push() {
        let mut b = StrictBuilder::words([0xca, 0xfe]);
        b.push_one(0x01);
        assert_eq!(b.len(), 3);
        assert_eq!(b.into_hex(), "cafe01");
        assert!(StrictBuilder::empty().is_empty());
    }
}
