use std::fmt::Display;

use crate::conv::{target::Target, Decode, Encode};
use crate::parse::{ParseResult, Parser};

/// Format version of a [`SafeCopy`](crate::SafeCopy) type
///
/// Written as four big-endian bytes ahead of the first value of each
/// versioned type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Version(u32);

impl Version {
    pub const ZERO: Self = Self(0);

    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for Version {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Encode for Version {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.0.write_to(buf)
    }
}

impl Decode for Version {
    #[inline]
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_u32().map(Self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn four_bytes_big_endian() {
        assert_eq!(Version::new(3).to_bytes(), vec![0, 0, 0, 3]);
        assert_eq!(Version::decode(vec![0u8, 0, 1, 0]), Version::new(256));
    }
}
