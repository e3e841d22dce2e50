//! Self-terminating codec for arbitrary-precision integers
//!
//! Naturals are written as little-endian groups of seven bits, where the high
//! bit of every byte but the last is set. Signed integers reserve the second
//! highest bit of the first byte for the sign, so that byte holds only six
//! bits of magnitude.

use ::num_bigint::{BigInt, BigUint, Sign};

use crate::conv::{target::Target, Decode, Encode};
use crate::parse::error::{ParseError, TokenError};
use crate::parse::{ParseResult, Parser};

const fn is_terminal(byte: u8) -> bool {
    byte & 0x80 == 0
}

fn radix_digits(nat: &BigUint) -> Vec<u8> {
    let mut ret = nat.to_radix_le(0x80);
    if ret.is_empty() {
        ret.push(0);
    }
    ret
}

/// Sets the continuation bit on every byte but the last.
fn mark_continuation(buf: &mut [u8]) {
    if let Some((_, init)) = buf.split_last_mut() {
        for byte in init {
            *byte |= 0x80;
        }
    }
}

fn from_lo7(bytes: &[u8]) -> ParseResult<BigUint> {
    let lo7: Vec<u8> = bytes.iter().map(|b| b & 0x7f).collect();
    if lo7.is_empty() {
        return Ok(BigUint::default());
    }
    BigUint::from_radix_le(&lo7, 0x80)
        .ok_or_else(|| ParseError::from(TokenError::NonTerminating(bytes.to_vec())))
}

impl Encode for BigUint {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        let mut ret = radix_digits(self);
        mark_continuation(&mut ret);
        buf.push_all(&ret) + crate::resolve_zero!(buf)
    }
}

impl Decode for BigUint {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        from_lo7(&p.take_self_terminating(is_terminal)?)
    }
}

impl Encode for BigInt {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        // one spare bit in the lowest group is shifted back out of the first
        // byte, leaving room for the sign
        let mut abs = self.magnitude().clone();
        abs <<= 1u8;
        let mut ret = radix_digits(&abs);
        if let Some(first) = ret.first_mut() {
            *first >>= 1u8;
            if self.sign() == Sign::Minus {
                *first |= 0x40;
            }
        }
        mark_continuation(&mut ret);
        buf.push_all(&ret) + crate::resolve_zero!(buf)
    }
}

impl Decode for BigInt {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let bytes = p.take_self_terminating(is_terminal)?;
        let (&first, rest) = match bytes.split_first() {
            Some(split) => split,
            None => return Err(TokenError::NonTerminating(bytes).into()),
        };
        let sign = match first & 0x40 {
            0 => Sign::Plus,
            _ => Sign::Minus,
        };
        let mut mag = from_lo7(rest)?;
        mag <<= 6u8;
        mag |= BigUint::from(first & 0x3f);
        Ok(BigInt::from_biguint(sign, mag))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Builder, StrictBuilder};

    fn nat(i: u32) -> BigUint {
        BigUint::from(i)
    }

    fn int(i: i32) -> BigInt {
        BigInt::from(i)
    }

    #[test]
    fn nat_conv() {
        assert_eq!(nat(0), BigUint::decode(vec![0x00u8]));
        assert_eq!(nat(1), BigUint::decode(vec![0x01u8]));
        assert_eq!(nat(128), BigUint::decode(vec![0x80u8, 0x01]));
        assert_eq!(nat(128).encode::<StrictBuilder>().into_hex(), "8001");
    }

    #[test]
    fn int_conv() {
        assert_eq!(int(0), BigInt::decode(vec![0x00u8]));
        assert_eq!(int(0).encode::<StrictBuilder>().into_hex(), "00");
        assert_eq!(int(64), BigInt::decode(vec![0x80u8, 0x01]));
        assert_eq!(int(64).encode::<StrictBuilder>().into_hex(), "8001");
        assert_eq!(int(-32), BigInt::decode(vec![0x60u8]));
        assert_eq!(int(-32).encode::<StrictBuilder>().into_hex(), "60");
    }

    #[test]
    fn truncated_is_nonterminating() {
        assert!(matches!(
            BigUint::try_decode::<_, crate::ByteParser>(vec![0x80u8, 0x80]),
            Err(crate::DecodeError::Parse(ParseError::Token(
                TokenError::NonTerminating(_)
            )))
        ));
    }
}
