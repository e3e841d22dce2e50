//! `SafeCopy` instances for standard-library and bignum types
//!
//! Scalars are primitive and delegate to their [`Encode`]/[`Decode`] layout.
//! Collections are `Base` at version 0: a `u64` element count, then the
//! version of the element type once, then every element.

use std::collections::{BTreeMap, BTreeSet};

use ::num_bigint::{BigInt, BigUint};

use crate::conv::{target::Target, Decode, Encode};
use crate::error::LengthError;
use crate::parse::{ParseResult, Parser};
use crate::safecopy::{
    contain, get_safe_get, get_safe_put, safe_get, safe_put, Base, Contained, Primitive, SafeCopy,
};
use crate::version::Version;

mod tuple;

macro_rules! impl_primitive {
    ( $( $t:ty ),+ $(,)? ) => {
        $(
            impl SafeCopy for $t {
                const VERSION: Version = Version::ZERO;
                type Kind = Primitive;

                fn error_type_name() -> &'static str {
                    stringify!($t)
                }

                #[inline]
                fn put_copy<U: Target>(&self, buf: &mut U) -> Contained<usize> {
                    contain(self.write_to(buf))
                }

                #[inline]
                fn get_copy<P: Parser>(p: &mut P) -> Contained<ParseResult<Self>> {
                    contain(<$t as Decode>::parse(p))
                }
            }
        )+
    };
}

impl_primitive!(
    (),
    bool,
    char,
    u8,
    i8,
    u16,
    i16,
    u32,
    i32,
    u64,
    i64,
    u128,
    i128,
    usize,
    isize,
    f32,
    f64,
    String,
    BigUint,
    BigInt,
);

/// Reads a collection length, capped so that a corrupt prefix cannot
/// trigger an oversized allocation.
fn take_length<P: Parser>(p: &mut P) -> ParseResult<(usize, usize)> {
    let len = LengthError::restrict(p.take_u64()?)?;
    Ok((len, len.min(p.remainder())))
}

fn get_array<T: SafeCopy, P: Parser, const N: usize>(p: &mut P) -> ParseResult<[T; N]> {
    let getter = get_safe_get::<T, P>(p)?;
    let mut elems: Vec<T> = Vec::with_capacity(N);
    for _ in 0..N {
        elems.push(getter.get(p)?);
    }
    <[T; N]>::try_from(elems).map_err(|rest| {
        LengthError::TooLong {
            limit: N as u64,
            actual: rest.len() as u64,
        }
        .into()
    })
}

fn get_vec<T: SafeCopy, P: Parser>(p: &mut P) -> ParseResult<Vec<T>> {
    let (len, cap) = take_length(p)?;
    let getter = get_safe_get::<T, P>(p)?;
    let mut elems = Vec::with_capacity(cap);
    for _ in 0..len {
        elems.push(getter.get(p)?);
    }
    Ok(elems)
}

fn get_map<K: SafeCopy + Ord, V: SafeCopy, P: Parser>(p: &mut P) -> ParseResult<BTreeMap<K, V>> {
    let (len, _) = take_length(p)?;
    let get_k = get_safe_get::<K, P>(p)?;
    let get_v = get_safe_get::<V, P>(p)?;
    let mut map = BTreeMap::new();
    for _ in 0..len {
        let k = get_k.get(p)?;
        let v = get_v.get(p)?;
        map.insert(k, v);
    }
    Ok(map)
}

fn get_set<T: SafeCopy + Ord, P: Parser>(p: &mut P) -> ParseResult<BTreeSet<T>> {
    let (len, _) = take_length(p)?;
    let getter = get_safe_get::<T, P>(p)?;
    let mut set = BTreeSet::new();
    for _ in 0..len {
        set.insert(getter.get(p)?);
    }
    Ok(set)
}

impl<T: SafeCopy> SafeCopy for Box<T> {
    const VERSION: Version = Version::ZERO;
    type Kind = Primitive;

    fn put_copy<U: Target>(&self, buf: &mut U) -> Contained<usize> {
        contain(safe_put(self.as_ref(), buf))
    }

    fn get_copy<P: Parser>(p: &mut P) -> Contained<ParseResult<Self>> {
        contain(safe_get::<T, P>(p).map(Box::new))
    }
}

impl<T: SafeCopy, const N: usize> SafeCopy for [T; N] {
    const VERSION: Version = Version::ZERO;
    type Kind = Primitive;

    fn put_copy<U: Target>(&self, buf: &mut U) -> Contained<usize> {
        let (putter, mut written) = get_safe_put::<T, U>(buf);
        for elem in self.iter() {
            written += putter.put(elem, buf);
        }
        contain(written)
    }

    fn get_copy<P: Parser>(p: &mut P) -> Contained<ParseResult<Self>> {
        contain(get_array(p))
    }
}

impl<T: SafeCopy> SafeCopy for Vec<T> {
    const VERSION: Version = Version::ZERO;
    type Kind = Base;

    fn put_copy<U: Target>(&self, buf: &mut U) -> Contained<usize> {
        let mut written = (self.len() as u64).write_to(buf);
        let (putter, n) = get_safe_put::<T, U>(buf);
        written += n;
        for elem in self.iter() {
            written += putter.put(elem, buf);
        }
        contain(written)
    }

    fn get_copy<P: Parser>(p: &mut P) -> Contained<ParseResult<Self>> {
        contain(get_vec(p))
    }
}

impl<T: SafeCopy> SafeCopy for Option<T> {
    const VERSION: Version = Version::ZERO;
    type Kind = Base;

    fn put_copy<U: Target>(&self, buf: &mut U) -> Contained<usize> {
        contain(match self {
            Some(x) => true.write_to(buf) + safe_put(x, buf),
            None => false.write_to(buf),
        })
    }

    fn get_copy<P: Parser>(p: &mut P) -> Contained<ParseResult<Self>> {
        contain(match p.take_bool() {
            Ok(true) => safe_get::<T, P>(p).map(Some),
            Ok(false) => Ok(None),
            Err(err) => Err(err),
        })
    }
}

impl<K: SafeCopy + Ord, V: SafeCopy> SafeCopy for BTreeMap<K, V> {
    const VERSION: Version = Version::ZERO;
    type Kind = Base;

    fn put_copy<U: Target>(&self, buf: &mut U) -> Contained<usize> {
        let mut written = (self.len() as u64).write_to(buf);
        let (put_k, nk) = get_safe_put::<K, U>(buf);
        let (put_v, nv) = get_safe_put::<V, U>(buf);
        written += nk + nv;
        for (k, v) in self.iter() {
            written += put_k.put(k, buf) + put_v.put(v, buf);
        }
        contain(written)
    }

    fn get_copy<P: Parser>(p: &mut P) -> Contained<ParseResult<Self>> {
        contain(get_map(p))
    }
}

impl<T: SafeCopy + Ord> SafeCopy for BTreeSet<T> {
    const VERSION: Version = Version::ZERO;
    type Kind = Base;

    fn put_copy<U: Target>(&self, buf: &mut U) -> Contained<usize> {
        let mut written = (self.len() as u64).write_to(buf);
        let (putter, n) = get_safe_put::<T, U>(buf);
        written += n;
        for elem in self.iter() {
            written += putter.put(elem, buf);
        }
        contain(written)
    }

    fn get_copy<P: Parser>(p: &mut P) -> Contained<ParseResult<Self>> {
        contain(get_set(p))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{safe_decode, safe_encode};

    #[test]
    fn primitives_are_unversioned() {
        assert_eq!(safe_encode(&7u16), vec![0x00, 0x07]);
        assert_eq!(safe_encode(&true), vec![0xff]);
        assert_eq!(safe_encode(&Box::new(1u8)), vec![0x01]);
        assert_eq!(safe_encode(&[1u8, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn vec_writes_element_version_once() {
        let v: Vec<Vec<u8>> = vec![vec![1], vec![2, 3]];
        assert_eq!(
            safe_encode(&v),
            vec![
                0, 0, 0, 0, // outer version
                0, 0, 0, 0, 0, 0, 0, 2, // length
                0, 0, 0, 0, // element version, once
                0, 0, 0, 0, 0, 0, 0, 1, 1, // [1]
                0, 0, 0, 0, 0, 0, 0, 2, 2, 3, // [2, 3]
            ]
        );
        assert_eq!(safe_decode::<Vec<Vec<u8>>, _>(safe_encode(&v)).unwrap(), v);
    }

    #[test]
    fn option_and_maps() {
        let o: Option<String> = Some("x".into());
        assert_eq!(safe_decode::<Option<String>, _>(safe_encode(&o)).unwrap(), o);

        let mut m = BTreeMap::new();
        m.insert(1u32, "a".to_string());
        m.insert(2u32, "b".to_string());
        assert_eq!(
            safe_decode::<BTreeMap<u32, String>, _>(safe_encode(&m)).unwrap(),
            m
        );

        let s: BTreeSet<i64> = [-1, 0, 1].into_iter().collect();
        assert_eq!(safe_decode::<BTreeSet<i64>, _>(safe_encode(&s)).unwrap(), s);
    }

    #[test]
    fn huge_length_prefix_does_not_preallocate() {
        let mut bytes = vec![0u8, 0, 0, 0];
        bytes.extend_from_slice(&u64::MAX.to_be_bytes()[..]);
        assert!(safe_decode::<Vec<u8>, _>(bytes).is_err());
    }
}
