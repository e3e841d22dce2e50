//! Versioned serialization contract
//!
//! [`SafeCopy`] extends the unversioned codec layer with a format version and
//! a [`Kind`] per type. Writers and readers never call `put_copy` or
//! `get_copy` directly; instead they go through [`get_safe_put`] and
//! [`get_safe_get`], which handle the version of the type exactly once and
//! return a handle that can then be used for any number of values.
//!
//! The items in this module are also the runtime surface that
//! `#[derive(SafeCopy)]` and `derive_safecopy!` generate calls into.

use std::marker::PhantomData;

use crate::builder::{strict::StrictBuilder, Builder};
use crate::conv::error::{finish, DecodeError, DecodeResult};
use crate::conv::{target::Target, Decode, Encode};
use crate::parse::error::{ParseError, TagError};
use crate::parse::{ByteParser, ParseResult, Parser, TryIntoParser};
use crate::version::Version;

pub mod kind;
pub mod profile;

pub use kind::{Base, Extension, Kind, KindSelector, Migrate, Primitive};
pub use profile::Profile;

/// Wrapper marking the output of `put_copy` and `get_copy`
///
/// The bytes produced inside a `Contained` never include the version of the
/// type itself, which is handled by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Contained<T>(T);

impl<T> Contained<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[inline]
pub fn contain<T>(x: T) -> Contained<T> {
    Contained(x)
}

/// Types with a versioned binary representation
///
/// Normally implemented through `#[derive(SafeCopy)]`; see the crate-level
/// documentation for the attribute syntax.
pub trait SafeCopy: Sized {
    /// Version written ahead of values of this type, unless it is primitive
    const VERSION: Version;

    /// Policy for values written under another version
    type Kind: Kind<Self>;

    /// Name of this type as reported in decode errors
    fn error_type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Writes this value without its version.
    fn put_copy<U: Target>(&self, buf: &mut U) -> Contained<usize>;

    /// Reads a value written under `Self::VERSION`, without its version.
    fn get_copy<P: Parser>(p: &mut P) -> Contained<ParseResult<Self>>;

    fn version() -> Version {
        Self::VERSION
    }

    fn kind() -> KindSelector {
        <Self::Kind as Kind<Self>>::SELECTOR
    }

    /// Reads a value written under version `found`, migrating as required.
    fn get_version<P: Parser>(found: Version, p: &mut P) -> ParseResult<Self> {
        if found == Self::VERSION {
            Self::get_copy(p).into_inner()
        } else {
            <Self::Kind as Kind<Self>>::get_older(found, p)
        }
    }

    fn profile() -> Profile {
        profile::profile_of::<Self>()
    }
}

/// Writer for values of `T` whose version has already been written
pub struct SafePut<T>(PhantomData<fn(&T)>);

impl<T: SafeCopy> SafePut<T> {
    #[inline]
    pub fn put<U: Target>(&self, value: &T, buf: &mut U) -> usize {
        value.put_copy(buf).into_inner()
    }
}

/// Reader for values of `T` whose version has already been read
pub struct SafeGet<T> {
    found: Version,
    _ty: PhantomData<fn() -> T>,
}

impl<T: SafeCopy> SafeGet<T> {
    #[inline]
    pub fn get<P: Parser>(&self, p: &mut P) -> ParseResult<T> {
        T::get_version(self.found, p)
    }

    /// Version that values read through this handle were written under
    pub fn found(&self) -> Version {
        self.found
    }
}

/// Writes the version of `T` unless it is primitive, returning a writer for
/// values of `T` along with the number of bytes written.
pub fn get_safe_put<T: SafeCopy, U: Target>(buf: &mut U) -> (SafePut<T>, usize) {
    debug_assert!(
        profile::check_consistency::<T>().is_ok(),
        "inconsistent migration chain for {}",
        T::error_type_name()
    );
    let written = match T::kind() {
        KindSelector::Primitive => 0,
        _ => T::VERSION.write_to(buf),
    };
    (SafePut(PhantomData), written)
}

/// Reads the version of `T` unless it is primitive, returning a reader for
/// values of `T`.
///
/// # Errors
///
/// Fails if the version cannot be read, or if the migration chain of `T`
/// repeats a version.
pub fn get_safe_get<T: SafeCopy, P: Parser>(p: &mut P) -> ParseResult<SafeGet<T>> {
    profile::check_consistency::<T>()?;
    let found = match T::kind() {
        KindSelector::Primitive => T::VERSION,
        _ => Version::parse(p)?,
    };
    Ok(SafeGet {
        found,
        _ty: PhantomData,
    })
}

/// Writes a single value along with its version.
pub fn safe_put<T: SafeCopy, U: Target>(value: &T, buf: &mut U) -> usize {
    let (putter, written) = get_safe_put::<T, U>(buf);
    written + putter.put(value, buf)
}

/// Reads a single value along with its version.
pub fn safe_get<T: SafeCopy, P: Parser>(p: &mut P) -> ParseResult<T> {
    get_safe_get::<T, P>(p)?.get(p)
}

/// Serializes `value` along with its version into a fresh byte vector.
pub fn safe_encode<T: SafeCopy>(value: &T) -> Vec<u8> {
    let mut buf = StrictBuilder::empty();
    let _ = safe_put(value, &mut buf);
    buf.into_vec()
}

/// Deserializes one versioned value from `input`.
///
/// # Errors
///
/// Fails if the value cannot be read, or (with `check_complete_parse`) if any
/// bytes are left over.
pub fn safe_decode<T, U>(input: U) -> DecodeResult<T>
where
    T: SafeCopy,
    U: TryIntoParser<ByteParser>,
    DecodeError: From<U::Error>,
{
    let mut p: ByteParser = input.try_into_parser()?;
    let ret = safe_get::<T, ByteParser>(&mut p)?;
    finish(p)?;
    Ok(ret)
}

/// Writes a constructor tag.
#[inline]
pub fn put_tag<U: Target>(buf: &mut U, tag: u8) -> usize {
    buf.push_one(tag)
}

/// Reads a constructor tag.
#[inline]
pub fn get_tag<P: Parser>(p: &mut P) -> ParseResult<u8> {
    p.take_u8()
}

/// Runs `f`, attaching `name` to any error it returns.
pub fn label<T, P, F>(name: &'static str, p: &mut P, f: F) -> ParseResult<T>
where
    P: Parser,
    F: FnOnce(&mut P) -> ParseResult<T>,
{
    f(p).map_err(|err| err.labeled(name))
}

/// Error for a tag that matches none of the `constructors` of `T`.
pub fn unknown_tag<T: SafeCopy>(tag: u8, constructors: usize) -> ParseError {
    TagError::new(tag, T::error_type_name(), constructors).into()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::error::MigrationError;

    #[derive(Debug)]
    struct Meters(u32);

    impl SafeCopy for Meters {
        const VERSION: Version = Version::new(2);
        type Kind = Base;

        fn error_type_name() -> &'static str {
            "Meters"
        }

        fn put_copy<U: Target>(&self, buf: &mut U) -> Contained<usize> {
            contain(self.0.write_to(buf))
        }

        fn get_copy<P: Parser>(p: &mut P) -> Contained<ParseResult<Self>> {
            contain(u32::parse(p).map(Meters))
        }
    }

    #[test]
    fn version_precedes_value() {
        assert_eq!(safe_encode(&Meters(5)), vec![0, 0, 0, 2, 0, 0, 0, 5]);
        let m: Meters = safe_decode(vec![0u8, 0, 0, 2, 0, 0, 0, 9]).unwrap();
        assert_eq!(m.0, 9);
    }

    #[test]
    fn base_rejects_other_versions() {
        let err = safe_decode::<Meters, _>(vec![0u8, 0, 0, 1, 0, 0, 0, 9]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Parse(ParseError::Migration(MigrationError::UnknownVersion {
                type_name: "Meters",
                found,
            })) if found == Version::new(1)
        ));
    }

    #[test]
    fn label_wraps_errors() {
        let mut p = ByteParser::from_buffer(Vec::<u8>::new().into());
        let err = label("Meters", &mut p, |p| get_tag(p)).unwrap_err();
        assert_eq!(err.labels(), &["Meters"]);
        assert_eq!(
            unknown_tag::<Meters>(4, 2).to_string(),
            "Could not identify tag \"4\" for type Meters that has only 2 constructors.  Maybe your data is corrupted?"
        );
    }

    #[test]
    fn profile_of_base() {
        assert_eq!(
            Meters::profile(),
            Profile::Versioned {
                versions: vec![Version::new(2)],
                kinds: vec![KindSelector::Base],
            }
        );
        assert_eq!(u8::profile(), Profile::Primitive);
    }
}
