//! Version-compatibility policies
//!
//! A type's [`Kind`] decides what happens when the version read from the
//! wire differs from its own: [`Primitive`] types are never versioned,
//! [`Base`] types reject every other version, and [`Extension`] types hand
//! the value over to the type they [`Migrate`] from.

use super::SafeCopy;
use crate::parse::error::MigrationError;
use crate::parse::{ParseResult, Parser};
use crate::version::Version;

/// Runtime tag for each of the provided [`Kind`] implementors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize, serde::Deserialize))]
pub enum KindSelector {
    Primitive,
    Base,
    Extension,
}

/// Policy for reading values of `T` stored under a version other than
/// `T::VERSION`
pub trait Kind<T: SafeCopy> {
    const SELECTOR: KindSelector;

    /// Parses a `T` that was written under version `found`.
    fn get_older<P: Parser>(found: Version, p: &mut P) -> ParseResult<T>;

    /// Appends the version and kind of `T` and of every type it migrates
    /// from, newest first.
    fn chain(links: &mut Vec<(Version, KindSelector)>);
}

/// Kind of types that are written without any version
pub struct Primitive;

/// Kind of versioned types with no predecessor
pub struct Base;

/// Kind of versioned types that can be migrated from an older type
pub struct Extension;

impl<T: SafeCopy> Kind<T> for Primitive {
    const SELECTOR: KindSelector = KindSelector::Primitive;

    fn get_older<P: Parser>(_found: Version, _p: &mut P) -> ParseResult<T> {
        Err(MigrationError::FromPrimitive {
            type_name: T::error_type_name(),
        }
        .into())
    }

    fn chain(links: &mut Vec<(Version, KindSelector)>) {
        links.push((T::VERSION, KindSelector::Primitive));
    }
}

impl<T: SafeCopy> Kind<T> for Base {
    const SELECTOR: KindSelector = KindSelector::Base;

    fn get_older<P: Parser>(found: Version, _p: &mut P) -> ParseResult<T> {
        Err(MigrationError::UnknownVersion {
            type_name: T::error_type_name(),
            found,
        }
        .into())
    }

    fn chain(links: &mut Vec<(Version, KindSelector)>) {
        links.push((T::VERSION, KindSelector::Base));
    }
}

impl<T: Migrate> Kind<T> for Extension {
    const SELECTOR: KindSelector = KindSelector::Extension;

    fn get_older<P: Parser>(found: Version, p: &mut P) -> ParseResult<T> {
        <T::MigrateFrom as SafeCopy>::get_version(found, p).map(T::migrate)
    }

    fn chain(links: &mut Vec<(Version, KindSelector)>) {
        links.push((T::VERSION, KindSelector::Extension));
        <<T::MigrateFrom as SafeCopy>::Kind as Kind<T::MigrateFrom>>::chain(links)
    }
}

/// Conversion from the previous version of a type
///
/// Implementing `Migrate` is what makes `type Kind = Extension` legal.
pub trait Migrate: SafeCopy {
    type MigrateFrom: SafeCopy;

    fn migrate(old: Self::MigrateFrom) -> Self;
}
