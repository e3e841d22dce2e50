use super::kind::{Kind, KindSelector};
use super::SafeCopy;
use crate::parse::error::MigrationError;
use crate::version::Version;

/// Summary of the migration chain of a [`SafeCopy`] type
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize, serde::Deserialize))]
pub enum Profile {
    /// Values are written without a version
    Primitive,
    /// The chain cannot be decoded from; carries the reason
    Invalid(String),
    /// Every version that can be read, newest first, paired with its kind
    Versioned {
        versions: Vec<Version>,
        kinds: Vec<KindSelector>,
    },
}

fn links_of<T: SafeCopy>() -> Vec<(Version, KindSelector)> {
    let mut links = Vec::new();
    <T::Kind as Kind<T>>::chain(&mut links);
    links
}

/// Verifies that no two links in the migration chain of `T` share a version.
pub(crate) fn check_consistency<T: SafeCopy>() -> Result<(), MigrationError> {
    let links = links_of::<T>();
    let mut versions: Vec<Version> = links.iter().map(|(v, _)| *v).collect();
    versions.sort_unstable();
    let before = versions.len();
    versions.dedup();
    if versions.len() == before {
        Ok(())
    } else {
        Err(MigrationError::DuplicateVersion {
            type_name: T::error_type_name(),
            versions: links.into_iter().map(|(v, _)| v).collect(),
        })
    }
}

pub(crate) fn profile_of<T: SafeCopy>() -> Profile {
    if <T::Kind as Kind<T>>::SELECTOR == KindSelector::Primitive {
        return Profile::Primitive;
    }
    if let Err(err) = check_consistency::<T>() {
        return Profile::Invalid(err.to_string());
    }
    let (versions, kinds) = links_of::<T>().into_iter().unzip();
    Profile::Versioned { versions, kinds }
}
