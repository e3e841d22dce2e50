//! Derivation sessions and the six entry points
//!
//! Each entry point runs one fresh [`DerivationSession`] over a catalog:
//! walk the target, infer obligations, then synthesize. Derivation is a pure
//! function of its inputs.

use crate::attr::DeriveMeta;
use crate::catalog::TypeCatalog;
use crate::context;
use crate::error::DeriveResult;
use crate::model::{Strategy, TypeExpr};
use crate::naming;
use crate::synth::{self, GeneratedUnit};
use crate::walker::{self, Target};

pub struct DerivationSession<'a> {
    catalog: &'a dyn TypeCatalog,
}

impl<'a> DerivationSession<'a> {
    pub fn new(catalog: &'a dyn TypeCatalog) -> Self {
        Self { catalog }
    }

    pub fn derive(
        &self,
        target: &Target,
        meta: &DeriveMeta,
        strategy: Strategy,
    ) -> DeriveResult<GeneratedUnit> {
        let walked = walker::walk(self.catalog, target)?;
        let obligations = context::infer(&walked);
        let name = naming::diagnostic_name(target);
        synth::synthesize(&walked, obligations, name, meta, strategy)
    }
}

pub fn derive(
    catalog: &dyn TypeCatalog,
    target: &Target,
    meta: &DeriveMeta,
    strategy: Strategy,
) -> DeriveResult<GeneratedUnit> {
    DerivationSession::new(catalog).derive(target, meta, strategy)
}

pub fn derive_safecopy(
    catalog: &dyn TypeCatalog,
    target: &Target,
    meta: &DeriveMeta,
) -> DeriveResult<GeneratedUnit> {
    derive(catalog, target, meta, Strategy::Normal)
}

pub fn derive_safecopy_simple(
    catalog: &dyn TypeCatalog,
    target: &Target,
    meta: &DeriveMeta,
) -> DeriveResult<GeneratedUnit> {
    derive(catalog, target, meta, Strategy::Simple)
}

pub fn derive_safecopy_legacy(
    catalog: &dyn TypeCatalog,
    target: &Target,
    meta: &DeriveMeta,
) -> DeriveResult<GeneratedUnit> {
    derive(catalog, target, meta, Strategy::LegacyCompat)
}

fn indexed(family: &str, indices: &[TypeExpr]) -> Target {
    Target::Indexed {
        family: family.to_owned(),
        indices: indices.to_vec(),
    }
}

pub fn derive_safecopy_indexed(
    catalog: &dyn TypeCatalog,
    family: &str,
    indices: &[TypeExpr],
    meta: &DeriveMeta,
) -> DeriveResult<GeneratedUnit> {
    derive(catalog, &indexed(family, indices), meta, Strategy::Normal)
}

pub fn derive_safecopy_simple_indexed(
    catalog: &dyn TypeCatalog,
    family: &str,
    indices: &[TypeExpr],
    meta: &DeriveMeta,
) -> DeriveResult<GeneratedUnit> {
    derive(catalog, &indexed(family, indices), meta, Strategy::Simple)
}

pub fn derive_safecopy_legacy_indexed(
    catalog: &dyn TypeCatalog,
    family: &str,
    indices: &[TypeExpr],
    meta: &DeriveMeta,
) -> DeriveResult<GeneratedUnit> {
    derive(catalog, &indexed(family, indices), meta, Strategy::LegacyCompat)
}

/// Routes a front-end request to the entry point for its target and strategy.
pub fn dispatch(
    catalog: &dyn TypeCatalog,
    target: &Target,
    meta: &DeriveMeta,
    strategy: Strategy,
) -> DeriveResult<GeneratedUnit> {
    match (target, strategy) {
        (Target::Indexed { family, indices }, Strategy::Normal) => {
            derive_safecopy_indexed(catalog, family, indices, meta)
        }
        (Target::Indexed { family, indices }, Strategy::Simple) => {
            derive_safecopy_simple_indexed(catalog, family, indices, meta)
        }
        (Target::Indexed { family, indices }, Strategy::LegacyCompat) => {
            derive_safecopy_legacy_indexed(catalog, family, indices, meta)
        }
        (_, Strategy::Normal) => derive_safecopy(catalog, target, meta),
        (_, Strategy::Simple) => derive_safecopy_simple(catalog, target, meta),
        (_, Strategy::LegacyCompat) => derive_safecopy_legacy(catalog, target, meta),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::DeriveError;
    use crate::fixtures::{catalog, ty};

    #[test]
    fn sessions_are_independent() {
        let cat = catalog("struct P { x: u8 } enum Q { A, B }");
        let meta = DeriveMeta::default();
        let p = derive_safecopy(&cat, &Target::Named("P".into()), &meta).unwrap();
        let q = derive_safecopy_legacy(&cat, &Target::Named("Q".into()), &meta).unwrap();
        let p_again = derive_safecopy(&cat, &Target::Named("P".into()), &meta).unwrap();
        assert_eq!(p.tokens.to_string(), p_again.tokens.to_string());
        assert_eq!(p.error_type_name, "P");
        assert_eq!(q.constructors.len(), 2);
    }

    #[test]
    fn type_targets_report_their_spelling() {
        let cat = catalog("type Name = String; struct Pair<A, B> { a: A, b: B }");
        let meta = DeriveMeta::default();
        let u = derive_safecopy_simple(&cat, &Target::Type(ty("Pair<u8, Name>")), &meta).unwrap();
        assert_eq!(u.error_type_name, "Pair<u8, Name>");
        let u = derive_safecopy(&cat, &Target::Type(ty("(u32, Name)")), &meta).unwrap();
        assert_eq!(u.error_type_name, "(u32, Name)");
    }

    #[test]
    fn indexed_entry_points() {
        let cat = catalog(
            "struct Memory;
             struct MemRecord { a: u8, b: u8 }
             impl Store for Memory { type Record = MemRecord; }",
        );
        let meta = DeriveMeta::default();
        let u = derive_safecopy_indexed(&cat, "Store::Record", &[ty("Memory")], &meta).unwrap();
        assert_eq!(u.error_type_name, "<Memory as Store>::Record");
        assert!(!u.tagged);
        let u = derive_safecopy_legacy_indexed(&cat, "Store::Record", &[ty("Memory")], &meta).unwrap();
        assert!(u.tagged);
        let u = derive_safecopy_simple_indexed(&cat, "Store::Record", &[ty("Memory")], &meta).unwrap();
        assert_eq!(u.constructors[0].acquisitions.len(), 2);

        let err = derive_safecopy_indexed(&cat, "Store::Missing", &[ty("Memory")], &meta).unwrap_err();
        assert!(matches!(err, DeriveError::Unresolved { .. }));
    }
}
