//! Inference of the `SafeCopy` requirements a derived impl places on its
//! generic parameters
//!
//! A field type is fixed when it mentions none of the impl's generic
//! parameters, and then needs nothing: its instance either exists or the
//! generated code fails to type-check at the field. An open field type built
//! only from the runtime's generic containers contributes one obligation, the
//! synonym-expanded type itself. An open field type that mentions any other
//! named type contributes the parameters it mentions instead: that type may
//! refer back to the one being derived, directly or through its own fields,
//! and requiring it would never terminate. Nothing is resolved against
//! existing instances.

use std::fmt::{self, Display, Formatter};

use crate::model::TypeExpr;
use crate::walker::Walked;

/// Ordered set of types that must implement `SafeCopy`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Obligations {
    items: Vec<TypeExpr>,
}

impl Obligations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `ty` unless an equal obligation is already present.
    pub fn push(&mut self, ty: TypeExpr) -> bool {
        if self.items.contains(&ty) {
            false
        } else {
            self.items.push(ty);
            true
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeExpr> {
        self.items.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Display for Obligations {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, ty) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: SafeCopy", ty)?;
        }
        Ok(())
    }
}

/// Generic types whose runtime instances constrain nothing but their
/// parameters, and never lead back to a derived type
const CONTAINERS: &[&str] = &["Box", "Vec", "Option", "BTreeMap", "BTreeSet"];

fn may_recurse(ty: &TypeExpr, walked: &Walked) -> bool {
    ty.mentions_con("Self")
        || ty.mentions_con(&walked.decl_name)
        || ty.any_con(&|name: &str| !CONTAINERS.iter().any(|c| *c == name))
}

/// Collects the obligations of every field of `walked`, in first-occurrence
/// order.
pub fn infer(walked: &Walked) -> Obligations {
    let scope = walked.scope();
    let mut obligations = Obligations::new();
    for field in walked.constructors.iter().flat_map(|c| c.fields.iter()) {
        let open: Vec<String> = field
            .expanded
            .free_vars()
            .into_iter()
            .filter(|v| scope.contains(v))
            .collect();
        if open.is_empty() {
            continue;
        }
        if may_recurse(&field.expanded, walked) {
            for v in open {
                obligations.push(TypeExpr::Var(v));
            }
        } else {
            obligations.push(field.expanded.clone());
        }
    }
    obligations
}
