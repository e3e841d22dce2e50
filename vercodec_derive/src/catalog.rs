//! Declaration lookup for the walker

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::model::{Constructor, DeclBody, Declaration, Field, FieldStyle, Param, Shape, TypeExpr};

/// Largest tuple arity with a built-in declaration
pub const MAX_TUPLE_ARITY: usize = 16;

/// Source of declarations visible to a derivation
///
/// Keys are the final path segment of a type name. Associated-type families
/// are keyed as `Trait::Assoc`.
pub trait TypeCatalog {
    fn resolve(&self, name: &str) -> Option<&Declaration>;
}

#[derive(Debug, Default, Clone)]
pub struct MapCatalog {
    decls: HashMap<String, Declaration>,
}

impl MapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `decl` under its name.
    ///
    /// Family declarations merge with an existing family of the same name,
    /// since every `impl` block contributes one instance clause.
    pub fn insert(&mut self, decl: Declaration) {
        if let DeclBody::Family { instances: more } = &decl.body {
            if let Some(Declaration {
                body: DeclBody::Family { instances },
                ..
            }) = self.decls.get_mut(&decl.name)
            {
                instances.extend(more.iter().cloned());
                return;
            }
        }
        self.decls.insert(decl.name.clone(), decl);
    }
}

impl TypeCatalog for MapCatalog {
    fn resolve(&self, name: &str) -> Option<&Declaration> {
        self.decls.get(name)
    }
}

impl FromIterator<Declaration> for MapCatalog {
    fn from_iter<I: IntoIterator<Item = Declaration>>(iter: I) -> Self {
        let mut cat = Self::new();
        for decl in iter {
            cat.insert(decl);
        }
        cat
    }
}

fn build_tuple(arity: usize) -> Declaration {
    let params: Vec<Param> = (0..arity).map(|i| Param::ty(&format!("T{}", i))).collect();
    let fields = params
        .iter()
        .map(|p| Field {
            name: None,
            ty: TypeExpr::Var(p.name.clone()),
        })
        .collect();
    Declaration {
        name: format!("({})", arity),
        params,
        predicates: Vec::new(),
        body: DeclBody::Data {
            shape: Shape::Tuple,
            constructors: vec![Constructor {
                name: String::new(),
                style: FieldStyle::Unnamed,
                fields,
            }],
        },
    }
}

lazy_static! {
    static ref TUPLES: Vec<Declaration> = (0..=MAX_TUPLE_ARITY).map(build_tuple).collect();
}

/// Built-in declaration of the `arity`-tuple, with parameters `T0..Tn`.
pub fn tuple_declaration(arity: usize) -> Option<&'static Declaration> {
    TUPLES.get(arity)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::FamilyInstance;

    #[test]
    fn tuples_are_prebuilt() {
        let pair = tuple_declaration(2).unwrap();
        assert_eq!(pair.params, vec![Param::ty("T0"), Param::ty("T1")]);
        assert!(tuple_declaration(MAX_TUPLE_ARITY + 1).is_none());
    }

    #[test]
    fn families_merge() {
        let inst = |head: &str| FamilyInstance {
            generics: vec![],
            predicates: vec![],
            head: vec![TypeExpr::con(head)],
            body: TypeExpr::con("u8"),
        };
        let fam = |head: &str| Declaration {
            name: "Store::Record".into(),
            params: vec![],
            predicates: vec![],
            body: DeclBody::Family {
                instances: vec![inst(head)],
            },
        };
        let cat: MapCatalog = vec![fam("Memory"), fam("Disk")].into_iter().collect();
        match &cat.resolve("Store::Record").unwrap().body {
            DeclBody::Family { instances } => assert_eq!(instances.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
