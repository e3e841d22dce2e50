//! Resolution of a derivation target to its constructors
//!
//! The walker follows a target through synonyms, tuples and associated-type
//! families until it reaches a data declaration, zipping the pending type
//! arguments against the declaration's parameters on the way. What comes out
//! is the list of constructors with every field type instantiated, together
//! with the generic parameters and predicates the generated impl needs.

use crate::catalog::{tuple_declaration, TypeCatalog};
use crate::error::{DeriveError, DeriveResult};
use crate::model::{
    Constructor, DeclBody, Declaration, Env, FamilyInstance, FieldStyle, Param, Predicate, Shape,
    TypeExpr, TypeName,
};
use crate::naming;

/// Expansion depth past which a chain of synonyms counts as cyclic
pub const MAX_EXPANSION_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A declaration derived over its own parameters
    Named(String),
    /// An arbitrary type expression, possibly quantified
    Type(TypeExpr),
    /// A member of an associated-type family, keyed as `Trait::Assoc`
    Indexed {
        family: String,
        indices: Vec<TypeExpr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedField {
    pub name: Option<String>,
    /// Field type as written, with the bindings applied
    pub ty: TypeExpr,
    /// `ty` with every resolvable synonym and projection expanded
    pub expanded: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedConstructor {
    pub name: String,
    pub style: FieldStyle,
    pub fields: Vec<WalkedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walked {
    /// Type the impl is written for
    pub self_ty: TypeExpr,
    pub decl_name: String,
    pub shape: Shape,
    pub constructors: Vec<WalkedConstructor>,
    /// Generic parameters of the impl
    pub params: Vec<Param>,
    /// Predicates carried over from the declaration and the target
    pub predicates: Vec<Predicate>,
}

impl Walked {
    pub fn scope(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }
}

fn cyclic(name: &impl std::fmt::Display) -> DeriveError {
    DeriveError::unsupported(name, "cyclic type synonym")
}

/// Walks `target` against `catalog`.
pub fn walk(catalog: &dyn TypeCatalog, target: &Target) -> DeriveResult<Walked> {
    let mut walker = Walker {
        catalog,
        params: Vec::new(),
        predicates: Vec::new(),
    };
    match target {
        Target::Named(name) => walker.walk_named(name),
        Target::Type(ty) => walker.walk_type(ty.clone()),
        Target::Indexed { family, indices } => {
            let body = walker.project(family, indices)?;
            walker.walk_type(body)
        }
    }
}

struct Walker<'a> {
    catalog: &'a dyn TypeCatalog,
    params: Vec<Param>,
    predicates: Vec<Predicate>,
}

impl<'a> Walker<'a> {
    fn resolve(&self, name: &str) -> Option<&'a Declaration> {
        self.catalog.resolve(name)
    }

    fn walk_named(mut self, name: &str) -> DeriveResult<Walked> {
        let decl = self.resolve(name).ok_or_else(|| DeriveError::Unresolved {
            name: name.to_owned(),
        })?;
        match &decl.body {
            DeclBody::Data { .. } => {
                self.params.extend(decl.params.iter().cloned());
                let args = decl
                    .params
                    .iter()
                    .map(|p| TypeExpr::Var(p.name.clone()))
                    .collect::<Vec<_>>();
                let self_ty = TypeExpr::app(TypeExpr::Con(TypeName::simple(&decl.name)), args.clone());
                self.instantiate(decl, self_ty, args)
            }
            DeclBody::Synonym(body) => self.walk_type(TypeExpr::Forall {
                params: decl.params.clone(),
                constraints: decl.predicates.clone(),
                body: Box::new(body.clone()),
            }),
            DeclBody::Family { .. } => Err(DeriveError::unsupported(
                name,
                "an associated-type family needs its indices",
            )),
            DeclBody::Unsupported(reason) => Err(DeriveError::unsupported(name, reason)),
        }
    }

    fn walk_type(mut self, mut ty: TypeExpr) -> DeriveResult<Walked> {
        let mut depth = 0;
        loop {
            if depth > MAX_EXPANSION_DEPTH {
                return Err(cyclic(&ty));
            }
            if let TypeExpr::Forall {
                params,
                constraints,
                body,
            } = ty
            {
                self.params.extend(params);
                self.predicates.extend(constraints);
                ty = *body;
                continue;
            }
            let (head, args) = ty.spine();
            let args: Vec<TypeExpr> = args.into_iter().cloned().collect();
            match head {
                TypeExpr::Con(name) => {
                    let decl = self.resolve(name.last()).ok_or_else(|| DeriveError::Unresolved {
                        name: name.to_string(),
                    })?;
                    match &decl.body {
                        DeclBody::Data { .. } => {
                            let self_ty = TypeExpr::app(TypeExpr::Con(name.clone()), args.clone());
                            return self.instantiate(decl, self_ty, args);
                        }
                        DeclBody::Synonym(body) => {
                            let env = bind(decl, &args)?;
                            self.predicates
                                .extend(decl.predicates.iter().map(|p| p.subst(&env)));
                            ty = body.subst(&env);
                            depth += 1;
                        }
                        DeclBody::Family { .. } => {
                            return Err(DeriveError::unsupported(
                                name,
                                "an associated-type family needs its indices",
                            ))
                        }
                        DeclBody::Unsupported(reason) => {
                            return Err(DeriveError::unsupported(name, reason))
                        }
                    }
                }
                TypeExpr::Tuple(elems) if args.is_empty() => {
                    let decl = tuple_declaration(elems.len()).ok_or_else(|| {
                        DeriveError::unsupported(&ty, "tuple is wider than the built-in declarations")
                    })?;
                    let elems = elems.clone();
                    return self.instantiate(decl, TypeExpr::Tuple(elems.clone()), elems);
                }
                TypeExpr::Projection {
                    self_ty,
                    trait_name,
                    trait_args,
                    assoc,
                } if args.is_empty() => {
                    let family = format!("{}::{}", trait_name.last(), assoc);
                    let mut indices = vec![self_ty.as_ref().clone()];
                    indices.extend(trait_args.iter().cloned());
                    ty = self.project(&family, &indices)?;
                    depth += 1;
                }
                TypeExpr::Var(_) => {
                    return Err(DeriveError::unsupported(
                        &ty,
                        "a bare generic parameter has no declaration",
                    ))
                }
                TypeExpr::Array(..) => {
                    return Err(DeriveError::unsupported(
                        &ty,
                        "arrays are covered by the runtime's built-in instance",
                    ))
                }
                _ => return Err(DeriveError::unsupported(&ty, "not a data type")),
            }
        }
    }

    /// Selects the family instance matching `indices` and returns its body.
    /// The instance's predicates join the impl's.
    fn project(&mut self, family: &str, indices: &[TypeExpr]) -> DeriveResult<TypeExpr> {
        let display = naming::family_display(family, indices, true);
        let decl = self
            .resolve(family)
            .ok_or_else(|| DeriveError::Unresolved {
                name: display.clone(),
            })?;
        let instances = match &decl.body {
            DeclBody::Family { instances } => instances,
            _ => return Err(DeriveError::Unresolved { name: display }),
        };
        let (inst, env) = select_instance(family, instances, indices)?;
        self.predicates
            .extend(inst.predicates.iter().map(|p| p.subst(&env)));
        Ok(inst.body.subst(&env))
    }

    fn instantiate(
        self,
        decl: &Declaration,
        self_ty: TypeExpr,
        args: Vec<TypeExpr>,
    ) -> DeriveResult<Walked> {
        let (shape, constructors) = match &decl.body {
            DeclBody::Data {
                shape,
                constructors,
            } => (*shape, constructors),
            _ => return Err(DeriveError::unsupported(&self_ty, "not a data type")),
        };
        let env = bind(decl, &args)?;
        let mut predicates: Vec<Predicate> =
            decl.predicates.iter().map(|p| p.subst(&env)).collect();
        for p in self.predicates {
            if !predicates.contains(&p) {
                predicates.push(p);
            }
        }
        let constructors = constructors
            .iter()
            .map(|c| instantiate_constructor(self.catalog, c, &env))
            .collect::<DeriveResult<Vec<_>>>()?;
        Ok(Walked {
            self_ty,
            decl_name: decl.name.clone(),
            shape,
            constructors,
            params: self.params,
            predicates,
        })
    }
}

fn instantiate_constructor(
    catalog: &dyn TypeCatalog,
    ctor: &Constructor,
    env: &Env,
) -> DeriveResult<WalkedConstructor> {
    let fields = ctor
        .fields
        .iter()
        .map(|f| {
            let ty = f.ty.subst(env);
            let expanded = expand_synonyms(catalog, &ty)?;
            Ok(WalkedField {
                name: f.name.clone(),
                ty,
                expanded,
            })
        })
        .collect::<DeriveResult<Vec<_>>>()?;
    Ok(WalkedConstructor {
        name: ctor.name.clone(),
        style: ctor.style,
        fields,
    })
}

/// Zips `args` against the parameters of `decl`.
fn bind(decl: &Declaration, args: &[TypeExpr]) -> DeriveResult<Env> {
    if args.len() != decl.params.len() {
        return Err(DeriveError::Arity {
            name: decl.name.clone(),
            expected: decl.params.len(),
            found: args.len(),
        });
    }
    Ok(decl
        .params
        .iter()
        .map(|p| p.name.clone())
        .zip(args.iter().cloned())
        .collect())
}

/// Picks the instance clause of `family` whose head matches `indices`.
///
/// Candidates are the clauses whose implementing type has the same outer
/// constructor as the first index; a clause implemented for a bare parameter
/// is always a candidate.
pub fn select_instance<'i>(
    family: &str,
    instances: &'i [FamilyInstance],
    indices: &[TypeExpr],
) -> DeriveResult<(&'i FamilyInstance, Env)> {
    let wanted = indices.first().and_then(TypeExpr::root_con);
    let candidates: Vec<&FamilyInstance> = instances
        .iter()
        .filter(|inst| inst.head.len() == indices.len())
        .filter(|inst| match inst.head.first().map(TypeExpr::root_con) {
            Some(None) => true,
            Some(root) => root == wanted,
            None => true,
        })
        .collect();
    let first = match candidates.first() {
        Some(inst) => *inst,
        None => {
            return Err(DeriveError::Unresolved {
                name: naming::family_display(family, indices, true),
            })
        }
    };
    for &inst in candidates.iter() {
        let generics: Vec<String> = inst.generics.iter().map(|p| p.name.clone()).collect();
        let mut env = Env::new();
        if inst
            .head
            .iter()
            .zip(indices)
            .all(|(pat, actual)| match_type(pat, actual, &generics, &mut env))
        {
            return Ok((inst, env));
        }
    }
    Err(DeriveError::IndexMismatch {
        expected: naming::family_display(family, indices, true),
        found: naming::family_display(family, &first.head, true),
    })
}

/// One-way structural match of an instance head against a concrete index,
/// binding the instance's generics in `env`.
fn match_type(pat: &TypeExpr, actual: &TypeExpr, generics: &[String], env: &mut Env) -> bool {
    match (pat, actual) {
        (TypeExpr::Var(v), _) if generics.contains(v) => match env.get(v) {
            Some(bound) => bound == actual,
            None => {
                env.insert(v.clone(), actual.clone());
                true
            }
        },
        (TypeExpr::Con(a), TypeExpr::Con(b)) => a.last() == b.last(),
        (TypeExpr::App(f, x), TypeExpr::App(g, y)) => {
            match_type(f, g, generics, env) && match_type(x, y, generics, env)
        }
        (TypeExpr::Tuple(ps), TypeExpr::Tuple(xs)) => {
            ps.len() == xs.len()
                && ps
                    .iter()
                    .zip(xs)
                    .all(|(p, x)| match_type(p, x, generics, env))
        }
        (TypeExpr::Array(pe, pn), TypeExpr::Array(xe, xn)) => {
            match_type(pe, xe, generics, env) && match_type(pn, xn, generics, env)
        }
        _ => pat == actual,
    }
}

/// Expands every resolvable synonym and projection inside `ty`.
///
/// Names the catalog does not know are left alone, as are projections with
/// no matching instance.
pub fn expand_synonyms(catalog: &dyn TypeCatalog, ty: &TypeExpr) -> DeriveResult<TypeExpr> {
    expand(catalog, ty, 0)
}

fn expand(catalog: &dyn TypeCatalog, ty: &TypeExpr, depth: usize) -> DeriveResult<TypeExpr> {
    if depth > MAX_EXPANSION_DEPTH {
        return Err(cyclic(ty));
    }
    let (head, args) = ty.spine();
    let head = match head {
        TypeExpr::Con(name) => {
            if let Some(decl) = catalog.resolve(name.last()) {
                if let DeclBody::Synonym(body) = &decl.body {
                    let args: Vec<TypeExpr> = args.into_iter().cloned().collect();
                    let env = bind(decl, &args)?;
                    return expand(catalog, &body.subst(&env), depth + 1);
                }
            }
            head.clone()
        }
        TypeExpr::Projection {
            self_ty,
            trait_name,
            trait_args,
            assoc,
        } => {
            let family = format!("{}::{}", trait_name.last(), assoc);
            let mut indices = vec![expand(catalog, self_ty, depth)?];
            for a in trait_args {
                indices.push(expand(catalog, a, depth)?);
            }
            if let Some(DeclBody::Family { instances }) = catalog.resolve(&family).map(|d| &d.body) {
                if let Ok((inst, env)) = select_instance(&family, instances, &indices) {
                    let body = inst.body.subst(&env);
                    return expand(catalog, &TypeExpr::app(body, args.into_iter().cloned()), depth + 1);
                }
            }
            TypeExpr::Projection {
                self_ty: Box::new(indices.remove(0)),
                trait_name: trait_name.clone(),
                trait_args: indices,
                assoc: assoc.clone(),
            }
        }
        TypeExpr::Tuple(elems) => TypeExpr::Tuple(
            elems
                .iter()
                .map(|e| expand(catalog, e, depth))
                .collect::<DeriveResult<Vec<_>>>()?,
        ),
        TypeExpr::Array(elem, len) => {
            TypeExpr::Array(Box::new(expand(catalog, elem, depth)?), len.clone())
        }
        other => other.clone(),
    };
    let args = args
        .into_iter()
        .map(|a| expand(catalog, a, depth))
        .collect::<DeriveResult<Vec<_>>>()?;
    Ok(TypeExpr::app(head, args))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::MapCatalog;
    use crate::fixtures::{catalog, ty};

    #[test]
    fn named_keeps_own_params() {
        let cat = catalog("enum E<A, B> { C(A, A), D(B, u32) }");
        let w = walk(&cat, &Target::Named("E".into())).unwrap();
        assert_eq!(
            w.self_ty,
            TypeExpr::app(TypeExpr::con("E"), [TypeExpr::var("A"), TypeExpr::var("B")])
        );
        assert_eq!(w.scope(), vec!["A".to_owned(), "B".to_owned()]);
        assert_eq!(w.constructors.len(), 2);
        assert_eq!(w.constructors[1].fields[0].ty, TypeExpr::var("B"));
    }

    #[test]
    fn applications_bind_arguments() {
        let cat = catalog("struct Pair<A, B> { a: A, b: Vec<B> }");
        let w = walk(&cat, &Target::Type(ty("Pair<u8, String>"))).unwrap();
        assert_eq!(w.constructors[0].fields[1].ty, ty("Vec<String>"));
        assert!(w.params.is_empty());
    }

    #[test]
    fn arity_is_exact() {
        let cat = catalog("struct Pair<A, B> { a: A, b: B }");
        for src in ["Pair<u8>", "Pair<u8, u8, u8>"] {
            let err = walk(&cat, &Target::Type(ty(src))).unwrap_err();
            assert!(err.to_string().starts_with("arity error"), "{}", err);
        }
    }

    #[test]
    fn synonyms_expand_eagerly() {
        let cat = catalog(
            "type Name = String;
             type Named<T> = Pair<Name, T>;
             struct Pair<A, B> { a: A, b: B }
             struct Rec { n: Name, p: Named<u8> }",
        );
        let w = walk(&cat, &Target::Named("Rec".into())).unwrap();
        let fields = &w.constructors[0].fields;
        assert_eq!(fields[0].ty, ty("Name"));
        assert_eq!(fields[0].expanded, ty("String"));
        assert_eq!(fields[1].expanded, ty("Pair<String, u8>"));

        let w = walk(&cat, &Target::Type(ty("Named<bool>"))).unwrap();
        assert_eq!(w.self_ty, ty("Pair<Name, bool>"));
    }

    #[test]
    fn cyclic_synonyms_fail() {
        let cat = catalog("type A = B; type B = A;");
        match walk(&cat, &Target::Named("A".into())) {
            Err(DeriveError::Unsupported { reason, .. }) => assert_eq!(reason, "cyclic type synonym"),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn tuples_use_builtin_declaration() {
        let cat = MapCatalog::new();
        let w = walk(&cat, &Target::Type(ty("(u8, String)"))).unwrap();
        assert_eq!(w.shape, Shape::Tuple);
        assert_eq!(w.constructors[0].fields[1].ty, ty("String"));
    }

    #[test]
    fn families_select_by_index() {
        let cat = catalog(
            "struct Memory; struct Disk;
             struct MemRecord { a: u8 }
             struct DiskRecord<T> { t: T }
             impl Store for Memory { type Record = MemRecord; }
             impl Store for Disk { type Record = DiskRecord<u64>; }",
        );
        let w = walk(
            &cat,
            &Target::Indexed {
                family: "Store::Record".into(),
                indices: vec![ty("Disk")],
            },
        )
        .unwrap();
        assert_eq!(w.self_ty, ty("DiskRecord<u64>"));

        let w = walk(&cat, &Target::Type(ty("<Memory as Store>::Record"))).unwrap();
        assert_eq!(w.decl_name, "MemRecord");

        let err = walk(
            &cat,
            &Target::Indexed {
                family: "Store::Record".into(),
                indices: vec![ty("Tape")],
            },
        )
        .unwrap_err();
        assert!(matches!(err, DeriveError::Unresolved { .. }));
    }

    #[test]
    fn mismatched_index_shows_both_forms() {
        let cat = catalog(
            "struct Wrap<T> { t: T }
             struct Rec { a: u8 }
             impl Store for Wrap<u8> { type Record = Rec; }",
        );
        let err = walk(
            &cat,
            &Target::Indexed {
                family: "Store::Record".into(),
                indices: vec![ty("Wrap<u16>")],
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            DeriveError::IndexMismatch {
                expected: "<Wrap<u16> as Store>::Record".into(),
                found: "<Wrap<u8> as Store>::Record".into(),
            }
        );
    }

    #[test]
    fn unresolved_names() {
        let cat = MapCatalog::new();
        assert!(matches!(
            walk(&cat, &Target::Type(ty("Missing<u8>"))),
            Err(DeriveError::Unresolved { .. })
        ));
    }
}
