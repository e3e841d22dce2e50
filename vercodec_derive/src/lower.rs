//! Lowering from `syn` syntax trees into the engine model
//!
//! Shapes the engine cannot derive through are rejected here, naming the
//! offending fragment, so that the later passes only see supported forms.

use proc_macro2::{Delimiter, Spacing, TokenStream, TokenTree};
use quote::ToTokens;
use syn::{
    Data, DeriveInput, Expr, Fields, GenericArgument, GenericParam, Generics, ImplItem, ItemImpl,
    ItemType, Path, PathArguments, Stmt, TraitBoundModifier, Type, TypeParamBound,
    WherePredicate,
};

use crate::error::{DeriveError, DeriveResult};
use crate::model::{
    Bound, Constructor, DeclBody, Declaration, FamilyInstance, Field, FieldStyle, Param, ParamKind,
    Predicate, Shape, TypeExpr, TypeName,
};

fn reject(fragment: &impl ToTokens, reason: &str) -> DeriveError {
    DeriveError::unsupported(fragment.to_token_stream(), reason)
}

pub fn type_name(path: &Path) -> TypeName {
    TypeName {
        segments: path.segments.iter().map(|s| s.ident.to_string()).collect(),
        leading_colon: path.leading_colon.is_some(),
    }
}

/// Lowers a written type. `scope` lists the generic parameters in force.
pub fn lower_type(ty: &Type, scope: &[String]) -> DeriveResult<TypeExpr> {
    match ty {
        Type::Path(tp) => match &tp.qself {
            Some(qself) => {
                if qself.position == 0 {
                    return Err(reject(ty, "projection without a trait"));
                }
                let segs: Vec<_> = tp.path.segments.iter().collect();
                if segs.len() != qself.position + 1 {
                    return Err(reject(ty, "nested associated-type projection"));
                }
                let (trait_segs, assoc) = segs.split_at(qself.position);
                let assoc = assoc[0];
                if !assoc.arguments.is_none() {
                    return Err(reject(ty, "generic associated type"));
                }
                let trait_name = TypeName {
                    segments: trait_segs.iter().map(|s| s.ident.to_string()).collect(),
                    leading_colon: tp.path.leading_colon.is_some(),
                };
                let mut trait_args = Vec::new();
                for (i, seg) in trait_segs.iter().enumerate() {
                    let args = lower_args(&seg.arguments, scope)?;
                    if !args.is_empty() && i + 1 != trait_segs.len() {
                        return Err(reject(ty, "generic arguments on a module path"));
                    }
                    trait_args.extend(args);
                }
                Ok(TypeExpr::Projection {
                    self_ty: Box::new(lower_type(&qself.ty, scope)?),
                    trait_name,
                    trait_args,
                    assoc: assoc.ident.to_string(),
                })
            }
            None => lower_path(&tp.path, ty, scope),
        },
        Type::Tuple(tt) => tt
            .elems
            .iter()
            .map(|e| lower_type(e, scope))
            .collect::<DeriveResult<Vec<_>>>()
            .map(TypeExpr::Tuple),
        Type::Array(ta) => Ok(TypeExpr::Array(
            Box::new(lower_type(&ta.elem, scope)?),
            Box::new(lower_const(&ta.len, scope)),
        )),
        Type::Paren(tp) => lower_type(&tp.elem, scope),
        Type::Group(tg) => lower_type(&tg.elem, scope),
        Type::BareFn(_) => Err(reject(ty, "function types have no serialized form")),
        Type::TraitObject(_) => Err(reject(ty, "trait objects are existential")),
        Type::ImplTrait(_) => Err(reject(ty, "`impl Trait` types are existential")),
        Type::Reference(_) => Err(reject(ty, "borrowed fields cannot be decoded")),
        Type::Ptr(_) => Err(reject(ty, "raw pointers have no serialized form")),
        Type::Slice(_) => Err(reject(ty, "unsized slices cannot be decoded")),
        Type::Never(_) => Err(reject(ty, "the never type is not a data type")),
        Type::Infer(_) => Err(reject(ty, "the type must be written out")),
        Type::Macro(_) => Err(reject(ty, "macro types are opaque")),
        _ => Err(reject(ty, "unrecognized type syntax")),
    }
}

fn lower_path(path: &Path, whole: &Type, scope: &[String]) -> DeriveResult<TypeExpr> {
    let first = match path.segments.first() {
        Some(seg) => seg,
        None => return Err(reject(whole, "empty path")),
    };
    let first_name = first.ident.to_string();
    if path.leading_colon.is_none() && scope.contains(&first_name) {
        if path.segments.len() > 1 {
            return Err(reject(whole, "associated types of generic parameters"));
        }
        if !first.arguments.is_none() {
            return Err(reject(whole, "generic parameters take no arguments"));
        }
        return Ok(TypeExpr::Var(first_name));
    }
    let last = path.segments.len() - 1;
    let mut args = Vec::new();
    for (i, seg) in path.segments.iter().enumerate() {
        if i != last {
            if !seg.arguments.is_none() {
                return Err(reject(whole, "generic arguments on a module path"));
            }
            continue;
        }
        args = lower_args(&seg.arguments, scope)?;
    }
    Ok(TypeExpr::app(TypeExpr::Con(type_name(path)), args))
}

fn lower_args(args: &PathArguments, scope: &[String]) -> DeriveResult<Vec<TypeExpr>> {
    match args {
        PathArguments::None => Ok(Vec::new()),
        PathArguments::Parenthesized(p) => Err(reject(p, "closure-style arguments")),
        PathArguments::AngleBracketed(ab) => ab
            .args
            .iter()
            .map(|arg| match arg {
                GenericArgument::Type(t) => lower_type(t, scope),
                GenericArgument::Const(e) => Ok(lower_const(e, scope)),
                GenericArgument::Lifetime(lt) => Err(reject(lt, "lifetime arguments")),
                other => Err(reject(other, "associated-item bindings")),
            })
            .collect(),
    }
}

/// Lowers a const-generic argument or array length.
pub fn lower_const(expr: &Expr, scope: &[String]) -> TypeExpr {
    match expr {
        Expr::Block(b) if b.attrs.is_empty() && b.block.stmts.len() == 1 => {
            if let Stmt::Expr(inner, None) = &b.block.stmts[0] {
                return lower_const(inner, scope);
            }
        }
        Expr::Paren(p) => return lower_const(&p.expr, scope),
        _ => {}
    }
    let mut words = Vec::new();
    let mut vars = Vec::new();
    flatten(expr.to_token_stream(), scope, &mut words, &mut vars);
    let text = words.join(" ");
    if vars.len() == 1 && text == vars[0] {
        return TypeExpr::Var(text);
    }
    TypeExpr::Const { text, vars }
}

fn flatten(ts: TokenStream, scope: &[String], words: &mut Vec<String>, vars: &mut Vec<String>) {
    let mut joined = false;
    for tt in ts {
        let glue = joined;
        joined = false;
        match tt {
            TokenTree::Group(g) => {
                let (open, close) = match g.delimiter() {
                    Delimiter::Parenthesis => ("(", ")"),
                    Delimiter::Brace => ("{", "}"),
                    Delimiter::Bracket => ("[", "]"),
                    Delimiter::None => ("", ""),
                };
                if !open.is_empty() {
                    words.push(open.to_owned());
                }
                flatten(g.stream(), scope, words, vars);
                if !close.is_empty() {
                    words.push(close.to_owned());
                }
            }
            TokenTree::Ident(id) => {
                let name = id.to_string();
                if scope.contains(&name) && !vars.contains(&name) {
                    vars.push(name.clone());
                }
                words.push(name);
            }
            TokenTree::Punct(p) => {
                match words.last_mut() {
                    Some(prev) if glue => prev.push(p.as_char()),
                    _ => words.push(p.as_char().to_string()),
                }
                joined = p.spacing() == Spacing::Joint;
            }
            TokenTree::Literal(l) => words.push(l.to_string()),
        }
    }
}

fn lower_bounds<'a>(
    bounds: impl IntoIterator<Item = &'a TypeParamBound>,
    scope: &[String],
) -> DeriveResult<Vec<Bound>> {
    let mut out = Vec::new();
    for bound in bounds {
        match bound {
            TypeParamBound::Trait(tb) => {
                if tb.lifetimes.is_some() {
                    return Err(reject(tb, "higher-ranked bounds"));
                }
                if tb.paren_token.is_some() {
                    return Err(reject(tb, "parenthesized bounds"));
                }
                let last = tb.path.segments.len().saturating_sub(1);
                let mut args = Vec::new();
                for (i, seg) in tb.path.segments.iter().enumerate() {
                    if i == last {
                        args = lower_args(&seg.arguments, scope)?;
                    } else if !seg.arguments.is_none() {
                        return Err(reject(tb, "generic arguments on a module path"));
                    }
                }
                out.push(Bound::Trait {
                    maybe: matches!(tb.modifier, TraitBoundModifier::Maybe(_)),
                    path: type_name(&tb.path),
                    args,
                });
            }
            TypeParamBound::Lifetime(lt) => out.push(Bound::Lifetime(lt.to_string())),
            other => return Err(reject(other, "unrecognized bound")),
        }
    }
    Ok(out)
}

/// Lowers the parameters and predicates of a generics list.
pub fn lower_generics(generics: &Generics) -> DeriveResult<(Vec<Param>, Vec<Predicate>)> {
    let scope: Vec<String> = generics
        .params
        .iter()
        .filter_map(|p| match p {
            GenericParam::Type(t) => Some(t.ident.to_string()),
            GenericParam::Const(c) => Some(c.ident.to_string()),
            GenericParam::Lifetime(_) => None,
        })
        .collect();

    let mut params = Vec::new();
    let mut predicates = Vec::new();
    for param in generics.params.iter() {
        match param {
            GenericParam::Lifetime(lp) => {
                return Err(reject(&lp.lifetime, "lifetime parameters"));
            }
            GenericParam::Type(tp) => {
                let name = tp.ident.to_string();
                if !tp.bounds.is_empty() {
                    predicates.push(Predicate {
                        bounded: TypeExpr::Var(name.clone()),
                        bounds: lower_bounds(&tp.bounds, &scope)?,
                    });
                }
                params.push(Param {
                    name,
                    kind: ParamKind::Type,
                });
            }
            GenericParam::Const(cp) => params.push(Param {
                name: cp.ident.to_string(),
                kind: ParamKind::Const {
                    ty: lower_type(&cp.ty, &scope)?,
                },
            }),
        }
    }
    if let Some(wc) = &generics.where_clause {
        for pred in wc.predicates.iter() {
            match pred {
                WherePredicate::Type(pt) => {
                    if pt.lifetimes.is_some() {
                        return Err(reject(pt, "higher-ranked bounds"));
                    }
                    predicates.push(Predicate {
                        bounded: lower_type(&pt.bounded_ty, &scope)?,
                        bounds: lower_bounds(&pt.bounds, &scope)?,
                    });
                }
                other => return Err(reject(other, "lifetime predicates")),
            }
        }
    }
    Ok((params, predicates))
}

pub fn scope_of(params: &[Param]) -> Vec<String> {
    params.iter().map(|p| p.name.clone()).collect()
}

fn lower_fields(fields: &Fields, scope: &[String]) -> DeriveResult<(FieldStyle, Vec<Field>)> {
    let style = match fields {
        Fields::Named(_) => FieldStyle::Named,
        Fields::Unnamed(_) => FieldStyle::Unnamed,
        Fields::Unit => FieldStyle::Unit,
    };
    let lowered = fields
        .iter()
        .map(|f| {
            Ok(Field {
                name: f.ident.as_ref().map(|i| i.to_string()),
                ty: lower_type(&f.ty, scope)?,
            })
        })
        .collect::<DeriveResult<Vec<_>>>()?;
    Ok((style, lowered))
}

/// Lowers a struct or enum declaration.
pub fn lower_derive_input(input: &DeriveInput) -> DeriveResult<Declaration> {
    let (params, predicates) = lower_generics(&input.generics)?;
    let scope = scope_of(&params);
    let name = input.ident.to_string();
    let (shape, constructors) = match &input.data {
        Data::Struct(ds) => {
            let (style, fields) = lower_fields(&ds.fields, &scope)?;
            (
                Shape::Struct,
                vec![Constructor {
                    name: name.clone(),
                    style,
                    fields,
                }],
            )
        }
        Data::Enum(de) => {
            let mut ctors = Vec::with_capacity(de.variants.len());
            for v in de.variants.iter() {
                let (style, fields) = lower_fields(&v.fields, &scope)?;
                ctors.push(Constructor {
                    name: v.ident.to_string(),
                    style,
                    fields,
                });
            }
            (Shape::Enum, ctors)
        }
        Data::Union(_) => {
            return Err(DeriveError::unsupported(
                &input.ident,
                "unions have no discriminant to serialize",
            ))
        }
    };
    Ok(Declaration {
        name,
        params,
        predicates,
        body: DeclBody::Data {
            shape,
            constructors,
        },
    })
}

/// Lowers `type Name<..> = ..;` into a synonym.
pub fn lower_alias(item: &ItemType) -> DeriveResult<Declaration> {
    let (params, predicates) = lower_generics(&item.generics)?;
    let scope = scope_of(&params);
    Ok(Declaration {
        name: item.ident.to_string(),
        body: DeclBody::Synonym(lower_type(&item.ty, &scope)?),
        params,
        predicates,
    })
}

/// Lowers the associated types of a trait impl into family instances, one
/// declaration per associated type.
pub fn lower_family_impl(item: &ItemImpl) -> DeriveResult<Vec<Declaration>> {
    let (bang, trait_path) = match &item.trait_ {
        Some((bang, path, _)) => (bang, path),
        None => return Ok(Vec::new()),
    };
    if bang.is_some() {
        return Ok(Vec::new());
    }
    let (generics, predicates) = lower_generics(&item.generics)?;
    let scope = scope_of(&generics);
    let mut head = vec![lower_type(&item.self_ty, &scope)?];
    if let Some(last) = trait_path.segments.last() {
        head.extend(lower_args(&last.arguments, &scope)?);
    }
    let trait_name = type_name(trait_path);

    let mut out = Vec::new();
    for impl_item in item.items.iter() {
        if let ImplItem::Type(assoc) = impl_item {
            if !assoc.generics.params.is_empty() {
                return Err(reject(&assoc.ident, "generic associated types"));
            }
            out.push(Declaration {
                name: format!("{}::{}", trait_name.last(), assoc.ident),
                params: Vec::new(),
                predicates: Vec::new(),
                body: DeclBody::Family {
                    instances: vec![FamilyInstance {
                        generics: generics.clone(),
                        predicates: predicates.clone(),
                        head: head.clone(),
                        body: lower_type(&assoc.ty, &scope)?,
                    }],
                },
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    fn ty(src: &str, scope: &[&str]) -> DeriveResult<TypeExpr> {
        let scope: Vec<String> = scope.iter().map(|s| s.to_string()).collect();
        lower_type(&syn::parse_str(src).unwrap(), &scope)
    }

    #[test]
    fn paths_become_applications() {
        assert_eq!(
            ty("std::collections::BTreeMap<K, u8>", &["K"]).unwrap(),
            TypeExpr::app(
                TypeExpr::Con(TypeName {
                    segments: vec!["std".into(), "collections".into(), "BTreeMap".into()],
                    leading_colon: false,
                }),
                [TypeExpr::var("K"), TypeExpr::con("u8")]
            )
        );
    }

    #[test]
    fn arrays_and_consts() {
        assert_eq!(
            ty("[T; N]", &["T", "N"]).unwrap(),
            TypeExpr::Array(Box::new(TypeExpr::var("T")), Box::new(TypeExpr::var("N")))
        );
        assert_eq!(
            ty("[u8; 4]", &[]).unwrap(),
            TypeExpr::Array(
                Box::new(TypeExpr::con("u8")),
                Box::new(TypeExpr::Const {
                    text: "4".into(),
                    vars: vec![],
                })
            )
        );
        assert_eq!(
            ty("Buf<{ N * 2 }>", &["N"]).unwrap(),
            TypeExpr::app(
                TypeExpr::con("Buf"),
                [TypeExpr::Const {
                    text: "N * 2".into(),
                    vars: vec!["N".into()],
                }]
            )
        );
    }

    #[test]
    fn rejects_unsupported_shapes() {
        for src in ["fn(u8) -> u8", "dyn Fn()", "&'a u8", "*const u8", "_", "!", "T::Item"] {
            match ty(src, &["T"]) {
                Err(DeriveError::Unsupported { .. }) => {}
                other => panic!("{} lowered to {:?}", src, other),
            }
        }
    }

    #[test]
    fn projections() {
        let t = ty("<Memory as Store>::Record", &[]).unwrap();
        assert_eq!(
            t,
            TypeExpr::Projection {
                self_ty: Box::new(TypeExpr::con("Memory")),
                trait_name: TypeName::simple("Store"),
                trait_args: vec![],
                assoc: "Record".into(),
            }
        );
    }

    #[test]
    fn generics_and_lifetimes() {
        let input: DeriveInput = syn::parse_str("struct S<A: Clone, const N: usize> where A: Default { a: [A; N] }").unwrap();
        let decl = lower_derive_input(&input).unwrap();
        assert_eq!(decl.params.len(), 2);
        assert_eq!(decl.predicates.len(), 2);

        let input: DeriveInput = syn::parse_str("struct S<'a> { a: &'a u8 }").unwrap();
        assert!(matches!(
            lower_derive_input(&input),
            Err(DeriveError::Unsupported { .. })
        ));

        let input: DeriveInput = syn::parse_str("union U { a: u8 }").unwrap();
        assert!(lower_derive_input(&input).is_err());
    }
}
