//! Emission of the `SafeCopy` impl for a walked target
//!
//! Constructors are tagged with their 0-based declaration index, written as a
//! single leading byte whenever the type does not have exactly one
//! constructor, or always under [`Strategy::LegacyCompat`]. Fields are written
//! and read left to right.
//!
//! Under [`Strategy::Normal`] each constructor first acquires a writer (or
//! reader) once per distinct field type, which is where the version of that
//! type goes on the wire, and then runs every field through the handle for its
//! type. The other strategies let every field carry its own version.

use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

use crate::attr::DeriveMeta;
use crate::context::Obligations;
use crate::error::{DeriveError, DeriveResult};
use crate::model::{ident, FieldStyle, Shape, Strategy, TypeExpr};
use crate::walker::{Walked, WalkedConstructor};

/// Constructors beyond this count cannot be told apart by a one-byte tag.
pub const MAX_CONSTRUCTORS: usize = 255;

/// Per-constructor summary of the emitted code
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorPlan {
    pub name: String,
    /// Tag byte, if the type is tagged
    pub tag: Option<u8>,
    /// Types whose version is handled, in the order it is handled
    pub acquisitions: Vec<TypeExpr>,
    pub fields: usize,
}

/// Result of one derivation
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    pub tokens: TokenStream,
    pub self_ty: TypeExpr,
    pub error_type_name: String,
    pub obligations: Obligations,
    pub tagged: bool,
    pub constructors: Vec<ConstructorPlan>,
}

/// Index of the first occurrence of each distinct (expanded) field type
fn distinct_types(ctor: &WalkedConstructor) -> Vec<usize> {
    let mut firsts: Vec<usize> = Vec::new();
    for (i, f) in ctor.fields.iter().enumerate() {
        if !firsts.iter().any(|&j| ctor.fields[j].expanded == f.expanded) {
            firsts.push(i);
        }
    }
    firsts
}

/// Position within `firsts` of the acquisition serving field `i`.
fn handle_of(ctor: &WalkedConstructor, firsts: &[usize], i: usize) -> usize {
    let expanded = &ctor.fields[i].expanded;
    firsts
        .iter()
        .position(|&j| &ctor.fields[j].expanded == expanded)
        .unwrap_or(0)
}

/// Path of constructor `ctor` usable both as a pattern and as an expression
fn ctor_path(shape: Shape, ctor: &WalkedConstructor) -> TokenStream {
    match shape {
        Shape::Enum => {
            let v = ident(&ctor.name);
            quote!(Self::#v)
        }
        Shape::Struct | Shape::Tuple => quote!(Self),
    }
}

/// Wraps one token stream per field into the constructor's shape.
fn assemble(shape: Shape, ctor: &WalkedConstructor, parts: Vec<TokenStream>) -> TokenStream {
    if shape == Shape::Tuple {
        return quote!((#(#parts,)*));
    }
    let path = ctor_path(shape, ctor);
    match ctor.style {
        FieldStyle::Unit => path,
        FieldStyle::Unnamed => quote!(#path(#(#parts),*)),
        FieldStyle::Named => {
            let names = ctor
                .fields
                .iter()
                .map(|f| ident(f.name.as_deref().unwrap_or("_")));
            quote!(#path { #(#names: #parts),* })
        }
    }
}

fn binders(ctor: &WalkedConstructor) -> Vec<TokenStream> {
    (0..ctor.fields.len())
        .map(|i| {
            let f = format_ident!("__f{}", i);
            quote!(#f)
        })
        .collect()
}

struct Synth<'a> {
    walked: &'a Walked,
    meta: &'a DeriveMeta,
    strategy: Strategy,
    tagged: bool,
}

impl Synth<'_> {
    fn put_arm(&self, index: usize, ctor: &WalkedConstructor) -> (TokenStream, ConstructorPlan) {
        let krate = &self.meta.krate;
        let pattern = assemble(self.walked.shape, ctor, binders(ctor));
        let mut stmts = Vec::new();
        let mut summands = Vec::new();
        let tag = if self.tagged { Some(index as u8) } else { None };
        if let Some(tag) = tag {
            let tag = Literal::u8_suffixed(tag);
            stmts.push(quote!(let __n = #krate::put_tag(buf, #tag);));
            summands.push(quote!(__n));
        }
        let acquisitions = match self.strategy {
            Strategy::Normal => {
                let firsts = distinct_types(ctor);
                for (k, &j) in firsts.iter().enumerate() {
                    let ty = &ctor.fields[j].ty;
                    let (put, ver) = (format_ident!("__put{}", k), format_ident!("__ver{}", k));
                    stmts.push(quote!(let (#put, #ver) = #krate::get_safe_put::<#ty, __U>(buf);));
                    summands.push(quote!(#ver));
                }
                for i in 0..ctor.fields.len() {
                    let put = format_ident!("__put{}", handle_of(ctor, &firsts, i));
                    let f = format_ident!("__f{}", i);
                    summands.push(quote!(#put.put(#f, buf)));
                }
                firsts.iter().map(|&j| ctor.fields[j].expanded.clone()).collect()
            }
            Strategy::Simple | Strategy::LegacyCompat => {
                for i in 0..ctor.fields.len() {
                    let f = format_ident!("__f{}", i);
                    summands.push(quote!(#krate::safe_put(#f, buf)));
                }
                ctor.fields.iter().map(|f| f.expanded.clone()).collect()
            }
        };
        summands.push(quote!(#krate::resolve_zero!(buf)));
        let arm = quote! {
            #pattern => {
                #(#stmts)*
                #krate::contain(#(#summands)+*)
            }
        };
        let plan = ConstructorPlan {
            name: crate::naming::strip_name(&ctor.name).to_owned(),
            tag,
            acquisitions,
            fields: ctor.fields.len(),
        };
        (arm, plan)
    }

    fn get_body(&self, ctor: &WalkedConstructor) -> TokenStream {
        let krate = &self.meta.krate;
        match self.strategy {
            Strategy::Normal => {
                let firsts = distinct_types(ctor);
                let acquire = firsts.iter().enumerate().map(|(k, &j)| {
                    let ty = &ctor.fields[j].ty;
                    let get = format_ident!("__get{}", k);
                    quote!(let #get = #krate::get_safe_get::<#ty, __P>(p)?;)
                });
                let parts = (0..ctor.fields.len())
                    .map(|i| {
                        let get = format_ident!("__get{}", handle_of(ctor, &firsts, i));
                        quote!(#get.get(p)?)
                    })
                    .collect();
                let value = assemble(self.walked.shape, ctor, parts);
                quote! {
                    #(#acquire)*
                    Ok(#value)
                }
            }
            Strategy::Simple | Strategy::LegacyCompat => {
                let parts = ctor
                    .fields
                    .iter()
                    .map(|f| {
                        let ty = &f.ty;
                        quote!(#krate::safe_get::<#ty, __P>(p)?)
                    })
                    .collect();
                let value = assemble(self.walked.shape, ctor, parts);
                quote!(Ok(#value))
            }
        }
    }

    fn put_copy(&self) -> (TokenStream, Vec<ConstructorPlan>) {
        let krate = &self.meta.krate;
        let ctors = &self.walked.constructors;
        if ctors.is_empty() {
            let body = quote! {
                #[allow(unused_variables)]
                fn put_copy<__U: #krate::Target>(&self, buf: &mut __U) -> #krate::Contained<usize> {
                    match *self {}
                }
            };
            return (body, Vec::new());
        }
        let (arms, plans): (Vec<_>, Vec<_>) = ctors
            .iter()
            .enumerate()
            .map(|(i, c)| self.put_arm(i, c))
            .unzip();
        let body = quote! {
            #[allow(unused_variables)]
            fn put_copy<__U: #krate::Target>(&self, buf: &mut __U) -> #krate::Contained<usize> {
                match self {
                    #(#arms)*
                }
            }
        };
        (body, plans)
    }

    fn get_copy(&self) -> TokenStream {
        let krate = &self.meta.krate;
        let ctors = &self.walked.constructors;
        let count = Literal::usize_unsuffixed(ctors.len());
        let inner = if self.tagged {
            let arms = ctors.iter().enumerate().map(|(i, c)| {
                let tag = Literal::u8_suffixed(i as u8);
                let body = self.get_body(c);
                quote!(#tag => { #body })
            });
            quote! {
                match #krate::get_tag(p)? {
                    #(#arms)*
                    __tag => Err(#krate::unknown_tag::<Self>(__tag, #count)),
                }
            }
        } else {
            // exactly one constructor
            match ctors.first() {
                Some(c) => self.get_body(c),
                None => quote!(),
            }
        };
        quote! {
            #[allow(unused_variables)]
            fn get_copy<__P: #krate::Parser>(p: &mut __P) -> #krate::Contained<#krate::ParseResult<Self>> {
                #krate::contain(#krate::label(
                    <Self as #krate::SafeCopy>::error_type_name(),
                    p,
                    |p| { #inner },
                ))
            }
        }
    }
}

/// Emits the impl of `SafeCopy` for `walked`, reporting `name` in errors.
pub fn synthesize(
    walked: &Walked,
    obligations: Obligations,
    name: String,
    meta: &DeriveMeta,
    strategy: Strategy,
) -> DeriveResult<GeneratedUnit> {
    let count = walked.constructors.len();
    if count > MAX_CONSTRUCTORS {
        return Err(DeriveError::TooManyConstructors { name, count });
    }
    let tagged = count != 1 || strategy == Strategy::LegacyCompat;
    let synth = Synth {
        walked,
        meta,
        strategy,
        tagged,
    };

    let krate = &meta.krate;
    let params = &walked.params;
    let self_ty = &walked.self_ty;
    let version = Literal::u32_suffixed(meta.version);
    let kind = meta.kind.to_path(krate);
    let (put_copy, constructors) = synth.put_copy();
    let get_copy = synth.get_copy();

    let preds = walked.predicates.iter().map(|p| quote!(#p));
    let obls = obligations.iter().map(|ty| quote!(#ty: #krate::SafeCopy));
    let clauses: Vec<TokenStream> = preds.chain(obls).collect();
    let where_clause = if clauses.is_empty() {
        quote!()
    } else {
        quote!(where #(#clauses),*)
    };

    let tokens = quote! {
        #[automatically_derived]
        impl<#(#params),*> #krate::SafeCopy for #self_ty #where_clause {
            const VERSION: #krate::Version = #krate::Version::new(#version);
            type Kind = #kind;

            fn error_type_name() -> &'static str {
                #name
            }

            #put_copy

            #get_copy
        }
    };

    Ok(GeneratedUnit {
        tokens,
        self_ty: walked.self_ty.clone(),
        error_type_name: name,
        obligations,
        tagged,
        constructors,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::infer;
    use crate::fixtures::{catalog, ty};
    use crate::model::{Constructor, Declaration};
    use crate::walker::{walk, Target};

    fn unit(src: &str, name: &str, strategy: Strategy) -> GeneratedUnit {
        let cat = catalog(src);
        let walked = walk(&cat, &Target::Named(name.into())).unwrap();
        let obl = infer(&walked);
        synthesize(&walked, obl, name.into(), &DeriveMeta::default(), strategy).unwrap()
    }

    #[test]
    fn tags_follow_declaration_order() {
        let u = unit("enum Op { Add, Sub(u8), Mul { x: u8 } }", "Op", Strategy::Normal);
        assert!(u.tagged);
        let tags: Vec<_> = u.constructors.iter().map(|c| c.tag).collect();
        assert_eq!(tags, vec![Some(0), Some(1), Some(2)]);
        let names: Vec<_> = u.constructors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Add", "Sub", "Mul"]);
    }

    #[test]
    fn single_constructor_is_untagged() {
        let u = unit("struct P { x: u8, y: u8 }", "P", Strategy::Normal);
        assert!(!u.tagged);
        assert_eq!(u.constructors[0].tag, None);
        let u = unit("struct P { x: u8, y: u8 }", "P", Strategy::Simple);
        assert!(!u.tagged);
        let u = unit("struct P { x: u8, y: u8 }", "P", Strategy::LegacyCompat);
        assert!(u.tagged);
        assert_eq!(u.constructors[0].tag, Some(0));
    }

    #[test]
    fn normal_acquires_each_type_once() {
        let src = "enum T<A, B> { C(A, A), D(B, i64) }";
        let u = unit(src, "T", Strategy::Normal);
        assert_eq!(u.constructors[0].acquisitions, vec![TypeExpr::var("A")]);
        assert_eq!(
            u.constructors[1].acquisitions,
            vec![TypeExpr::var("B"), ty("i64")]
        );
        let u = unit(src, "T", Strategy::Simple);
        assert_eq!(u.constructors[0].acquisitions.len(), 2);
    }

    #[test]
    fn synonyms_share_an_acquisition() {
        let u = unit(
            "type Name = String; struct R { a: Name, b: String }",
            "R",
            Strategy::Normal,
        );
        assert_eq!(u.constructors[0].acquisitions, vec![ty("String")]);
    }

    #[test]
    fn too_many_constructors() {
        let ctors = |n: usize| {
            (0..n)
                .map(|i| Constructor {
                    name: format!("C{}", i),
                    style: FieldStyle::Unit,
                    fields: vec![],
                })
                .collect::<Vec<_>>()
        };
        let mut cat = crate::catalog::MapCatalog::new();
        cat.insert(Declaration::data("Wide", Shape::Enum, ctors(256)));
        cat.insert(Declaration::data("Full", Shape::Enum, ctors(255)));

        let walked = walk(&cat, &Target::Named("Wide".into())).unwrap();
        let err = synthesize(
            &walked,
            Obligations::new(),
            "Wide".into(),
            &DeriveMeta::default(),
            Strategy::Normal,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DeriveError::TooManyConstructors {
                name: "Wide".into(),
                count: 256,
            }
        );

        let walked = walk(&cat, &Target::Named("Full".into())).unwrap();
        let u = synthesize(
            &walked,
            Obligations::new(),
            "Full".into(),
            &DeriveMeta::default(),
            Strategy::Normal,
        )
        .unwrap();
        assert_eq!(u.constructors.last().unwrap().tag, Some(254));
    }

    #[test]
    fn emits_a_parseable_impl() {
        let u = unit(
            "enum T<A: Clone, B> { C(A, A), D { b: B, n: i64 }, E }",
            "T",
            Strategy::Normal,
        );
        let item: syn::ItemImpl = syn::parse2(u.tokens).unwrap();
        let where_clause = item.generics.where_clause.unwrap();
        assert_eq!(where_clause.predicates.len(), 3);
        assert_eq!(item.items.len(), 5);
    }

    #[test]
    fn named_fields_keep_their_names() {
        let u = unit("struct P { x: u8, r#type: u16 }", "P", Strategy::Simple);
        let out = u.tokens.to_string();
        assert!(out.contains("x : __f0"));
        assert!(out.contains("r#type : __f1"));
        let _: syn::ItemImpl = syn::parse2(u.tokens).unwrap();
    }

    #[test]
    fn empty_enum_still_emits() {
        let u = unit("enum Never {}", "Never", Strategy::Normal);
        assert!(u.tagged);
        assert!(u.constructors.is_empty());
        let _: syn::ItemImpl = syn::parse2(u.tokens).unwrap();
    }
}
