//! The item block accepted by `derive_safecopy!`
//!
//! A block holds ordinary items, which are re-emitted unchanged apart from
//! their `#[safecopy]` attributes, and derivation directives of the form
//!
//! ```text
//! #[safecopy(..)]
//! impl<..> SafeCopy for <type> where .. ;
//! ```
//!
//! Every struct, enum, type alias and associated-type impl in the block goes
//! into the catalog that the block's derivations resolve names against. A
//! struct, enum or alias carrying `#[safecopy(..)]` is itself derived for.

use std::collections::HashMap;

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::discouraged::Speculative;
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{Attribute, DeriveInput, Generics, Item, Path, Token, Type};

use crate::attr::{self, Attrs};
use crate::catalog::MapCatalog;
use crate::derive;
use crate::error::{DeriveError, DeriveResult};
use crate::lower;
use crate::model::{DeclBody, Declaration, TypeExpr};
use crate::walker::Target;

/// `impl<..> SafeCopy for <type> where .. ;`
pub struct Directive {
    pub attrs: Vec<Attribute>,
    pub generics: Generics,
    pub ty: Type,
}

impl Parse for Directive {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        input.parse::<Token![impl]>()?;
        let mut generics: Generics = input.parse()?;
        let trait_path: Path = input.parse()?;
        match trait_path.segments.last() {
            Some(seg) if seg.ident == "SafeCopy" && seg.arguments.is_none() => {}
            _ => return Err(syn::Error::new(trait_path.span(), "expected `SafeCopy`")),
        }
        input.parse::<Token![for]>()?;
        let ty: Type = input.parse()?;
        generics.where_clause = input.parse()?;
        input.parse::<Token![;]>()?;
        Ok(Self {
            attrs,
            generics,
            ty,
        })
    }
}

pub enum Entry {
    Item(Item),
    Directive(Directive),
}

pub struct Block {
    pub entries: Vec<Entry>,
}

impl Parse for Block {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut entries = Vec::new();
        while !input.is_empty() {
            let fork = input.fork();
            match fork.parse::<Directive>() {
                Ok(directive) => {
                    input.advance_to(&fork);
                    entries.push(Entry::Directive(directive));
                }
                Err(_) => entries.push(Entry::Item(input.parse()?)),
            }
        }
        Ok(Self { entries })
    }
}

/// A derivation requested within a block
struct Request {
    target: DeriveResult<Target>,
    attrs: Attrs,
    span: Span,
}

fn item_attrs(item: &mut Item) -> Option<&mut Vec<Attribute>> {
    match item {
        Item::Struct(s) => Some(&mut s.attrs),
        Item::Enum(e) => Some(&mut e.attrs),
        Item::Union(u) => Some(&mut u.attrs),
        Item::Type(t) => Some(&mut t.attrs),
        Item::Impl(i) => Some(&mut i.attrs),
        _ => None,
    }
}

/// Converts a directive to the target it names.
fn directive_target(d: &Directive) -> DeriveResult<Target> {
    let (params, constraints) = lower::lower_generics(&d.generics)?;
    let scope = lower::scope_of(&params);
    let body = lower::lower_type(&d.ty, &scope)?;
    if params.is_empty() && constraints.is_empty() {
        if let TypeExpr::Projection {
            self_ty,
            trait_name,
            trait_args,
            assoc,
        } = body
        {
            let mut indices = vec![*self_ty];
            indices.extend(trait_args);
            return Ok(Target::Indexed {
                family: format!("{}::{}", trait_name.last(), assoc),
                indices,
            });
        }
        return Ok(Target::Type(body));
    }
    Ok(Target::Type(TypeExpr::Forall {
        params,
        constraints,
        body: Box::new(body),
    }))
}

impl Block {
    /// Re-emits the block's items followed by one impl per derivation.
    pub fn expand(self) -> TokenStream {
        let mut catalog = MapCatalog::new();
        let mut failures: HashMap<String, DeriveError> = HashMap::new();
        let mut requests = Vec::new();
        let mut items = Vec::new();
        let mut errors = Vec::new();

        for entry in self.entries {
            match entry {
                Entry::Directive(d) => match attr::parse_attrs(&d.attrs) {
                    Ok(attrs) => requests.push(Request {
                        target: directive_target(&d),
                        attrs: attrs.unwrap_or_default(),
                        span: d.ty.span(),
                    }),
                    Err(err) => errors.push(err),
                },
                Entry::Item(mut item) => {
                    let requested = match item_attrs(&mut item) {
                        Some(attrs) => {
                            let parsed = attr::parse_attrs(attrs);
                            attr::strip(attrs);
                            parsed
                        }
                        None => Ok(None),
                    };
                    let named = register(&mut catalog, &mut failures, &item);
                    match (requested, named) {
                        (Ok(Some(attrs)), Some((name, span))) => requests.push(Request {
                            target: match failures.get(&name) {
                                Some(err) => Err(err.clone()),
                                None => Ok(Target::Named(name)),
                            },
                            attrs,
                            span,
                        }),
                        (Ok(Some(_)), None) => errors.push(syn::Error::new(
                            item.span(),
                            "#[safecopy] applies to structs, enums and type aliases",
                        )),
                        (Ok(None), _) => {}
                        (Err(err), _) => errors.push(err),
                    }
                    items.push(item);
                }
            }
        }

        let impls = requests.into_iter().map(|req| {
            req.target
                .and_then(|target| {
                    derive::dispatch(&catalog, &target, &req.attrs.meta, req.attrs.strategy)
                })
                .map(|unit| unit.tokens)
                .unwrap_or_else(|err| err.into_syn(req.span).to_compile_error())
        });
        let impls: Vec<TokenStream> = impls.collect();
        let errors = errors.into_iter().map(|e| e.to_compile_error());
        quote! {
            #(#items)*
            #(#impls)*
            #(#errors)*
        }
    }
}

/// Adds whatever `item` declares to `catalog`, returning the name and span
/// of a declaration that could be derived for.
fn register(
    catalog: &mut MapCatalog,
    failures: &mut HashMap<String, DeriveError>,
    item: &Item,
) -> Option<(String, Span)> {
    let ident = match item {
        Item::Struct(s) => &s.ident,
        Item::Enum(e) => &e.ident,
        Item::Union(u) => &u.ident,
        Item::Type(t) => &t.ident,
        Item::Impl(i) => {
            // impls the engine cannot lower are still valid Rust, and only
            // matter if a derivation projects through them
            if let Ok(decls) = lower::lower_family_impl(i) {
                for decl in decls {
                    catalog.insert(decl);
                }
            }
            return None;
        }
        _ => return None,
    };
    let lowered = match item {
        Item::Struct(s) => lower::lower_derive_input(&DeriveInput::from(s.clone())),
        Item::Enum(e) => lower::lower_derive_input(&DeriveInput::from(e.clone())),
        Item::Union(u) => lower::lower_derive_input(&DeriveInput::from(u.clone())),
        Item::Type(t) => lower::lower_alias(t),
        _ => return None,
    };
    let name = ident.to_string();
    match lowered {
        Ok(decl) => catalog.insert(decl),
        Err(err) => {
            catalog.insert(Declaration {
                name: name.clone(),
                params: Vec::new(),
                predicates: Vec::new(),
                body: DeclBody::Unsupported(err.to_string()),
            });
            failures.insert(name.clone(), err);
        }
    }
    Some((name, ident.span()))
}
