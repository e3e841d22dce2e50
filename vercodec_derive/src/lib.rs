//! Derivation of `vercodec::SafeCopy`
//!
//! Use these macros through their re-exports in `vercodec`.

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod attr;
mod block;
mod catalog;
mod context;
mod derive;
mod error;
#[cfg(test)]
mod fixtures;
mod lower;
mod model;
mod naming;
mod synth;
mod walker;

use crate::catalog::MapCatalog;
use crate::walker::Target;

/// Derives `SafeCopy` for a struct or enum.
///
/// Accepts `#[safecopy(version = N, kind = K, strategy = S, crate = "path")]`.
///
/// The derive only sees the item it is attached to, so type aliases used in
/// field types are not expanded. Under the `normal` strategy, a field of type
/// `Bytes` (for `type Bytes = Vec<u8>`) and a field of type `Vec<u8>` are then
/// treated as distinct types and the version of `Vec<u8>` is written for each.
/// Declare the alias and the type together inside [`derive_safecopy!`] to
/// have them recognised as one type.
#[proc_macro_derive(SafeCopy, attributes(safecopy))]
pub fn safecopy_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    expand_derive(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_derive(ast: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = attr::parse_attrs(&ast.attrs)?.unwrap_or_default();
    let span = ast.ident.span();
    let decl = lower::lower_derive_input(ast).map_err(|e| e.into_syn(span))?;
    let target = Target::Named(decl.name.clone());
    let catalog: MapCatalog = std::iter::once(decl).collect();
    derive::dispatch(&catalog, &target, &attrs.meta, attrs.strategy)
        .map(|unit| unit.tokens)
        .map_err(|e| e.into_syn(span))
}

/// Re-emits a block of items and derives `SafeCopy` as directed within it.
///
/// Items carrying `#[safecopy(..)]` are derived for. Instances for other
/// types, including instantiations, type aliases and associated-type
/// projections declared in the block, are requested with directives:
///
/// ```ignore
/// derive_safecopy! {
///     struct Pair<A, B> { a: A, b: B }
///     type Label = String;
///
///     #[safecopy(version = 1)]
///     impl<B> SafeCopy for Pair<Label, B>;
/// }
/// ```
#[proc_macro]
pub fn derive_safecopy(input: TokenStream) -> TokenStream {
    parse_macro_input!(input as block::Block).expand().into()
}
