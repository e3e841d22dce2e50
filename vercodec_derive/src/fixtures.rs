//! Catalog and type builders shared by the unit tests

use crate::catalog::MapCatalog;
use crate::lower;
use crate::model::TypeExpr;

/// Builds a catalog from a source snippet of items.
pub fn catalog(src: &str) -> MapCatalog {
    let file: syn::File = syn::parse_str(src).unwrap();
    let mut cat = MapCatalog::new();
    for item in file.items {
        match item {
            syn::Item::Struct(s) => cat.insert(lower::lower_derive_input(&s.into()).unwrap()),
            syn::Item::Enum(e) => cat.insert(lower::lower_derive_input(&e.into()).unwrap()),
            syn::Item::Type(t) => cat.insert(lower::lower_alias(&t).unwrap()),
            syn::Item::Impl(i) => {
                for d in lower::lower_family_impl(&i).unwrap() {
                    cat.insert(d)
                }
            }
            _ => {}
        }
    }
    cat
}

pub fn ty(src: &str) -> TypeExpr {
    ty_in(src, &[])
}

pub fn ty_in(src: &str, scope: &[&str]) -> TypeExpr {
    let scope: Vec<String> = scope.iter().map(|s| s.to_string()).collect();
    lower::lower_type(&syn::parse_str(src).unwrap(), &scope).unwrap()
}
