//! Parsing of `#[safecopy(..)]` attributes
//!
//! Recognized keys:
//! - `version = N`: format version, `0` if absent
//! - `kind = base | extension | primitive | <path>`: migration policy, `base` if absent
//! - `strategy = normal | simple | legacy`: field layout, `normal` if absent
//! - `crate = "path"`: path of the runtime crate, `::vercodec` if absent

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::spanned::Spanned;
use syn::{Attribute, Ident, LitInt, LitStr, Path};

use crate::error::DeriveError;
use crate::model::Strategy;

pub const ATTR: &str = "safecopy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindSpec {
    Base,
    Extension,
    Primitive,
    /// Any user type implementing the runtime `Kind` trait
    Path(Path),
}

impl KindSpec {
    pub fn to_path(&self, krate: &Path) -> TokenStream {
        match self {
            KindSpec::Base => quote!(#krate::Base),
            KindSpec::Extension => quote!(#krate::Extension),
            KindSpec::Primitive => quote!(#krate::Primitive),
            KindSpec::Path(p) => p.to_token_stream(),
        }
    }
}

/// Options that end up in the generated impl
#[derive(Debug, Clone)]
pub struct DeriveMeta {
    pub version: u32,
    pub kind: KindSpec,
    pub krate: Path,
}

impl Default for DeriveMeta {
    fn default() -> Self {
        Self {
            version: 0,
            kind: KindSpec::Base,
            krate: syn::parse_quote!(::vercodec),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attrs {
    pub meta: DeriveMeta,
    pub strategy: Strategy,
}

impl Default for Attrs {
    fn default() -> Self {
        Self {
            meta: DeriveMeta::default(),
            strategy: Strategy::Normal,
        }
    }
}

pub fn is_safecopy(attr: &Attribute) -> bool {
    attr.path().is_ident(ATTR)
}

fn duplicate(key: &str, at: &impl Spanned) -> syn::Error {
    syn::Error::new(
        at.span(),
        DeriveError::Attribute(format!("duplicate key `{}`", key)),
    )
}

/// Parses every `#[safecopy(..)]` among `attrs`, or returns `None` when
/// there are none.
pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Option<Attrs>> {
    let mut version: Option<u32> = None;
    let mut kind: Option<KindSpec> = None;
    let mut strategy: Option<Strategy> = None;
    let mut krate: Option<Path> = None;
    let mut seen = false;

    for attr in attrs.iter().filter(|a| is_safecopy(a)) {
        seen = true;
        if let syn::Meta::Path(_) = attr.meta {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("version") {
                if version.is_some() {
                    return Err(duplicate("version", &nested.path));
                }
                let lit: LitInt = nested.value()?.parse()?;
                version = Some(lit.base10_parse::<u32>()?);
            } else if nested.path.is_ident("kind") {
                if kind.is_some() {
                    return Err(duplicate("kind", &nested.path));
                }
                let path: Path = nested.value()?.parse()?;
                kind = Some(if path.is_ident("base") {
                    KindSpec::Base
                } else if path.is_ident("extension") {
                    KindSpec::Extension
                } else if path.is_ident("primitive") {
                    KindSpec::Primitive
                } else {
                    KindSpec::Path(path)
                });
            } else if nested.path.is_ident("strategy") {
                if strategy.is_some() {
                    return Err(duplicate("strategy", &nested.path));
                }
                let ident: Ident = nested.value()?.parse()?;
                strategy = Some(match ident.to_string().as_str() {
                    "normal" => Strategy::Normal,
                    "simple" => Strategy::Simple,
                    "legacy" => Strategy::LegacyCompat,
                    other => {
                        return Err(syn::Error::new(
                            ident.span(),
                            DeriveError::Attribute(format!(
                                "unknown strategy `{}`, expected `normal`, `simple` or `legacy`",
                                other
                            )),
                        ))
                    }
                });
            } else if nested.path.is_ident("crate") {
                if krate.is_some() {
                    return Err(duplicate("crate", &nested.path));
                }
                let lit: LitStr = nested.value()?.parse()?;
                krate = Some(lit.parse()?);
            } else {
                return Err(nested.error(DeriveError::Attribute(format!(
                    "unknown key `{}`",
                    nested.path.to_token_stream()
                ))));
            }
            Ok(())
        })?;
    }

    if !seen {
        return Ok(None);
    }
    let defaults = DeriveMeta::default();
    Ok(Some(Attrs {
        meta: DeriveMeta {
            version: version.unwrap_or(defaults.version),
            kind: kind.unwrap_or(defaults.kind),
            krate: krate.unwrap_or(defaults.krate),
        },
        strategy: strategy.unwrap_or(Strategy::Normal),
    }))
}

/// Removes `#[safecopy(..)]` attributes before an item is re-emitted.
pub fn strip(attrs: &mut Vec<Attribute>) {
    attrs.retain(|a| !is_safecopy(a));
}

#[cfg(test)]
mod test {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn defaults_apply() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[safecopy(version = 3)])];
        let parsed = parse_attrs(&attrs).unwrap().unwrap();
        assert_eq!(parsed.meta.version, 3);
        assert_eq!(parsed.meta.kind, KindSpec::Base);
        assert_eq!(parsed.strategy, Strategy::Normal);
        assert!(parse_attrs(&[]).unwrap().is_none());
    }

    #[test]
    fn kinds_and_strategies() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[safecopy(kind = my::Policy)]),
            parse_quote!(#[safecopy(strategy = legacy, crate = "crate")]),
        ];
        let parsed = parse_attrs(&attrs).unwrap().unwrap();
        assert_eq!(parsed.meta.kind, KindSpec::Path(parse_quote!(my::Policy)));
        assert_eq!(parsed.strategy, Strategy::LegacyCompat);
        assert_eq!(
            parsed.meta.kind.to_path(&parsed.meta.krate).to_string(),
            "my :: Policy"
        );
    }

    #[test]
    fn rejects_unknown_and_duplicate_keys() {
        let unknown: Vec<Attribute> = vec![parse_quote!(#[safecopy(colour = 1)])];
        assert!(parse_attrs(&unknown).is_err());
        let dup: Vec<Attribute> = vec![parse_quote!(#[safecopy(version = 1, version = 2)])];
        assert!(parse_attrs(&dup).is_err());
        let bad: Vec<Attribute> = vec![parse_quote!(#[safecopy(strategy = fancy)])];
        assert!(parse_attrs(&bad).is_err());
    }
}
