//! Canonical display names
//!
//! The name a derived impl reports from `error_type_name`, and that decode
//! errors are labelled with, is computed here from the target. The same
//! renderer also formats type expressions in derivation errors, in qualified
//! form there.
//!
//! Rendering is deterministic: arguments are separated by `, `, a 1-tuple is
//! written `(A,)` and an array `[T; N]`. Unqualified rendering keeps only the
//! final segment of every path, with the constructor-name cleanup of
//! [`strip_name`] applied. Generic parameter names are never altered.

use std::fmt::{self, Formatter, Write};

use crate::model::{TypeExpr, TypeName};
use crate::walker::Target;

/// Drops a raw-identifier prefix and a trailing `__<digits>` hygiene suffix.
pub fn strip_name(name: &str) -> &str {
    let name = name.strip_prefix("r#").unwrap_or(name);
    match name.rfind("__") {
        Some(ix) if ix > 0 => {
            let suffix = &name[ix + 2..];
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                &name[..ix]
            } else {
                name
            }
        }
        _ => name,
    }
}

fn write_name(name: &TypeName, f: &mut Formatter<'_>, qualified: bool) -> fmt::Result {
    if qualified {
        write!(f, "{}", name)
    } else {
        f.write_str(strip_name(name.last()))
    }
}

fn write_list(items: &[&TypeExpr], f: &mut Formatter<'_>, qualified: bool) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        render_arg(item, f, qualified)?;
    }
    Ok(())
}

/// Renders `ty` in generic-argument position, where a const expression
/// other than a literal needs braces.
fn render_arg(ty: &TypeExpr, f: &mut Formatter<'_>, qualified: bool) -> fmt::Result {
    match ty {
        TypeExpr::Const { text, .. } if !is_literal(text) => write!(f, "{{ {} }}", text),
        _ => render(ty, f, qualified),
    }
}

pub(crate) fn is_literal(text: &str) -> bool {
    !text.contains(char::is_whitespace)
        && text
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_digit() || c == '\'' || c == '"')
}

pub(crate) fn render(ty: &TypeExpr, f: &mut Formatter<'_>, qualified: bool) -> fmt::Result {
    match ty {
        TypeExpr::Var(v) => f.write_str(v),
        TypeExpr::Con(name) => write_name(name, f, qualified),
        TypeExpr::App(..) => {
            let (head, args) = ty.spine();
            render(head, f, qualified)?;
            f.write_char('<')?;
            write_list(&args, f, qualified)?;
            f.write_char('>')
        }
        TypeExpr::Tuple(elems) => {
            f.write_char('(')?;
            write_list(&elems.iter().collect::<Vec<_>>(), f, qualified)?;
            if elems.len() == 1 {
                f.write_char(',')?;
            }
            f.write_char(')')
        }
        TypeExpr::Array(elem, len) => {
            f.write_char('[')?;
            render(elem, f, qualified)?;
            f.write_str("; ")?;
            render(len, f, qualified)?;
            f.write_char(']')
        }
        TypeExpr::Projection {
            self_ty,
            trait_name,
            trait_args,
            assoc,
        } => {
            f.write_char('<')?;
            render(self_ty, f, qualified)?;
            f.write_str(" as ")?;
            write_name(trait_name, f, qualified)?;
            if !trait_args.is_empty() {
                f.write_char('<')?;
                write_list(&trait_args.iter().collect::<Vec<_>>(), f, qualified)?;
                f.write_char('>')?;
            }
            write!(f, ">::{}", assoc)
        }
        TypeExpr::Forall { body, .. } => render(body, f, qualified),
        TypeExpr::Const { text, .. } => f.write_str(text),
    }
}

struct Rendered<'a> {
    ty: &'a TypeExpr,
    qualified: bool,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        render(self.ty, f, self.qualified)
    }
}

pub fn render_unqualified(ty: &TypeExpr) -> String {
    Rendered {
        ty,
        qualified: false,
    }
    .to_string()
}

/// Renders a family member as `<Index as Trait<..>>::Assoc`.
pub fn family_display(family: &str, indices: &[TypeExpr], qualified: bool) -> String {
    let (trait_name, assoc) = family.rsplit_once("::").unwrap_or((family, ""));
    let projection = TypeExpr::Projection {
        self_ty: Box::new(indices.first().cloned().unwrap_or(TypeExpr::Tuple(Vec::new()))),
        trait_name: TypeName::simple(trait_name),
        trait_args: indices.iter().skip(1).cloned().collect(),
        assoc: assoc.to_owned(),
    };
    Rendered {
        ty: &projection,
        qualified,
    }
    .to_string()
}

/// Name reported by the impl derived for `target`.
pub fn diagnostic_name(target: &Target) -> String {
    match target {
        Target::Named(name) => strip_name(name).to_owned(),
        Target::Type(ty) => render_unqualified(ty),
        Target::Indexed { family, indices } => family_display(family, indices, false),
    }
}
