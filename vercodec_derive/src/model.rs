//! Engine-owned model of type expressions and declarations
//!
//! Everything the walker, inference and synthesis passes look at is
//! expressed in these types rather than in `syn` trees, so that the passes
//! can be exercised against hand-built catalogs. Values are plain owned data.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use proc_macro2::{Ident, Span, TokenStream};
use quote::{quote, ToTokens, TokenStreamExt};

/// Path naming a type constructor or trait, without generic arguments
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    pub segments: Vec<String>,
    pub leading_colon: bool,
}

impl TypeName {
    pub fn simple(name: &str) -> Self {
        Self {
            segments: vec![name.to_owned()],
            leading_colon: false,
        }
    }

    /// Final segment, used as the catalog key
    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.leading_colon {
            f.write_str("::")?;
        }
        f.write_str(&self.segments.join("::"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeExpr {
    /// Generic parameter, type or const
    Var(String),
    /// Bare type constructor
    Con(TypeName),
    /// Application of a constructor to one more argument
    App(Box<TypeExpr>, Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    /// `[elem; len]`, where `len` is a `Var` or a `Const`
    Array(Box<TypeExpr>, Box<TypeExpr>),
    /// `<self_ty as trait_name<trait_args..>>::assoc`
    Projection {
        self_ty: Box<TypeExpr>,
        trait_name: TypeName,
        trait_args: Vec<TypeExpr>,
        assoc: String,
    },
    /// Quantified type, introduced by the generics of a derivation directive
    Forall {
        params: Vec<Param>,
        constraints: Vec<Predicate>,
        body: Box<TypeExpr>,
    },
    /// Const expression, stored as space-separated tokens, together with
    /// the generic parameters it mentions
    Const { text: String, vars: Vec<String> },
}

/// Substitution of generic parameters, keyed by parameter name
pub type Env = BTreeMap<String, TypeExpr>;

impl TypeExpr {
    #[cfg(test)]
    pub fn con(name: &str) -> Self {
        TypeExpr::Con(TypeName::simple(name))
    }

    #[cfg(test)]
    pub fn var(name: &str) -> Self {
        TypeExpr::Var(name.to_owned())
    }

    /// Applies `head` to `args`, left to right.
    pub fn app(head: TypeExpr, args: impl IntoIterator<Item = TypeExpr>) -> Self {
        args.into_iter()
            .fold(head, |f, x| TypeExpr::App(Box::new(f), Box::new(x)))
    }

    /// Splits an application chain into its head and its arguments in order.
    pub fn spine(&self) -> (&TypeExpr, Vec<&TypeExpr>) {
        let mut pending = Vec::new();
        let mut cur = self;
        while let TypeExpr::App(f, x) = cur {
            pending.push(x.as_ref());
            cur = f.as_ref();
        }
        pending.reverse();
        (cur, pending)
    }

    /// Generic parameters occurring free in `self`, in first-occurrence order.
    pub fn free_vars(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_vars(&mut Vec::new(), &mut out);
        out
    }

    fn collect_vars(&self, bound: &mut Vec<String>, out: &mut Vec<String>) {
        match self {
            TypeExpr::Var(v) => note_var(v, bound, out),
            TypeExpr::Con(_) => {}
            TypeExpr::Const { vars, .. } => {
                for v in vars {
                    note_var(v, bound, out)
                }
            }
            TypeExpr::App(f, x) => {
                f.collect_vars(bound, out);
                x.collect_vars(bound, out);
            }
            TypeExpr::Tuple(elems) => {
                for e in elems {
                    e.collect_vars(bound, out)
                }
            }
            TypeExpr::Array(elem, len) => {
                elem.collect_vars(bound, out);
                len.collect_vars(bound, out);
            }
            TypeExpr::Projection {
                self_ty,
                trait_args,
                ..
            } => {
                self_ty.collect_vars(bound, out);
                for a in trait_args {
                    a.collect_vars(bound, out)
                }
            }
            TypeExpr::Forall {
                params,
                constraints,
                body,
            } => {
                let depth = bound.len();
                bound.extend(params.iter().map(|p| p.name.clone()));
                for c in constraints {
                    c.collect_vars(bound, out);
                }
                body.collect_vars(bound, out);
                bound.truncate(depth);
            }
        }
    }

    /// Replaces every free occurrence of a parameter bound in `env`.
    #[must_use]
    pub fn subst(&self, env: &Env) -> TypeExpr {
        if env.is_empty() {
            return self.clone();
        }
        match self {
            TypeExpr::Var(v) => env.get(v).cloned().unwrap_or_else(|| self.clone()),
            TypeExpr::Con(_) => self.clone(),
            TypeExpr::Const { text, vars } => subst_const(text, vars, env),
            TypeExpr::App(f, x) => TypeExpr::App(Box::new(f.subst(env)), Box::new(x.subst(env))),
            TypeExpr::Tuple(elems) => TypeExpr::Tuple(elems.iter().map(|e| e.subst(env)).collect()),
            TypeExpr::Array(elem, len) => {
                TypeExpr::Array(Box::new(elem.subst(env)), Box::new(len.subst(env)))
            }
            TypeExpr::Projection {
                self_ty,
                trait_name,
                trait_args,
                assoc,
            } => TypeExpr::Projection {
                self_ty: Box::new(self_ty.subst(env)),
                trait_name: trait_name.clone(),
                trait_args: trait_args.iter().map(|a| a.subst(env)).collect(),
                assoc: assoc.clone(),
            },
            TypeExpr::Forall {
                params,
                constraints,
                body,
            } => {
                let mut inner = env.clone();
                for p in params {
                    inner.remove(&p.name);
                }
                TypeExpr::Forall {
                    params: params.clone(),
                    constraints: constraints.iter().map(|c| c.subst(&inner)).collect(),
                    body: Box::new(body.subst(&inner)),
                }
            }
        }
    }

    /// Returns `true` if a constructor whose final segment is `name` occurs
    /// anywhere in `self`.
    pub fn mentions_con(&self, name: &str) -> bool {
        self.any_con(&|n: &str| n == name)
    }

    /// Whether the final path segment of any constructor in `self`
    /// satisfies `pred`.
    pub fn any_con<F: Fn(&str) -> bool>(&self, pred: &F) -> bool {
        match self {
            TypeExpr::Con(n) => pred(n.last()),
            TypeExpr::Var(_) | TypeExpr::Const { .. } => false,
            TypeExpr::App(f, x) => f.any_con(pred) || x.any_con(pred),
            TypeExpr::Tuple(elems) => elems.iter().any(|e| e.any_con(pred)),
            TypeExpr::Array(elem, _) => elem.any_con(pred),
            TypeExpr::Projection {
                self_ty,
                trait_args,
                ..
            } => self_ty.any_con(pred) || trait_args.iter().any(|a| a.any_con(pred)),
            TypeExpr::Forall { body, .. } => body.any_con(pred),
        }
    }

    /// Outermost constructor of `self`, as used to pick family-instance
    /// candidates. `None` for a bare parameter, which matches anything.
    pub fn root_con(&self) -> Option<String> {
        match self.spine().0 {
            TypeExpr::Con(n) => Some(n.last().to_owned()),
            TypeExpr::Tuple(elems) => Some(format!("({})", elems.len())),
            TypeExpr::Array(..) => Some("[]".to_owned()),
            TypeExpr::Projection { assoc, .. } => Some(format!("::{}", assoc)),
            TypeExpr::Forall { body, .. } => body.root_con(),
            TypeExpr::Var(_) => None,
            TypeExpr::Const { text, .. } => Some(text.clone()),
            TypeExpr::App(..) => None,
        }
    }
}

fn note_var(v: &String, bound: &[String], out: &mut Vec<String>) {
    if !bound.contains(v) && !out.contains(v) {
        out.push(v.clone());
    }
}

fn subst_const(text: &str, vars: &[String], env: &Env) -> TypeExpr {
    if vars.len() == 1 && text == vars[0] {
        if let Some(bound) = env.get(&vars[0]) {
            return bound.clone();
        }
    }
    let mut out_vars = Vec::new();
    let rendered: Vec<String> = text
        .split_whitespace()
        .map(|tok| match env.get(tok) {
            Some(TypeExpr::Var(v)) => {
                if !out_vars.contains(v) {
                    out_vars.push(v.clone());
                }
                v.clone()
            }
            Some(TypeExpr::Const { text, vars }) => {
                for v in vars {
                    if !out_vars.contains(v) {
                        out_vars.push(v.clone());
                    }
                }
                format!("( {} )", text)
            }
            Some(other) => other.to_string(),
            None => {
                if vars.iter().any(|v| v == tok) && !out_vars.iter().any(|v| v == tok) {
                    out_vars.push(tok.to_owned());
                }
                tok.to_owned()
            }
        })
        .collect();
    TypeExpr::Const {
        text: rendered.join(" "),
        vars: out_vars,
    }
}

/// Qualified canonical rendering, used in error messages
impl Display for TypeExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        crate::naming::render(self, f, true)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamKind {
    Type,
    Const { ty: TypeExpr },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
}

impl Param {
    pub fn ty(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: ParamKind::Type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bound {
    Trait {
        /// `?Trait`
        maybe: bool,
        path: TypeName,
        args: Vec<TypeExpr>,
    },
    /// Lifetime bound such as `'static`, stored with its apostrophe
    Lifetime(String),
}

/// `bounded: bound + bound + ..`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Predicate {
    pub bounded: TypeExpr,
    pub bounds: Vec<Bound>,
}

impl Predicate {
    #[must_use]
    pub fn subst(&self, env: &Env) -> Predicate {
        Predicate {
            bounded: self.bounded.subst(env),
            bounds: self
                .bounds
                .iter()
                .map(|b| match b {
                    Bound::Trait { maybe, path, args } => Bound::Trait {
                        maybe: *maybe,
                        path: path.clone(),
                        args: args.iter().map(|a| a.subst(env)).collect(),
                    },
                    Bound::Lifetime(l) => Bound::Lifetime(l.clone()),
                })
                .collect(),
        }
    }

    fn collect_vars(&self, bound: &mut Vec<String>, out: &mut Vec<String>) {
        self.bounded.collect_vars(bound, out);
        for b in &self.bounds {
            if let Bound::Trait { args, .. } = b {
                for a in args {
                    a.collect_vars(bound, out);
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Struct,
    Enum,
    Tuple,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldStyle {
    Unit,
    Unnamed,
    Named,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Constructor {
    pub name: String,
    pub style: FieldStyle,
    pub fields: Vec<Field>,
}

/// One `impl Trait<..> for X { type Assoc = Body; }` clause
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FamilyInstance {
    pub generics: Vec<Param>,
    pub predicates: Vec<Predicate>,
    /// Implementing type followed by the trait's generic arguments
    pub head: Vec<TypeExpr>,
    pub body: TypeExpr,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclBody {
    Data {
        shape: Shape,
        constructors: Vec<Constructor>,
    },
    Synonym(TypeExpr),
    Family {
        instances: Vec<FamilyInstance>,
    },
    /// Declaration that exists but cannot be derived for, with the reason
    Unsupported(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Declaration {
    pub name: String,
    pub params: Vec<Param>,
    pub predicates: Vec<Predicate>,
    pub body: DeclBody,
}

#[cfg(test)]
impl Declaration {
    /// Data declaration with no generic parameters
    pub fn data(name: &str, shape: Shape, constructors: Vec<Constructor>) -> Self {
        Self {
            name: name.to_owned(),
            params: Vec::new(),
            predicates: Vec::new(),
            body: DeclBody::Data {
                shape,
                constructors,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    Normal,
    Simple,
    LegacyCompat,
}

/// Builds an identifier from its source spelling, honouring `r#`.
pub fn ident(name: &str) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(name, Span::call_site()),
    }
}

impl ToTokens for TypeName {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 || self.leading_colon {
                tokens.extend(quote!(::));
            }
            tokens.append(ident(seg));
        }
    }
}

fn const_tokens(text: &str, braced: bool) -> TokenStream {
    let inner: TokenStream = match text.parse() {
        Ok(ts) => ts,
        Err(_) => {
            let msg = format!("unparseable const expression `{}`", text);
            return quote!(compile_error!(#msg));
        }
    };
    if braced && !crate::naming::is_literal(text) {
        quote!({ #inner })
    } else {
        inner
    }
}

struct Arg<'a>(&'a TypeExpr);

impl ToTokens for Arg<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match self.0 {
            TypeExpr::Const { text, .. } => tokens.extend(const_tokens(text, true)),
            other => other.to_tokens(tokens),
        }
    }
}

impl ToTokens for TypeExpr {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match self {
            TypeExpr::Var(v) => tokens.append(ident(v)),
            TypeExpr::Con(name) => name.to_tokens(tokens),
            TypeExpr::App(..) => {
                let (head, args) = self.spine();
                let args = args.into_iter().map(Arg);
                tokens.extend(quote!(#head < #(#args),* >));
            }
            TypeExpr::Tuple(elems) => {
                if elems.len() == 1 {
                    let elem = &elems[0];
                    tokens.extend(quote!((#elem,)));
                } else {
                    tokens.extend(quote!((#(#elems),*)));
                }
            }
            TypeExpr::Array(elem, len) => {
                let len = Arg(len);
                tokens.extend(quote!([#elem; #len]));
            }
            TypeExpr::Projection {
                self_ty,
                trait_name,
                trait_args,
                assoc,
            } => {
                let assoc = ident(assoc);
                if trait_args.is_empty() {
                    tokens.extend(quote!(<#self_ty as #trait_name>::#assoc));
                } else {
                    let args = trait_args.iter().map(Arg);
                    tokens.extend(quote!(<#self_ty as #trait_name<#(#args),*>>::#assoc));
                }
            }
            TypeExpr::Forall { body, .. } => body.to_tokens(tokens),
            TypeExpr::Const { text, .. } => tokens.extend(const_tokens(text, false)),
        }
    }
}

impl ToTokens for Bound {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match self {
            Bound::Trait { maybe, path, args } => {
                if *maybe {
                    tokens.extend(quote!(?));
                }
                path.to_tokens(tokens);
                if !args.is_empty() {
                    let args = args.iter().map(Arg);
                    tokens.extend(quote!(<#(#args),*>));
                }
            }
            Bound::Lifetime(lt) => {
                let lt = syn::Lifetime::new(lt, Span::call_site());
                lt.to_tokens(tokens);
            }
        }
    }
}

impl ToTokens for Predicate {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let bounded = &self.bounded;
        let bounds = &self.bounds;
        tokens.extend(quote!(#bounded: #(#bounds)+*));
    }
}

impl ToTokens for Param {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let name = ident(&self.name);
        match &self.kind {
            ParamKind::Type => tokens.append(name),
            ParamKind::Const { ty } => tokens.extend(quote!(const #name: #ty)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn spine_and_app_agree() {
        let t = TypeExpr::app(TypeExpr::con("Pair"), [TypeExpr::var("A"), TypeExpr::con("u8")]);
        let (head, args) = t.spine();
        assert_eq!(head, &TypeExpr::con("Pair"));
        assert_eq!(args, vec![&TypeExpr::var("A"), &TypeExpr::con("u8")]);
    }

    #[test]
    fn forall_binds_its_params() {
        let t = TypeExpr::Forall {
            params: vec![Param::ty("A")],
            constraints: vec![],
            body: Box::new(TypeExpr::Tuple(vec![TypeExpr::var("A"), TypeExpr::var("B")])),
        };
        assert_eq!(t.free_vars(), vec!["B".to_owned()]);
        let mut env = Env::new();
        env.insert("A".into(), TypeExpr::con("u8"));
        assert_eq!(t.subst(&env), t);
    }

    #[test]
    fn const_substitution() {
        let len = TypeExpr::Const {
            text: "N + 1".into(),
            vars: vec!["N".into()],
        };
        let mut env = Env::new();
        env.insert("N".into(), TypeExpr::var("M"));
        assert_eq!(
            len.subst(&env),
            TypeExpr::Const {
                text: "M + 1".into(),
                vars: vec!["M".into()],
            }
        );
    }

    #[test]
    fn tokens_for_generic_args() {
        let t = TypeExpr::app(
            TypeExpr::con("Buf"),
            [
                TypeExpr::var("r#T"),
                TypeExpr::Const {
                    text: "N + 1".into(),
                    vars: vec!["N".into()],
                },
            ],
        );
        let parsed: syn::Type = syn::parse2(t.to_token_stream()).unwrap();
        assert_eq!(parsed, syn::parse_quote!(Buf<r#T, { N + 1 }>));
        let one = TypeExpr::Tuple(vec![TypeExpr::con("u8")]);
        let parsed: syn::Type = syn::parse2(one.to_token_stream()).unwrap();
        assert_eq!(parsed, syn::parse_quote!((u8,)));
    }
}
