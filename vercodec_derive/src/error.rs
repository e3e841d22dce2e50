use std::fmt::{self, Display, Formatter};

use proc_macro2::Span;

/// Failure of a derivation, reported once as a compile error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeriveError {
    /// A type fragment the engine cannot derive through
    Unsupported { fragment: String, reason: String },
    TooManyConstructors { name: String, count: usize },
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },
    /// Family index that no instance clause of the candidate set matches
    IndexMismatch { expected: String, found: String },
    Unresolved { name: String },
    Attribute(String),
}

pub type DeriveResult<T> = Result<T, DeriveError>;

impl DeriveError {
    pub fn unsupported(fragment: impl Display, reason: &str) -> Self {
        Self::Unsupported {
            fragment: fragment.to_string(),
            reason: reason.to_owned(),
        }
    }

    pub fn into_syn(self, span: Span) -> syn::Error {
        syn::Error::new(span, self)
    }
}

impl Display for DeriveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeriveError::Unsupported { fragment, reason } => {
                write!(f, "cannot derive SafeCopy through `{}`: {}", fragment, reason)
            }
            DeriveError::TooManyConstructors { name, count } => write!(
                f,
                "`{}` has {} constructors, but at most 255 can be tagged in one byte",
                name, count
            ),
            DeriveError::Arity {
                name,
                expected,
                found,
            } => write!(
                f,
                "arity error: `{}` takes {} type arguments, but {} were supplied",
                name, expected, found
            ),
            DeriveError::IndexMismatch { expected, found } => write!(
                f,
                "no instance matches the requested index\n  expected: {}\n  found:    {}",
                expected, found
            ),
            DeriveError::Unresolved { name } => {
                write!(f, "cannot resolve `{}` to a declaration in scope", name)
            }
            DeriveError::Attribute(msg) => write!(f, "invalid safecopy attribute: {}", msg),
        }
    }
}

impl std::error::Error for DeriveError {}
