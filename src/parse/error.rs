//! Error types used to report failure in low-level parsing
//!
//! This module contains a hierarchy of types representing the classes of
//! error that may arise from calls to [`Parser`](super::Parser) methods, from
//! decoders built on top of them, and from the version-and-migration logic
//! of [`SafeCopy`](crate::SafeCopy).
//!
//! # Layout
//!
//! The primary type is `ParseError`, with the alias `ParseResult<T>`; the
//! remaining types are refinements of `ParseError`, grouped by provenance.
//! Decoders may wrap any `ParseError` in a chain of labels (see
//! [`ParseError::labeled`]) naming the types whose parse was in progress.

use std::array::TryFromSliceError;
use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Display, Formatter, Result};
use std::string::FromUtf8Error;

use crate::error::LengthError;
use crate::version::Version;

/// Enumeration type over all errors that may be encountered while decoding
#[derive(Debug)]
pub enum ParseError {
    /// The input ended before the requested bytes
    Overrun(OverrunError),
    /// Error class encountered when internal invariants or preconditions are violated
    Internal(InternalError),
    /// Low-level parsing succeeded, but the raw value is not a legal value of
    /// the target type
    External(ExternalError),
    /// The bytes in the buffer are not a valid token at this position
    ///
    /// This includes unknown constructor tags, illegal boolean bytes, and
    /// self-terminating values that never terminate.
    Token(TokenError),
    /// A stored version could not be reconciled with the current one
    Migration(MigrationError),
    /// Any of the above, raised while parsing the labelled types
    ///
    /// `labels` is ordered innermost-first.
    Labeled {
        labels: Vec<&'static str>,
        inner: Box<ParseError>,
    },
}

impl ParseError {
    /// Constructs a [`ParseError`] from a generic, abstract Error value.
    ///
    /// Errors defined as part of the `ParseError` hierarchy have dedicated
    /// `From` conversions that should be preferred.
    pub fn reify<E: 'static + Error + Send + Sync>(err: E) -> Self {
        Self::External(ExternalError::GenericError(err.into()))
    }

    /// Records that this error occurred while parsing a value labelled `label`.
    ///
    /// Repeated calls accumulate, so that an error raised deep inside nested
    /// values reports every enclosing label, innermost first.
    #[must_use]
    pub fn labeled(self, label: &'static str) -> Self {
        match self {
            ParseError::Labeled { mut labels, inner } => {
                labels.push(label);
                ParseError::Labeled { labels, inner }
            }
            other => ParseError::Labeled {
                labels: vec![label],
                inner: Box::new(other),
            },
        }
    }

    /// Returns the labels attached to this error, innermost first.
    pub fn labels(&self) -> &[&'static str] {
        match self {
            ParseError::Labeled { labels, .. } => labels.as_slice(),
            _ => &[],
        }
    }

    /// Returns the underlying error with every label stripped.
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::Labeled { inner, .. } => inner.root(),
            other => other,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ParseError::Overrun(err) => Display::fmt(err, f),
            ParseError::Internal(err) => Display::fmt(err, f),
            ParseError::External(err) => Display::fmt(err, f),
            ParseError::Token(err) => Display::fmt(err, f),
            ParseError::Migration(err) => Display::fmt(err, f),
            ParseError::Labeled { labels, inner } => {
                Display::fmt(inner, f)?;
                for (ix, label) in labels.iter().enumerate() {
                    if ix == 0 {
                        write!(f, "\nFrom:\t{}", label)?;
                    } else {
                        write!(f, "\n\t{}", label)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<Infallible> for ParseError {
    fn from(_void: Infallible) -> Self {
        match _void {}
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Overrun(err) => Some(err),
            ParseError::Internal(err) => Some(err),
            ParseError::External(err) => Some(err),
            ParseError::Token(err) => Some(err),
            ParseError::Migration(err) => Some(err),
            ParseError::Labeled { inner, .. } => Some(inner.as_ref()),
        }
    }
}

/// Type alias for Result with an error type of [`ParseError`]
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// A consume operation that would run past the end of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrunError {
    pub offset: usize,
    pub requested: usize,
    pub available: usize,
}

impl From<OverrunError> for ParseError {
    fn from(err: OverrunError) -> Self {
        Self::Overrun(err)
    }
}

impl Display for OverrunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "cannot consume {} bytes at offset {}: only {} remain",
            self.requested, self.offset, self.available
        )
    }
}

impl Error for OverrunError {}

/// Errors arising from unexpected tokens in the buffer
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenError {
    InvalidBoolean(u8),
    /// Byte parsed could not be matched to any constructor of the type being decoded
    UnknownTag(TagError),
    /// Supposedly self-terminating byte-sequence failed to terminate before reaching end of buffer
    NonTerminating(Vec<u8>),
}

impl From<TokenError> for ParseError {
    fn from(tok_e: TokenError) -> Self {
        Self::Token(tok_e)
    }
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::InvalidBoolean(byte) => {
                write!(f, "invalid boolean encoding 0x{byte:02x}")
            }
            Self::UnknownTag(err) => Display::fmt(err, f),
            Self::NonTerminating(buf) => {
                write!(f, "element failed to terminate: ")?;
                crate::util::write_all_hex(buf, f)
            }
        }
    }
}

impl Error for TokenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TokenError::UnknownTag(err) => Some(err),
            TokenError::InvalidBoolean(_) | TokenError::NonTerminating(_) => None,
        }
    }
}

/// Implementation-internal errors
///
/// These signify a bug in a `Parser` implementation rather than bad input.
#[derive(Debug, Clone, Copy)]
pub enum InternalError {
    SliceCoerceFailure(TryFromSliceError),
}

impl From<TryFromSliceError> for InternalError {
    fn from(err: TryFromSliceError) -> Self {
        Self::SliceCoerceFailure(err)
    }
}

impl From<InternalError> for ParseError {
    fn from(err: InternalError) -> Self {
        Self::Internal(err)
    }
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            InternalError::SliceCoerceFailure(_err) => {
                write!(f, "failed to coerce from byte-slice to fixed-length array")
            }
        }
    }
}

impl Error for InternalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InternalError::SliceCoerceFailure(err) => Some(err),
        }
    }
}

/// Converts a borrowed byte-slice into an owned byte-array
pub(crate) fn coerce_slice<const N: usize>(bytes: &'_ [u8]) -> ParseResult<[u8; N]> {
    match <[u8; N] as TryFrom<&'_ [u8]>>::try_from(bytes) {
        Ok(array) => Ok(array),
        Err(err) => Err(ParseError::from(InternalError::from(err))),
    }
}

/// Contextually invalid results of otherwise successful parser calls
#[derive(Debug)]
pub enum ExternalError {
    /// Bytes of a string value were not valid UTF-8
    UncoercableString(FromUtf8Error),
    /// A `u32` parsed for a `char` is not a Unicode scalar value
    InvalidChar(u32),
    /// A collection length prefix cannot be represented
    LengthViolation(LengthError),
    /// Any other case that cannot be listed here due to downstream crate specifics
    GenericError(Box<dyn Send + Sync + Error>),
}

impl From<ExternalError> for ParseError {
    fn from(err: ExternalError) -> Self {
        ParseError::External(err)
    }
}

impl From<FromUtf8Error> for ParseError {
    fn from(err: FromUtf8Error) -> Self {
        ParseError::External(ExternalError::UncoercableString(err))
    }
}

impl From<LengthError> for ParseError {
    fn from(err: LengthError) -> Self {
        ParseError::External(ExternalError::LengthViolation(err))
    }
}

impl Display for ExternalError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ExternalError::UncoercableString(err) => {
                write!(
                    f,
                    "parsed byte-array could not be coerced to String: {}",
                    err
                )
            }
            ExternalError::InvalidChar(raw) => {
                write!(f, "0x{raw:08x} is not a valid unicode scalar value")
            }
            ExternalError::LengthViolation(x) => {
                write!(f, "{}", x)
            }
            ExternalError::GenericError(e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl Error for ExternalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExternalError::UncoercableString(err) => Some(err),
            ExternalError::InvalidChar(_) => None,
            ExternalError::LengthViolation(err) => Some(err),
            ExternalError::GenericError(err) => Some(err.as_ref()),
        }
    }
}

impl From<Box<dyn Error + Send + Sync>> for ExternalError {
    fn from(value: Box<dyn Error + Send + Sync>) -> Self {
        Self::GenericError(value)
    }
}

/// Error representing a constructor tag with no matching constructor
///
/// The `Display` form of this error is a stable, externally matched message:
///
/// ```text
/// Could not identify tag "<tag>" for type <type> that has only <N> constructors.  Maybe your data is corrupted?
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagError {
    actual: u8,
    for_type: &'static str,
    constructors: usize,
}

impl TagError {
    /// Constructs a `TagError` for a type named `for_type` with the given
    /// number of constructors.
    pub fn new(actual: u8, for_type: &'static str, constructors: usize) -> Self {
        Self {
            actual,
            for_type,
            constructors,
        }
    }

    /// The offending tag byte
    pub fn actual(&self) -> u8 {
        self.actual
    }

    /// The diagnostic name of the type being decoded
    pub fn for_type(&self) -> &'static str {
        self.for_type
    }
}

impl From<TagError> for ParseError {
    fn from(val: TagError) -> Self {
        TokenError::UnknownTag(val).into()
    }
}

impl Display for TagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "Could not identify tag \"{}\" for type {} that has only {} constructors.  Maybe your data is corrupted?",
            self.actual, self.for_type, self.constructors
        )
    }
}

impl Error for TagError {}

/// Errors raised while reconciling a stored version with the current one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// The stored version is not reachable through the migration chain
    UnknownVersion {
        type_name: &'static str,
        found: Version,
    },
    /// The migration chain reached a primitive type with a mismatched version
    FromPrimitive { type_name: &'static str },
    /// Two links of the migration chain share a version number
    DuplicateVersion {
        type_name: &'static str,
        versions: Vec<Version>,
    },
}

impl From<MigrationError> for ParseError {
    fn from(err: MigrationError) -> Self {
        ParseError::Migration(err)
    }
}

impl Display for MigrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            MigrationError::UnknownVersion { type_name, found } => {
                write!(
                    f,
                    "cannot find getter associated with version {} of type {}",
                    found, type_name
                )
            }
            MigrationError::FromPrimitive { type_name } => {
                write!(f, "cannot migrate from primitive type {}", type_name)
            }
            MigrationError::DuplicateVersion {
                type_name,
                versions,
            } => {
                write!(f, "duplicate version tags in migration chain of {}: ", type_name)?;
                for (ix, v) in versions.iter().enumerate() {
                    if ix > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
        }
    }
}

impl Error for MigrationError {}
