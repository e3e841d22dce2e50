//! Versioned binary serialization with derived, migration-aware instances
//!
//! # Overview
//!
//! Every type that implements [`SafeCopy`] carries a format [`Version`] and a
//! [`Kind`] as part of its identity. Values written under one version stay
//! readable after the type changes shape, either directly or by walking a
//! chain of [`Migrate`] conversions from the version found on the wire.
//!
//! Instances are normally derived rather than written by hand:
//!
//! ```
//! use vercodec::{safe_decode, safe_encode, SafeCopy};
//!
//! #[derive(SafeCopy, Debug, PartialEq)]
//! #[safecopy(version = 1)]
//! enum Shape {
//!     Circle(u32),
//!     Rect { w: u32, h: u32 },
//! }
//!
//! let bytes = safe_encode(&Shape::Rect { w: 2, h: 3 });
//! assert_eq!(bytes, [0, 0, 0, 1, 1, 0, 0, 0, 2, 0, 0, 0, 3]);
//! assert_eq!(safe_decode::<Shape, _>(bytes).unwrap(), Shape::Rect { w: 2, h: 3 });
//! ```
//!
//! # Attributes
//!
//! `#[safecopy(version = N, kind = K, strategy = S, crate = path)]` controls
//! the derived instance:
//!
//! * `version` defaults to `0`
//! * `kind` is `base` (the default), `extension`, `primitive`, or any path to a
//!   type implementing [`Kind`]
//! * `strategy` is `normal` (the default), `simple`, or `legacy`
//!
//! Under `normal`, the version of each distinct field type is written once per
//! constructor, ahead of the fields; under `simple` and `legacy` every field
//! carries its own version. A constructor tag byte is written whenever a type
//! does not have exactly one constructor, and always under `legacy`.
//!
//! The function-like [`derive_safecopy!`] accepts whole item blocks, and can
//! also derive instances for type aliases, generic instantiations and
//! associated-type projections declared within the same block.
//!
//! # Layout
//!
//! * [`conv`] holds the unversioned [`Encode`]/[`Decode`] layer and the write-side [`Target`]
//! * [`parse`] holds the [`Parser`] model, [`ByteParser`], and the error hierarchy
//! * [`safecopy`] holds the versioned contract and the runtime used by derived code
//! * [`builder`] holds [`StrictBuilder`], the default byte sink for [`safe_encode`]

extern crate self as vercodec;

pub mod builder;
pub mod conv;
pub mod error;
mod instances;
pub mod parse;
pub mod prim;
pub mod safecopy;
pub mod util;
pub mod version;
pub mod zarith;

pub use vercodec_derive::{derive_safecopy, SafeCopy};

pub use crate::builder::{strict::StrictBuilder, Builder};
pub use crate::conv::{
    error::{DecodeError, DecodeResult},
    target::{ByteCounter, Target},
    Decode, Encode,
};
pub use crate::parse::{
    error::{MigrationError, OverrunError, ParseError, TagError},
    ByteParser, ParseResult, Parser, TryIntoParser, VecBuffer,
};
pub use crate::safecopy::{
    contain, get_safe_get, get_safe_put, get_tag, label, put_tag, safe_decode, safe_encode,
    safe_get, safe_put, unknown_tag, Base, Contained, Extension, Kind, KindSelector, Migrate,
    Primitive, Profile, SafeCopy, SafeGet, SafePut,
};
pub use crate::version::Version;
