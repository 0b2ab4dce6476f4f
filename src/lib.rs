//! Tag-driven field-by-field overwriting of one record by another of the same
//! type.
//!
//! Fields opt in through an annotation of the form `<bool>[,omitempty]`:
//!
//! ```
//! overwrite::record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Profile {
//!         pub name: String => "true",
//!         pub nickname: String => "true,omitempty",
//!         pub id: u64,
//!     }
//! }
//!
//! let mut dst = Profile { name: "a".into(), nickname: "b".into(), id: 1 };
//! let src = Profile { name: "x".into(), nickname: String::new(), id: 2 };
//! overwrite::overwrite(&mut dst, &src).unwrap();
//! assert_eq!(dst, Profile { name: "x".into(), nickname: "b".into(), id: 1 });
//! ```
//!
//! Nested records are always descended into; pointer, function and channel
//! fields are left alone.

pub mod engine;
pub mod errors;
pub mod options;
pub mod reflect;
pub mod tag;

pub use engine::{Arg, Overwriter};
pub use errors::{CopyError, ErrorKind, Result, TagError};
pub use options::{Options, Traversal};
pub use reflect::{Field, Kind, Record, Reflect};
pub use tag::Directive;

/// Copy eligible fields of `src` into `dst` with default options.
pub fn copy(dst: Arg<'_>, src: Arg<'_>) -> Result<()> {
    Overwriter::new().copy(dst, src)
}

/// Typed convenience over [`copy`].
pub fn overwrite<T: Record>(dst: &mut T, src: &T) -> Result<()> {
    Overwriter::new().overwrite(dst, src)
}
