use itertools::Itertools;
use tracing::{debug, trace};

use crate::errors::{CopyError, Result};
use crate::options::{Options, Traversal};
use crate::reflect::{Field, Record, Reflect};
use crate::tag;

/// A loosely typed argument to [`Overwriter::copy`].
///
/// The destination must be `Mut`, the source must be a record passed as
/// `Value`.
pub enum Arg<'a> {
    Nil,
    Mut(&'a mut dyn Reflect),
    Value(&'a dyn Reflect),
}

impl<'a, T: Reflect> From<&'a mut T> for Arg<'a> {
    fn from(value: &'a mut T) -> Self {
        Arg::Mut(value)
    }
}

impl<'a, T: Reflect> From<&'a T> for Arg<'a> {
    fn from(value: &'a T) -> Self {
        Arg::Value(value)
    }
}

enum Flow {
    Next,
    Stop,
}

/// Copies annotated fields from a source record into a destination record.
///
/// The destination is written in place, field by field. When an error is
/// returned, fields visited before the failure have already been overwritten;
/// use [`Overwriter::overwrite_atomic`] when that matters.
#[derive(Debug, Clone, Default)]
pub struct Overwriter {
    opts: Options,
}

impl Overwriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, opts: Options) -> Self {
        self.opts = opts;
        self
    }

    /// Copy every eligible field of `src` into `dst`.
    ///
    /// Inputs are validated before anything is written: `dst` must be a
    /// mutable reference and `src` a record value of the same type.
    pub fn copy(&self, dst: Arg<'_>, src: Arg<'_>) -> Result<()> {
        let (dst, src) = check_input(dst, src)?;
        debug!(record = src.type_name(), "overwrite start");
        let mut path = Vec::new();
        self.copy_record(dst, src, &mut path, 0)?;
        debug!(record = src.type_name(), "overwrite done");
        Ok(())
    }

    /// Typed entry point; the input checks are settled by the compiler.
    pub fn overwrite<T: Record>(&self, dst: &mut T, src: &T) -> Result<()> {
        self.copy(Arg::Mut(dst), Arg::Value(src))
    }

    /// Like [`Overwriter::overwrite`], but `dst` is only replaced when the
    /// whole copy succeeds.
    pub fn overwrite_atomic<T: Record + Clone>(&self, dst: &mut T, src: &T) -> Result<()> {
        let mut scratch = dst.clone();
        self.overwrite(&mut scratch, src)?;
        *dst = scratch;
        Ok(())
    }

    fn copy_record(
        &self,
        dst: &mut dyn Record,
        src: &dyn Record,
        path: &mut Vec<&'static str>,
        depth: usize,
    ) -> Result<()> {
        for (index, field) in src.fields().iter().enumerate() {
            path.push(field.name);
            let flow = self.copy_field(dst, src, index, field, path, depth);
            path.pop();
            if let Flow::Stop = flow? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn copy_field(
        &self,
        dst: &mut dyn Record,
        src: &dyn Record,
        index: usize,
        field: &Field,
        path: &mut Vec<&'static str>,
        depth: usize,
    ) -> Result<Flow> {
        let Some(value) = src.field(index) else {
            trace!(field = %dotted(path), "no accessor, skipped");
            return Ok(Flow::Next);
        };

        // Nested records are always descended into, whatever their tag says.
        if let Some(nested) = value.as_record() {
            if let Some(limit) = self.opts.max_depth {
                if depth >= limit {
                    return Err(CopyError::DepthExceeded {
                        field: dotted(path),
                        limit,
                    });
                }
            }
            let slot = dst.field_mut(index).ok_or_else(|| not_settable(path))?;
            let slot_type = slot.type_name();
            let target = slot.as_record_mut().ok_or(CopyError::TypeMismatch {
                dst: slot_type,
                src: nested.type_name(),
            })?;
            trace!(field = %dotted(path), "descending");
            // An error below aborts this level too.
            self.copy_record(target, nested, path, depth + 1)?;
            return Ok(match self.opts.traversal {
                Traversal::AllSiblings => Flow::Next,
                Traversal::StopAfterFirstRecord => Flow::Stop,
            });
        }

        // Pointers, functions, channels and complex numbers are left alone.
        if !value.kind().is_leaf() {
            trace!(field = %dotted(path), kind = ?value.kind(), "unsupported kind, skipped");
            return Ok(Flow::Next);
        }

        // Read the tag.
        let directive = tag::parse(field.annotation.unwrap_or_default()).map_err(|source| {
            CopyError::Tag {
                field: dotted(path),
                source,
            }
        })?;
        if !directive.eligible {
            trace!(field = %dotted(path), "not eligible, skipped");
            return Ok(Flow::Next);
        }

        // Settable is checked before emptiness, so a read-only field fails
        // even when there is nothing to copy.
        let slot = dst.field_mut(index).ok_or_else(|| not_settable(path))?;

        if directive.skip_if_empty && value.is_zero() {
            trace!(field = %dotted(path), "empty source, skipped");
            return Ok(Flow::Next);
        }

        // Replace the destination value whole.
        if !slot.assign(value) {
            return Err(CopyError::TypeMismatch {
                dst: slot.type_name(),
                src: value.type_name(),
            });
        }
        trace!(field = %dotted(path), "copied");
        Ok(Flow::Next)
    }
}

fn check_input<'d, 's>(
    dst: Arg<'d>,
    src: Arg<'s>,
) -> Result<(&'d mut dyn Record, &'s dyn Record)> {
    // Nil checks come first, destination before source.
    if let Arg::Nil = dst {
        return Err(CopyError::DstNil);
    }
    if let Arg::Nil = src {
        return Err(CopyError::SrcNil);
    }
    // Shape: a mutable destination and a record value as source.
    let Arg::Mut(dst) = dst else {
        return Err(CopyError::DstNotPointer);
    };
    let src = match src {
        Arg::Value(value) => value.as_record().ok_or(CopyError::SrcNotStruct)?,
        _ => return Err(CopyError::SrcNotStruct),
    };

    // Same concrete type on both sides.
    let mismatch = CopyError::TypeMismatch {
        dst: dst.type_name(),
        src: src.type_name(),
    };
    if dst.as_any().type_id() != src.as_any().type_id() {
        return Err(mismatch);
    }
    let dst = dst.as_record_mut().ok_or(mismatch)?;
    Ok((dst, src))
}

fn dotted(path: &[&str]) -> String {
    path.iter().join(".")
}

fn not_settable(path: &[&str]) -> CopyError {
    CopyError::FieldNotSettable {
        field: dotted(path),
    }
}
