//! Runtime type descriptors for records and their field values.
//!
//! A record type exposes a static table of its fields (name and annotation)
//! together with accessors, and every field value reports its [`Kind`]. The
//! copy engine walks these generically. [`record!`](crate::record) builds all
//! of it from a struct definition.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender, SyncSender};
use std::sync::Arc;

/// Value kinds as the engine sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    /// `Vec<T>` and `[T; N]`.
    Seq,
    /// `HashMap` and `BTreeMap`.
    Map,
    Record,
    Pointer,
    Func,
    Chan,
    Complex,
}

impl Kind {
    /// Kinds whose values can be overwritten as a whole.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            Kind::Bool | Kind::Int | Kind::Uint | Kind::Float | Kind::String | Kind::Seq | Kind::Map
        )
    }
}

/// Dynamic view of a single value.
pub trait Reflect: Any {
    fn kind(&self) -> Kind;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any;

    /// True when the value equals the zero value of its type.
    fn is_zero(&self) -> bool;

    /// Replace `self` with a copy of `src`. Returns false when `src` is a
    /// different type or the kind does not support assignment.
    fn assign(&mut self, src: &dyn Reflect) -> bool;

    fn as_record(&self) -> Option<&dyn Record> {
        None
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        None
    }
}

/// A field entry in a record's descriptor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    /// Raw `overwrite` annotation; `None` when the field has none.
    pub annotation: Option<&'static str>,
}

impl Field {
    pub const fn new(name: &'static str, annotation: Option<&'static str>) -> Self {
        Self { name, annotation }
    }
}

/// An aggregate with named fields, visited in declaration order.
///
/// `field` and `field_mut` are indexed like `fields()`. A field whose
/// `field_mut` returns `None` is read-only: the engine reports it as not
/// settable when its annotation asks for an overwrite.
pub trait Record: Reflect {
    fn fields(&self) -> &'static [Field];
    fn field(&self, index: usize) -> Option<&dyn Reflect>;
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Clone `src` into `dst` if it has the same concrete type.
pub fn assign_clone<T: Reflect + Clone>(dst: &mut T, src: &dyn Reflect) -> bool {
    match src.as_any().downcast_ref::<T>() {
        Some(value) => {
            dst.clone_from(value);
            true
        }
        None => false,
    }
}

macro_rules! impl_leaf {
    ($kind:expr, |$v:ident| $zero:expr; $($ty:ty),+ $(,)?) => {$(
        impl Reflect for $ty {
            fn kind(&self) -> Kind {
                $kind
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn is_zero(&self) -> bool {
                let $v = self;
                $zero
            }
            fn assign(&mut self, src: &dyn Reflect) -> bool {
                assign_clone(self, src)
            }
        }
    )+};
}

impl_leaf!(Kind::Bool, |v| !*v; bool);
impl_leaf!(Kind::Int, |v| *v == 0; i8, i16, i32, i64, i128, isize);
impl_leaf!(Kind::Uint, |v| *v == 0; u8, u16, u32, u64, u128, usize);
// -0.0 has a sign bit set and is not the zero value.
impl_leaf!(Kind::Float, |v| v.to_bits() == 0; f32, f64);
impl_leaf!(Kind::String, |v| v.is_empty(); String);

impl<T: Clone + 'static> Reflect for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::Seq
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
    fn assign(&mut self, src: &dyn Reflect) -> bool {
        assign_clone(self, src)
    }
}

impl<T: Reflect + Clone, const N: usize> Reflect for [T; N] {
    fn kind(&self) -> Kind {
        Kind::Seq
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn is_zero(&self) -> bool {
        self.iter().all(|v| v.is_zero())
    }
    fn assign(&mut self, src: &dyn Reflect) -> bool {
        assign_clone(self, src)
    }
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: Clone + 'static,
{
    fn kind(&self) -> Kind {
        Kind::Map
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
    fn assign(&mut self, src: &dyn Reflect) -> bool {
        assign_clone(self, src)
    }
}

impl<K: Clone + 'static, V: Clone + 'static> Reflect for BTreeMap<K, V> {
    fn kind(&self) -> Kind {
        Kind::Map
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
    fn assign(&mut self, src: &dyn Reflect) -> bool {
        assign_clone(self, src)
    }
}

// Kinds below are never copied; they only need to identify themselves.
macro_rules! impl_inert {
    ($kind:expr, |$v:ident| $zero:expr; $([$($gen:tt)*] $ty:ty),+ $(,)?) => {$(
        impl<$($gen)*> Reflect for $ty {
            fn kind(&self) -> Kind {
                $kind
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn is_zero(&self) -> bool {
                let $v = self;
                $zero
            }
            fn assign(&mut self, _src: &dyn Reflect) -> bool {
                false
            }
        }
    )+};
}

impl_inert!(Kind::Pointer, |_v| false;
    [T: ?Sized + 'static] Box<T>,
    [T: ?Sized + 'static] Rc<T>,
    [T: ?Sized + 'static] Arc<T>,
);
impl_inert!(Kind::Pointer, |v| v.is_none();
    [T: ?Sized + 'static] Option<Box<T>>,
    [T: ?Sized + 'static] Option<Rc<T>>,
    [T: ?Sized + 'static] Option<Arc<T>>,
);
impl_inert!(Kind::Func, |_v| false;
    [R: 'static] fn() -> R,
    [A: 'static, R: 'static] fn(A) -> R,
    [A: 'static, B: 'static, R: 'static] fn(A, B) -> R,
    [A: 'static, B: 'static, C: 'static, R: 'static] fn(A, B, C) -> R,
);
impl_inert!(Kind::Chan, |_v| false;
    [T: 'static] Sender<T>,
    [T: 'static] SyncSender<T>,
    [T: 'static] Receiver<T>,
);

/// Declare a struct whose fields carry `overwrite` annotations.
///
/// An annotation follows the field type after `=>`; fields without one are
/// never overwritten. Every field type must implement [`Reflect`].
///
/// ```
/// overwrite::record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Settings {
///         pub name: String => "true",
///         pub retries: u32 => "true,omitempty",
///         pub local_only: bool,
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(=> $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Reflect for $name {
            fn kind(&self) -> $crate::Kind {
                $crate::Kind::Record
            }
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
            fn is_zero(&self) -> bool {
                true $(&& $crate::Reflect::is_zero(&self.$field))*
            }
            // Records are merged field by field, never assigned whole.
            fn assign(&mut self, _src: &dyn $crate::Reflect) -> bool {
                false
            }
            fn as_record(&self) -> ::std::option::Option<&dyn $crate::Record> {
                ::std::option::Option::Some(self)
            }
            fn as_record_mut(&mut self) -> ::std::option::Option<&mut dyn $crate::Record> {
                ::std::option::Option::Some(self)
            }
        }

        impl $crate::Record for $name {
            fn fields(&self) -> &'static [$crate::Field] {
                const FIELDS: &[$crate::Field] = &[
                    $($crate::Field::new(
                        ::std::stringify!($field),
                        $crate::__annotation!($($tag)?),
                    )),*
                ];
                FIELDS
            }
            // Resolve the index through the table, then pick the field by name.
            #[allow(clippy::match_single_binding)]
            fn field(&self, index: usize) -> ::std::option::Option<&dyn $crate::Reflect> {
                match $crate::Record::fields(self).get(index)?.name {
                    $(::std::stringify!($field) => ::std::option::Option::Some(&self.$field),)*
                    _ => ::std::option::Option::None,
                }
            }
            #[allow(clippy::match_single_binding)]
            fn field_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn $crate::Reflect> {
                match $crate::Record::fields(self).get(index)?.name {
                    $(::std::stringify!($field) => ::std::option::Option::Some(&mut self.$field),)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __annotation {
    () => {
        ::std::option::Option::None
    };
    ($tag:literal) => {
        ::std::option::Option::Some($tag)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    crate::record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct Probe {
            n: i32 => "true",
            s: String => "true,omitempty",
            plain: bool,
        }
    }

    crate::record! {
        struct Empty {}
    }

    #[test]
    fn descriptor_table_follows_declaration() {
        let p = Probe::default();
        assert_eq!(
            p.fields(),
            &[
                Field::new("n", Some("true")),
                Field::new("s", Some("true,omitempty")),
                Field::new("plain", None),
            ]
        );
        assert_eq!(p.field(0).map(|f| f.kind()), Some(Kind::Int));
        assert_eq!(p.field(1).map(|f| f.kind()), Some(Kind::String));
        assert_eq!(p.field(2).map(|f| f.kind()), Some(Kind::Bool));
        assert!(p.field(3).is_none());
    }

    #[test]
    fn field_mut_writes_through() {
        let mut p = Probe::default();
        let src = 7i32;
        assert!(p.field_mut(0).unwrap().assign(&src));
        assert_eq!(p.n, 7);
        assert!(!p.field_mut(0).unwrap().assign(&7i64));
    }

    crate::record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct Quad {
            a: u8 => "true",
            b: u8 => "true",
            c: u8 => "true",
            d: u8 => "true",
        }
    }

    #[test]
    fn index_picks_the_declared_field() {
        let mut q = Quad { a: 1, b: 2, c: 3, d: 4 };
        for (index, expected) in [1u8, 2, 3, 4].iter().enumerate() {
            let got = q.field(index).unwrap().as_any().downcast_ref::<u8>();
            assert_eq!(got, Some(expected));
        }
        assert!(q.field(4).is_none());
        assert!(q.field_mut(4).is_none());

        assert!(q.field_mut(2).unwrap().assign(&30u8));
        assert_eq!(q, Quad { a: 1, b: 2, c: 30, d: 4 });
    }

    #[test]
    fn empty_record() {
        let e = Empty {};
        assert!(e.fields().is_empty());
        assert!(e.field(0).is_none());
        let mut e = e;
        assert!(e.field_mut(0).is_none());
        assert!(e.is_zero());
    }

    #[test]
    fn zero_values() {
        assert!(0u8.is_zero());
        assert!(!1i64.is_zero());
        assert!(0.0f64.is_zero());
        assert!(!(-0.0f32).is_zero());
        assert!(String::new().is_zero());
        assert!(Vec::<i32>::new().is_zero());
        assert!([0u8, 0].is_zero());
        assert!(![0u8, 1].is_zero());
        assert!(HashMap::<String, String>::new().is_zero());
        assert!(None::<Box<i32>>.is_zero());
        assert!(!Probe { n: 1, ..Probe::default() }.is_zero());
        assert!(Probe::default().is_zero());
    }

    #[test]
    fn inert_kinds() {
        fn f(x: i32) -> i32 {
            x
        }
        let func: fn(i32) -> i32 = f;
        let (tx, rx) = std::sync::mpsc::channel::<u8>();
        assert_eq!(func.kind(), Kind::Func);
        assert_eq!(tx.kind(), Kind::Chan);
        assert_eq!(rx.kind(), Kind::Chan);
        assert_eq!(Box::new(1).kind(), Kind::Pointer);
        assert_eq!(Some(Rc::new(1)).kind(), Kind::Pointer);
        assert!(!Kind::Pointer.is_leaf());
        assert!(!Kind::Record.is_leaf());
        assert!(Kind::Map.is_leaf());
    }
}
