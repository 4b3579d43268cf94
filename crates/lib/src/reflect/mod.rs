//! Uniform value handles over caller-supplied data.
//!
//! Change events are applied onto arbitrary Rust values: nested structs,
//! maps, vectors, optional slots, scalars and dynamically typed documents.
//! The [`Reflect`] trait gives every such value a single object-safe handle
//! whose [`ReflectRef`]/[`ReflectMut`] views expose exactly one container
//! contract ([`Struct`], [`Map`], [`Slice`], [`Pointer`]) or a scalar slot.
//!
//! Implementations are provided for the primitives, `String`, `Option`,
//! `Box`, `Vec`, `BTreeMap`, `HashMap` and the dynamic [`Value`]. Caller
//! structs implement it with [`reflect_struct!`](crate::reflect_struct).

use std::any::{Any, TypeId};

use crate::sync::{Override, UpdateBounds};

pub mod coerce;
mod errors;
mod impls;
mod macros;
mod value;

pub use coerce::{Scalar, ScalarKind, ScalarSlot, ScalarType};
pub use errors::ReflectError;
pub use value::Value;

/// Shape of a value handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// An optional or boxed slot wrapping another value.
    Pointer,
    /// A dynamically typed slot whose shape is decided at runtime.
    Interface,
    Struct,
    Map,
    Slice,
    Scalar,
    /// A kind that change events cannot address.
    Unsupported,
}

/// Read-only view of a value.
pub enum ReflectRef<'a> {
    Struct(&'a dyn Struct),
    Map(&'a dyn Map),
    Slice(&'a dyn Slice),
    Pointer(&'a dyn Pointer),
    Dynamic(&'a Value),
    Scalar(&'a dyn ScalarSlot),
    Unsupported,
}

impl ReflectRef<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            ReflectRef::Struct(_) => Kind::Struct,
            ReflectRef::Map(_) => Kind::Map,
            ReflectRef::Slice(_) => Kind::Slice,
            ReflectRef::Pointer(_) => Kind::Pointer,
            ReflectRef::Dynamic(_) => Kind::Interface,
            ReflectRef::Scalar(_) => Kind::Scalar,
            ReflectRef::Unsupported => Kind::Unsupported,
        }
    }
}

/// Mutable view of a value.
pub enum ReflectMut<'a> {
    Struct(&'a mut dyn Struct),
    Map(&'a mut dyn Map),
    Slice(&'a mut dyn Slice),
    Pointer(&'a mut dyn Pointer),
    Dynamic(&'a mut Value),
    Scalar(&'a mut dyn ScalarSlot),
    Unsupported,
}

/// An addressable value.
///
/// The boilerplate methods are generated by [`reflect_struct!`](crate::reflect_struct)
/// for caller structs. The two capability probes default to `None`; a type
/// overrides them to take over the events addressed to it.
pub trait Reflect: Any {
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn reflect_ref(&self) -> ReflectRef<'_>;

    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// A fresh zero value of the same type.
    fn zeroed(&self) -> Box<dyn Reflect>;

    /// Resets the value to its zero value in place.
    fn reset(&mut self);

    /// Replaces the value with `value` when both have the same type.
    fn set_boxed(&mut self, value: Box<dyn Reflect>) -> Result<(), ReflectError>;

    fn kind(&self) -> Kind {
        self.reflect_ref().kind()
    }

    /// Segment- or path-based override of generic event application.
    fn overrides(&mut self) -> Option<Override<'_>> {
        None
    }

    /// Batch boundary notifications.
    fn update_bounds(&mut self) -> Option<&mut dyn UpdateBounds> {
        None
    }
}

impl dyn Reflect {
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

/// Static description of one struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    /// Alternative name used by tag lookup.
    pub alias: Option<&'static str>,
    pub settable: bool,
}

/// A value with a fixed set of named fields.
pub trait Struct {
    fn fields(&self) -> &'static [FieldInfo];

    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// A keyed container. Keys cross this interface as literals and are coerced
/// to the map's key kind.
pub trait Map {
    fn key_kind(&self) -> ScalarKind;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rendered keys in iteration order.
    fn keys(&self) -> Vec<String>;

    fn get(&self, key: &str) -> Result<Option<&dyn Reflect>, ReflectError>;

    fn get_mut(&mut self, key: &str) -> Result<Option<&mut dyn Reflect>, ReflectError>;

    /// Returns the entry at `key`, inserting a zero value first if absent.
    fn get_or_insert(&mut self, key: &str) -> Result<&mut dyn Reflect, ReflectError>;

    fn insert_boxed(&mut self, key: &str, value: Box<dyn Reflect>) -> Result<(), ReflectError>;

    /// Removes `key`, returning whether it was present.
    fn remove(&mut self, key: &str) -> Result<bool, ReflectError>;

    /// A zero value of the map's value type.
    fn new_value(&self) -> Box<dyn Reflect>;
}

/// An ordered, growable sequence.
pub trait Slice {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    fn push_boxed(&mut self, value: Box<dyn Reflect>) -> Result<(), ReflectError>;

    /// Removes the element at `index`, shifting the rest down.
    fn remove(&mut self, index: usize) -> Result<(), ReflectError>;

    /// A zero value of the element type.
    fn new_element(&self) -> Box<dyn Reflect>;
}

/// An owned slot that may be unallocated.
pub trait Pointer {
    fn is_null(&self) -> bool;

    fn pointee(&self) -> Option<&dyn Reflect>;

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect>;

    /// Returns the pointee, allocating a zero value first if needed.
    fn alloc(&mut self) -> &mut dyn Reflect;

    fn pointee_type_id(&self) -> TypeId;
}

/// Follows pointer layers without allocating. `None` when a layer is empty.
pub fn deref_ref(mut value: &dyn Reflect) -> Option<&dyn Reflect> {
    loop {
        match value.reflect_ref() {
            ReflectRef::Pointer(ptr) => value = ptr.pointee()?,
            _ => return Some(value),
        }
    }
}

/// Follows pointer layers mutably.
///
/// With `allocate`, every unallocated layer is filled with a zero value;
/// otherwise an unallocated layer is a [`ReflectError::NilPointer`].
pub fn deref_mut(mut value: &mut dyn Reflect, allocate: bool) -> Result<&mut dyn Reflect, ReflectError> {
    loop {
        if value.kind() != Kind::Pointer {
            return Ok(value);
        }
        let type_name = value.type_name();
        let ReflectMut::Pointer(ptr) = value.reflect_mut() else {
            return Err(ReflectError::NotAContainer { type_name });
        };
        value = if allocate {
            ptr.alloc()
        } else {
            ptr.pointee_mut()
                .ok_or(ReflectError::NilPointer { type_name })?
        };
    }
}

/// Dereferences `value` and exposes dynamic maps and sequences through the
/// generic container views.
pub(crate) fn resolve_ref(value: &dyn Reflect) -> Option<ReflectRef<'_>> {
    let value = deref_ref(value)?;
    Some(match value.reflect_ref() {
        ReflectRef::Dynamic(Value::Map(map)) => ReflectRef::Map(map),
        ReflectRef::Dynamic(Value::Seq(seq)) => ReflectRef::Slice(seq),
        other => other,
    })
}

/// Mutable counterpart of [`resolve_ref`].
pub(crate) fn resolve_mut(
    value: &mut dyn Reflect,
    allocate: bool,
) -> Result<ReflectMut<'_>, ReflectError> {
    let value = deref_mut(value, allocate)?;
    Ok(match value.reflect_mut() {
        ReflectMut::Dynamic(dynamic) => match dynamic {
            Value::Map(map) => ReflectMut::Map(map),
            Value::Seq(seq) => ReflectMut::Slice(seq),
            other => ReflectMut::Dynamic(other),
        },
        other => other,
    })
}

/// Structural deep equality.
///
/// Structs compare field by field and must have the same type; maps by key
/// set and entries; slices element-wise. Scalars, typed or dynamic, compare
/// by canonical literal, so `Value::Int(30)` equals an `i32` of 30.
pub fn reflect_eq(a: &dyn Reflect, b: &dyn Reflect) -> bool {
    let (Some(x), Some(y)) = (resolve_ref(a), resolve_ref(b)) else {
        return deref_ref(a).is_none() && deref_ref(b).is_none();
    };
    match (x, y) {
        (ReflectRef::Struct(x), ReflectRef::Struct(y)) => {
            let same_type = deref_ref(a).map(|v| v.type_name()) == deref_ref(b).map(|v| v.type_name());
            same_type
                && (0..x.fields().len()).all(|i| match (x.field(i), y.field(i)) {
                    (Some(f), Some(g)) => reflect_eq(f, g),
                    _ => false,
                })
        }
        (ReflectRef::Map(x), ReflectRef::Map(y)) => {
            x.len() == y.len()
                && x.keys().iter().all(|key| match (x.get(key), y.get(key)) {
                    (Ok(Some(f)), Ok(Some(g))) => reflect_eq(f, g),
                    _ => false,
                })
        }
        (ReflectRef::Slice(x), ReflectRef::Slice(y)) => {
            x.len() == y.len()
                && (0..x.len()).all(|i| match (x.get(i), y.get(i)) {
                    (Some(f), Some(g)) => reflect_eq(f, g),
                    _ => false,
                })
        }
        (ReflectRef::Dynamic(Value::Null), ReflectRef::Dynamic(Value::Null)) => true,
        _ => match (coerce::scalar_to_string(a), coerce::scalar_to_string(b)) {
            (Some(f), Some(g)) => f == g,
            _ => false,
        },
    }
}

/// Compact one-line rendering of any value, used in logs and CLI output.
pub fn debug_string(value: &dyn Reflect) -> String {
    let mut out = String::new();
    write_debug(&mut out, value);
    out
}

fn write_debug(out: &mut String, value: &dyn Reflect) {
    match resolve_ref(value) {
        None => out.push_str("null"),
        Some(ReflectRef::Struct(s)) => {
            out.push('{');
            for (i, info) in s.fields().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(info.name);
                out.push_str(": ");
                match s.field(i) {
                    Some(field) => write_debug(out, field),
                    None => out.push('?'),
                }
            }
            out.push('}');
        }
        Some(ReflectRef::Map(map)) => {
            out.push('{');
            for (i, key) in map.keys().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push_str(": ");
                match map.get(key) {
                    Ok(Some(entry)) => write_debug(out, entry),
                    _ => out.push('?'),
                }
            }
            out.push('}');
        }
        Some(ReflectRef::Slice(slice)) => {
            out.push('[');
            for i in 0..slice.len() {
                if i > 0 {
                    out.push_str(", ");
                }
                match slice.get(i) {
                    Some(element) => write_debug(out, element),
                    None => out.push('?'),
                }
            }
            out.push(']');
        }
        Some(ReflectRef::Scalar(scalar)) => match scalar.get() {
            Scalar::Str(text) => out.push_str(&format!("{text:?}")),
            other => out.push_str(&other.to_string()),
        },
        Some(ReflectRef::Dynamic(dynamic)) => match dynamic {
            Value::Text(text) => out.push_str(&format!("{text:?}")),
            other => match other.as_scalar() {
                Some(scalar) => out.push_str(&scalar.to_string()),
                None => out.push_str("null"),
            },
        },
        Some(ReflectRef::Pointer(_)) | Some(ReflectRef::Unsupported) => {
            out.push('<');
            out.push_str(value.type_name());
            out.push('>');
        }
    }
}
