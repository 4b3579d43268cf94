//! Reading and writing children of a container through a [`Reflect`] handle.
//!
//! Every operation takes a container and one key. Optional layers are
//! unwrapped transparently: write operations allocate unallocated layers,
//! reads never do. Lists are addressed according to a [`SearchMode`].

use std::any::Any;
use std::collections::BTreeMap;

use tracing::trace;

use crate::Config;
use crate::path::{extract_name_and_substring, is_structured};
use crate::reflect::coerce::scalar_get;
use crate::reflect::{
    FieldInfo, Kind, Reflect, ReflectError, ReflectMut, ReflectRef, Slice, Struct, Value,
    deref_mut, deref_ref, resolve_mut, resolve_ref,
};

pub mod entry;

pub use entry::{build_element, match_existing};

/// How a key addresses an element of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Lists cannot be addressed.
    #[default]
    None,
    /// The key is a zero-based position.
    ByIndex,
    /// The key describes the element's content (see [`match_existing`]).
    ByContent,
    First,
    Last,
}

impl SearchMode {
    /// Picks the mode for a list key: empty keys address the last element,
    /// structured keys address by content, integers by index (unless
    /// `find_by_content` is set), anything else by content.
    pub fn for_list_key(key: &str, config: &Config) -> Self {
        if key.is_empty() {
            SearchMode::Last
        } else if is_structured(key) {
            SearchMode::ByContent
        } else if !config.find_by_content && key.parse::<usize>().is_ok() {
            SearchMode::ByIndex
        } else {
            SearchMode::ByContent
        }
    }
}

/// Shape of a container materialised by a map or sequence event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Map,
    Seq,
}

/// A struct field resolved from a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLookup {
    pub index: usize,
    pub info: FieldInfo,
}

/// Resolves `name` to a field by exact name, then ignoring case, then by alias.
pub fn lookup_field(target: &dyn Struct, name: &str, config: &Config) -> Option<FieldLookup> {
    let fields = target.fields();
    let index = fields
        .iter()
        .position(|f| f.name == name)
        .or_else(|| {
            if config.case_insensitive {
                fields.iter().position(|f| loose_eq(f.name, name))
            } else {
                None
            }
        })
        .or_else(|| {
            if config.tag_lookup {
                fields.iter().position(|f| f.alias == Some(name))
            } else {
                None
            }
        })?;
    Some(FieldLookup {
        index,
        info: fields[index],
    })
}

fn loose_eq(a: &str, b: &str) -> bool {
    fn fold(c: u8) -> u8 {
        if c == b'-' { b'_' } else { c.to_ascii_lowercase() }
    }
    a.len() == b.len() && a.bytes().zip(b.bytes()).all(|(x, y)| fold(x) == fold(y))
}

/// Returns the child at `key` without allocating anything.
///
/// An unallocated optional field is reported as not found.
pub fn find<'a>(
    container: &'a mut dyn Reflect,
    key: &str,
    mode: SearchMode,
    config: &Config,
) -> Result<&'a mut dyn Reflect, ReflectError> {
    let value = deref_mut(container, false)?;
    let type_name = value.type_name();
    trace!(container = type_name, key, ?mode, "find");
    match resolve_mut(value, false)? {
        ReflectMut::Struct(target) => {
            require_key(key)?;
            let (name, rest) = split_struct_key(key)?;
            let child = struct_child(target, type_name, &name, config, false)?;
            if !rest.is_empty() {
                return find(child, &rest, SearchMode::ByContent, config);
            }
            if deref_ref(&*child).is_none() {
                return Err(ReflectError::NilPointer {
                    type_name: child.type_name(),
                });
            }
            Ok(child)
        }
        ReflectMut::Map(map) => {
            require_key(key)?;
            map.get_mut(key)?.ok_or_else(|| not_found(key))
        }
        ReflectMut::Slice(list) => {
            let index = locate(&*list, key, mode, config)?.ok_or_else(|| not_found(key))?;
            list.get_mut(index).ok_or_else(|| not_found(key))
        }
        ReflectMut::Unsupported => Err(ReflectError::UnsupportedContainerKind { type_name }),
        _ => Err(ReflectError::NotAContainer { type_name }),
    }
}

/// Read-only counterpart of [`find`].
pub fn find_ref<'a>(
    container: &'a dyn Reflect,
    key: &str,
    mode: SearchMode,
    config: &Config,
) -> Result<&'a dyn Reflect, ReflectError> {
    let Some(value) = deref_ref(container) else {
        return Err(ReflectError::NilPointer {
            type_name: container.type_name(),
        });
    };
    let type_name = value.type_name();
    match resolve_ref(value) {
        Some(ReflectRef::Struct(target)) => {
            require_key(key)?;
            let (name, rest) = split_struct_key(key)?;
            let lookup = lookup_field(target, &name, config).ok_or_else(|| {
                ReflectError::FieldNotFound {
                    field: name.clone(),
                    type_name,
                }
            })?;
            let child = target
                .field(lookup.index)
                .ok_or_else(|| not_found(&name))?;
            if !rest.is_empty() {
                return find_ref(child, &rest, SearchMode::ByContent, config);
            }
            if deref_ref(child).is_none() {
                return Err(ReflectError::NilPointer {
                    type_name: child.type_name(),
                });
            }
            Ok(child)
        }
        Some(ReflectRef::Map(map)) => {
            require_key(key)?;
            map.get(key)?.ok_or_else(|| not_found(key))
        }
        Some(ReflectRef::Slice(list)) => {
            let index = locate(list, key, mode, config)?.ok_or_else(|| not_found(key))?;
            list.get(index).ok_or_else(|| not_found(key))
        }
        Some(ReflectRef::Unsupported) => Err(ReflectError::UnsupportedContainerKind { type_name }),
        _ => Err(ReflectError::NotAContainer { type_name }),
    }
}

/// Like [`find`], but fabricates a zero-valued child on a miss.
///
/// The returned child has every optional layer allocated. For lists, a
/// `First`/`Last` miss appends a zero element and a `ByContent` miss appends
/// an element built from `key`. Index misses cannot be fabricated.
pub fn find_or_init<'a>(
    container: &'a mut dyn Reflect,
    key: &str,
    mode: SearchMode,
    config: &Config,
) -> Result<&'a mut dyn Reflect, ReflectError> {
    let value = deref_mut(container, true)?;
    let type_name = value.type_name();
    trace!(container = type_name, key, ?mode, "find_or_init");
    let child = match resolve_mut(value, true)? {
        ReflectMut::Struct(target) => {
            require_key(key)?;
            let (name, rest) = split_struct_key(key)?;
            let child = struct_child(target, type_name, &name, config, false)?;
            if !rest.is_empty() {
                return find_or_init(child, &rest, SearchMode::ByContent, config);
            }
            child
        }
        ReflectMut::Map(map) => {
            require_key(key)?;
            map.get_or_insert(key)?
        }
        ReflectMut::Slice(list) => {
            let index = locate_or_append(list, key, mode, config)?;
            list.get_mut(index).ok_or_else(|| not_found(key))?
        }
        ReflectMut::Unsupported => {
            return Err(ReflectError::UnsupportedContainerKind { type_name });
        }
        _ => return Err(ReflectError::NotAContainer { type_name }),
    };
    deref_mut(child, true)
}

/// Writes a literal into the child at `key`.
///
/// Maps upsert the entry, struct fields are coerced in place, lists append:
/// `ByContent` skips the append when an equal entry exists, every other mode
/// appends unconditionally.
pub fn child_set(
    container: &mut dyn Reflect,
    key: &str,
    literal: &str,
    mode: SearchMode,
    config: &Config,
) -> Result<(), ReflectError> {
    set_child(
        container,
        key,
        Payload::Literal {
            text: literal,
            dynamic: None,
        },
        mode,
        config,
    )
}

/// [`child_set`] with an explicit value for dynamic slots, used when the
/// event's tag decides the dynamic variant.
pub(crate) fn child_set_tagged(
    container: &mut dyn Reflect,
    key: &str,
    literal: &str,
    dynamic: Value,
    mode: SearchMode,
    config: &Config,
) -> Result<(), ReflectError> {
    set_child(
        container,
        key,
        Payload::Literal {
            text: literal,
            dynamic: Some(dynamic),
        },
        mode,
        config,
    )
}

/// Like [`child_set`] but stores an already typed value. Scalars are still
/// converted to the slot's kind; other values must match the slot's type.
pub fn child_direct_set(
    container: &mut dyn Reflect,
    key: &str,
    value: Box<dyn Reflect>,
    mode: SearchMode,
    config: &Config,
) -> Result<(), ReflectError> {
    set_child(container, key, Payload::Typed(value), mode, config)
}

/// Removes the child at `key`.
///
/// Map entries are deleted (deleting an absent entry succeeds), struct
/// fields are reset to their zero value, list elements are removed keeping
/// the order of the rest.
pub fn child_unset(
    container: &mut dyn Reflect,
    key: &str,
    mode: SearchMode,
    config: &Config,
) -> Result<(), ReflectError> {
    let value = deref_mut(container, false)?;
    let type_name = value.type_name();
    trace!(container = type_name, key, ?mode, "child_unset");
    match resolve_mut(value, false)? {
        ReflectMut::Struct(target) => {
            require_key(key)?;
            let (name, rest) = split_struct_key(key)?;
            let child = struct_child(target, type_name, &name, config, true)?;
            if rest.is_empty() {
                child.reset();
                Ok(())
            } else {
                child_unset(child, &rest, SearchMode::ByContent, config)
            }
        }
        ReflectMut::Map(map) => {
            require_key(key)?;
            if !map.remove(key)? {
                trace!(key, "map entry already absent");
            }
            Ok(())
        }
        ReflectMut::Slice(list) => {
            let index = locate(&*list, key, mode, config)?.ok_or_else(|| not_found(key))?;
            list.remove(index)
        }
        ReflectMut::Unsupported => Err(ReflectError::UnsupportedContainerKind { type_name }),
        _ => Err(ReflectError::NotAContainer { type_name }),
    }
}

/// Ensures the child at `key` is a container of `shape`.
///
/// Existing containers of the right shape are left untouched. An empty key
/// on a list always appends a new anonymous entry.
pub fn child_materialize(
    container: &mut dyn Reflect,
    key: &str,
    shape: Shape,
    mode: SearchMode,
    config: &Config,
) -> Result<(), ReflectError> {
    let value = deref_mut(container, true)?;
    let type_name = value.type_name();
    trace!(container = type_name, key, ?shape, "child_materialize");
    match resolve_mut(value, true)? {
        ReflectMut::Struct(target) => {
            require_key(key)?;
            let (name, rest) = split_struct_key(key)?;
            let child = struct_child(target, type_name, &name, config, true)?;
            if rest.is_empty() {
                materialize_slot(child, shape)
            } else {
                child_materialize(child, &rest, shape, SearchMode::ByContent, config)
            }
        }
        ReflectMut::Map(map) => {
            require_key(key)?;
            if let Some(existing) = map.get_mut(key)? {
                return materialize_slot(existing, shape);
            }
            let mut fresh = map.new_value();
            materialize_slot(&mut *fresh, shape)?;
            map.insert_boxed(key, fresh)
        }
        ReflectMut::Slice(list) => {
            if key.is_empty() {
                let mut fresh = list.new_element();
                materialize_slot(&mut *fresh, shape)?;
                return list.push_boxed(fresh);
            }
            let index = locate_or_append(list, key, mode, config)?;
            let slot = list.get_mut(index).ok_or_else(|| not_found(key))?;
            materialize_slot(slot, shape)
        }
        ReflectMut::Unsupported => Err(ReflectError::UnsupportedContainerKind { type_name }),
        _ => Err(ReflectError::NotAContainer { type_name }),
    }
}

/// Replaces a dynamic leaf with an empty map so it can be descended into.
pub(crate) fn promote_to_map(slot: &mut dyn Reflect) -> Result<(), ReflectError> {
    let slot = deref_mut(slot, true)?;
    if let ReflectMut::Dynamic(value) = slot.reflect_mut()
        && value.is_leaf()
    {
        trace!(previous = %value, "promoting dynamic leaf to map");
        *value = Value::Map(BTreeMap::new());
    }
    Ok(())
}

enum Payload<'a> {
    Literal {
        text: &'a str,
        dynamic: Option<Value>,
    },
    Typed(Box<dyn Reflect>),
}

fn set_child(
    container: &mut dyn Reflect,
    key: &str,
    payload: Payload<'_>,
    mode: SearchMode,
    config: &Config,
) -> Result<(), ReflectError> {
    let value = deref_mut(container, true)?;
    let type_name = value.type_name();
    trace!(container = type_name, key, ?mode, "child_set");
    match resolve_mut(value, true)? {
        ReflectMut::Struct(target) => {
            require_key(key)?;
            let (name, rest) = split_struct_key(key)?;
            let child = struct_child(target, type_name, &name, config, true)?;
            if rest.is_empty() {
                set_slot(child, payload, config)
            } else {
                set_child(child, &rest, payload, SearchMode::ByContent, config)
            }
        }
        ReflectMut::Map(map) => {
            require_key(key)?;
            if let Some(existing) = map.get_mut(key)? {
                return set_slot(existing, payload, config);
            }
            let mut fresh = map.new_value();
            set_slot(&mut *fresh, payload, config)?;
            map.insert_boxed(key, fresh)
        }
        ReflectMut::Slice(list) => match mode {
            SearchMode::None => Err(ReflectError::not_addressable(
                key,
                "a list needs a search mode",
            )),
            SearchMode::ByContent => {
                let existing = match &payload {
                    Payload::Typed(value) if key.is_empty() => {
                        (0..list.len()).find(|&i| {
                            list.get(i)
                                .is_some_and(|element| crate::reflect::reflect_eq(element, &**value))
                        })
                    }
                    _ => {
                        require_key(key)?;
                        match_existing(&*list, key, config)?
                    }
                };
                if existing.is_some() {
                    trace!(key, "equal entry already present");
                    return Ok(());
                }
                match payload {
                    Payload::Typed(value) => push_converted(list, value, config),
                    Payload::Literal { .. } => {
                        let element = build_element(&*list.new_element(), key, config)?;
                        list.push_boxed(element)
                    }
                }
            }
            _ => {
                // Set-like lists receive the key itself when no value is given.
                let payload = match payload {
                    Payload::Literal { text, .. } if text.is_empty() && !key.is_empty() => {
                        Payload::Literal {
                            text: key,
                            dynamic: None,
                        }
                    }
                    other => other,
                };
                let mut element = list.new_element();
                set_slot(&mut *element, payload, config)?;
                list.push_boxed(element)
            }
        },
        ReflectMut::Unsupported => Err(ReflectError::UnsupportedContainerKind { type_name }),
        _ => Err(ReflectError::NotAContainer { type_name }),
    }
}

fn push_converted(
    list: &mut dyn Slice,
    value: Box<dyn Reflect>,
    config: &Config,
) -> Result<(), ReflectError> {
    let mut element = list.new_element();
    set_slot(&mut *element, Payload::Typed(value), config)?;
    list.push_boxed(element)
}

fn set_slot(slot: &mut dyn Reflect, payload: Payload<'_>, config: &Config) -> Result<(), ReflectError> {
    let slot = deref_mut(slot, true)?;
    let type_name = slot.type_name();
    let (text, dynamic) = match payload {
        Payload::Typed(value) => return assign_typed(slot, value),
        Payload::Literal { text, dynamic } => (text, dynamic),
    };

    if slot.kind() == Kind::Struct {
        if text.is_empty() {
            return Ok(());
        }
        if !is_structured(text) {
            return Err(ReflectError::not_convertible(
                text,
                type_name,
                "a struct needs a structured literal",
            ));
        }
        let built = build_element(&*slot, text, config)?;
        return slot.set_boxed(built);
    }

    match slot.reflect_mut() {
        ReflectMut::Scalar(scalar) => scalar.set_literal(text),
        ReflectMut::Dynamic(value) => {
            *value = dynamic.unwrap_or_else(|| Value::from(text));
            Ok(())
        }
        ReflectMut::Map(_) | ReflectMut::Slice(_) if text.is_empty() => Ok(()),
        ReflectMut::Unsupported => Err(ReflectError::UnsupportedContainerKind { type_name }),
        _ => Err(ReflectError::not_convertible(
            text,
            type_name,
            "a container cannot hold a scalar",
        )),
    }
}

fn assign_typed(slot: &mut dyn Reflect, value: Box<dyn Reflect>) -> Result<(), ReflectError> {
    if Any::type_id(slot.as_any()) == Any::type_id(value.as_any()) {
        return slot.set_boxed(value);
    }
    let type_name = slot.type_name();
    let scalar = scalar_get(&*value);
    match slot.reflect_mut() {
        ReflectMut::Scalar(target) => match scalar {
            Some(scalar) => target.set(scalar),
            None => Err(ReflectError::not_convertible(
                value.type_name(),
                type_name,
                "not a scalar",
            )),
        },
        ReflectMut::Dynamic(target) => {
            *target = match (value.downcast_ref::<Value>(), scalar) {
                (Some(dynamic), _) => dynamic.clone(),
                (None, Some(scalar)) => Value::from_scalar(scalar),
                (None, None) => {
                    return Err(ReflectError::not_convertible(
                        value.type_name(),
                        type_name,
                        "only scalars convert into dynamic slots",
                    ));
                }
            };
            Ok(())
        }
        _ => Err(ReflectError::not_convertible(
            value.type_name(),
            type_name,
            "value type differs",
        )),
    }
}

fn materialize_slot(slot: &mut dyn Reflect, shape: Shape) -> Result<(), ReflectError> {
    let slot = deref_mut(slot, true)?;
    let type_name = slot.type_name();
    match (slot.reflect_mut(), shape) {
        (ReflectMut::Dynamic(value), Shape::Map) => {
            if !matches!(value, Value::Map(_)) {
                *value = Value::Map(BTreeMap::new());
            }
            Ok(())
        }
        (ReflectMut::Dynamic(value), Shape::Seq) => {
            if !matches!(value, Value::Seq(_)) {
                *value = Value::Seq(Vec::new());
            }
            Ok(())
        }
        // Sets and ordered maps may be backed by lists.
        (ReflectMut::Struct(_) | ReflectMut::Map(_) | ReflectMut::Slice(_), Shape::Map) => Ok(()),
        (ReflectMut::Slice(_), Shape::Seq) => Ok(()),
        (ReflectMut::Unsupported, _) => Err(ReflectError::UnsupportedContainerKind { type_name }),
        (_, shape) => Err(ReflectError::not_convertible(
            format!("{shape:?}"),
            type_name,
            "destination cannot hold this shape",
        )),
    }
}

fn locate(
    list: &dyn Slice,
    key: &str,
    mode: SearchMode,
    config: &Config,
) -> Result<Option<usize>, ReflectError> {
    match mode {
        SearchMode::ByIndex => {
            let index: usize = key
                .parse()
                .map_err(|_| ReflectError::not_addressable(key, "expected a list index"))?;
            Ok((index < list.len()).then_some(index))
        }
        SearchMode::ByContent => {
            require_key(key)?;
            match_existing(list, key, config)
        }
        SearchMode::First => Ok((!list.is_empty()).then_some(0)),
        SearchMode::Last => Ok(list.len().checked_sub(1)),
        SearchMode::None => Err(ReflectError::not_addressable(
            key,
            "a list needs a search mode",
        )),
    }
}

fn locate_or_append(
    list: &mut dyn Slice,
    key: &str,
    mode: SearchMode,
    config: &Config,
) -> Result<usize, ReflectError> {
    if let Some(index) = locate(&*list, key, mode, config)? {
        return Ok(index);
    }
    match mode {
        SearchMode::First | SearchMode::Last | SearchMode::ByContent => {
            let template = list.new_element();
            let element = if key.is_empty() {
                template
            } else {
                build_element(&*template, key, config)?
            };
            list.push_boxed(element)?;
            Ok(list.len() - 1)
        }
        _ => Err(not_found(key)),
    }
}

fn struct_child<'a>(
    target: &'a mut dyn Struct,
    type_name: &'static str,
    name: &str,
    config: &Config,
    write: bool,
) -> Result<&'a mut dyn Reflect, ReflectError> {
    let not_found = || ReflectError::FieldNotFound {
        field: name.to_string(),
        type_name,
    };
    let lookup = lookup_field(&*target, name, config).ok_or_else(not_found)?;
    if write && !lookup.info.settable {
        return Err(ReflectError::NotSettable {
            field: lookup.info.name.to_string(),
            type_name,
        });
    }
    target.field_mut(lookup.index).ok_or_else(not_found)
}

/// Splits `Field[k=v]` into the field name and the qualifier remainder.
fn split_struct_key(key: &str) -> Result<(String, String), ReflectError> {
    if is_structured(key) {
        Ok(extract_name_and_substring(key)?)
    } else {
        Ok((key.to_string(), String::new()))
    }
}

fn require_key(key: &str) -> Result<(), ReflectError> {
    if key.is_empty() {
        return Err(ReflectError::not_addressable(key, "an empty key cannot address this container"));
    }
    Ok(())
}

fn not_found(key: &str) -> ReflectError {
    ReflectError::EntryNotFound {
        key: key.to_string(),
    }
}
