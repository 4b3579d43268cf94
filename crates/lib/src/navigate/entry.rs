//! Content-addressed list entries.
//!
//! A structured key such as `Address[ip=10.0.0.1][prefix=24]` both builds a
//! new list element (every named field set from its literal) and finds an
//! existing one (every named field equal). Plain keys stand for a scalar
//! element.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;

use super::{lookup_field, struct_child};
use crate::Config;
use crate::path::{StructuredKey, is_structured};
use crate::reflect::{
    Kind, Reflect, ReflectError, ReflectMut, ReflectRef, Slice, Value, deref_mut, deref_ref,
    reflect_eq, resolve_ref,
};

/// Builds a new element shaped like `template` from `key`.
///
/// Structs get exactly the named fields set; a field value that is itself a
/// bracketed key is decomposed into the nested struct or dynamic map.
/// Scalars take the key as their literal (the first qualifier value when the
/// key is structured). Fails when a named field does not exist or is
/// read-only.
pub fn build_element(
    template: &dyn Reflect,
    key: &str,
    config: &Config,
) -> Result<Box<dyn Reflect>, ReflectError> {
    let mut element = template.zeroed();
    fill(&mut *element, key, config)?;
    Ok(element)
}

/// Finds the first element of `list` matching `key`.
///
/// Only the fields named by the key are compared. A key without qualifiers
/// is compared against whole elements as a scalar.
pub fn match_existing(
    list: &dyn Slice,
    key: &str,
    config: &Config,
) -> Result<Option<usize>, ReflectError> {
    let candidate = build_element(&*list.new_element(), key, config)?;
    let constrained: Vec<String> = if is_structured(key) {
        StructuredKey::parse(key)?
            .fields
            .into_iter()
            .map(|(field, _)| field)
            .collect()
    } else {
        Vec::new()
    };

    for index in 0..list.len() {
        let Some(existing) = list.get(index) else {
            continue;
        };
        let matched = if constrained.is_empty() {
            reflect_eq(existing, &*candidate)
        } else {
            constrained.iter().all(|field| {
                match (
                    named_field(existing, field, config),
                    named_field(&*candidate, field, config),
                ) {
                    (Some(a), Some(b)) => reflect_eq(a, b),
                    _ => false,
                }
            })
        };
        if matched {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

fn named_field<'a>(value: &'a dyn Reflect, name: &str, config: &Config) -> Option<&'a dyn Reflect> {
    match resolve_ref(value)? {
        ReflectRef::Struct(target) => {
            let lookup = lookup_field(target, name, config)?;
            target.field(lookup.index)
        }
        ReflectRef::Map(map) => map.get(name).ok().flatten(),
        _ => None,
    }
}

fn fill(slot: &mut dyn Reflect, literal: &str, config: &Config) -> Result<(), ReflectError> {
    let slot = deref_mut(slot, true)?;
    let type_name = slot.type_name();
    if config.init_children && slot.kind() == Kind::Struct {
        init_children(&mut *slot, &mut Vec::new());
    }

    match slot.reflect_mut() {
        ReflectMut::Struct(target) => {
            let key = StructuredKey::parse(literal)?;
            for (field, value) in &key.fields {
                let child = struct_child(&mut *target, type_name, field, config, true)?;
                fill(child, value, config)?;
            }
            Ok(())
        }
        ReflectMut::Dynamic(value) => {
            if !is_structured(literal) {
                *value = Value::from(literal);
                return Ok(());
            }
            let key = StructuredKey::parse(literal)?;
            let mut map = BTreeMap::new();
            for (field, nested) in &key.fields {
                let mut entry = Value::Null;
                fill(&mut entry, nested, config)?;
                map.insert(field.clone(), entry);
            }
            *value = Value::Map(map);
            Ok(())
        }
        ReflectMut::Scalar(scalar) => {
            if !is_structured(literal) {
                return scalar.set_literal(literal);
            }
            let key = StructuredKey::parse(literal)?;
            match key.fields.into_iter().next() {
                Some((_, value)) => scalar.set_literal(&value),
                None => scalar.set_literal(&key.name),
            }
        }
        ReflectMut::Map(_) | ReflectMut::Slice(_) if literal.is_empty() => Ok(()),
        ReflectMut::Map(_) | ReflectMut::Slice(_) => Err(ReflectError::not_addressable(
            literal,
            format!("cannot build a {type_name} from a key"),
        )),
        ReflectMut::Unsupported => Err(ReflectError::UnsupportedContainerKind { type_name }),
        ReflectMut::Pointer(_) => Err(ReflectError::NotAContainer { type_name }),
    }
}

/// Allocates every optional slot below `value`, except where the slot's
/// target type already encloses it.
fn init_children(value: &mut dyn Reflect, ancestors: &mut Vec<TypeId>) {
    let id = Any::type_id(value.as_any());
    if ancestors.contains(&id) {
        return;
    }
    ancestors.push(id);

    let mut undo = false;
    match value.reflect_mut() {
        ReflectMut::Struct(target) => {
            for index in 0..target.fields().len() {
                if let Some(field) = target.field_mut(index) {
                    init_children(field, ancestors);
                }
            }
        }
        ReflectMut::Pointer(ptr) => {
            let was_null = ptr.is_null();
            let inner = ptr.alloc();
            let recursive = deref_ref(&*inner)
                .is_some_and(|target| ancestors.contains(&Any::type_id(target.as_any())));
            if was_null && recursive {
                undo = true;
            } else {
                init_children(inner, ancestors);
            }
        }
        _ => {}
    }
    if undo {
        value.reset();
    }

    ancestors.pop();
}
