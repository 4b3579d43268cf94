//! `Reflect` implementations for standard library types.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use super::{Map, Pointer, Reflect, ReflectError, ReflectMut, ReflectRef, ScalarKind, ScalarType, Slice};

macro_rules! impl_reflect_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                crate::__reflect_common!();

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Scalar(self)
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::Scalar(self)
                }
            }
        )+
    };
}

impl_reflect_scalar!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, char, String
);

impl<T: Reflect + Default> Pointer for Option<T> {
    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|v| v as &mut dyn Reflect)
    }

    fn alloc(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }

    fn pointee_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }
}

impl<T: Reflect + Default> Reflect for Option<T> {
    crate::__reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }
}

// A box is never unallocated; resetting it resets the pointee.
impl<T: Reflect + Default> Pointer for Box<T> {
    fn is_null(&self) -> bool {
        false
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        Some(&**self)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(&mut **self)
    }

    fn alloc(&mut self) -> &mut dyn Reflect {
        &mut **self
    }

    fn pointee_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }
}

impl<T: Reflect + Default> Reflect for Box<T> {
    crate::__reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }
}

impl<T: Reflect + Default> Slice for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        <[T]>::get(self, index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        <[T]>::get_mut(self, index).map(|v| v as &mut dyn Reflect)
    }

    fn push_boxed(&mut self, value: Box<dyn Reflect>) -> Result<(), ReflectError> {
        self.push(downcast_owned::<T>(value)?);
        Ok(())
    }

    fn remove(&mut self, index: usize) -> Result<(), ReflectError> {
        if index >= Vec::len(self) {
            return Err(ReflectError::EntryNotFound {
                key: index.to_string(),
            });
        }
        Vec::remove(self, index);
        Ok(())
    }

    fn new_element(&self) -> Box<dyn Reflect> {
        Box::new(T::default())
    }
}

impl<T: Reflect + Default> Reflect for Vec<T> {
    crate::__reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Slice(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Slice(self)
    }
}

impl<K, V> Map for BTreeMap<K, V>
where
    K: ScalarType + Ord + 'static,
    V: Reflect + Default,
{
    fn key_kind(&self) -> ScalarKind {
        K::KIND
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).map(ScalarType::to_literal).collect()
    }

    fn get(&self, key: &str) -> Result<Option<&dyn Reflect>, ReflectError> {
        let key = map_key::<K>(key)?;
        Ok(BTreeMap::get(self, &key).map(|v| v as &dyn Reflect))
    }

    fn get_mut(&mut self, key: &str) -> Result<Option<&mut dyn Reflect>, ReflectError> {
        let key = map_key::<K>(key)?;
        Ok(BTreeMap::get_mut(self, &key).map(|v| v as &mut dyn Reflect))
    }

    fn get_or_insert(&mut self, key: &str) -> Result<&mut dyn Reflect, ReflectError> {
        let key = map_key::<K>(key)?;
        Ok(self.entry(key).or_default())
    }

    fn insert_boxed(&mut self, key: &str, value: Box<dyn Reflect>) -> Result<(), ReflectError> {
        let key = map_key::<K>(key)?;
        self.insert(key, downcast_owned::<V>(value)?);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, ReflectError> {
        let key = map_key::<K>(key)?;
        Ok(BTreeMap::remove(self, &key).is_some())
    }

    fn new_value(&self) -> Box<dyn Reflect> {
        Box::new(V::default())
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: ScalarType + Ord + 'static,
    V: Reflect + Default,
{
    crate::__reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }
}

impl<K, V, S> Map for HashMap<K, V, S>
where
    K: ScalarType + Hash + Eq + 'static,
    V: Reflect + Default,
    S: BuildHasher + Default + 'static,
{
    fn key_kind(&self) -> ScalarKind {
        K::KIND
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = HashMap::keys(self).map(ScalarType::to_literal).collect();
        keys.sort();
        keys
    }

    fn get(&self, key: &str) -> Result<Option<&dyn Reflect>, ReflectError> {
        let key = map_key::<K>(key)?;
        Ok(HashMap::get(self, &key).map(|v| v as &dyn Reflect))
    }

    fn get_mut(&mut self, key: &str) -> Result<Option<&mut dyn Reflect>, ReflectError> {
        let key = map_key::<K>(key)?;
        Ok(HashMap::get_mut(self, &key).map(|v| v as &mut dyn Reflect))
    }

    fn get_or_insert(&mut self, key: &str) -> Result<&mut dyn Reflect, ReflectError> {
        let key = map_key::<K>(key)?;
        Ok(self.entry(key).or_default())
    }

    fn insert_boxed(&mut self, key: &str, value: Box<dyn Reflect>) -> Result<(), ReflectError> {
        let key = map_key::<K>(key)?;
        self.insert(key, downcast_owned::<V>(value)?);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, ReflectError> {
        let key = map_key::<K>(key)?;
        Ok(HashMap::remove(self, &key).is_some())
    }

    fn new_value(&self) -> Box<dyn Reflect> {
        Box::new(V::default())
    }
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: ScalarType + Hash + Eq + 'static,
    V: Reflect + Default,
    S: BuildHasher + Default + 'static,
{
    crate::__reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }
}

// Fixed-size arrays cannot grow or shrink, so change events never address them.
impl<T: Reflect + Default, const N: usize> Reflect for [T; N] {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Unsupported
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Unsupported
    }

    fn zeroed(&self) -> Box<dyn Reflect> {
        Box::new(std::array::from_fn::<T, N, _>(|_| T::default()))
    }

    fn reset(&mut self) {
        *self = std::array::from_fn(|_| T::default());
    }

    fn set_boxed(&mut self, value: Box<dyn Reflect>) -> Result<(), ReflectError> {
        *self = downcast_owned::<Self>(value)?;
        Ok(())
    }
}

fn map_key<K: ScalarType>(key: &str) -> Result<K, ReflectError> {
    K::from_scalar(super::Scalar::Str(key.to_string()))
        .map_err(|e| ReflectError::not_addressable(key, format!("map key: {e}")))
}

fn downcast_owned<T: Reflect>(value: Box<dyn Reflect>) -> Result<T, ReflectError> {
    let from = value.type_name();
    value
        .into_any()
        .downcast::<T>()
        .map(|v| *v)
        .map_err(|_| {
            ReflectError::not_convertible(from, std::any::type_name::<T>(), "value type differs")
        })
}
