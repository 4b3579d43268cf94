//! Declarative implementation of [`Reflect`](super::Reflect) for caller structs.

/// Boilerplate methods shared by every `Reflect` implementation.
#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_common {
    () => {
        fn type_name(&self) -> &'static str {
            ::std::any::type_name::<Self>()
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }

        fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
            self
        }

        fn zeroed(&self) -> ::std::boxed::Box<dyn $crate::reflect::Reflect> {
            ::std::boxed::Box::new(<Self as ::std::default::Default>::default())
        }

        fn reset(&mut self) {
            *self = <Self as ::std::default::Default>::default();
        }

        fn set_boxed(
            &mut self,
            value: ::std::boxed::Box<dyn $crate::reflect::Reflect>,
        ) -> ::std::result::Result<(), $crate::reflect::ReflectError> {
            let from = $crate::reflect::Reflect::type_name(&*value);
            match $crate::reflect::Reflect::into_any(value).downcast::<Self>() {
                Ok(v) => {
                    *self = *v;
                    Ok(())
                }
                Err(_) => Err($crate::reflect::ReflectError::TypeNotConvertible {
                    value: from.to_string(),
                    target: ::std::any::type_name::<Self>().to_string(),
                    reason: "value type differs".to_string(),
                }),
            }
        }
    };
}

/// Implements [`Reflect`](crate::reflect::Reflect) and
/// [`Struct`](crate::reflect::Struct) for a struct with named fields.
///
/// Fields are listed explicitly; unlisted fields are invisible to change
/// events. Each entry may declare an alias used by tag lookup (`field as
/// "alias"`) and may be marked `readonly` (`field: readonly`), in which case
/// writes fail with `NotSettable`. The struct must implement `Default`.
///
/// An optional trailing list wires override contracts the struct implements:
/// `segments` (`Updater`), `paths` (`DataUpdate`) and `bounds`
/// (`UpdateBounds`).
///
/// ```
/// use ysync::reflect_struct;
///
/// #[derive(Debug, Default)]
/// struct Interface {
///     name: String,
///     mtu: u32,
///     admin_up: bool,
///     index: u32,
/// }
///
/// reflect_struct!(Interface {
///     name,
///     mtu,
///     admin_up as "admin-status",
///     index: readonly,
/// });
/// ```
#[macro_export]
macro_rules! reflect_struct {
    (@cap segments) => {
        fn overrides(&mut self) -> Option<$crate::sync::Override<'_>> {
            Some($crate::sync::Override::Segments(self))
        }
    };
    (@cap paths) => {
        fn overrides(&mut self) -> Option<$crate::sync::Override<'_>> {
            Some($crate::sync::Override::Paths(self))
        }
    };
    (@cap bounds) => {
        fn update_bounds(&mut self) -> Option<&mut dyn $crate::sync::UpdateBounds> {
            Some(self)
        }
    };

    // One field entry at a time.
    (@collect $ty:ty; [$($cap:ident)*] [$($info:tt)*] $field:ident as $alias:literal : readonly $(, $($rest:tt)*)?) => {
        $crate::reflect_struct!(@collect $ty; [$($cap)*] [$($info)* ($field, Some($alias), false)] $($($rest)*)?);
    };
    (@collect $ty:ty; [$($cap:ident)*] [$($info:tt)*] $field:ident as $alias:literal $(, $($rest:tt)*)?) => {
        $crate::reflect_struct!(@collect $ty; [$($cap)*] [$($info)* ($field, Some($alias), true)] $($($rest)*)?);
    };
    (@collect $ty:ty; [$($cap:ident)*] [$($info:tt)*] $field:ident : readonly $(, $($rest:tt)*)?) => {
        $crate::reflect_struct!(@collect $ty; [$($cap)*] [$($info)* ($field, None, false)] $($($rest)*)?);
    };
    (@collect $ty:ty; [$($cap:ident)*] [$($info:tt)*] $field:ident $(, $($rest:tt)*)?) => {
        $crate::reflect_struct!(@collect $ty; [$($cap)*] [$($info)* ($field, None, true)] $($($rest)*)?);
    };

    (@collect $ty:ty; [$($cap:ident)*] [$(($field:ident, $alias:expr, $settable:expr))*]) => {
        impl $crate::reflect::Struct for $ty {
            fn fields(&self) -> &'static [$crate::reflect::FieldInfo] {
                const FIELDS: &[$crate::reflect::FieldInfo] = &[
                    $($crate::reflect::FieldInfo {
                        name: stringify!($field),
                        alias: $alias,
                        settable: $settable,
                    }),*
                ];
                FIELDS
            }

            fn field(&self, index: usize) -> Option<&dyn $crate::reflect::Reflect> {
                let info = $crate::reflect::Struct::fields(self).get(index)?;
                match info.name {
                    $(stringify!($field) => Some(&self.$field),)*
                    _ => None,
                }
            }

            fn field_mut(&mut self, index: usize) -> Option<&mut dyn $crate::reflect::Reflect> {
                let info = $crate::reflect::Struct::fields(self).get(index)?;
                match info.name {
                    $(stringify!($field) => Some(&mut self.$field),)*
                    _ => None,
                }
            }
        }

        impl $crate::reflect::Reflect for $ty {
            $crate::__reflect_common!();

            fn reflect_ref(&self) -> $crate::reflect::ReflectRef<'_> {
                $crate::reflect::ReflectRef::Struct(self)
            }

            fn reflect_mut(&mut self) -> $crate::reflect::ReflectMut<'_> {
                $crate::reflect::ReflectMut::Struct(self)
            }

            $($crate::reflect_struct!(@cap $cap);)*
        }
    };

    ($ty:ty { $($body:tt)* } $(; $($cap:ident),+ $(,)?)?) => {
        $crate::reflect_struct!(@collect $ty; [$($($cap)+)?] [] $($body)*);
    };
}
