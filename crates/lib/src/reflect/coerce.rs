//! Scalar coercion between string literals and typed scalar slots.
//!
//! Change events carry every scalar as a string literal. This module turns a
//! literal into a value of the destination scalar kind (and back), and
//! converts between scalar kinds with range checks against the destination
//! width.

use std::fmt;
use std::num::IntErrorKind;

use super::{Reflect, ReflectError, ReflectMut, Value, deref_mut};

/// The destination kinds a scalar slot can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Char,
    String,
}

impl ScalarKind {
    /// Rust name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::Isize => "isize",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::Usize => "usize",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Char => "char",
            ScalarKind::String => "String",
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }

    pub fn is_integer(self) -> bool {
        self.int_bounds().is_some()
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            ScalarKind::U8 | ScalarKind::U16 | ScalarKind::U32 | ScalarKind::U64 | ScalarKind::Usize
        )
    }

    fn int_bounds(self) -> Option<(i128, i128)> {
        let bounds = match self {
            ScalarKind::I8 => (i8::MIN as i128, i8::MAX as i128),
            ScalarKind::I16 => (i16::MIN as i128, i16::MAX as i128),
            ScalarKind::I32 => (i32::MIN as i128, i32::MAX as i128),
            ScalarKind::I64 => (i64::MIN as i128, i64::MAX as i128),
            ScalarKind::Isize => (isize::MIN as i128, isize::MAX as i128),
            ScalarKind::U8 => (0, u8::MAX as i128),
            ScalarKind::U16 => (0, u16::MAX as i128),
            ScalarKind::U32 => (0, u32::MAX as i128),
            ScalarKind::U64 => (0, u64::MAX as i128),
            ScalarKind::Usize => (0, usize::MAX as i128),
            _ => return None,
        };
        Some(bounds)
    }

    /// The zero value of this kind.
    pub fn zero(self) -> Scalar {
        match self {
            ScalarKind::Bool => Scalar::Bool(false),
            ScalarKind::F32 | ScalarKind::F64 => Scalar::Float(0.0),
            ScalarKind::Char => Scalar::Char('\0'),
            ScalarKind::String => Scalar::Str(String::new()),
            k if k.is_unsigned() => Scalar::Uint(0),
            _ => Scalar::Int(0),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar value detached from any slot.
///
/// Signed kinds normalise to `Int`, unsigned kinds to `Uint`, both float
/// widths to `Float`.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(char),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&coerce_to_string(self))
    }
}

/// Parses `literal` as a value of `kind`.
///
/// An empty literal yields the zero value for every non-string kind. Booleans
/// accept only `true`/`false` in any ASCII case.
pub fn coerce_from_str(kind: ScalarKind, literal: &str) -> Result<Scalar, ReflectError> {
    match kind {
        ScalarKind::String => Ok(Scalar::Str(literal.to_string())),
        _ if literal.is_empty() => Ok(kind.zero()),
        ScalarKind::Bool => parse_bool(literal).map(Scalar::Bool).ok_or_else(|| {
            ReflectError::not_convertible(literal, kind.name(), "expected true or false")
        }),
        ScalarKind::Char => {
            let mut chars = literal.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Scalar::Char(c)),
                _ => Err(ReflectError::not_convertible(
                    literal,
                    kind.name(),
                    "expected a single character",
                )),
            }
        }
        k if k.is_float() => {
            let value: f64 = literal
                .parse()
                .map_err(|e| ReflectError::not_convertible(literal, k.name(), format!("{e}")))?;
            if value.is_infinite() && !literal.to_ascii_lowercase().contains("inf") {
                return Err(overflow(literal, k));
            }
            check_float(value, k, literal)
        }
        k if k.is_unsigned() => {
            let value: u64 = literal.parse().map_err(|e: std::num::ParseIntError| {
                match e.kind() {
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => overflow(literal, k),
                    _ => ReflectError::not_convertible(literal, k.name(), format!("{e}")),
                }
            })?;
            check_int(value as i128, k, literal)
        }
        k => {
            let value: i64 = literal.parse().map_err(|e: std::num::ParseIntError| {
                match e.kind() {
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => overflow(literal, k),
                    _ => ReflectError::not_convertible(literal, k.name(), format!("{e}")),
                }
            })?;
            check_int(value as i128, k, literal)
        }
    }
}

/// Renders a scalar as its canonical literal.
pub fn coerce_to_string(value: &Scalar) -> String {
    match value {
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(v) => v.to_string(),
        Scalar::Uint(v) => v.to_string(),
        Scalar::Float(v) => v.to_string(),
        Scalar::Char(c) => c.to_string(),
        Scalar::Str(s) => s.clone(),
    }
}

/// Converts `value` to `kind`.
///
/// Strings are parsed with [`coerce_from_str`]; anything converts to a
/// string. Numbers convert to bool as nonzero, bool to numbers as 1/0.
/// Numeric conversions must fit the destination; floats convert to integers
/// only when integral.
pub fn convert(value: Scalar, kind: ScalarKind) -> Result<Scalar, ReflectError> {
    match (value, kind) {
        (Scalar::Str(s), k) => coerce_from_str(k, &s),
        (other, ScalarKind::String) => Ok(Scalar::Str(coerce_to_string(&other))),
        (Scalar::Bool(b), ScalarKind::Bool) => Ok(Scalar::Bool(b)),
        (Scalar::Bool(b), k) if k.is_integer() || k.is_float() => {
            convert(Scalar::Int(i64::from(b)), k)
        }
        (Scalar::Int(v), ScalarKind::Bool) => Ok(Scalar::Bool(v != 0)),
        (Scalar::Uint(v), ScalarKind::Bool) => Ok(Scalar::Bool(v != 0)),
        (Scalar::Float(v), ScalarKind::Bool) => Ok(Scalar::Bool(v != 0.0)),
        (Scalar::Int(v), k) if k.is_integer() => check_int(v as i128, k, &v.to_string()),
        (Scalar::Uint(v), k) if k.is_integer() => check_int(v as i128, k, &v.to_string()),
        (Scalar::Int(v), k) if k.is_float() => check_float(v as f64, k, &v.to_string()),
        (Scalar::Uint(v), k) if k.is_float() => check_float(v as f64, k, &v.to_string()),
        (Scalar::Float(v), k) if k.is_float() => check_float(v, k, &v.to_string()),
        (Scalar::Float(v), k) if k.is_integer() => {
            if v.is_finite() && v.fract() == 0.0 {
                check_int(v as i128, k, &v.to_string())
            } else {
                Err(ReflectError::not_convertible(
                    v.to_string(),
                    k.name(),
                    "not an integral value",
                ))
            }
        }
        (Scalar::Char(c), ScalarKind::Char) => Ok(Scalar::Char(c)),
        (Scalar::Char(c), k) if k.is_integer() => check_int(c as u32 as i128, k, &c.to_string()),
        (Scalar::Int(v), ScalarKind::Char) => int_to_char(v as i128),
        (Scalar::Uint(v), ScalarKind::Char) => int_to_char(v as i128),
        (other, k) => Err(ReflectError::not_convertible(
            coerce_to_string(&other),
            k.name(),
            "incompatible scalar kinds",
        )),
    }
}

/// Parses `literal` into a detached scalar of `kind`. Never touches a slot.
pub fn scalar_new(kind: ScalarKind, literal: &str) -> Result<Scalar, ReflectError> {
    coerce_from_str(kind, literal)
}

/// Writes `literal` into the scalar reached from `slot`, allocating every
/// unallocated optional level on the way down.
///
/// Dynamic slots receive the literal as text.
pub fn scalar_set(slot: &mut dyn Reflect, literal: &str) -> Result<(), ReflectError> {
    let slot = deref_mut(slot, true)?;
    let type_name = slot.type_name();
    match slot.reflect_mut() {
        ReflectMut::Scalar(scalar) => scalar.set_literal(literal),
        ReflectMut::Dynamic(value) => {
            *value = Value::Text(literal.to_string());
            Ok(())
        }
        _ => Err(ReflectError::not_convertible(
            literal,
            type_name,
            "destination is not a scalar",
        )),
    }
}

/// Reads the scalar reached from `value` without allocating.
///
/// Returns `None` for containers, unallocated slots and dynamic nulls.
pub fn scalar_get(value: &dyn Reflect) -> Option<Scalar> {
    let value = super::deref_ref(value)?;
    match value.reflect_ref() {
        super::ReflectRef::Scalar(scalar) => Some(scalar.get()),
        super::ReflectRef::Dynamic(dynamic) => dynamic.as_scalar(),
        _ => None,
    }
}

/// Renders the scalar reached from `value` as its canonical literal.
pub fn scalar_to_string(value: &dyn Reflect) -> Option<String> {
    let value = super::deref_ref(value)?;
    match value.reflect_ref() {
        super::ReflectRef::Scalar(scalar) => Some(scalar.literal()),
        super::ReflectRef::Dynamic(dynamic) => dynamic.as_scalar().map(|s| coerce_to_string(&s)),
        _ => None,
    }
}

/// A Rust type that occupies a scalar slot.
pub trait ScalarType: Sized {
    const KIND: ScalarKind;

    fn to_scalar(&self) -> Scalar;

    fn from_scalar(value: Scalar) -> Result<Self, ReflectError>;

    /// Canonical literal for this value.
    fn to_literal(&self) -> String;
}

/// Object-safe view of a scalar slot.
pub trait ScalarSlot {
    fn scalar_kind(&self) -> ScalarKind;

    fn get(&self) -> Scalar;

    /// Converts `value` to this slot's kind and stores it.
    fn set(&mut self, value: Scalar) -> Result<(), ReflectError>;

    fn set_literal(&mut self, literal: &str) -> Result<(), ReflectError> {
        self.set(Scalar::Str(literal.to_string()))
    }

    fn literal(&self) -> String;
}

impl<T: ScalarType> ScalarSlot for T {
    fn scalar_kind(&self) -> ScalarKind {
        T::KIND
    }

    fn get(&self) -> Scalar {
        self.to_scalar()
    }

    fn set(&mut self, value: Scalar) -> Result<(), ReflectError> {
        *self = T::from_scalar(value)?;
        Ok(())
    }

    fn literal(&self) -> String {
        self.to_literal()
    }
}

macro_rules! impl_scalar_type {
    ($variant:ident as $repr:ty => $($ty:ty : $kind:ident),+ $(,)?) => {
        $(
            impl ScalarType for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;

                fn to_scalar(&self) -> Scalar {
                    Scalar::$variant(*self as $repr)
                }

                fn from_scalar(value: Scalar) -> Result<Self, ReflectError> {
                    match convert(value, Self::KIND)? {
                        Scalar::$variant(v) => Ok(v as $ty),
                        other => Err(mismatch(&other, Self::KIND)),
                    }
                }

                fn to_literal(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

impl_scalar_type!(Int as i64 => i8: I8, i16: I16, i32: I32, i64: I64, isize: Isize);
impl_scalar_type!(Uint as u64 => u8: U8, u16: U16, u32: U32, u64: U64, usize: Usize);
impl_scalar_type!(Float as f64 => f32: F32, f64: F64);

impl ScalarType for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn to_scalar(&self) -> Scalar {
        Scalar::Bool(*self)
    }

    fn from_scalar(value: Scalar) -> Result<Self, ReflectError> {
        match convert(value, Self::KIND)? {
            Scalar::Bool(b) => Ok(b),
            other => Err(mismatch(&other, Self::KIND)),
        }
    }

    fn to_literal(&self) -> String {
        self.to_string()
    }
}

impl ScalarType for char {
    const KIND: ScalarKind = ScalarKind::Char;

    fn to_scalar(&self) -> Scalar {
        Scalar::Char(*self)
    }

    fn from_scalar(value: Scalar) -> Result<Self, ReflectError> {
        match convert(value, Self::KIND)? {
            Scalar::Char(c) => Ok(c),
            other => Err(mismatch(&other, Self::KIND)),
        }
    }

    fn to_literal(&self) -> String {
        self.to_string()
    }
}

impl ScalarType for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn to_scalar(&self) -> Scalar {
        Scalar::Str(self.clone())
    }

    fn from_scalar(value: Scalar) -> Result<Self, ReflectError> {
        Ok(match value {
            Scalar::Str(s) => s,
            other => coerce_to_string(&other),
        })
    }

    fn to_literal(&self) -> String {
        self.clone()
    }
}

fn parse_bool(literal: &str) -> Option<bool> {
    if literal.eq_ignore_ascii_case("true") {
        Some(true)
    } else if literal.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn check_int(value: i128, kind: ScalarKind, shown: &str) -> Result<Scalar, ReflectError> {
    let Some((min, max)) = kind.int_bounds() else {
        return Err(ReflectError::not_convertible(shown, kind.name(), "not an integer kind"));
    };
    if value < min || value > max {
        return Err(overflow(shown, kind));
    }
    Ok(if kind.is_unsigned() {
        Scalar::Uint(value as u64)
    } else {
        Scalar::Int(value as i64)
    })
}

fn check_float(value: f64, kind: ScalarKind, shown: &str) -> Result<Scalar, ReflectError> {
    if kind == ScalarKind::F32 && value.is_finite() && value.abs() > f32::MAX as f64 {
        return Err(overflow(shown, kind));
    }
    Ok(Scalar::Float(value))
}

fn int_to_char(value: i128) -> Result<Scalar, ReflectError> {
    u32::try_from(value)
        .ok()
        .and_then(char::from_u32)
        .map(Scalar::Char)
        .ok_or_else(|| {
            ReflectError::not_convertible(value.to_string(), "char", "not a unicode scalar value")
        })
}

fn overflow(shown: &str, kind: ScalarKind) -> ReflectError {
    ReflectError::Overflow {
        value: shown.to_string(),
        target: kind.name().to_string(),
    }
}

fn mismatch(value: &Scalar, kind: ScalarKind) -> ReflectError {
    ReflectError::not_convertible(coerce_to_string(value), kind.name(), "unexpected scalar form")
}
