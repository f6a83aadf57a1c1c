//! Dynamically typed values passed between actions and bound objects.

use crate::{bindable::Bindable, error::BindError};
use std::fmt;

/// A value assigned to a property or passed as a method argument.
///
/// Markup only carries text, so most values arrive as [`Value::Str`] and are
/// converted to the target's field type through [`FromValue`].
#[derive(Debug, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// Text.
    Str(String),
    /// An object built by the engine.
    Object(Box<dyn Bindable>),
}

impl Value {
    /// Wraps a bindable object.
    pub fn object<T: Bindable>(object: T) -> Self {
        Value::Object(Box::new(object))
    }

    /// Converts into `T`.
    pub fn convert<T: FromValue>(self) -> Result<T, BindError> {
        T::from_value(self)
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The text, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Copies scalar values. Objects are uniquely owned and yield `None`.
    pub fn try_clone(&self) -> Option<Value> {
        Some(match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Float(*f),
            Value::Str(s) => Value::Str(s.clone()),
            Value::Object(_) => return None,
        })
    }

    /// Short description used in conversion errors.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_owned(),
            Value::Bool(b) => format!("bool {b}"),
            Value::Int(i) => format!("integer {i}"),
            Value::Float(f) => format!("float {f}"),
            Value::Str(s) => format!("string {s:?}"),
            Value::Object(o) => format!("object `{}`", o.type_name()),
        }
    }
}

impl PartialEq for Value {
    /// Scalars compare by value; objects never compare equal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Object(o) => write!(f, "<{}>", o.type_name()),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Box<dyn Bindable>> for Value {
    fn from(o: Box<dyn Bindable>) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

macro_rules! int_into_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Int(i64::from(i))
            }
        })*
    };
}

int_into_value!(i8, i16, i32, i64, u8, u16, u32);

/// Conversion from a [`Value`] into a concrete field or argument type.
pub trait FromValue: Sized {
    /// Performs the conversion.
    fn from_value(value: Value) -> Result<Self, BindError>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, BindError> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, BindError> {
        match value {
            Value::Str(s) => Ok(s),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok(value.to_string()),
            other => Err(BindError::conversion("String", other.describe())),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, BindError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(i) => Ok(i != 0),
            Value::Str(ref s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "on" | "1" => Ok(true),
                "false" | "no" | "n" | "off" | "0" => Ok(false),
                _ => Err(BindError::conversion("bool", value.describe())),
            },
            other => Err(BindError::conversion("bool", other.describe())),
        }
    }
}

impl FromValue for char {
    fn from_value(value: Value) -> Result<Self, BindError> {
        if let Value::Str(ref s) = value {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(c);
            }
        }
        Err(BindError::conversion("char", value.describe()))
    }
}

macro_rules! int_from_value {
    ($($t:ty),*) => {
        $(impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self, BindError> {
                let expected = stringify!($t);
                match value {
                    Value::Int(i) => <$t>::try_from(i)
                        .map_err(|_| BindError::conversion(expected, value.describe())),
                    Value::Str(ref s) => s
                        .trim()
                        .parse::<$t>()
                        .map_err(|_| BindError::conversion(expected, value.describe())),
                    other => Err(BindError::conversion(expected, other.describe())),
                }
            }
        })*
    };
}

int_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_from_value {
    ($($t:ty),*) => {
        $(impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self, BindError> {
                let expected = stringify!($t);
                match value {
                    Value::Float(f) => Ok(f as $t),
                    Value::Int(i) => Ok(i as $t),
                    Value::Str(ref s) => s
                        .trim()
                        .parse::<$t>()
                        .map_err(|_| BindError::conversion(expected, value.describe())),
                    other => Err(BindError::conversion(expected, other.describe())),
                }
            }
        })*
    };
}

float_from_value!(f32, f64);

impl FromValue for Box<dyn Bindable> {
    fn from_value(value: Value) -> Result<Self, BindError> {
        match value {
            Value::Object(o) => Ok(o),
            other => Err(BindError::conversion("object", other.describe())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, BindError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Converts an object value into a concrete bindable type.
///
/// `#[derive(Bindable)]` uses this to make derived types [`FromValue`].
pub fn object_from_value<T: Bindable>(value: Value) -> Result<T, BindError> {
    let expected = std::any::type_name::<T>();
    match value {
        Value::Object(o) if o.is::<T>() => o
            .downcast::<T>()
            .map(|b| *b)
            .ok_or_else(|| BindError::conversion(expected, "object")),
        other => Err(BindError::conversion(expected, other.describe())),
    }
}
