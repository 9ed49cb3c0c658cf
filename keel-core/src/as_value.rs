use crate::{Error, Result, Value, truncate_long};
use anyhow::anyhow;
use std::any;
use time::{Date, macros::format_description};

/// Conversion between native Rust types and the dynamically typed [`Value`]
/// used for parameters and row decoding.
///
/// # Conversion contract
/// - `as_value` never fails and never loses information.
/// - `try_from_value` accepts the canonical variant for the type and may
///   accept other variants when the conversion is exact (for example an
///   `Int64` holding a value that fits into `i32`). Out of range values are
///   rejected with an error naming both the value and the target type.
///
/// # Examples
/// ```rust
/// use keel_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The NULL variant that matches this type.
    fn as_empty_value() -> Value;
    /// Convert this value into its owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::statement(anyhow!(
        "Cannot convert {:?} to {}",
        value,
        any::type_name::<T>(),
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    $($pat_rest => $expr_rest,)*
                    #[allow(unreachable_patterns)]
                    _ => Err(conversion_error::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value!(
    bool,
    Value::Boolean,
    Value::Int32(Some(v)) => Ok(v != 0),
    Value::Int64(Some(v)) => Ok(v != 0),
);
impl_as_value!(
    i32,
    Value::Int32,
    Value::Int64(Some(v)) => i32::try_from(v).map_err(|_| {
        Error::statement(anyhow!("Value {v}: i64 is out of range for i32"))
    }),
);
impl_as_value!(
    i64,
    Value::Int64,
    Value::Int32(Some(v)) => Ok(v as _),
);
impl_as_value!(
    f64,
    Value::Float64,
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Int64(Some(v)) => {
        let result = v as f64;
        if result as i64 != v {
            return Err(Error::statement(anyhow!(
                "Value {v}: i64 cannot be represented exactly as f64"
            )));
        }
        Ok(result)
    },
);
impl_as_value!(String, Value::Varchar);
impl_as_value!(Vec<u8>, Value::Blob);
impl_as_value!(
    Date,
    Value::Date,
    Value::Varchar(Some(ref v)) => {
        Date::parse(v, format_description!("[year]-[month]-[day]")).map_err(|e| {
            Error::statement(anyhow::Error::new(e).context(format!(
                "Cannot extract a date from `{}`",
                truncate_long!(v)
            )))
        })
    },
);

impl AsValue for Value {
    fn as_empty_value() -> Value {
        Value::Null
    }
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}
