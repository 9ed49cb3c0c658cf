use time::Date;

/// Dynamically typed value that can be bound to a statement parameter or
/// read back from a result row.
///
/// Typed variants carry an `Option` so a typed NULL can still be bound.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float64(Option<f64>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Boolean(None)
                | Value::Int32(None)
                | Value::Int64(None)
                | Value::Float64(None)
                | Value::Varchar(None)
                | Value::Blob(None)
                | Value::Date(None)
        )
    }

    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}
