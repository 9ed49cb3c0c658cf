use crate::{AsValue, Result, Value, parse_date};

/// A statement parameter as supplied by the caller.
///
/// Most parameters are ready values. A [`Parameter::DateText`] holds a
/// `DD/MM/YYYY` string that is parsed only when the parameter is bound, so a
/// malformed date surfaces as a failure of the unit of work that binds it.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Value(Value),
    DateText(String),
}

impl Parameter {
    pub fn date_text(text: impl Into<String>) -> Self {
        Parameter::DateText(text.into())
    }

    /// Resolve into the value to bind.
    pub fn into_value(self) -> Result<Value> {
        match self {
            Parameter::Value(value) => Ok(value),
            Parameter::DateText(text) => Ok(Value::Date(Some(parse_date(&text)?))),
        }
    }
}

impl<T: AsValue> From<T> for Parameter {
    fn from(value: T) -> Self {
        Parameter::Value(value.as_value())
    }
}

impl From<&str> for Parameter {
    fn from(value: &str) -> Self {
        Parameter::Value(Value::Varchar(Some(value.into())))
    }
}
