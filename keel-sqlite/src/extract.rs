use anyhow::{Context, anyhow};
use keel_core::{AsValue, Value};
use libsqlite3_sys::*;
use std::{ffi::c_int, slice, str};

pub(crate) fn extract_value(statement: *mut sqlite3_stmt, index: c_int) -> anyhow::Result<Value> {
    let column_type = unsafe { sqlite3_column_type(statement, index) };
    Ok(match column_type {
        SQLITE_NULL => Value::Null,
        SQLITE_INTEGER => unsafe { sqlite3_column_int64(statement, index) }.as_value(),
        SQLITE_FLOAT => unsafe { sqlite3_column_double(statement, index) }.as_value(),
        SQLITE_BLOB => {
            let bytes = unsafe {
                let ptr = sqlite3_column_blob(statement, index) as *const u8;
                let len = sqlite3_column_bytes(statement, index).max(0) as usize;
                if ptr.is_null() || len == 0 {
                    &[][..]
                } else {
                    slice::from_raw_parts(ptr, len)
                }
            };
            Value::Blob(Some(bytes.into()))
        }
        SQLITE_TEXT => {
            let bytes = unsafe {
                let ptr = sqlite3_column_text(statement, index);
                let len = sqlite3_column_bytes(statement, index).max(0) as usize;
                if ptr.is_null() || len == 0 {
                    &[][..]
                } else {
                    slice::from_raw_parts(ptr, len)
                }
            };
            Value::Varchar(Some(
                str::from_utf8(bytes)
                    .context("Sqlite returned text that is not valid UTF-8")?
                    .to_owned(),
            ))
        }
        _ => return Err(anyhow!("Unexpected column type {}", column_type)),
    })
}

/// The key of the current row, it is always the first column.
pub(crate) fn extract_key(statement: *mut sqlite3_stmt) -> anyhow::Result<i64> {
    if unsafe { sqlite3_column_count(statement) } < 1 {
        return Err(anyhow!("The statement does not return the generated key"));
    }
    let value = extract_value(statement, 0)?;
    i64::try_from_value(value)
        .map_err(anyhow::Error::new)
        .context("The generated key is not an integer")
}
