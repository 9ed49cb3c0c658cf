use crate::{CBox, connection::last_error, extract::extract_key};
use anyhow::anyhow;
use keel_core::{AsValue, Error, ExecutionResult, Prepared, Result, Value, truncate_long};
use libsqlite3_sys::*;
use std::{
    ffi::{CStr, c_char, c_int, c_void},
    fmt::{self, Display},
    sync::atomic::{AtomicPtr, Ordering},
};
use tokio::task::spawn_blocking;

pub(crate) fn finalize_statement(statement: *mut sqlite3_stmt) {
    unsafe {
        sqlite3_finalize(statement);
    }
}

fn bind_text(statement: *mut sqlite3_stmt, index: c_int, text: &str) -> c_int {
    unsafe {
        sqlite3_bind_text(
            statement,
            index,
            text.as_ptr() as *const c_char,
            text.len() as c_int,
            SQLITE_TRANSIENT(),
        )
    }
}

pub struct SqlitePrepared {
    pub(crate) statement: CBox<sqlite3_stmt>,
    pub(crate) index: u64,
    pub(crate) bound: Vec<bool>,
    pub(crate) generated_keys: bool,
    pub(crate) executed: bool,
}

impl SqlitePrepared {
    pub(crate) fn new(statement: CBox<sqlite3_stmt>, generated_keys: bool) -> Self {
        let count = unsafe { sqlite3_bind_parameter_count(*statement) }.max(0) as usize;
        Self {
            statement,
            index: 1,
            bound: vec![false; count],
            generated_keys,
            executed: false,
        }
    }

    /// Text of the statement as prepared.
    pub fn sql(&self) -> String {
        unsafe {
            let sql = sqlite3_sql(*self.statement);
            if sql.is_null() {
                return String::new();
            }
            CStr::from_ptr(sql).to_string_lossy().into_owned()
        }
    }

    fn error(&self, error: anyhow::Error) -> Error {
        let error = Error::Statement(error);
        log::error!("{}", error);
        error
    }
}

impl Prepared for SqlitePrepared {
    fn bind(&mut self, value: impl AsValue) -> Result<&mut Self> {
        let index = self.index;
        self.bind_index(value, index)
    }

    fn bind_index(&mut self, value: impl AsValue, index: u64) -> Result<&mut Self> {
        let sql = self.sql();
        // Indexes start from 1
        let position = match c_int::try_from(index) {
            Ok(position) if position > 0 => position,
            _ => return Err(self.error(anyhow!(
                "Parameter index {} is out of range for query:\n{}",
                index,
                truncate_long!(sql)
            ))),
        };
        let statement = *self.statement;
        let rc = unsafe {
            match value.as_value() {
                Value::Null
                | Value::Boolean(None)
                | Value::Int32(None)
                | Value::Int64(None)
                | Value::Float64(None)
                | Value::Varchar(None)
                | Value::Blob(None)
                | Value::Date(None) => sqlite3_bind_null(statement, position),
                Value::Boolean(Some(v)) => sqlite3_bind_int(statement, position, v as c_int),
                Value::Int32(Some(v)) => sqlite3_bind_int(statement, position, v),
                Value::Int64(Some(v)) => sqlite3_bind_int64(statement, position, v),
                Value::Float64(Some(v)) => sqlite3_bind_double(statement, position, v),
                Value::Varchar(Some(v)) => bind_text(statement, position, &v),
                Value::Blob(Some(v)) => sqlite3_bind_blob(
                    statement,
                    position,
                    v.as_ptr() as *const c_void,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                // Stored as ISO 8601 text, the format sqlite date functions understand
                Value::Date(Some(v)) => bind_text(statement, position, &v.to_string()),
            }
        };
        if rc != SQLITE_OK {
            let db = unsafe { sqlite3_db_handle(statement) };
            return Err(self.error(anyhow!(last_error(db)).context(format!(
                "Cannot bind parameter {} to query:\n{}",
                index,
                truncate_long!(sql)
            ))));
        }
        if let Some(bound) = self.bound.get_mut(index as usize - 1) {
            *bound = true;
        }
        self.index = index + 1;
        Ok(self)
    }

    async fn execute(&mut self) -> Result<ExecutionResult> {
        let sql = self.sql();
        if self.executed {
            return Err(self.error(anyhow!(
                "The statement was already executed:\n{}",
                truncate_long!(sql)
            )));
        }
        self.executed = true;
        if let Some(missing) = self.bound.iter().position(|v| !v) {
            return Err(self.error(anyhow!(
                "Parameter {} was never bound to query:\n{}",
                missing + 1,
                truncate_long!(sql)
            )));
        }
        let statement = AtomicPtr::new(*self.statement);
        let generated_keys = self.generated_keys;
        let result = spawn_blocking(move || -> anyhow::Result<ExecutionResult> {
            let statement = statement.load(Ordering::Relaxed);
            let db = unsafe { sqlite3_db_handle(statement) };
            let before = unsafe { sqlite3_total_changes64(db) };
            let mut keys = Vec::new();
            loop {
                match unsafe { sqlite3_step(statement) } {
                    SQLITE_DONE => break,
                    SQLITE_ROW => {
                        if generated_keys {
                            keys.push(extract_key(statement)?);
                        }
                    }
                    _ => return Err(anyhow!(last_error(db))),
                }
            }
            // Total changes also count the work of triggers, changes are the statement's own
            let rows_affected = unsafe {
                if sqlite3_total_changes64(db) == before {
                    0
                } else {
                    sqlite3_changes64(db) as u64
                }
            };
            Ok(ExecutionResult::new(rows_affected, keys))
        })
        .await
        .map_err(|e| Error::statement(e))?;
        result.map_err(|e| {
            self.error(e.context(format!(
                "While executing the query:\n{}",
                truncate_long!(sql)
            )))
        })
    }

    fn close(mut self) -> Result<()> {
        let statement = self.statement.take();
        let rc = unsafe { sqlite3_finalize(statement) };
        if rc != SQLITE_OK {
            // Finalize always succeeds, the code repeats the outcome of the last step
            log::trace!("Finalized a statement whose last evaluation returned {}", rc);
        }
        Ok(())
    }
}

impl Display for SqlitePrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sql = self.sql();
        write!(f, "`{}`", truncate_long!(sql))
    }
}
