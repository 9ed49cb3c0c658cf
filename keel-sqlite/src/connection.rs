use crate::{
    CBox, SqliteDriver, SqlitePrepared, error_message_from_ptr, prepared::finalize_statement,
};
use anyhow::{Context, anyhow};
use keel_core::{
    Connection, ConnectionConfig, Driver, Error, OpenMode, Result, truncate_long,
};
use libsqlite3_sys::{
    SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_MEMORY, SQLITE_OPEN_READONLY,
    SQLITE_OPEN_READWRITE, sqlite3, sqlite3_busy_timeout, sqlite3_close, sqlite3_column_count,
    sqlite3_errmsg, sqlite3_exec, sqlite3_extended_result_codes, sqlite3_free,
    sqlite3_open_v2, sqlite3_prepare_v2, sqlite3_sql, sqlite3_stmt, sqlite3_stmt_readonly,
};
use std::{
    ffi::{CStr, CString, c_char, c_int, c_void},
    ptr,
    sync::atomic::{AtomicPtr, Ordering},
};
use tokio::task::spawn_blocking;

pub struct SqliteConnection {
    pub(crate) connection: CBox<sqlite3>,
}

fn close_connection(connection: *mut sqlite3) {
    unsafe {
        sqlite3_close(connection);
    }
}

pub(crate) fn last_error(connection: *mut sqlite3) -> String {
    unsafe { error_message_from_ptr(&sqlite3_errmsg(connection)).to_string() }
}

/// Run every statement in `sql`, discarding rows.
pub(crate) fn exec(connection: *mut sqlite3, sql: &CStr) -> anyhow::Result<()> {
    let mut message: *mut c_char = ptr::null_mut();
    let rc = unsafe {
        sqlite3_exec(
            connection,
            sql.as_ptr(),
            None,
            ptr::null_mut(),
            &mut message,
        )
    };
    if rc != SQLITE_OK {
        let error = if message.is_null() {
            anyhow!(last_error(connection))
        } else {
            anyhow!(error_message_from_ptr(&(message as *const c_char)).to_string())
        };
        unsafe {
            sqlite3_free(message as *mut c_void);
        }
        return Err(error);
    }
    Ok(())
}

/// Prepare the single statement in `sql`. Only whitespace, semicolons and
/// comments may follow it.
fn prepare_one(connection: *mut sqlite3, sql: &str) -> anyhow::Result<CBox<sqlite3_stmt>> {
    let query =
        CString::new(sql.as_bytes()).context("Could not create a CString from the query String")?;
    let mut statement = CBox::new(ptr::null_mut(), finalize_statement);
    let mut tail = ptr::null();
    let rc = unsafe {
        sqlite3_prepare_v2(
            connection,
            query.as_ptr(),
            query.as_bytes_with_nul().len() as c_int,
            &mut *statement,
            &mut tail,
        )
    };
    if rc != SQLITE_OK {
        return Err(anyhow!(last_error(connection)));
    }
    if statement.is_null() {
        return Err(anyhow!("The query does not contain any statement"));
    }
    let mut rest = tail;
    while !rest.is_null() && unsafe { *rest } != 0 {
        let mut next = CBox::new(ptr::null_mut(), finalize_statement);
        let mut next_tail = ptr::null();
        let rc = unsafe { sqlite3_prepare_v2(connection, rest, -1, &mut *next, &mut next_tail) };
        if rc != SQLITE_OK || !next.is_null() {
            return Err(anyhow!("Cannot prepare more than one statement at a time"));
        }
        if next_tail == rest {
            break;
        }
        rest = next_tail;
    }
    Ok(statement)
}

/// A writing statement without result columns reports no keys by itself, it is
/// prepared again with `RETURNING rowid` appended to its own text. The new line
/// ends any trailing line comment.
fn returning_rowid(
    connection: *mut sqlite3,
    statement: CBox<sqlite3_stmt>,
) -> CBox<sqlite3_stmt> {
    let writes_without_rows = unsafe {
        sqlite3_column_count(*statement) == 0 && sqlite3_stmt_readonly(*statement) == 0
    };
    if !writes_without_rows {
        return statement;
    }
    let sql = unsafe { sqlite3_sql(*statement) };
    if sql.is_null() {
        return statement;
    }
    let sql = unsafe { CStr::from_ptr(sql) }.to_string_lossy().into_owned();
    let sql = format!(
        "{}\nRETURNING rowid",
        sql.trim_end().trim_end_matches(';').trim_end()
    );
    match prepare_one(connection, &sql) {
        Ok(rewritten) => rewritten,
        Err(e) => {
            // Statements like CREATE TABLE accept no RETURNING clause
            log::debug!("Generated keys are not available for the query: {:#}", e);
            statement
        }
    }
}

impl SqliteConnection {
    fn open_flags(mode: OpenMode) -> c_int {
        match mode {
            OpenMode::ReadOnly => SQLITE_OPEN_READONLY,
            OpenMode::ReadWrite => SQLITE_OPEN_READWRITE,
            OpenMode::ReadWriteCreate => SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
            OpenMode::Memory => SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_MEMORY,
        }
    }
}

impl Connection for SqliteConnection {
    type Prepared = SqlitePrepared;

    async fn connect(config: &ConnectionConfig) -> Result<SqliteConnection> {
        let name = <SqliteDriver as Driver>::NAME;
        if config.driver != name {
            let error = Error::connection(anyhow!(
                "Expected sqlite connection url to start with `{}://`, found `{}://`",
                name,
                config.driver,
            ));
            log::error!("{}", error);
            return Err(error);
        }
        let context = format!("Could not open the sqlite database `{}`", config.location);
        let location = CString::new(config.location.as_bytes())
            .with_context(|| context.clone())
            .map_err(Error::Connection)?;
        let flags = Self::open_flags(config.mode);
        let busy_timeout = config
            .busy_timeout
            .map(|v| v.as_millis().min(c_int::MAX as u128) as c_int);
        let foreign_keys = config.foreign_keys;
        let connection = spawn_blocking(move || -> anyhow::Result<CBox<sqlite3>> {
            let mut connection = CBox::new(ptr::null_mut(), close_connection);
            let rc = unsafe {
                sqlite3_open_v2(location.as_ptr(), &mut *connection, flags, ptr::null())
            };
            if rc != SQLITE_OK {
                if connection.is_null() {
                    return Err(anyhow!("Sqlite could not allocate the connection"));
                }
                return Err(anyhow!(last_error(*connection)));
            }
            unsafe {
                sqlite3_extended_result_codes(*connection, 1);
                if let Some(timeout) = busy_timeout {
                    sqlite3_busy_timeout(*connection, timeout);
                }
            }
            exec(
                *connection,
                if foreign_keys {
                    c"PRAGMA foreign_keys = ON"
                } else {
                    c"PRAGMA foreign_keys = OFF"
                },
            )
            .context("Could not configure the foreign keys enforcement")?;
            Ok(connection)
        })
        .await
        .map_err(|e| Error::connection(e))?
        .context(context)
        .map_err(|e| {
            let error = Error::Connection(e);
            log::error!("{}", error);
            error
        })?;
        Ok(Self { connection })
    }

    async fn prepare(&mut self, sql: String, generated_keys: bool) -> Result<SqlitePrepared> {
        let connection = AtomicPtr::new(*self.connection);
        let context = format!("While preparing the query:\n{}", truncate_long!(sql));
        let statement = spawn_blocking(move || -> anyhow::Result<CBox<sqlite3_stmt>> {
            let connection = connection.load(Ordering::Relaxed);
            let statement = prepare_one(connection, &sql)?;
            Ok(if generated_keys {
                returning_rowid(connection, statement)
            } else {
                statement
            })
        })
        .await
        .map_err(|e| Error::statement(e))?
        .map_err(|e| {
            let error = Error::Statement(e.context(context));
            log::error!("{}", error);
            error
        })?;
        Ok(SqlitePrepared::new(statement, generated_keys))
    }

    async fn execute_script(&mut self, sql: String) -> Result<()> {
        let connection = AtomicPtr::new(*self.connection);
        let context = format!("While running the script:\n{}", truncate_long!(sql));
        spawn_blocking(move || -> anyhow::Result<()> {
            let script =
                CString::new(sql).context("Could not create a CString from the script String")?;
            exec(connection.load(Ordering::Relaxed), &script)
        })
        .await
        .map_err(|e| Error::statement(e))?
        .map_err(|e| {
            let error = Error::Statement(e.context(context));
            log::error!("{}", error);
            error
        })
    }

    fn close(mut self) -> Result<()> {
        let connection = self.connection.take();
        let rc = unsafe { sqlite3_close(connection) };
        if rc != SQLITE_OK {
            // Statements still alive keep the handle open, it is left to them
            return Err(Error::connection(
                anyhow!(last_error(connection)).context("Could not close the sqlite connection"),
            ));
        }
        Ok(())
    }
}
