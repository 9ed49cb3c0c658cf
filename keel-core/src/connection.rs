use crate::{ConnectionConfig, Prepared, Result};
use std::future::Future;

/// One live link to a database backend.
///
/// A connection is exclusively owned by the scope that opened it. Closing
/// consumes it, so it cannot be used afterwards.
pub trait Connection: Send + Sized {
    type Prepared: Prepared;

    /// Open a new connection.
    ///
    /// Fails with [`crate::Error::Connection`] when the url names another
    /// driver or the backend cannot be opened.
    fn connect(config: &ConnectionConfig) -> impl Future<Output = Result<Self>> + Send;

    /// Prepare exactly one statement with positional `?` placeholders.
    ///
    /// When `generated_keys` is set, executing the statement collects the keys
    /// assigned by the backend.
    fn prepare(
        &mut self,
        sql: String,
        generated_keys: bool,
    ) -> impl Future<Output = Result<Self::Prepared>> + Send;

    /// Run one or more statements without parameters, discarding any rows.
    fn execute_script(&mut self, sql: String) -> impl Future<Output = Result<()>> + Send;

    fn close(self) -> Result<()>;
}
