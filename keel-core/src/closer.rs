use crate::{Connection, Prepared};

/// Release a statement and then its connection, whichever are present.
///
/// Runs on cleanup paths, possibly while another failure is being reported:
/// errors raised while closing are logged and never returned.
pub fn release<P: Prepared, C: Connection>(statement: Option<P>, connection: Option<C>) {
    if let Some(statement) = statement {
        let description = statement.to_string();
        match statement.close() {
            Ok(()) => log::debug!("Released the statement {}", description),
            Err(e) => log::warn!("Could not release the statement {}: {}", description, e),
        }
    }
    if let Some(connection) = connection {
        match connection.close() {
            Ok(()) => log::debug!("Released the connection"),
            Err(e) => log::warn!("Could not release the connection: {}", e),
        }
    }
}
