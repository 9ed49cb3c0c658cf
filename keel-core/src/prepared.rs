use crate::{AsValue, ExecutionResult, Result};
use std::{fmt::Display, future::Future};

/// A parameterized, backend-prepared statement.
///
/// # Binding Semantics
/// * `bind` sets the parameter after the last one bound (starting from 1).
/// * `bind_index` sets the parameter at `index` (from 1).
///
/// Binding methods return `&mut Self` for fluent chaining:
/// ```rust,ignore
/// prepared.bind("Carl Purple")?.bind(3000.0)?;
/// ```
///
/// A statement executes at most once; a second `execute` fails.
pub trait Prepared: Send + Display {
    /// Bind the next parameter.
    fn bind(&mut self, value: impl AsValue) -> Result<&mut Self>;
    /// Bind a value at a specific index.
    fn bind_index(&mut self, value: impl AsValue, index: u64) -> Result<&mut Self>;
    /// Execute the statement.
    fn execute(&mut self) -> impl Future<Output = Result<ExecutionResult>> + Send;
    /// Release the backend handle.
    fn close(self) -> Result<()>;
}
