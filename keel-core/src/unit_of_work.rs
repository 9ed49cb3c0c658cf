use crate::{
    Connection, ConnectionProvider, Driver, Error, ExecutionResult, Parameter, Prepared, Result,
    release,
};
use anyhow::anyhow;
use std::fmt::{self, Display};

/// Lifecycle of a [`UnitOfWork`].
///
/// `Idle -> Connected -> Prepared -> Executed -> Closed`, plus a direct
/// transition to `Closed` from any open state when an operation fails.
/// `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOfWorkState {
    Idle,
    Connected,
    Prepared,
    Executed,
    Closed,
}

impl Display for UnitOfWorkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitOfWorkState::Idle => "idle",
            UnitOfWorkState::Connected => "connected",
            UnitOfWorkState::Prepared => "prepared",
            UnitOfWorkState::Executed => "executed",
            UnitOfWorkState::Closed => "closed",
        })
    }
}

/// One acquire, execute, release sequence over an exclusively owned connection.
///
/// Resources are released exactly once: by [`UnitOfWork::close`], as soon as
/// any operation fails, or when the unit of work is dropped (for example
/// because the caller returned early with `?`). Release failures are logged and
/// never replace the error being returned.
///
/// ```rust,ignore
/// let mut unit = provider.begin().await?;
/// let result = unit
///     .prepare_insert(
///         "INSERT INTO seller (Name, BirthDate) VALUES (?, ?)",
///         [Parameter::from("Carl Purple"), Parameter::date_text("22/04/1985")],
///         true,
///     )
///     .await?;
/// unit.close();
/// ```
pub struct UnitOfWork<C: Connection> {
    state: UnitOfWorkState,
    connection: Option<C>,
    statement: Option<C::Prepared>,
}

impl<C: Connection> UnitOfWork<C> {
    pub async fn begin<D>(provider: &ConnectionProvider<D>) -> Result<Self>
    where
        D: Driver<Connection = C>,
    {
        let mut result = Self {
            state: UnitOfWorkState::Idle,
            connection: None,
            statement: None,
        };
        result.connection = Some(provider.acquire().await?);
        result.transition(UnitOfWorkState::Connected);
        Ok(result)
    }

    /// Wrap a connection that is already open.
    pub fn with_connection(connection: C) -> Self {
        Self {
            state: UnitOfWorkState::Connected,
            connection: Some(connection),
            statement: None,
        }
    }

    pub fn state(&self) -> UnitOfWorkState {
        self.state
    }

    /// Run parameterless statements on the connection before any statement is prepared.
    pub async fn execute_script(&mut self, sql: impl Into<String>) -> Result<()> {
        self.require(UnitOfWorkState::Connected, "run a script")?;
        let Some(connection) = self.connection.as_mut() else {
            return Err(Error::Closed("run a script"));
        };
        let result = connection.execute_script(sql.into()).await;
        result.map_err(|e| self.fail(e))
    }

    pub async fn prepare(
        &mut self,
        sql: impl Into<String>,
        generated_keys: bool,
    ) -> Result<&mut Self> {
        self.require(UnitOfWorkState::Connected, "prepare")?;
        let Some(connection) = self.connection.as_mut() else {
            return Err(Error::Closed("prepare"));
        };
        let result = connection.prepare(sql.into(), generated_keys).await;
        match result {
            Ok(statement) => {
                self.statement = Some(statement);
                self.transition(UnitOfWorkState::Prepared);
                Ok(self)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Bind the next parameter of the prepared statement.
    pub fn bind(&mut self, parameter: impl Into<Parameter>) -> Result<&mut Self> {
        self.require(UnitOfWorkState::Prepared, "bind")?;
        let result = match (parameter.into().into_value(), self.statement.as_mut()) {
            (Ok(value), Some(statement)) => statement.bind(value).map(|_| ()),
            (Ok(..), None) => Err(Error::Closed("bind")),
            (Err(e), ..) => Err(e),
        };
        match result {
            Ok(()) => Ok(self),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Execute the prepared statement. A statement executes at most once.
    pub async fn execute(&mut self) -> Result<ExecutionResult> {
        self.require(UnitOfWorkState::Prepared, "execute")?;
        let Some(statement) = self.statement.as_mut() else {
            return Err(Error::Closed("execute"));
        };
        let result = statement.execute().await;
        match result {
            Ok(result) => {
                self.transition(UnitOfWorkState::Executed);
                Ok(result)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Prepare `sql`, bind `parameters` in order and execute it once.
    pub async fn prepare_insert<I>(
        &mut self,
        sql: impl Into<String>,
        parameters: I,
        generated_keys: bool,
    ) -> Result<ExecutionResult>
    where
        I: IntoIterator,
        I::Item: Into<Parameter>,
    {
        self.prepare(sql, generated_keys).await?;
        for parameter in parameters {
            self.bind(parameter)?;
        }
        self.execute().await
    }

    /// Release the statement and the connection.
    pub fn close(mut self) {
        self.release_resources();
    }

    fn require(&mut self, expected: UnitOfWorkState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            return Ok(());
        }
        if self.state == UnitOfWorkState::Closed {
            return Err(Error::Closed(operation));
        }
        let error = Error::statement(anyhow!(
            "Cannot {} while the unit of work is {}, it must be {}",
            operation,
            self.state,
            expected,
        ));
        Err(self.fail(error))
    }

    fn fail(&mut self, error: Error) -> Error {
        log::debug!(
            "Unit of work failed while {} ({}), releasing its resources",
            self.state,
            error.kind(),
        );
        self.release_resources();
        error
    }

    fn release_resources(&mut self) {
        if self.state == UnitOfWorkState::Closed {
            return;
        }
        release(self.statement.take(), self.connection.take());
        self.transition(UnitOfWorkState::Closed);
    }

    fn transition(&mut self, state: UnitOfWorkState) {
        log::debug!("Unit of work {} -> {}", self.state, state);
        self.state = state;
    }
}

impl<C: Connection> Drop for UnitOfWork<C> {
    fn drop(&mut self) {
        self.release_resources();
    }
}
