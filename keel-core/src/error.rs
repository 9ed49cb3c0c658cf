/// Failure of a unit of work.
///
/// Drivers build context-rich [`anyhow::Error`] values internally and classify
/// them into one of these kinds at the trait boundary, so callers can react to
/// the kind without parsing messages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend could not be reached or refused to open the database.
    #[error("connection error: {0:#}")]
    Connection(anyhow::Error),
    /// Text that should hold a `DD/MM/YYYY` date did not.
    #[error("date format error: `{input}` is not a valid DD/MM/YYYY date")]
    DateFormat {
        input: String,
        source: time::error::Parse,
    },
    /// The backend rejected the statement, or a parameter could not be bound.
    #[error("statement error: {0:#}")]
    Statement(anyhow::Error),
    /// The unit of work was already released when `0` was attempted.
    #[error("cannot {0}: the unit of work is closed")]
    Closed(&'static str),
    /// Invalid or missing configuration.
    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),
}

impl Error {
    pub fn connection(error: impl Into<anyhow::Error>) -> Self {
        Self::Connection(error.into())
    }

    pub fn statement(error: impl Into<anyhow::Error>) -> Self {
        Self::Statement(error.into())
    }

    pub fn config(error: impl Into<anyhow::Error>) -> Self {
        Self::Config(error.into())
    }

    /// Short, stable name of the error kind, meant for log records.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Connection(..) => "connection",
            Error::DateFormat { .. } => "date_format",
            Error::Statement(..) => "statement",
            Error::Closed(..) => "closed",
            Error::Config(..) => "config",
        }
    }
}
