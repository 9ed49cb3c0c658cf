use crate::{Connection, ConnectionConfig, Driver, Result, UnitOfWork};

/// Opens connections for one driver from one configuration. No pooling: every
/// call to [`ConnectionProvider::acquire`] opens a new connection.
pub struct ConnectionProvider<D: Driver> {
    driver: D,
    config: ConnectionConfig,
}

impl<D: Driver> ConnectionProvider<D> {
    pub fn new(driver: D, config: ConnectionConfig) -> Self {
        Self { driver, config }
    }

    pub fn from_url(driver: D, url: &str) -> Result<Self> {
        Ok(Self::new(driver, ConnectionConfig::parse(url)?))
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub async fn acquire(&self) -> Result<D::Connection> {
        match D::Connection::connect(&self.config).await {
            Ok(connection) => {
                log::info!("Connected to {}", self.config);
                Ok(connection)
            }
            Err(e) => {
                log::error!("Could not connect to {}: {}", self.config, e);
                Err(e)
            }
        }
    }

    /// Start a unit of work on a freshly acquired connection.
    pub async fn begin(&self) -> Result<UnitOfWork<D::Connection>> {
        UnitOfWork::begin(self).await
    }
}
