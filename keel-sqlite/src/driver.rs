use crate::SqliteConnection;
use keel_core::Driver;

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for SqliteDriver {
    type Connection = SqliteConnection;

    const NAME: &'static str = "sqlite";
}
