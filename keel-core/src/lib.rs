mod as_value;
mod closer;
mod config;
mod connection;
mod date;
mod driver;
mod error;
mod parameter;
mod prepared;
mod provider;
mod query;
mod unit_of_work;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use closer::*;
pub use config::*;
pub use connection::*;
pub use date::*;
pub use driver::*;
pub use error::*;
pub use parameter::*;
pub use prepared::*;
pub use provider::*;
pub use query::*;
pub use unit_of_work::*;
pub use util::*;
pub use value::*;

pub type Result<T> = std::result::Result<T, Error>;
