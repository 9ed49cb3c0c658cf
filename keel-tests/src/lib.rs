mod departments;
mod lifecycle;
mod schema;
mod seller;

use crate::{
    departments::{departments, generated_keys_for_any_insert, no_rows},
    lifecycle::{double_execute, malformed_query},
    seller::{carl_purple, malformed_birth_date, missing_department},
};
use keel::{ConnectionProvider, Driver};
use log::LevelFilter;
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run every scenario against the database `provider` points to.
///
/// The scenarios drop and recreate the `department` and `seller` tables.
pub async fn execute_tests<D: Driver>(provider: &ConnectionProvider<D>) {
    carl_purple(provider).await;
    missing_department(provider).await;
    malformed_birth_date(provider).await;
    departments(provider).await;
    no_rows(provider).await;
    generated_keys_for_any_insert(provider).await;
    double_execute(provider).await;
    malformed_query(provider).await;
}

/// Mute logging while `code` runs. Bindings made inside stay in scope.
#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    };
}
