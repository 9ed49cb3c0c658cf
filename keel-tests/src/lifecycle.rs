use crate::{schema::reset, silent_logs};
use keel::{ConnectionProvider, Driver, Error, UnitOfWorkState, seller::INSERT_DEPARTMENTS};

pub async fn double_execute<D: Driver>(provider: &ConnectionProvider<D>) {
    let _tables = reset(provider, false).await;
    let mut unit = provider.begin().await.expect("Failed to begin");
    assert_eq!(unit.state(), UnitOfWorkState::Connected);
    unit.prepare(INSERT_DEPARTMENTS, true)
        .await
        .expect("Failed to prepare");
    assert_eq!(unit.state(), UnitOfWorkState::Prepared);
    let result = unit.execute().await.expect("Failed to execute");
    assert_eq!(unit.state(), UnitOfWorkState::Executed);
    assert_eq!(result.rows_affected, 2);

    silent_logs! {
        let again = unit.execute().await;
    }
    assert!(matches!(again, Err(Error::Statement(..))), "{:?}", again);
    assert_eq!(unit.state(), UnitOfWorkState::Closed);

    let closed = unit.prepare("SELECT 1", false).await.map(|_| ());
    assert!(matches!(closed, Err(Error::Closed(..))), "{:?}", closed);
    let closed = unit.bind(1).map(|_| ());
    assert!(matches!(closed, Err(Error::Closed(..))), "{:?}", closed);
    unit.close();
}

pub async fn malformed_query<D: Driver>(provider: &ConnectionProvider<D>) {
    let _tables = reset(provider, false).await;
    for sql in [
        "INSERT INTO nowhere (Name) VALUES (?)",
        "INSRT INTO department (Name) VALUES (?)",
        "INSERT INTO department (Name) VALUES (?); DELETE FROM department",
    ] {
        let mut unit = provider.begin().await.expect("Failed to begin");
        silent_logs! {
            let result = unit.prepare_insert(sql, ["D1"], true).await;
        }
        assert!(
            matches!(result, Err(Error::Statement(..))),
            "`{sql}` must fail, got {:?}",
            result
        );
        assert_eq!(unit.state(), UnitOfWorkState::Closed);
    }

    // Binding more parameters than placeholders
    let mut unit = provider.begin().await.expect("Failed to begin");
    silent_logs! {
        let result = unit
            .prepare_insert("INSERT INTO department (Name) VALUES (?)", ["D1", "D2"], false)
            .await;
    }
    assert!(matches!(result, Err(Error::Statement(..))), "{:?}", result);

    // Missing parameters
    let mut unit = provider.begin().await.expect("Failed to begin");
    silent_logs! {
        let result = unit
            .prepare_insert("INSERT INTO department (Id, Name) VALUES (?, ?)", [1], false)
            .await;
    }
    assert!(matches!(result, Err(Error::Statement(..))), "{:?}", result);
}
