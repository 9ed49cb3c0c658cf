use crate::{
    schema::{count_sellers, reset},
    silent_logs,
};
use keel::{
    ConnectionProvider, Driver, Error, Parameter, Value,
    seller::{NewSeller, insert_seller, report},
};
use time::macros::date;

pub async fn carl_purple<D: Driver>(provider: &ConnectionProvider<D>) {
    let _tables = reset(provider, true).await;
    let seller = NewSeller::carl_purple();
    let result = insert_seller(provider, &seller)
        .await
        .expect("Failed to insert Carl Purple");
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.generated_keys.len(), 1);
    let lines = report(result);
    assert_eq!(lines.len(), 1);
    let id = lines[0]
        .strip_prefix("Done! Id: ")
        .and_then(|v| v.parse::<i64>().ok())
        .expect("Unexpected report line");
    assert!(id > 0);

    assert_eq!(count_sellers(provider, &seller).await, 1);

    // The key is the id of the stored row
    let mut unit = provider.begin().await.expect("Failed to begin");
    unit.prepare(
        "UPDATE seller SET BaseSalary = BaseSalary WHERE Id = ? AND BirthDate = ?",
        false,
    )
    .await
    .expect("Failed to prepare the lookup");
    unit.bind(id)
        .expect("Failed to bind the id")
        .bind(Value::Date(Some(date!(1985 - 04 - 22))))
        .expect("Failed to bind the birth date");
    let result = unit.execute().await.expect("Failed to look up Carl Purple");
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.generated_keys.len(), 0);
    unit.close();
}

pub async fn missing_department<D: Driver>(provider: &ConnectionProvider<D>) {
    let _tables = reset(provider, false).await;
    let seller = NewSeller::carl_purple();
    silent_logs! {
        let result = insert_seller(provider, &seller).await;
    }
    assert!(
        matches!(result, Err(Error::Statement(..))),
        "Department 4 does not exist, got {:?}",
        result
    );
    assert_eq!(count_sellers(provider, &seller).await, 0);
}

pub async fn malformed_birth_date<D: Driver>(provider: &ConnectionProvider<D>) {
    let _tables = reset(provider, true).await;
    for birth_date in ["1985-04-22", "22-04-1985", "31/02/1985", "22/13/1985", "22/04/1985 "] {
        let seller = NewSeller {
            birth_date: birth_date.into(),
            ..NewSeller::carl_purple()
        };
        silent_logs! {
            let result = insert_seller(provider, &seller).await;
        }
        match result {
            Err(Error::DateFormat { input, .. }) => assert_eq!(input, birth_date),
            other => panic!("Expected a date error for `{birth_date}`, got {other:?}"),
        }
    }
    assert_eq!(count_sellers(provider, &NewSeller::carl_purple()).await, 0);

    // The same row binds once the date is valid
    let mut unit = provider.begin().await.expect("Failed to begin");
    let result = unit
        .prepare_insert(
            keel::seller::INSERT_SELLER,
            [
                Parameter::from("Anna Red"),
                "anna@gmail.com".into(),
                Parameter::date_text("29/02/2000"),
                2500.0_f64.into(),
                1.into(),
            ],
            true,
        )
        .await
        .expect("Failed to insert Anna Red");
    unit.close();
    assert_eq!(result.rows_affected, 1);
}
