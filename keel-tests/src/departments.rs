use crate::schema::reset;
use indoc::indoc;
use keel::{
    ConnectionProvider, Driver,
    seller::{insert_departments, report},
};

pub async fn departments<D: Driver>(provider: &ConnectionProvider<D>) {
    let _tables = reset(provider, false).await;
    let result = insert_departments(provider)
        .await
        .expect("Failed to insert the departments");
    assert_eq!(result.rows_affected, 2);
    let keys = result.generated_keys.collect::<Vec<_>>();
    assert_eq!(keys.len(), 2);
    assert!(keys[0] > 0);
    assert!(keys[0] < keys[1], "Keys must follow the insertion order");

    let result = insert_departments(provider)
        .await
        .expect("Failed to insert the departments again");
    let lines = report(result);
    assert_eq!(
        lines,
        [
            format!("Done! Id: {}", keys[1] + 1),
            format!("Done! Id: {}", keys[1] + 2),
        ]
    );
}

pub async fn no_rows<D: Driver>(provider: &ConnectionProvider<D>) {
    let _tables = reset(provider, true).await;
    let mut unit = provider.begin().await.expect("Failed to begin");
    let result = unit
        .prepare_insert(
            "INSERT INTO department (Name) SELECT 'Nobody' WHERE 0",
            Vec::<&str>::new(),
            true,
        )
        .await
        .expect("Failed to run an insert matching nothing");
    unit.close();
    assert_eq!(result.rows_affected, 0);
    assert_eq!(result.generated_keys.len(), 0);

    let mut unit = provider.begin().await.expect("Failed to begin");
    let result = unit
        .prepare_insert(
            "INSERT INTO department (Name) SELECT Name FROM department WHERE Id = ?",
            [404],
            true,
        )
        .await
        .expect("Failed to run an insert matching nothing");
    unit.close();
    assert_eq!(report(result), ["No rows affected!".to_string()]);
}

pub async fn generated_keys_for_any_insert<D: Driver>(provider: &ConnectionProvider<D>) {
    let _tables = reset(provider, false).await;
    let queries: [(&str, Vec<&str>); 5] = [
        (
            "INSERT INTO department (Name) VALUES ('Returning customers')",
            vec![],
        ),
        ("INSERT INTO department (Name) VALUES (?) -- add one", vec!["D2"]),
        (
            indoc! {"
                WITH names (Name) AS (SELECT ?)
                INSERT INTO department (Name) SELECT Name FROM names
            "},
            vec!["D3"],
        ),
        ("insert into department (Name) values (?);", vec!["D4"]),
        (
            "INSERT INTO department (Name) VALUES (?) RETURNING Id",
            vec!["D5"],
        ),
    ];
    for (id, (sql, parameters)) in (1..).zip(queries) {
        let mut unit = provider.begin().await.expect("Failed to begin");
        let result = unit
            .prepare_insert(sql, parameters, true)
            .await
            .expect(&format!("Failed to run `{sql}`"));
        unit.close();
        assert_eq!(result.rows_affected, 1, "`{sql}`");
        assert_eq!(report(result), [format!("Done! Id: {id}")], "`{sql}`");
    }
}
