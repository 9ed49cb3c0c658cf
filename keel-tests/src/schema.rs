use indoc::indoc;
use keel::{ConnectionProvider, Driver};
use std::sync::LazyLock;
use tokio::sync::{Mutex, MutexGuard};

static TABLES: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

const CREATE_TABLES: &str = indoc! {"
    DROP TABLE IF EXISTS seller;
    DROP TABLE IF EXISTS department;
    CREATE TABLE department (
        Id INTEGER PRIMARY KEY AUTOINCREMENT,
        Name VARCHAR(60) NOT NULL
    );
    CREATE TABLE seller (
        Id INTEGER PRIMARY KEY AUTOINCREMENT,
        Name VARCHAR(60) NOT NULL,
        Email VARCHAR(100) NOT NULL,
        BirthDate DATE NOT NULL,
        BaseSalary DOUBLE NOT NULL,
        DepartmentId INTEGER NOT NULL REFERENCES department (Id)
    );
"};

const SEED_DEPARTMENTS: &str = indoc! {"
    INSERT INTO department (Name) VALUES
        ('Computers'),
        ('Electronics'),
        ('Fashion'),
        ('Books');
"};

/// Recreate the tables, optionally with departments 1 to 4. The returned guard
/// keeps other scenarios off the tables.
pub(crate) async fn reset<D: Driver>(
    provider: &ConnectionProvider<D>,
    seed_departments: bool,
) -> MutexGuard<'static, ()> {
    let guard = TABLES.lock().await;
    let mut unit = provider
        .begin()
        .await
        .expect("Could not acquire a connection to reset the tables");
    let mut script = CREATE_TABLES.to_string();
    if seed_departments {
        script.push_str(SEED_DEPARTMENTS);
    }
    unit.execute_script(script)
        .await
        .expect("Could not reset the tables");
    unit.close();
    guard
}

/// Rows of `seller` that match every column, counted by updating them in place.
pub(crate) async fn count_sellers<D: Driver>(
    provider: &ConnectionProvider<D>,
    seller: &keel::seller::NewSeller,
) -> u64 {
    let mut unit = provider
        .begin()
        .await
        .expect("Could not acquire a connection to count the sellers");
    let result = unit
        .prepare_insert(
            indoc! {"
                UPDATE seller SET Name = Name
                WHERE Name = ? AND Email = ? AND BirthDate = ? AND BaseSalary = ? AND DepartmentId = ?
            "},
            seller.parameters(),
            false,
        )
        .await
        .expect("Could not count the sellers");
    unit.close();
    result.rows_affected
}
