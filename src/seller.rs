//! The seller workload: insert one seller row and report the keys it got.

use crate::{ConnectionProvider, Driver, ExecutionResult, Parameter, Result};

pub const INSERT_SELLER: &str = "INSERT INTO seller (Name, Email, BirthDate, BaseSalary, DepartmentId) VALUES (?, ?, ?, ?, ?)";

pub const INSERT_DEPARTMENTS: &str = "INSERT INTO department (Name) VALUES ('D1'),('D2')";

/// A seller row waiting to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSeller {
    pub name: String,
    pub email: String,
    /// `DD/MM/YYYY`, parsed when the row is bound.
    pub birth_date: String,
    pub base_salary: f64,
    pub department_id: i32,
}

impl NewSeller {
    pub fn carl_purple() -> Self {
        Self {
            name: "Carl Purple".into(),
            email: "carl@gmail.com".into(),
            birth_date: "22/04/1985".into(),
            base_salary: 3000.0,
            department_id: 4,
        }
    }

    /// Parameters in the column order of [`INSERT_SELLER`].
    pub fn parameters(&self) -> [Parameter; 5] {
        [
            self.name.clone().into(),
            self.email.clone().into(),
            Parameter::date_text(self.birth_date.clone()),
            self.base_salary.into(),
            self.department_id.into(),
        ]
    }
}

pub async fn insert_seller<D: Driver>(
    provider: &ConnectionProvider<D>,
    seller: &NewSeller,
) -> Result<ExecutionResult> {
    let mut unit = provider.begin().await?;
    let result = unit
        .prepare_insert(INSERT_SELLER, seller.parameters(), true)
        .await?;
    unit.close();
    log::info!(
        "Inserted seller `{}`, {} row(s) affected",
        seller.name,
        result.rows_affected
    );
    Ok(result)
}

/// Insert two departments with one statement, every row reports its own key.
pub async fn insert_departments<D: Driver>(
    provider: &ConnectionProvider<D>,
) -> Result<ExecutionResult> {
    let mut unit = provider.begin().await?;
    let result = unit
        .prepare_insert(INSERT_DEPARTMENTS, Vec::<Parameter>::new(), true)
        .await?;
    unit.close();
    log::info!("Inserted {} department(s)", result.rows_affected);
    Ok(result)
}

/// Lines to print for the outcome of an insert.
pub fn report(result: ExecutionResult) -> Vec<String> {
    if result.rows_affected == 0 {
        return vec!["No rows affected!".into()];
    }
    result
        .generated_keys
        .map(|id| format!("Done! Id: {id}"))
        .collect()
}
