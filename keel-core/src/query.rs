use std::vec;

/// Keys assigned by the backend while executing a statement.
///
/// Forward only: each key is yielded once and the sequence cannot be restarted.
#[derive(Debug, Default)]
pub struct GeneratedKeys {
    keys: vec::IntoIter<i64>,
}

impl GeneratedKeys {
    pub fn new(keys: Vec<i64>) -> Self {
        Self {
            keys: keys.into_iter(),
        }
    }
}

impl Iterator for GeneratedKeys {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        self.keys.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl ExactSizeIterator for GeneratedKeys {}

/// Outcome of executing a statement once.
///
/// Zero affected rows is a regular outcome, in that case no key is generated.
#[derive(Debug, Default)]
pub struct ExecutionResult {
    /// Rows inserted, updated or deleted by the statement itself.
    pub rows_affected: u64,
    pub generated_keys: GeneratedKeys,
}

impl ExecutionResult {
    pub fn new(rows_affected: u64, keys: Vec<i64>) -> Self {
        Self {
            rows_affected,
            generated_keys: if rows_affected == 0 {
                GeneratedKeys::default()
            } else {
                GeneratedKeys::new(keys)
            },
        }
    }
}
