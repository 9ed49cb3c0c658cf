#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use keel_core::{
        AsValue, Connection, ConnectionConfig, ConnectionProvider, Driver, Error,
        ExecutionResult, Parameter, Prepared, Result, UnitOfWork, UnitOfWorkState, Value,
    };
    use std::{
        collections::HashMap,
        fmt::{self, Display},
        sync::{
            Arc, LazyLock, Mutex,
            atomic::{AtomicI64, AtomicUsize, Ordering},
        },
    };

    /// What happened to the resources opened for one location.
    #[derive(Default)]
    struct Journal {
        connections_opened: AtomicUsize,
        connections_closed: AtomicUsize,
        statements_prepared: AtomicUsize,
        statements_closed: AtomicUsize,
        next_key: AtomicI64,
    }

    impl Journal {
        fn counts(&self) -> (usize, usize, usize, usize) {
            (
                self.connections_opened.load(Ordering::SeqCst),
                self.statements_prepared.load(Ordering::SeqCst),
                self.statements_closed.load(Ordering::SeqCst),
                self.connections_closed.load(Ordering::SeqCst),
            )
        }
    }

    static JOURNALS: LazyLock<Mutex<HashMap<String, Arc<Journal>>>> =
        LazyLock::new(|| Mutex::new(HashMap::new()));

    fn journal(location: &str) -> Arc<Journal> {
        JOURNALS
            .lock()
            .unwrap()
            .entry(location.to_owned())
            .or_default()
            .clone()
    }

    struct RecordingDriver;

    impl Driver for RecordingDriver {
        type Connection = RecordingConnection;
        const NAME: &'static str = "recording";
    }

    struct RecordingConnection {
        journal: Arc<Journal>,
        failing_release: bool,
    }

    impl Connection for RecordingConnection {
        type Prepared = RecordingPrepared;

        async fn connect(config: &ConnectionConfig) -> Result<Self> {
            if config.driver != RecordingDriver::NAME || config.location == "unreachable" {
                return Err(Error::connection(anyhow!("Cannot reach {}", config)));
            }
            let journal = journal(&config.location);
            journal.connections_opened.fetch_add(1, Ordering::SeqCst);
            Ok(Self {
                journal,
                failing_release: config.location.starts_with("failing-release"),
            })
        }

        async fn prepare(&mut self, sql: String, generated_keys: bool) -> Result<RecordingPrepared> {
            if sql.contains("MALFORMED") {
                return Err(Error::statement(anyhow!("near \"MALFORMED\": syntax error")));
            }
            self.journal.statements_prepared.fetch_add(1, Ordering::SeqCst);
            Ok(RecordingPrepared {
                journal: self.journal.clone(),
                sql,
                values: Vec::new(),
                generated_keys,
                executed: false,
                failing_release: self.failing_release,
            })
        }

        async fn execute_script(&mut self, _sql: String) -> Result<()> {
            Ok(())
        }

        fn close(self) -> Result<()> {
            self.journal.connections_closed.fetch_add(1, Ordering::SeqCst);
            if self.failing_release {
                return Err(Error::connection(anyhow!("The connection was reset")));
            }
            Ok(())
        }
    }

    struct RecordingPrepared {
        journal: Arc<Journal>,
        sql: String,
        values: Vec<Value>,
        generated_keys: bool,
        executed: bool,
        failing_release: bool,
    }

    impl Prepared for RecordingPrepared {
        fn bind(&mut self, value: impl AsValue) -> Result<&mut Self> {
            let index = self.values.len() as u64 + 1;
            self.bind_index(value, index)
        }

        fn bind_index(&mut self, value: impl AsValue, index: u64) -> Result<&mut Self> {
            let index = index as usize;
            if index == 0 {
                return Err(Error::statement(anyhow!("Parameter indexes start from 1")));
            }
            if self.values.len() < index {
                self.values.resize(index, Value::Null);
            }
            self.values[index - 1] = value.as_value();
            Ok(self)
        }

        async fn execute(&mut self) -> Result<ExecutionResult> {
            if self.executed {
                return Err(Error::statement(anyhow!("Already executed")));
            }
            self.executed = true;
            if self.sql.contains("REJECT") {
                return Err(Error::statement(anyhow!("FOREIGN KEY constraint failed")));
            }
            if self.sql.contains("NOTHING") {
                return Ok(ExecutionResult::new(0, vec![]));
            }
            let key = self.journal.next_key.fetch_add(1, Ordering::SeqCst) + 1;
            let keys = if self.generated_keys { vec![key] } else { vec![] };
            Ok(ExecutionResult::new(1, keys))
        }

        fn close(self) -> Result<()> {
            self.journal.statements_closed.fetch_add(1, Ordering::SeqCst);
            if self.failing_release {
                return Err(Error::statement(anyhow!("Could not finalize")));
            }
            Ok(())
        }
    }

    impl Display for RecordingPrepared {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.sql)
        }
    }

    const INSERT: &str = "INSERT INTO seller (Name, BirthDate, BaseSalary) VALUES (?, ?, ?)";

    fn provider(location: &str) -> ConnectionProvider<RecordingDriver> {
        ConnectionProvider::from_url(RecordingDriver, &format!("recording://{location}"))
            .expect("Could not build the provider")
    }

    fn seller(birth_date: &str) -> [Parameter; 3] {
        [
            "Carl Purple".into(),
            Parameter::date_text(birth_date),
            3000.0_f64.into(),
        ]
    }

    #[tokio::test]
    async fn success() {
        let provider = provider("success");
        let mut unit = provider.begin().await.expect("Could not begin");
        assert_eq!(unit.state(), UnitOfWorkState::Connected);
        let result = unit
            .prepare_insert(INSERT, seller("22/04/1985"), true)
            .await
            .expect("Insert should succeed");
        assert_eq!(unit.state(), UnitOfWorkState::Executed);
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.generated_keys.collect::<Vec<_>>(), [1]);
        unit.close();
        assert_eq!(journal("success").counts(), (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn no_keys_requested() {
        let provider = provider("no-keys");
        let mut unit = provider.begin().await.unwrap();
        let result = unit
            .prepare_insert(INSERT, seller("22/04/1985"), false)
            .await
            .unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.generated_keys.len(), 0);
    }

    #[tokio::test]
    async fn zero_rows() {
        let provider = provider("zero-rows");
        let mut unit = provider.begin().await.unwrap();
        let result = unit
            .prepare_insert("INSERT NOTHING", Vec::<Parameter>::new(), true)
            .await
            .expect("Zero rows is not an error");
        assert_eq!(result.rows_affected, 0);
        assert_eq!(result.generated_keys.count(), 0);
        drop(unit);
        assert_eq!(journal("zero-rows").counts(), (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn date_error() {
        let provider = provider("date-error");
        let mut unit = provider.begin().await.unwrap();
        let result = unit.prepare_insert(INSERT, seller("1985-04-22"), true).await;
        assert!(matches!(result, Err(Error::DateFormat { .. })));
        assert_eq!(unit.state(), UnitOfWorkState::Closed);
        assert_eq!(journal("date-error").counts(), (1, 1, 1, 1));
        unit.close();
        assert_eq!(journal("date-error").counts(), (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn statement_error() {
        let provider = provider("statement-error");
        let mut unit = provider.begin().await.unwrap();
        let result = unit
            .prepare_insert("INSERT REJECT (?, ?, ?)", seller("22/04/1985"), true)
            .await;
        assert!(matches!(result, Err(Error::Statement(..))));
        assert_eq!(unit.state(), UnitOfWorkState::Closed);
        drop(unit);
        assert_eq!(journal("statement-error").counts(), (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn prepare_error() {
        let provider = provider("prepare-error");
        let mut unit = provider.begin().await.unwrap();
        let result = unit.prepare("MALFORMED", true).await;
        assert!(matches!(result, Err(Error::Statement(..))));
        drop(unit);
        assert_eq!(journal("prepare-error").counts(), (1, 0, 0, 1));
    }

    #[tokio::test]
    async fn connection_error() {
        let result = provider("unreachable").begin().await;
        assert!(matches!(result, Err(Error::Connection(..))));
        assert_eq!(journal("unreachable").counts(), (0, 0, 0, 0));
    }

    #[tokio::test]
    async fn early_return() {
        async fn insert_then_bail(provider: &ConnectionProvider<RecordingDriver>) -> Result<()> {
            let mut unit = provider.begin().await?;
            unit.prepare(INSERT, true).await?.bind("Carl Purple")?;
            Err(Error::config(anyhow!("Changed my mind")))
        }
        let result = insert_then_bail(&provider("early-return")).await;
        assert!(matches!(result, Err(Error::Config(..))));
        assert_eq!(journal("early-return").counts(), (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn executes_once() {
        let provider = provider("executes-once");
        let mut unit = provider.begin().await.unwrap();
        unit.prepare(INSERT, true).await.unwrap();
        unit.bind("Carl Purple")
            .unwrap()
            .bind(Parameter::date_text("22/04/1985"))
            .unwrap()
            .bind(3000.0_f64)
            .unwrap();
        unit.execute().await.expect("First execution should succeed");
        assert!(matches!(unit.execute().await, Err(Error::Statement(..))));
        assert_eq!(unit.state(), UnitOfWorkState::Closed);
        assert!(matches!(unit.execute().await, Err(Error::Closed("execute"))));
        assert!(matches!(unit.bind(1_i32), Err(Error::Closed("bind"))));
        assert!(matches!(
            unit.prepare(INSERT, true).await,
            Err(Error::Closed("prepare"))
        ));
        drop(unit);
        assert_eq!(journal("executes-once").counts(), (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn out_of_order() {
        let provider = provider("out-of-order");
        let mut unit = provider.begin().await.unwrap();
        assert!(matches!(unit.bind("too early"), Err(Error::Statement(..))));
        assert_eq!(unit.state(), UnitOfWorkState::Closed);
        assert_eq!(journal("out-of-order").counts(), (1, 0, 0, 1));
    }

    #[tokio::test]
    async fn release_errors_are_swallowed() {
        let provider = provider("failing-release");
        let mut unit = provider.begin().await.unwrap();
        let result = unit
            .prepare_insert(INSERT, seller("22/04/1985"), true)
            .await
            .expect("Insert should succeed");
        assert_eq!(result.rows_affected, 1);
        unit.close();
        assert_eq!(journal("failing-release").counts(), (1, 1, 1, 1));

        let mut unit = provider.begin().await.unwrap();
        let result = unit.prepare_insert(INSERT, seller("22-04-1985"), true).await;
        assert!(
            matches!(result, Err(Error::DateFormat { .. })),
            "The release failure must not replace the original error"
        );
        assert_eq!(journal("failing-release").counts(), (2, 2, 2, 2));
    }

    #[tokio::test]
    async fn with_connection() {
        let config = ConnectionConfig::parse("recording://wrapped").unwrap();
        let connection = RecordingConnection::connect(&config).await.unwrap();
        let mut unit = UnitOfWork::with_connection(connection);
        unit.execute_script("CREATE TABLE seller (Name TEXT)")
            .await
            .unwrap();
        assert_eq!(unit.state(), UnitOfWorkState::Connected);
        unit.close();
        assert_eq!(journal("wrapped").counts(), (1, 0, 0, 1));
    }
}
