#[cfg(test)]
mod tests {
    use keel_core::{ConnectionConfig, Error, OpenMode};
    use std::time::Duration;

    #[test]
    fn defaults() {
        let config = ConnectionConfig::parse("sqlite://seller.sqlite").unwrap();
        assert_eq!(config.driver, "sqlite");
        assert_eq!(config.location, "seller.sqlite");
        assert_eq!(config.mode, OpenMode::ReadWriteCreate);
        assert!(config.foreign_keys);
        assert_eq!(config.busy_timeout, None);
        assert!(!config.is_memory());
    }

    #[test]
    fn options() {
        let config: ConnectionConfig =
            "sqlite://../target/debug/a%20b.sqlite?mode=ro&foreign_keys=off&busy_timeout=250"
                .parse()
                .unwrap();
        assert_eq!(config.location, "../target/debug/a b.sqlite");
        assert_eq!(config.mode, OpenMode::ReadOnly);
        assert!(!config.foreign_keys);
        assert_eq!(config.busy_timeout, Some(Duration::from_millis(250)));
        let reparsed = ConnectionConfig::parse(&config.to_string()).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn memory() {
        assert!(ConnectionConfig::parse("sqlite://:memory:").unwrap().is_memory());
        assert!(
            ConnectionConfig::parse("sqlite://shared?mode=memory")
                .unwrap()
                .is_memory()
        );
    }

    #[test]
    fn invalid() {
        for url in [
            "seller.sqlite",
            "://seller.sqlite",
            "sqlite://",
            "sqlite://?mode=rw",
            "sqlite://a.sqlite?mode=rwx",
            "sqlite://a.sqlite?foreign_keys=maybe",
            "sqlite://a.sqlite?busy_timeout=soon",
            "sqlite://a.sqlite?user=root",
        ] {
            assert!(
                matches!(ConnectionConfig::parse(url), Err(Error::Config(..))),
                "Expected `{url}` to be rejected"
            );
        }
    }
}
