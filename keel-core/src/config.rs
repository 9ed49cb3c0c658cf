use crate::{Error, Result};
use anyhow::anyhow;
use std::{env, fmt, str::FromStr, time::Duration};

/// How the database file is opened.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
    #[default]
    ReadWriteCreate,
    Memory,
}

impl OpenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenMode::ReadOnly => "ro",
            OpenMode::ReadWrite => "rw",
            OpenMode::ReadWriteCreate => "rwc",
            OpenMode::Memory => "memory",
        }
    }
}

impl FromStr for OpenMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "ro" => OpenMode::ReadOnly,
            "rw" => OpenMode::ReadWrite,
            "rwc" => OpenMode::ReadWriteCreate,
            "memory" => OpenMode::Memory,
            _ => {
                return Err(Error::config(anyhow!(
                    "Unknown mode `{s}`, expected one of `ro`, `rw`, `rwc`, `memory`"
                )));
            }
        })
    }
}

/// Everything a driver needs to open one connection.
///
/// Parsed from a URL of the form `<driver>://<location>?<options>`, for example
/// `sqlite://data/sales.sqlite?mode=rw&busy_timeout=500`. The location is
/// percent decoded. Recognized options:
/// * `mode`: `ro`, `rw`, `rwc` (default) or `memory`
/// * `foreign_keys`: `on` (default) or `off`
/// * `busy_timeout`: milliseconds to wait on a locked database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub driver: String,
    pub location: String,
    pub mode: OpenMode,
    pub foreign_keys: bool,
    pub busy_timeout: Option<Duration>,
}

impl ConnectionConfig {
    /// Environment variable read by [`ConnectionConfig::from_env`].
    pub const ENV_URL: &'static str = "KEEL_DATABASE_URL";

    pub fn parse(url: &str) -> Result<Self> {
        let context = || format!("Invalid connection url `{url}`");
        let Some((driver, rest)) = url.split_once("://") else {
            return Err(Error::config(
                anyhow!("Expected the url to start with `<driver>://`").context(context()),
            ));
        };
        if driver.is_empty() || !driver.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::config(
                anyhow!("Invalid driver name `{driver}`").context(context()),
            ));
        }
        let (location, query) = rest.split_once('?').unwrap_or((rest, ""));
        let location = urlencoding::decode(location)
            .map_err(|e| Error::config(anyhow::Error::new(e).context(context())))?;
        if location.is_empty() {
            return Err(Error::config(
                anyhow!("The url does not name a database").context(context()),
            ));
        }
        let mut result = Self {
            driver: driver.to_owned(),
            location: location.into_owned(),
            mode: OpenMode::default(),
            foreign_keys: true,
            busy_timeout: None,
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "mode" => result.mode = value.parse()?,
                "foreign_keys" => {
                    result.foreign_keys = match value.as_ref() {
                        "on" | "true" | "1" => true,
                        "off" | "false" | "0" => false,
                        _ => {
                            return Err(Error::config(
                                anyhow!("Expected `on` or `off` for `foreign_keys`, found `{value}`")
                                    .context(context()),
                            ));
                        }
                    }
                }
                "busy_timeout" => {
                    let millis: u64 = value.parse().map_err(|e| {
                        Error::config(anyhow::Error::new(e).context(format!(
                            "Expected milliseconds for `busy_timeout`, found `{value}`"
                        )))
                    })?;
                    result.busy_timeout = Some(Duration::from_millis(millis));
                }
                _ => {
                    return Err(Error::config(
                        anyhow!("Unknown connection option `{key}`").context(context()),
                    ));
                }
            }
        }
        Ok(result)
    }

    /// Read the url from [`ConnectionConfig::ENV_URL`], `None` when it is not set.
    pub fn from_env() -> Result<Option<Self>> {
        match env::var(Self::ENV_URL) {
            Ok(url) => Self::parse(&url).map(Some),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(Error::config(
                anyhow::Error::new(e).context(format!("Cannot read `{}`", Self::ENV_URL)),
            )),
        }
    }

    pub fn is_memory(&self) -> bool {
        self.mode == OpenMode::Memory || self.location == ":memory:"
    }
}

impl FromStr for ConnectionConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Written back in url form for log records. The url holds no credentials, only
/// a location and options, so it is logged as is.
impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}?mode={}&foreign_keys={}",
            self.driver,
            self.location.replace('%', "%25").replace('?', "%3F"),
            self.mode.as_str(),
            if self.foreign_keys { "on" } else { "off" },
        )?;
        if let Some(timeout) = self.busy_timeout {
            write!(f, "&busy_timeout={}", timeout.as_millis())?;
        }
        Ok(())
    }
}
