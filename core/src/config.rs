//! Connection settings for the Lognex API.
//!
//! `ApiConfig` can be built in code, read from the environment, or embedded
//! in a host application's own serde-based configuration file.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "https://online.moysklad.ru";

/// Path of the JSON API below the host.
pub const API_PATH: &str = "/api/remap/1.1";

pub const ENV_LOGIN: &str = "LOGNEX_LOGIN";
pub const ENV_PASSWORD: &str = "LOGNEX_PASSWORD";
pub const ENV_HOST: &str = "LOGNEX_HOST";
pub const ENV_TIME_WITH_MILLISECONDS: &str = "LOGNEX_TIME_WITH_MILLISECONDS";
pub const ENV_QUERY_CHARSET: &str = "LOGNEX_QUERY_CHARSET";

/// Charset used to percent-encode query parameter keys and values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryCharset {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "iso-8859-1")]
    Iso8859_1,
    #[serde(rename = "us-ascii")]
    UsAscii,
}

impl QueryCharset {
    pub fn name(self) -> &'static str {
        match self {
            QueryCharset::Utf8 => "utf-8",
            QueryCharset::Iso8859_1 => "iso-8859-1",
            QueryCharset::UsAscii => "us-ascii",
        }
    }

    /// Encodes `text` into bytes, or `None` when a character has no mapping.
    pub fn encode(self, text: &str) -> Option<Cow<'_, [u8]>> {
        match self {
            QueryCharset::Utf8 => Some(Cow::Borrowed(text.as_bytes())),
            QueryCharset::Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(c).ok())
                .collect::<Option<Vec<u8>>>()
                .map(Cow::Owned),
            QueryCharset::UsAscii => text.is_ascii().then_some(Cow::Borrowed(text.as_bytes())),
        }
    }
}

impl fmt::Display for QueryCharset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueryCharset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(QueryCharset::Utf8),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(QueryCharset::Iso8859_1),
            "us-ascii" | "ascii" => Ok(QueryCharset::UsAscii),
            other => Err(Error::Config(format!("unsupported query charset `{other}`"))),
        }
    }
}

/// Credentials and wire options for one API account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub login: String,
    pub password: String,
    /// Ask the server for millisecond precision in timestamps.
    #[serde(default)]
    pub time_with_milliseconds: bool,
    #[serde(default)]
    pub query_charset: QueryCharset,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

impl ApiConfig {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: default_host(),
            login: login.into(),
            password: password.into(),
            time_with_milliseconds: false,
            query_charset: QueryCharset::default(),
        }
    }

    /// Reads `LOGNEX_LOGIN` and `LOGNEX_PASSWORD`, plus the optional
    /// `LOGNEX_HOST`, `LOGNEX_TIME_WITH_MILLISECONDS` and `LOGNEX_QUERY_CHARSET`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let login = lookup(ENV_LOGIN).ok_or_else(|| Error::Config(format!("{ENV_LOGIN} is not set")))?;
        let password =
            lookup(ENV_PASSWORD).ok_or_else(|| Error::Config(format!("{ENV_PASSWORD} is not set")))?;
        let mut config = Self::new(login, password);

        if let Some(host) = lookup(ENV_HOST) {
            config = config.with_host(host);
        }
        if let Some(flag) = lookup(ENV_TIME_WITH_MILLISECONDS) {
            let flag = flag.parse::<bool>().map_err(|_| {
                Error::Config(format!("{ENV_TIME_WITH_MILLISECONDS} must be `true` or `false`"))
            })?;
            config = config.with_time_with_milliseconds(flag);
        }
        if let Some(charset) = lookup(ENV_QUERY_CHARSET) {
            config = config.with_query_charset(charset.parse()?);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_time_with_milliseconds(mut self, enabled: bool) -> Self {
        self.time_with_milliseconds = enabled;
        self
    }

    pub fn with_query_charset(mut self, charset: QueryCharset) -> Self {
        self.query_charset = charset;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        if self.login.is_empty() {
            return Err(Error::Config("login must not be empty".to_string()));
        }
        if self.login.contains(':') {
            return Err(Error::Config("login must not contain `:`".to_string()));
        }
        Ok(())
    }

    /// Value of the `Authorization` header for these credentials.
    pub fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.login, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes())
        )
    }

    /// `<host><api path>`, the prefix of every endpoint URL.
    pub fn api_url(&self) -> String {
        format!("{}{}", self.host.trim_end_matches('/'), API_PATH)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("login", &self.login)
            .field("password", &"***")
            .field("time_with_milliseconds", &self.time_with_milliseconds)
            .field("query_charset", &self.query_charset)
            .finish()
    }
}
