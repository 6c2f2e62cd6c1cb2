//! Entry point of the SDK: credentials, transport and request factory.
//!
//! # Design
//! `ApiClient` holds the configuration, the `Authorization` value computed
//! once from it, and the transport. It carries no per-call state: every call
//! starts a fresh `RequestExecutor` borrowing the client, so one client can be
//! shared between threads by reference.

use std::fmt;

use crate::config::ApiConfig;
use crate::error::Result;
use crate::http::{Transport, UreqTransport};
use crate::request::RequestExecutor;
use crate::resources::EntityClients;

pub struct ApiClient {
    config: ApiConfig,
    authorization: String,
    transport: Box<dyn Transport>,
}

impl ApiClient {
    /// Client talking to `config.host` over `ureq`.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Self::with_transport(config, UreqTransport::new())
    }

    pub fn with_transport(config: ApiConfig, transport: impl Transport + 'static) -> Result<Self> {
        config.validate()?;
        let authorization = config.authorization();
        Ok(Self {
            config,
            authorization,
            transport: Box::new(transport),
        })
    }

    /// Client configured from `LOGNEX_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ApiConfig::from_env()?)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub(crate) fn authorization(&self) -> &str {
        &self.authorization
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Starts a request to an API method, e.g. `/entity/counterparty/metadata`.
    pub fn path(&self, path: &str) -> RequestExecutor<'_> {
        RequestExecutor::new(self, format!("{}{}", self.config.api_url(), path))
    }

    /// Starts a request to an absolute URL, e.g. a `meta.href` taken from a
    /// weak reference.
    pub fn url(&self, url: &str) -> RequestExecutor<'_> {
        RequestExecutor::new(self, url.to_string())
    }

    /// Clients of the `/entity` resources.
    pub fn entity(&self) -> EntityClients<'_> {
        EntityClients::new(self)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
