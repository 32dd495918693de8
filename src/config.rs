use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

pub const ENV_BACKEND: &str = "OBJSTORE_BACKEND";
pub const ENV_ENDPOINT: &str = "OBJSTORE_ENDPOINT";
pub const ENV_ACCESS_KEY: &str = "OBJSTORE_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "OBJSTORE_SECRET_KEY";
pub const ENV_SESSION_TOKEN: &str = "OBJSTORE_SESSION_TOKEN";
pub const ENV_STORAGE_CLASS: &str = "OBJSTORE_STORAGE_CLASS";

/// Connection parameters for one backend instance
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: String,
    pub endpoint: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub storage_class: Option<String>,
}

impl StorageConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read `OBJSTORE_*` variables. Backend and endpoint are required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Configuration(format!("{} is not set", name)))
        };

        Ok(Self {
            backend: required(ENV_BACKEND)?,
            endpoint: required(ENV_ENDPOINT)?,
            access_key: lookup(ENV_ACCESS_KEY).unwrap_or_default(),
            secret_key: lookup(ENV_SECRET_KEY).unwrap_or_default(),
            session_token: lookup(ENV_SESSION_TOKEN).filter(|v| !v.is_empty()),
            storage_class: lookup(ENV_STORAGE_CLASS),
        })
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("storage_class", &self.storage_class)
            .finish()
    }
}
