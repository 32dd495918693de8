//! LabStore backend: bearer-token auth, SHA-256 integrity header and
//! per-write storage classes.

use crate::error::Result;
use crate::restful::{check_status, read_body, Credentials, RequestSpec, RestfulStorage};
use crate::signer::BearerSigner;
use crate::storage::{ObjectStorage, SupportStorageClass};
use crate::types::{ByteRange, ObjectInfo, DEFAULT_STORAGE_CLASS};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Method, StatusCode};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::io::AsyncRead;

pub const NAME: &str = "labstore";

pub const CONFIG_ID_HEADER: &str = "X-LabStore-ConfigId";
pub const SHA256_HEADER: &str = "X-LabStore-SHA256";

#[derive(Debug)]
pub struct LabStore {
    inner: RestfulStorage,
    config_id: RwLock<String>,
}

impl LabStore {
    /// Bare `host[:port]` input becomes `https://<host>/objects`.
    pub fn new(endpoint: &str, access_key: &str, secret_key: &str, token: &str) -> Result<Self> {
        let endpoint = normalize_endpoint(endpoint);
        let inner = RestfulStorage::new(
            &endpoint,
            Credentials::new(access_key, secret_key, token),
            "",
            Arc::new(BearerSigner),
        )?;

        Ok(Self {
            inner,
            config_id: RwLock::new(DEFAULT_STORAGE_CLASS.to_string()),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}

pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}/objects", endpoint)
    }
}

/// URL-safe, unpadded base64 of the SHA-256 of `body`
pub fn content_digest(body: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(body))
}

/// Registry constructor
pub fn construct(
    endpoint: &str,
    access_key: &str,
    secret_key: &str,
    token: &str,
) -> Result<Box<dyn ObjectStorage>> {
    Ok(Box::new(LabStore::new(endpoint, access_key, secret_key, token)?))
}

#[async_trait]
impl ObjectStorage for LabStore {
    fn describe(&self) -> String {
        format!(
            "{}://{}/",
            NAME,
            self.inner.url().host_str().unwrap_or_default()
        )
    }

    async fn head(&self, key: &str) -> Result<ObjectInfo> {
        self.inner.head(key).await
    }

    async fn get(&self, key: &str, range: ByteRange) -> Result<Bytes> {
        self.inner.get(key, range).await
    }

    async fn put(&self, key: &str, body: &mut (dyn AsyncRead + Send + Unpin)) -> Result<()> {
        let config_id = self.config_id.read().clone();
        let body = read_body(body).await?;

        let spec = RequestSpec::new(Method::PUT, key)
            .header(CONTENT_LENGTH.as_str(), body.len().to_string())
            .header(CONFIG_ID_HEADER, config_id)
            .header(SHA256_HEADER, content_digest(&body))
            .body(body);

        let response = self.inner.execute(spec).await?;
        check_status(response, &[StatusCode::OK]).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }

    fn as_storage_class(&self) -> Option<&dyn SupportStorageClass> {
        Some(self)
    }
}

impl SupportStorageClass for LabStore {
    fn set_storage_class(&self, storage_class: &str) {
        let value = if storage_class.is_empty() {
            DEFAULT_STORAGE_CLASS
        } else {
            storage_class
        };
        *self.config_id.write() = value.to_string();
    }

    fn storage_class(&self) -> String {
        self.config_id.read().clone()
    }
}
