use crate::error::{Error, Result};
use crate::types::{ByteRange, ListRequest, ListResponse, ObjectInfo};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncRead;

/// Uniform operation set every backend satisfies
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Human readable identity, e.g. `labstore://store.example/`
    fn describe(&self) -> String;

    /// Size, modification time and etag of an object
    async fn head(&self, key: &str) -> Result<ObjectInfo>;

    /// Read an object, or a byte range of it
    async fn get(&self, key: &str, range: ByteRange) -> Result<Bytes>;

    /// Store an object, reading the whole body from `body` first
    async fn put(&self, key: &str, body: &mut (dyn AsyncRead + Send + Unpin)) -> Result<()>;

    /// Delete an object. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List objects with optional prefix filtering
    async fn list(&self, _list_req: ListRequest) -> Result<ListResponse> {
        Err(Error::NotSupported("list"))
    }

    /// Server side copy
    async fn copy(&self, _dst: &str, _src: &str) -> Result<()> {
        Err(Error::NotSupported("copy"))
    }

    /// Storage class capability, if this backend has it
    fn as_storage_class(&self) -> Option<&dyn SupportStorageClass> {
        None
    }
}

/// Capability extension: backends that route writes to a storage tier
pub trait SupportStorageClass: Send + Sync {
    /// Select the tier for subsequent writes. An empty string resets to `"default"`.
    fn set_storage_class(&self, storage_class: &str);

    fn storage_class(&self) -> String;
}

impl std::fmt::Debug for dyn ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}
