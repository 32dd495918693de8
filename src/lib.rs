//! # objstore-bridge
//!
//! One object storage interface over many REST services, each with its own
//! authentication scheme, endpoint convention and capability set.
//!
//! ## Features
//!
//! - **Uniform interface**: every backend implements [`ObjectStorage`]
//! - **Pluggable signing**: backends choose a [`Signer`] at construction time
//! - **Capability extensions**: optional traits such as [`SupportStorageClass`],
//!   discovered at runtime instead of required of every backend
//! - **Explicit registry**: backends are looked up by name in a [`Registry`]
//!   the host program builds at startup
//!
//! ## Quick Start
//!
//! ```no_run
//! use objstore_bridge::{ByteRange, Registry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Registry::with_builtin()?;
//!
//!     // Bare hosts are expanded to https://<host>/objects
//!     let storage = registry.construct("labstore", "store.example", "", "token", "")?;
//!
//!     if let Some(sc) = storage.as_storage_class() {
//!         sc.set_storage_class("cold");
//!     }
//!
//!     storage.put("reports/q3.txt", &mut &b"hello"[..]).await?;
//!     let data = storage.get("reports/q3.txt", ByteRange::full()).await?;
//!     println!("read {} bytes", data.len());
//!
//!     storage.delete("reports/q3.txt").await?;
//!     Ok(())
//! }
//! ```
//!
//! Operations a backend declines, such as listing, fail with
//! [`Error::NotSupported`]:
//!
//! ```no_run
//! # async fn example(storage: &dyn objstore_bridge::ObjectStorage) {
//! match storage.list(Default::default()).await {
//!     Err(e) if e.is_not_supported() => println!("listing unavailable"),
//!     other => println!("{:?}", other.map(|r| r.objects.len())),
//! }
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod error;
pub mod registry;
pub mod restful;
pub mod signer;
pub mod storage;
pub mod types;

pub use config::StorageConfig;
pub use error::{BackendError, Error, Result};
pub use registry::{BackendDescriptor, Constructor, Registry};
pub use restful::{encode_key, Credentials, RequestSpec, RestfulStorage};
pub use signer::{AnonymousSigner, BearerSigner, HmacSigner, Signer};
pub use storage::{ObjectStorage, SupportStorageClass};
pub use types::*;
