//! Plain REST backend signed with HMAC-SHA256. No storage-class support.

use crate::error::Result;
use crate::restful::{Credentials, RestfulStorage};
use crate::signer::HmacSigner;
use crate::storage::ObjectStorage;
use std::sync::Arc;

pub const NAME: &str = "restful";

const SIGNING_NAME: &str = "RESTFUL";

/// Registry constructor. The endpoint must already be an absolute URL.
pub fn construct(
    endpoint: &str,
    access_key: &str,
    secret_key: &str,
    token: &str,
) -> Result<Box<dyn ObjectStorage>> {
    let storage = RestfulStorage::new(
        endpoint,
        Credentials::new(access_key, secret_key, token),
        SIGNING_NAME,
        Arc::new(HmacSigner),
    )?;
    Ok(Box::new(storage))
}
