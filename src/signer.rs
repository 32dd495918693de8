//! Request signing strategies.
//!
//! A [`Signer`] receives the fully built request together with the
//! instance's access key, secret key and signing name, and mutates the
//! request headers in place. The executor never knows which scheme is in
//! use; every backend picks one at construction time.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, DATE};
use reqwest::Request;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Authentication scheme applied to every outgoing request
pub trait Signer: Send + Sync {
    fn sign(
        &self,
        request: &mut Request,
        access_key: &str,
        secret_key: &str,
        signing_name: &str,
    ) -> Result<()>;
}

/// Plain functions and closures with the four-parameter shape are signers too.
impl<F> Signer for F
where
    F: Fn(&mut Request, &str, &str, &str) -> Result<()> + Send + Sync,
{
    fn sign(
        &self,
        request: &mut Request,
        access_key: &str,
        secret_key: &str,
        signing_name: &str,
    ) -> Result<()> {
        self(request, access_key, secret_key, signing_name)
    }
}

/// Leaves the request untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousSigner;

impl Signer for AnonymousSigner {
    fn sign(&self, _: &mut Request, _: &str, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
}

/// `Authorization: Bearer <secret key>`. Access key and signing name are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerSigner;

impl Signer for BearerSigner {
    fn sign(&self, request: &mut Request, _: &str, secret_key: &str, _: &str) -> Result<()> {
        let value = HeaderValue::from_str(&format!("Bearer {}", secret_key))
            .map_err(|e| Error::Signing(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// HMAC-SHA256 request signing.
///
/// The string to sign is
///
/// ```text
/// METHOD\nContent-MD5\nContent-Type\nDate\n/<url path>
/// ```
///
/// and the resulting header is
/// `Authorization: <signing name> <access key>:<base64 signature>`.
/// Requests are sent unsigned when the access key is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSigner;

const CONTENT_MD5: &str = "content-md5";

impl HmacSigner {
    pub fn string_to_sign(request: &Request) -> String {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string()
        };

        let mut to_sign = format!("{}\n", request.method());
        to_sign.push_str(&header(CONTENT_MD5));
        to_sign.push('\n');
        to_sign.push_str(&header(CONTENT_TYPE.as_str()));
        to_sign.push('\n');
        to_sign.push_str(&header(DATE.as_str()));
        to_sign.push('\n');
        to_sign.push_str(request.url().path());
        to_sign
    }
}

impl Signer for HmacSigner {
    fn sign(
        &self,
        request: &mut Request,
        access_key: &str,
        secret_key: &str,
        signing_name: &str,
    ) -> Result<()> {
        if access_key.is_empty() {
            return Ok(());
        }

        let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
            .map_err(|e| Error::Signing(e.to_string()))?;
        mac.update(Self::string_to_sign(request).as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        let value = HeaderValue::from_str(&format!("{} {}:{}", signing_name, access_key, signature))
            .map_err(|e| Error::Signing(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}
