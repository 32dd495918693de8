//! Generic REST request executor shared by every backend.

use crate::error::{BackendError, Error, Result};
use crate::signer::Signer;
use crate::storage::ObjectStorage;
use crate::types::{ByteRange, ObjectInfo};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, DATE, ETAG, LAST_MODIFIED, RANGE,
    USER_AGENT,
};
use reqwest::{Client, Method, Response, StatusCode, Url};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};

const USER_AGENT_VALUE: &str = concat!("objstore-bridge/", env!("CARGO_PKG_VERSION"));

/// Connection credentials, read-only after construction
#[derive(Clone, Default)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>, token: &str) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: (!token.is_empty()).then(|| token.to_string()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// One storage operation: method, key, body and extra headers
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub key: String,
    pub body: Option<Bytes>,
    pub headers: HashMap<String, String>,
}

impl RequestSpec {
    pub fn new(method: Method, key: impl Into<String>) -> Self {
        Self {
            method,
            key: key.into(),
            body: None,
            headers: HashMap::new(),
        }
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Base for REST backends: endpoint, credentials and the signing strategy.
///
/// The endpoint is normalized by the backend constructor and never changes
/// afterwards. Every field is read-only, so one instance can serve
/// concurrent calls.
#[derive(Clone)]
pub struct RestfulStorage {
    endpoint: String,
    url: Url,
    credentials: Credentials,
    signing_name: String,
    signer: Arc<dyn Signer>,
    client: Client,
}

impl fmt::Debug for RestfulStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestfulStorage")
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .field("signing_name", &self.signing_name)
            .finish()
    }
}

impl RestfulStorage {
    /// Create a new executor. Does not touch the network.
    pub fn new(
        endpoint: &str,
        credentials: Credentials,
        signing_name: impl Into<String>,
        signer: Arc<dyn Signer>,
    ) -> Result<Self> {
        let url = Url::parse(endpoint)?;
        if url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "endpoint {} cannot carry object keys",
                endpoint
            )));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            url,
            credentials,
            signing_name: signing_name.into(),
            signer,
            client,
        })
    }

    /// The endpoint exactly as it was given at construction
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// `<endpoint>/<key>`. Keys are expected to be encoded by the caller.
    ///
    /// The joined string is parsed as a URL, so `.` and `..` segments in the
    /// key are resolved: `a/../b` addresses `<endpoint>/b`. [`encode_key`]
    /// leaves dots alone, so callers that store such keys must map them
    /// to something else first.
    pub fn object_url(&self, key: &str) -> Result<Url> {
        let base = self.endpoint.trim_end_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, key))?)
    }

    /// Build, sign and send one request.
    ///
    /// Transport failures are returned as [`Error::Transport`] without retry.
    /// The status is not inspected here; see [`check_status`].
    pub async fn execute(&self, spec: RequestSpec) -> Result<Response> {
        let url = self.object_url(&spec.key)?;

        let mut headers = HeaderMap::new();
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        headers.insert(DATE, header_value(&date)?);
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        for (name, value) in &spec.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::InvalidHeader(format!("{}: {}", name, e)))?;
            headers.insert(name, header_value(value)?);
        }

        let mut builder = self.client.request(spec.method.clone(), url).headers(headers);
        if let Some(body) = spec.body {
            builder = builder.body(body);
        }
        let mut request = builder
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        self.signer.sign(
            &mut request,
            &self.credentials.access_key,
            &self.credentials.secret_key,
            &self.signing_name,
        )?;

        tracing::debug!(method = %request.method(), url = %request.url(), "sending request");
        let response = self.client.execute(request).await?;
        tracing::debug!(status = %response.status(), "received response");
        Ok(response)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader(format!("{:?}: {}", value, e)))
}

/// Pass the response through if its status is one of `expected`, otherwise
/// consume the body and turn it into a [`BackendError`].
pub async fn check_status(response: Response, expected: &[StatusCode]) -> Result<Response> {
    if expected.contains(&response.status()) {
        return Ok(response);
    }
    Err(parse_error(response).await)
}

/// Read the error body of a failed response. The response is consumed.
pub async fn parse_error(response: Response) -> Error {
    let status = response.status();
    match response.bytes().await {
        Ok(body) => {
            let err = BackendError::from_body(status, &body);
            tracing::warn!(status = status.as_u16(), kind = %err.kind, message = %err.message, "request failed");
            Error::Backend(err)
        }
        Err(e) => Error::Transport(e),
    }
}

/// Percent-encode each path segment of `key`, keeping `/` separators, so the
/// key maps onto the same number of URL path segments.
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Buffer a whole request body in memory.
pub async fn read_body(body: &mut (dyn AsyncRead + Send + Unpin)) -> Result<Bytes> {
    let mut buf = Vec::new();
    body.read_to_end(&mut buf).await.map_err(Error::Read)?;
    Ok(Bytes::from(buf))
}

fn object_info(key: &str, headers: &HeaderMap) -> ObjectInfo {
    let text = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

    ObjectInfo {
        key: key.to_string(),
        size: text(CONTENT_LENGTH)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0),
        last_modified: text(LAST_MODIFIED)
            .and_then(|s| chrono::DateTime::parse_from_rfc2822(s).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc)),
        etag: text(ETAG).map(|s| s.trim_matches('"').to_string()),
    }
}

#[async_trait]
impl ObjectStorage for RestfulStorage {
    fn describe(&self) -> String {
        format!(
            "{}://{}/",
            self.url.scheme(),
            self.url.host_str().unwrap_or_default()
        )
    }

    async fn head(&self, key: &str) -> Result<ObjectInfo> {
        let response = self.execute(RequestSpec::new(Method::HEAD, key)).await?;
        let response = check_status(response, &[StatusCode::OK]).await?;
        Ok(object_info(key, response.headers()))
    }

    async fn get(&self, key: &str, range: ByteRange) -> Result<Bytes> {
        if range.limit == Some(0) {
            return Ok(Bytes::new());
        }

        let mut spec = RequestSpec::new(Method::GET, key);
        if let Some(value) = range.header_value() {
            spec = spec.header(RANGE.as_str(), value);
        }
        let response = self.execute(spec).await?;
        let response =
            check_status(response, &[StatusCode::OK, StatusCode::PARTIAL_CONTENT]).await?;
        Ok(response.bytes().await?)
    }

    async fn put(&self, key: &str, body: &mut (dyn AsyncRead + Send + Unpin)) -> Result<()> {
        let body = read_body(body).await?;
        let spec = RequestSpec::new(Method::PUT, key)
            .header(CONTENT_LENGTH.as_str(), body.len().to_string())
            .body(body);
        let response = self.execute(spec).await?;
        check_status(response, &[StatusCode::OK, StatusCode::CREATED]).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self.execute(RequestSpec::new(Method::DELETE, key)).await?;
        check_status(
            response,
            &[StatusCode::OK, StatusCode::NO_CONTENT, StatusCode::NOT_FOUND],
        )
        .await?;
        Ok(())
    }
}
