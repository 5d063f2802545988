//! Request and response value types shared by the transport and executor

use super::classify::ErrorClassifier;
use super::media_type::{negotiate_charset, Charset, MediaType};
use crate::error::{Error, Result};
use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, StreamExt};
use reqwest::Method;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncReadExt;

/// Chunk size used when streaming a file body
const FILE_CHUNK_SIZE: usize = 64 * 1024;

/// Content type used for JSON payloads
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

// ============================================================================
// Request side
// ============================================================================

/// Outgoing request body. Single use: consumed by the transport.
pub enum RequestBody {
    /// Fully buffered payload
    Bytes(Bytes),
    /// Streamed payload
    Stream(BoxStream<'static, std::io::Result<Bytes>>),
}

impl RequestBody {
    /// Collect the whole body into memory
    pub async fn into_bytes(self) -> Result<Bytes> {
        match self {
            RequestBody::Bytes(bytes) => Ok(bytes),
            RequestBody::Stream(mut stream) => {
                let mut buffer = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| ErrorClassifier.from_transport(&e))?;
                    buffer.extend_from_slice(&chunk);
                }
                Ok(buffer.freeze())
            }
        }
    }
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            RequestBody::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// One wire-level request, built fresh for every attempt
#[derive(Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub content_type: Option<String>,
    /// Ordered; names may repeat
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Zero means no timeout
    pub connect_timeout: Duration,
    /// Zero means no timeout
    pub read_timeout: Duration,
}

impl RequestDescriptor {
    /// Bodiless request with no timeouts
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            content_type: None,
            headers: Vec::new(),
            body: None,
            connect_timeout: Duration::ZERO,
            read_timeout: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, content_type: Option<String>, body: RequestBody) -> Self {
        self.content_type = content_type;
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// Last value of a header, matched case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        last_header(&self.headers, name)
    }
}

/// Re-materializable payload of a logical request
///
/// A retry needs a fresh [`RequestBody`], so the executor keeps the source
/// and opens a new body for every attempt.
#[derive(Debug, Clone, Default)]
pub enum BodySource {
    #[default]
    Empty,
    /// Serialized JSON
    Json(Bytes),
    /// Raw bytes with their content type
    Bytes { data: Bytes, content_type: String },
    /// File streamed from disk on every attempt
    File {
        path: PathBuf,
        content_type: String,
    },
}

impl BodySource {
    pub fn is_empty(&self) -> bool {
        matches!(self, BodySource::Empty)
    }

    /// Content type the body is sent with
    pub fn content_type(&self) -> Option<&str> {
        match self {
            BodySource::Empty => None,
            BodySource::Json(_) => Some(JSON_CONTENT_TYPE),
            BodySource::Bytes { content_type, .. } | BodySource::File { content_type, .. } => {
                Some(content_type)
            }
        }
    }

    /// Open a new single-use body
    pub async fn open(&self) -> Result<Option<RequestBody>> {
        match self {
            BodySource::Empty => Ok(None),
            BodySource::Json(data) | BodySource::Bytes { data, .. } => {
                Ok(Some(RequestBody::Bytes(data.clone())))
            }
            BodySource::File { path, .. } => {
                let file = tokio::fs::File::open(path).await.map_err(|e| {
                    Error::transport(format!("Cannot open {}: {e}", path.display()))
                })?;
                Ok(Some(RequestBody::Stream(file_stream(file))))
            }
        }
    }
}

fn file_stream(file: tokio::fs::File) -> BoxStream<'static, std::io::Result<Bytes>> {
    futures::stream::try_unfold(file, |mut file| async move {
        let mut chunk = BytesMut::with_capacity(FILE_CHUNK_SIZE);
        let read = file.read_buf(&mut chunk).await?;
        let next = (read > 0).then(|| (chunk.freeze(), file));
        Ok::<_, std::io::Error>(next)
    })
    .boxed()
}

/// Logical API request; survives retries
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: BodySource,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: BodySource::Empty,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: BodySource) -> Self {
        self.body = body;
        self
    }
}

// ============================================================================
// Response side
// ============================================================================

/// Lazily streamed response body
///
/// Dropping it releases the underlying connection; remaining bytes are
/// discarded.
pub struct ResponseBody {
    stream: BoxStream<'static, Result<Bytes>>,
}

impl ResponseBody {
    pub fn new(stream: BoxStream<'static, Result<Bytes>>) -> Self {
        Self { stream }
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::new(futures::stream::once(async move { Ok(bytes) }).boxed())
    }

    pub fn empty() -> Self {
        Self::new(futures::stream::empty().boxed())
    }

    /// Read the remaining body into memory
    pub async fn bytes(mut self) -> Result<Bytes> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }

    /// Close without reading
    pub fn ignore(self) {
        drop(self);
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResponseBody")
    }
}

/// Status, headers and body stream of a received response
#[derive(Debug)]
pub struct ResponseEnvelope {
    status: u16,
    headers: Vec<(String, String)>,
    content_type: Option<String>,
    content_length: Option<u64>,
    body: ResponseBody,
}

impl ResponseEnvelope {
    /// Build an envelope; content type and length are read from `headers`
    pub fn new(status: u16, headers: Vec<(String, String)>, body: ResponseBody) -> Self {
        let content_type = last_header(&headers, "content-type").map(str::to_string);
        let content_length =
            last_header(&headers, "content-length").and_then(|v| v.trim().parse().ok());
        Self {
            status,
            headers,
            content_type,
            content_length,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// All headers in received order
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Last value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        last_header(&self.headers, name)
    }

    /// Every value of a repeated header, in order
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn media_type(&self) -> Option<MediaType> {
        self.content_type.as_deref().and_then(MediaType::parse)
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_forbidden_or_unauthorized(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// False for bodiless statuses (1xx, 202, 204, 304) with no content
    pub fn has_message_body(&self) -> bool {
        let bodiless = self.status / 100 == 1 || matches!(self.status, 202 | 204 | 304);
        !(bodiless && self.content_length.unwrap_or(0) == 0)
    }

    /// Charset the body should be decoded with
    pub fn charset(&self) -> Charset {
        negotiate_charset(self.content_type())
    }

    /// Take the body, consuming the envelope
    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// Read the full body
    pub async fn bytes(self) -> Result<Bytes> {
        self.body.bytes().await
    }

    /// Read the full body as text using the negotiated charset
    pub async fn text(self) -> Result<String> {
        let charset = self.charset();
        let bytes = self.body.bytes().await?;
        Ok(charset.decode(&bytes))
    }

    /// Close the body without reading it
    pub fn ignore(self) {
        self.body.ignore();
    }
}

fn last_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .rev()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
