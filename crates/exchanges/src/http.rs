//! Monoio-native HTTPS client
//!
//! - One TLS connection per request (`Connection: close`)
//! - rustls with the webpki root store
//! - Bodies framed by `Content-Length`, chunked encoding, or connection close
//! - Every round-trip bounded by a deadline

use crate::errors::{ExchangeError, Result};
use crate::traits::Transport;

use async_trait::async_trait;
use monoio::io::{AsyncReadRent, AsyncWriteRentExt};
use monoio::net::TcpStream;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection};
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

const READ_CHUNK: usize = 8192;
const USER_AGENT: &str = concat!("flyer/", env!("CARGO_PKG_VERSION"));

/// Default deadline for one request/response round-trip
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully-built outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// HTTP response with a fully drained body
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body as text, lossy on invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Monoio-native HTTPS client
pub struct MonoioHttpsClient {
    tls_config: Arc<ClientConfig>,
    timeout: Duration,
}

impl MonoioHttpsClient {
    /// Create a client with the default deadline
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests fail with `Timeout` after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let tls_config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Ok(Self {
            tls_config: Arc::new(tls_config),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn round_trip(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let parsed = url::Url::parse(&request.url)?;
        if parsed.scheme() != "https" {
            return Err(ExchangeError::InvalidUrl(format!("unsupported scheme: {}", parsed.scheme())));
        }
        let host = parsed
            .host_str()
            .ok_or_else(|| ExchangeError::InvalidUrl("No host in URL".to_string()))?;
        let port = parsed.port().unwrap_or(443);

        let mut path_and_query = parsed.path().to_string();
        if path_and_query.is_empty() {
            path_and_query.push('/');
        }
        if let Some(query) = parsed.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        let tcp = TcpStream::connect((host, port))
            .await
            .map_err(|e| ExchangeError::Transport(format!("TCP connect to {host}:{port} failed: {e}")))?;

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| ExchangeError::Transport(format!("Invalid server name: {e}")))?;
        let conn = ClientConnection::new(self.tls_config.clone(), server_name)
            .map_err(|e| ExchangeError::Transport(format!("TLS setup failed: {e}")))?;

        let mut tls = TlsStream { stream: tcp, conn };
        tls.write_all(&encode_request(request, host, &path_and_query)).await?;
        let raw = tls.read_to_end().await?;

        parse_http_response(&raw)
    }
}

#[async_trait(?Send)]
impl Transport for MonoioHttpsClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        match monoio::time::timeout(self.timeout, self.round_trip(&request)).await {
            Ok(result) => result,
            Err(_) => Err(ExchangeError::Timeout(format!(
                "{} {} exceeded {}ms",
                request.method,
                request.url,
                self.timeout.as_millis()
            ))),
        }
    }
}

/// Serialize request line, headers and body
fn encode_request(request: &HttpRequest, host: &str, path_and_query: &str) -> Vec<u8> {
    let body = request.body.as_deref().unwrap_or("");
    let mut head = format!(
        "{} {path_and_query} HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: {USER_AGENT}\r\n\
         Connection: close\r\n\
         Content-Length: {}\r\n",
        request.method,
        body.len()
    );
    for (name, value) in &request.headers {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");

    let mut bytes = head.into_bytes();
    bytes.extend_from_slice(body.as_bytes());
    bytes
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Parse a raw HTTP/1.1 response
pub(crate) fn parse_http_response(data: &[u8]) -> Result<HttpResponse> {
    let header_end = find(data, b"\r\n\r\n")
        .ok_or_else(|| ExchangeError::Transport("Invalid HTTP response: no header terminator".to_string()))?;

    let head = std::str::from_utf8(&data[..header_end])
        .map_err(|_| ExchangeError::Transport("Invalid HTTP response: non-UTF-8 headers".to_string()))?;
    let mut lines = head.split("\r\n");

    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| ExchangeError::Transport("Invalid status line".to_string()))?;

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let raw_body = &data[header_end + 4..];
    let chunked = find_header(&headers, "transfer-encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));

    let body = if chunked {
        decode_chunked(raw_body)?
    } else if let Some(len) = find_header(&headers, "content-length") {
        let len: usize = len
            .parse()
            .map_err(|_| ExchangeError::Transport(format!("Invalid Content-Length: {len}")))?;
        if raw_body.len() < len {
            return Err(ExchangeError::Transport(format!(
                "Truncated body: expected {len} bytes, got {}",
                raw_body.len()
            )));
        }
        raw_body[..len].to_vec()
    } else {
        raw_body.to_vec()
    };

    Ok(HttpResponse { status, headers, body })
}

fn decode_chunked(mut rest: &[u8]) -> Result<Vec<u8>> {
    let malformed = |what: &str| ExchangeError::Transport(format!("Malformed chunked body: {what}"));
    let mut body = Vec::with_capacity(rest.len());

    loop {
        let line_end = find(rest, b"\r\n").ok_or_else(|| malformed("missing size line"))?;
        let size_line = std::str::from_utf8(&rest[..line_end]).map_err(|_| malformed("size line"))?;
        let size_hex = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_hex, 16).map_err(|_| malformed(size_hex))?;
        rest = &rest[line_end + 2..];

        if size == 0 {
            return Ok(body);
        }
        if rest.len() < size {
            return Err(malformed("truncated chunk"));
        }
        body.extend_from_slice(&rest[..size]);
        rest = rest[size..]
            .strip_prefix(b"\r\n")
            .ok_or_else(|| malformed("missing chunk terminator"))?;
    }
}

/// rustls session over a monoio TCP stream
struct TlsStream {
    stream: TcpStream,
    conn: ClientConnection,
}

impl TlsStream {
    /// Push every pending TLS record to the socket
    async fn flush_tls(&mut self) -> Result<()> {
        while self.conn.wants_write() {
            let mut buf = Vec::with_capacity(READ_CHUNK);
            self.conn
                .write_tls(&mut buf)
                .map_err(|e| ExchangeError::Transport(format!("TLS write failed: {e}")))?;
            if !buf.is_empty() {
                let (result, _) = self.stream.write_all(buf).await;
                result.map_err(|e| ExchangeError::Transport(format!("TCP write failed: {e}")))?;
            }
        }
        Ok(())
    }

    /// Feed one socket read into the TLS state machine. `false` on EOF.
    async fn fill(&mut self) -> Result<bool> {
        let buf = vec![0u8; READ_CHUNK];
        let (result, buf) = self.stream.read(buf).await;
        let n = result.map_err(|e| ExchangeError::Transport(format!("TCP read failed: {e}")))?;
        if n == 0 {
            return Ok(false);
        }

        let mut cursor = std::io::Cursor::new(&buf[..n]);
        while (cursor.position() as usize) < n {
            self.conn
                .read_tls(&mut cursor)
                .map_err(|e| ExchangeError::Transport(format!("TLS read failed: {e}")))?;
            self.conn
                .process_new_packets()
                .map_err(|e| ExchangeError::Transport(format!("TLS process failed: {e}")))?;
        }
        Ok(true)
    }

    async fn handshake(&mut self) -> Result<()> {
        while self.conn.is_handshaking() {
            self.flush_tls().await?;
            if !self.conn.is_handshaking() {
                break;
            }
            if self.conn.wants_read() {
                if !self.fill().await? {
                    return Err(ExchangeError::Transport("Connection closed during handshake".to_string()));
                }
            } else if !self.conn.wants_write() {
                return Err(ExchangeError::Transport("TLS handshake stalled".to_string()));
            }
        }
        self.flush_tls().await
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.handshake().await?;
        self.conn
            .writer()
            .write_all(data)
            .map_err(|e| ExchangeError::Transport(format!("TLS application write failed: {e}")))?;
        self.flush_tls().await
    }

    async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut response = Vec::new();
        let mut plain = vec![0u8; READ_CHUNK];

        loop {
            match self.conn.reader().read(&mut plain) {
                // close_notify
                Ok(0) => break,
                Ok(n) => {
                    response.extend_from_slice(&plain[..n]);
                    continue;
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                // peer closed without close_notify; the body is framed anyway
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(ExchangeError::Transport(format!("TLS read failed: {e}"))),
            }

            if !self.fill().await? {
                while let Ok(n) = self.conn.reader().read(&mut plain) {
                    if n == 0 {
                        break;
                    }
                    response.extend_from_slice(&plain[..n]);
                }
                break;
            }
        }

        Ok(response)
    }
}
