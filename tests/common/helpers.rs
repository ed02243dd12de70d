use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stubborn::{Download, Downloader, DownloaderBuilder};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

// Common test constants
pub const ARTIFACT_PATH: &str = "/resolve/main/model.gguf";
pub const TEST_USER_AGENT: &str = "stubborn-test-agent";
pub const TEST_TOKEN: &str = "hf_test_token";
pub const TEST_BACKOFF: Duration = Duration::from_millis(100);

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary file with the given content
pub fn create_temp_file(dir: &Path, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).expect("Failed to write temporary file");
    file_path
}

/// Creates random artifact content of the given size
pub fn create_test_content(size: usize) -> Vec<u8> {
    let mut content = vec![0u8; size];
    rand::rng().fill(&mut content[..]);
    content
}

/// Pairs the mock artifact URL with a destination inside `dir`
pub fn create_test_download(server: &MockServer, dir: &Path) -> Download {
    let url = format!("{}{}", server.uri(), ARTIFACT_PATH);
    Download::parse(&url, dir.join("model.gguf")).expect("Failed to create download")
}

/// A downloader without progress bar and with a short backoff
pub fn create_test_downloader(retries: u32) -> Downloader {
    DownloaderBuilder::hidden()
        .retries(retries)
        .backoff(TEST_BACKOFF)
        .build()
}

// === Mock Server Helpers ===

/// Answers the size probe with the length of `content`
pub async fn mount_head(server: &MockServer, content: &[u8]) {
    Mock::given(method("HEAD"))
        .and(path(ARTIFACT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-length", content.len().to_string().as_str())
                .set_body_bytes(content.to_vec()),
        )
        .mount(server)
        .await;
}

/// Answers the size probe with the given status and no length
pub async fn mount_head_status(server: &MockServer, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(ARTIFACT_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serves `content` with `Range: bytes=N-` support
pub async fn mount_ranged_get(server: &MockServer, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(ARTIFACT_PATH))
        .respond_with(RangeResponder::new(content))
        .mount(server)
        .await;
}

/// Serves the whole of `content` with a 200, ignoring any `Range` header
pub async fn mount_full_get(server: &MockServer, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(ARTIFACT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

/// `Range` header values of the GET requests the server received
pub async fn received_ranges(server: &MockServer) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == "GET")
        .map(|r| {
            r.headers
                .get("range")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .collect()
}

/// Start offset of a `bytes=N-` request header
fn requested_start(request: &Request) -> Option<usize> {
    request
        .headers
        .get("range")?
        .to_str()
        .ok()?
        .strip_prefix("bytes=")?
        .strip_suffix('-')?
        .parse()
        .ok()
}

/// Serves a file the way a resume-capable server does.
pub struct RangeResponder {
    content: Vec<u8>,
}

impl RangeResponder {
    pub fn new(content: &[u8]) -> Self {
        Self {
            content: content.to_vec(),
        }
    }
}

impl Respond for RangeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let total = self.content.len();
        match requested_start(request) {
            Some(start) if start < total => ResponseTemplate::new(206)
                .insert_header(
                    "content-range",
                    format!("bytes {}-{}/{}", start, total - 1, total).as_str(),
                )
                .set_body_bytes(self.content[start..].to_vec()),
            Some(_) => ResponseTemplate::new(416)
                .insert_header("content-range", format!("bytes */{}", total).as_str()),
            None => ResponseTemplate::new(200).set_body_bytes(self.content.clone()),
        }
    }
}

/// Cuts the first `cut` answers short, then behaves like [`RangeResponder`].
///
/// A short answer carries only the first `chunk` bytes of what was asked for,
/// like a connection dropped mid-transfer.
pub struct FlakyResponder {
    inner: RangeResponder,
    chunk: usize,
    cut: usize,
    calls: AtomicUsize,
}

impl FlakyResponder {
    pub fn new(content: &[u8], chunk: usize, cut: usize) -> Self {
        Self {
            inner: RangeResponder::new(content),
            chunk,
            cut,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for FlakyResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.cut {
            return self.inner.respond(request);
        }

        let total = self.inner.content.len();
        let start = requested_start(request).unwrap_or(0);
        let end = (start + self.chunk).min(total);
        let body = self.inner.content[start..end].to_vec();
        if start == 0 {
            ResponseTemplate::new(200).set_body_bytes(body)
        } else {
            ResponseTemplate::new(206)
                .insert_header(
                    "content-range",
                    format!("bytes {}-{}/{}", start, end - 1, total).as_str(),
                )
                .set_body_bytes(body)
        }
    }
}

/// Always answers with a 206 covering the whole file, whatever was asked.
pub struct MisalignedResponder {
    content: Vec<u8>,
}

impl MisalignedResponder {
    pub fn new(content: &[u8]) -> Self {
        Self {
            content: content.to_vec(),
        }
    }
}

impl Respond for MisalignedResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let total = self.content.len();
        ResponseTemplate::new(206)
            .insert_header(
                "content-range",
                format!("bytes 0-{}/{}", total - 1, total).as_str(),
            )
            .set_body_bytes(self.content.clone())
    }
}

// === Assertion Helpers ===

/// Asserts that the file at `path` holds exactly `expected`
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let actual = fs::read(path).expect("Failed to read downloaded file");
    assert_eq!(actual.len(), expected.len(), "File size mismatch at path: {:?}", path);
    assert!(actual == expected, "File content mismatch at path: {:?}", path);
}

// === Raw Socket Server ===

/// How the first GET answered by [`spawn_interrupting_server`] goes wrong.
#[derive(Debug, Clone, Copy)]
pub struct Interruption {
    /// Body bytes actually sent.
    pub sent: usize,
    /// Length announced in `Content-Length`.
    pub declared: usize,
    /// Keep the connection open this long instead of closing it.
    pub stall: Option<Duration>,
}

/// A plain TCP server for failures wiremock cannot produce.
///
/// HEAD requests get the real length. The first GET is answered according to
/// `interruption`, every later one like a resume-capable server would.
/// Returns the artifact URL and the `Range` headers of the GET requests.
pub async fn spawn_interrupting_server(
    content: Vec<u8>,
    interruption: Interruption,
) -> (String, Arc<Mutex<Vec<Option<String>>>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read listener address");
    let ranges = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&ranges);
    let content = Arc::new(content);

    tokio::spawn(async move {
        let gets = Arc::new(AtomicUsize::new(0));
        while let Ok((socket, _)) = listener.accept().await {
            let content = Arc::clone(&content);
            let seen = Arc::clone(&seen);
            let gets = Arc::clone(&gets);
            tokio::spawn(async move {
                serve_connection(socket, &content, interruption, &seen, &gets).await;
            });
        }
    });

    (format!("http://{}{}", addr, ARTIFACT_PATH), ranges)
}

async fn serve_connection(
    mut socket: TcpStream,
    content: &[u8],
    interruption: Interruption,
    seen: &Mutex<Vec<Option<String>>>,
    gets: &AtomicUsize,
) {
    let Some(head) = read_request_head(&mut socket).await else {
        return;
    };
    let total = content.len();

    if !head.starts_with("GET ") {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            total
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
        return;
    }

    let range = request_header(&head, "range");
    seen.lock().expect("ranges lock poisoned").push(range.clone());

    if gets.fetch_add(1, Ordering::SeqCst) == 0 {
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            interruption.declared
        );
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(&content[..interruption.sent]).await;
        let _ = socket.flush().await;
        if let Some(stall) = interruption.stall {
            tokio::time::sleep(stall).await;
        }
        let _ = socket.shutdown().await;
        return;
    }

    let start = range
        .as_deref()
        .and_then(|r| r.strip_prefix("bytes="))
        .and_then(|r| r.strip_suffix('-'))
        .and_then(|r| r.parse::<usize>().ok())
        .unwrap_or(0)
        .min(total);
    let head = if start == 0 {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            total
        )
    } else {
        format!(
            "HTTP/1.1 206 Partial Content\r\nContent-Length: {}\r\nContent-Range: bytes {}-{}/{}\r\nConnection: close\r\n\r\n",
            total - start,
            start,
            total - 1,
            total
        )
    };
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(&content[start..]).await;
    let _ = socket.shutdown().await;
}

async fn read_request_head(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8(buf).ok()
}

fn request_header(head: &str, name: &str) -> Option<String> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}
