/// Minimal HTTP/1.1 server answering from a handler, for exercising the
/// fetch client and strategies without network access.
///
/// Every response carries `Connection: close`, so each attempt opens a fresh
/// connection and shows up as its own request line. The server also works as
/// a forward proxy target: proxied requests arrive with an absolute URI.
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl CannedResponse {
    pub fn json(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

type Handler = Arc<dyn Fn(&str) -> CannedResponse + Send + Sync>;

pub struct CannedServer {
    pub url: String,
    pub port: u16,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl CannedServer {
    /// Answer every request with `handler(request_line)`
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> CannedResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(handler);

        let log = requests.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let handler = handler.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    serve(stream, handler, log).await;
                });
            }
        });

        Self {
            url: format!("http://127.0.0.1:{}", port),
            port,
            requests,
            handle,
        }
    }

    /// Answer with `responses` in order, repeating the last one afterwards
    pub async fn sequence(responses: Vec<CannedResponse>) -> Self {
        let counter = Arc::new(Mutex::new(0usize));
        Self::start(move |_| {
            let mut index = counter.lock().unwrap();
            let response = responses[(*index).min(responses.len() - 1)].clone();
            *index += 1;
            response
        })
        .await
    }

    /// Request lines received so far, e.g. `GET /placowki/?page=1 HTTP/1.1`
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Drop for CannedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(mut stream: TcpStream, handler: Handler, log: Arc<Mutex<Vec<String>>>) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    // Headers only; the client under test sends GETs without bodies
    while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buffer);
    let request_line = head.lines().next().unwrap_or_default().to_string();
    log.lock().unwrap().push(request_line.clone());

    let response = handler(&request_line);
    let mut raw = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        reason(response.status),
        response.body.len()
    );
    for (name, value) in &response.headers {
        raw.push_str(&format!("{}: {}\r\n", name, value));
    }
    raw.push_str("\r\n");
    raw.push_str(&response.body);

    let _ = stream.write_all(raw.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
