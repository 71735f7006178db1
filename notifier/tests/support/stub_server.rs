//! Loopback HTTP stub standing in for Google endpoints.
//!
//! The stub serves one connection per scripted response, captures each
//! request and closes the connection, so every client call is observable.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Request observed by the stub.
#[derive(Debug)]
pub struct CapturedRequest {
    /// First line, e.g. `POST /path HTTP/1.1`.
    pub request_line: String,
    /// Header pairs in arrival order.
    pub headers: Vec<(String, String)>,
    /// Decoded request body.
    pub body: String,
}

impl CapturedRequest {
    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Running stub with its base URL.
pub struct StubServer {
    /// Base URL to hand to the adapter, ending in `/`.
    pub base_url: String,
    handle: JoinHandle<Vec<CapturedRequest>>,
}

impl StubServer {
    /// Wait until every scripted response has been served.
    pub async fn captured(self) -> Vec<CapturedRequest> {
        self.handle.await.expect("stub server task")
    }
}

/// Start a stub answering successive requests with `responses`.
pub async fn serve(responses: Vec<(u16, &'static str)>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub address");

    let handle = tokio::spawn(async move {
        let mut captured = Vec::with_capacity(responses.len());
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.expect("accept");
            captured.push(read_request(&mut socket).await);
            let response = format!(
                "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            socket.shutdown().await.expect("shutdown");
        }
        captured
    });

    StubServer {
        base_url: format!("http://{addr}/"),
        handle,
    }
}

async fn read_request(socket: &mut TcpStream) -> CapturedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];
    loop {
        let read = socket.read(&mut chunk).await.expect("read request");
        assert!(read > 0, "client closed before sending a full request");
        buffer.extend(chunk.iter().take(read));

        if let Some(request) = parse_request(&buffer) {
            return request;
        }
    }
}

fn parse_request(buffer: &[u8]) -> Option<CapturedRequest> {
    let text = String::from_utf8_lossy(buffer);
    let (head, body) = text.split_once("\r\n\r\n")?;
    let mut lines = head.lines();
    let request_line = lines.next()?.to_owned();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .collect();
    let expected = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    if body.len() < expected {
        return None;
    }
    Some(CapturedRequest {
        request_line,
        headers,
        body: body.to_owned(),
    })
}
