//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body. Responds to HEAD with Content-Length and
//! Accept-Ranges: bytes; responds to GET with Range with 206 Partial Content.
//! Knobs simulate the failures the downloader must report.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// Status returned for HEAD (e.g. 404 to simulate a missing resource).
    pub head_status: u16,
    /// If false, HEAD omits Content-Length.
    pub head_content_length: bool,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// Close the connection without a response for the GET whose range starts here.
    pub drop_range_starting_at: Option<u64>,
    /// Hold the connection open without ever answering the GET whose range starts here.
    pub stall_range_starting_at: Option<u64>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            head_status: 200,
            head_content_length: true,
            support_ranges: true,
            drop_range_starting_at: None,
            stall_range_starting_at: None,
        }
    }
}

/// A request as seen by the server.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub user_agent: Option<String>,
    pub range: Option<String>,
}

/// Handle to a running server. The server runs until the process exits.
pub struct RangeServer {
    pub url: String,
    requests: Arc<Mutex<Vec<SeenRequest>>>,
    gets: Arc<AtomicUsize>,
}

impl RangeServer {
    /// Number of GET requests received so far.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Range header values of all GETs, sorted.
    pub fn ranges_requested(&self) -> Vec<String> {
        let mut r: Vec<String> = self
            .requests()
            .into_iter()
            .filter(|r| r.method == "GET")
            .filter_map(|r| r.range)
            .collect();
        r.sort();
        r
    }
}

/// Starts a server in a background thread serving `body`.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let gets = Arc::new(AtomicUsize::new(0));
    {
        let requests = Arc::clone(&requests);
        let gets = Arc::clone(&gets);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let body = Arc::clone(&body);
                let requests = Arc::clone(&requests);
                let gets = Arc::clone(&gets);
                thread::spawn(move || handle(stream, &body, opts, &requests, &gets));
            }
        });
    }
    RangeServer {
        url: format!("http://127.0.0.1:{}/file.bin", port),
        requests,
        gets,
    }
}

fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8(buf).ok()
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    opts: RangeServerOptions,
    requests: &Mutex<Vec<SeenRequest>>,
    gets: &AtomicUsize,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let request = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let seen = parse_request(&request);
    requests.lock().unwrap().push(seen.clone());
    let total = body.len() as u64;

    if seen.method.eq_ignore_ascii_case("HEAD") {
        let length = if opts.head_content_length {
            format!("Content-Length: {}\r\n", total)
        } else {
            String::new()
        };
        let response = format!(
            "HTTP/1.1 {} {}\r\n{}Accept-Ranges: bytes\r\nConnection: close\r\n\r\n",
            opts.head_status,
            reason(opts.head_status),
            length
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if seen.method.eq_ignore_ascii_case("GET") {
        gets.fetch_add(1, Ordering::SeqCst);
        let range = seen.range.as_deref().and_then(parse_range);
        if let (Some(drop_at), Some((start, _))) = (opts.drop_range_starting_at, range) {
            if start == drop_at {
                // Close without a response: the client sees a transport failure.
                let _ = stream.shutdown(std::net::Shutdown::Both);
                return;
            }
        }
        if let (Some(stall_at), Some((start, _))) = (opts.stall_range_starting_at, range) {
            if start == stall_at {
                // Block until the client gives up and closes its end.
                let _ = stream.set_read_timeout(None);
                let mut sink = [0u8; 256];
                while matches!(stream.read(&mut sink), Ok(n) if n > 0) {}
                return;
            }
        }
        let (status, extra, slice) = match range {
            Some((start, end_incl)) if opts.support_ranges => {
                let end_incl = end_incl.min(total.saturating_sub(1));
                if start > end_incl {
                    (416, format!("Content-Range: bytes */{}\r\n", total), &body[0..0])
                } else {
                    let slice = &body[start as usize..=end_incl as usize];
                    (
                        206,
                        format!("Content-Range: bytes {}-{}/{}\r\n", start, end_incl, total),
                        slice,
                    )
                }
            }
            _ => (200, String::new(), body),
        };
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            status,
            reason(status),
            slice.len(),
            extra
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(slice);
        return;
    }

    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        206 => "Partial Content",
        404 => "Not Found",
        416 => "Range Not Satisfiable",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

fn parse_request(request: &str) -> SeenRequest {
    let mut lines = request.lines();
    let method = lines
        .next()
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or("")
        .to_string();
    let mut user_agent = None;
    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("user-agent") {
                user_agent = Some(value.trim().to_string());
            } else if name.eq_ignore_ascii_case("range") {
                range = Some(value.trim().to_string());
            }
        }
    }
    SeenRequest {
        method,
        user_agent,
        range,
    }
}

/// Parses `bytes=X-Y` into `(X, Y)`.
fn parse_range(value: &str) -> Option<(u64, u64)> {
    let part = value.strip_prefix("bytes=")?;
    let (a, b) = part.split_once('-')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}
