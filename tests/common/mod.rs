//! Shared loopback HTTP stub for exercising the client without a network.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

/// Serve the given raw HTTP responses, one connection each, then stop.
/// Returns the base URL and a handle yielding the number of requests served.
pub fn serve_responses(responses: Vec<String>) -> (String, JoinHandle<u32>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let handle = thread::spawn(move || {
        let mut served = 0u32;
        for response in responses {
            let (mut stream, _) = listener.accept().expect("accept");
            read_http_request(&mut stream);
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            served += 1;
        }
        served
    });
    (format!("http://{addr}"), handle)
}

pub fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// A 200 response shaped like a generateContent payload carrying `text`
pub fn generation_response(text: &str) -> String {
    let body = serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    })
    .to_string();
    http_response("200 OK", &body)
}

/// Drain one HTTP request (headers plus Content-Length body) from the stream
fn read_http_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    loop {
        let n = stream.read(&mut tmp).expect("read request");
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let mut remaining = content_length.saturating_sub(buf.len() - (pos + 4));
            while remaining > 0 {
                let n = stream.read(&mut tmp).expect("read body");
                if n == 0 {
                    break;
                }
                remaining = remaining.saturating_sub(n);
            }
            return;
        }
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
