//! Minimal blocking HTTP/1.1 server over any Read + Write stream.
//!
//! Works for TCP and Unix domain sockets alike, both implement Read + Write.
//!
//! Intentionally limited surface:
//! - One request per connection (no keep-alive)
//! - No chunked transfer encoding (rejected)
//! - POST requires Content-Length
//! - Header cap: 32 KiB, Body cap: 1 MiB (Read::take, not Content-Length trust)

use std::io::{Read, Write};

/// Maximum header section size (32 KiB)
const MAX_HEADER_SIZE: usize = 32 * 1024;

/// Maximum request body size (1 MiB)
pub const MAX_BODY_SIZE: usize = 1_048_576;

/// Why a request could not be read
#[derive(Debug, PartialEq, Eq)]
pub enum RequestError {
    /// Malformed or unsupported request (400)
    Malformed(String),
    /// Body exceeded [`MAX_BODY_SIZE`] (413)
    TooLarge,
}

/// Parsed HTTP request (transport-free)
#[derive(Debug)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// HTTP response to write back
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Reason phrase for the status codes the server emits
pub fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Read and parse one HTTP request from a stream.
///
/// Returns None if the connection closed before any bytes arrived.
/// Returns Some(Err) for requests the caller should answer with an error.
pub fn read_request(stream: &mut impl Read) -> Option<Result<HttpRequest, RequestError>> {
    // Read header section with cap
    let mut header_buf = Vec::with_capacity(4096);
    let mut byte = [0u8; 1];

    loop {
        match stream.read(&mut byte) {
            Ok(0) => {
                if header_buf.is_empty() {
                    return None;
                }
                return malformed("Connection closed mid-request".to_string());
            }
            Ok(_) => {
                header_buf.push(byte[0]);
                if header_buf.len() > MAX_HEADER_SIZE {
                    return malformed("Headers too large".to_string());
                }
                if header_buf.ends_with(b"\r\n\r\n") {
                    break;
                }
            }
            Err(e) => {
                if header_buf.is_empty() {
                    return None;
                }
                return malformed(format!("Read error: {}", e));
            }
        }
    }

    let mut parsed_headers = [httparse::EMPTY_HEADER; 64];
    let mut req = httparse::Request::new(&mut parsed_headers);

    match req.parse(&header_buf) {
        Ok(httparse::Status::Complete(_)) => {}
        Ok(httparse::Status::Partial) => {
            return malformed("Incomplete HTTP request".to_string());
        }
        Err(e) => {
            return malformed(format!("HTTP parse error: {}", e));
        }
    }

    let method = req.method.unwrap_or("").to_string();
    let path = req.path.unwrap_or("/").to_string();

    let mut headers = Vec::new();
    let mut content_length: Option<usize> = None;
    let mut chunked = false;

    for h in req.headers.iter() {
        let name = h.name.to_string();
        let value = String::from_utf8_lossy(h.value).to_string();

        if name.eq_ignore_ascii_case("Content-Length") {
            content_length = value.trim().parse().ok();
        }
        if name.eq_ignore_ascii_case("Transfer-Encoding")
            && value.to_lowercase().contains("chunked")
        {
            chunked = true;
        }

        headers.push((name, value));
    }

    if chunked {
        return malformed("Chunked transfer encoding not supported".to_string());
    }

    let body = if method == "POST" || method == "PUT" || method == "PATCH" {
        let Some(len) = content_length else {
            return malformed("POST requires Content-Length".to_string());
        };
        if len > MAX_BODY_SIZE {
            return Some(Err(RequestError::TooLarge));
        }

        let mut body = Vec::with_capacity(len);
        if let Err(e) = stream.take(len as u64).read_to_end(&mut body) {
            return malformed(format!("Read error: {}", e));
        }
        if body.len() < len {
            return malformed("Connection closed mid-body".to_string());
        }
        body
    } else {
        Vec::new()
    };

    Some(Ok(HttpRequest {
        method,
        path,
        headers,
        body,
    }))
}

fn malformed(msg: String) -> Option<Result<HttpRequest, RequestError>> {
    Some(Err(RequestError::Malformed(msg)))
}

/// Write an HTTP response to a stream.
pub fn write_response(stream: &mut impl Write, response: &HttpResponse) {
    let mut header_block = format!(
        "HTTP/1.1 {} {}\r\n",
        response.status,
        reason(response.status)
    );
    header_block.push_str(&format!("Content-Length: {}\r\n", response.body.len()));
    header_block.push_str("Connection: close\r\n");

    for (name, value) in &response.headers {
        header_block.push_str(&format!("{}: {}\r\n", name, value));
    }
    header_block.push_str("\r\n");

    // Client may have disconnected; nothing useful to do with write errors
    let _ = stream.write_all(header_block.as_bytes());
    if !response.body.is_empty() {
        let _ = stream.write_all(&response.body);
    }
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_get_request() {
        let raw = b"GET /existingresult/1 HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let mut stream = Cursor::new(raw.to_vec());
        let req = read_request(&mut stream).unwrap().unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/existingresult/1");
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_parse_post_with_body() {
        let body = r#"{"inputs":[10.0,20.0]}"#;
        let raw = format!(
            "POST /addition HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let mut stream = Cursor::new(raw.into_bytes());
        let req = read_request(&mut stream).unwrap().unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/addition");
        assert_eq!(String::from_utf8_lossy(&req.body), body);
    }

    #[test]
    fn test_reject_chunked() {
        let raw = b"POST /addition HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";
        let mut stream = Cursor::new(raw.to_vec());
        match read_request(&mut stream).unwrap() {
            Err(RequestError::Malformed(msg)) => assert!(msg.contains("Chunked")),
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_post_requires_content_length() {
        let raw = b"POST /addition HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let mut stream = Cursor::new(raw.to_vec());
        match read_request(&mut stream).unwrap() {
            Err(RequestError::Malformed(msg)) => assert!(msg.contains("Content-Length")),
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_body_over_cap_rejected() {
        let raw = format!(
            "POST /addition HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            MAX_BODY_SIZE + 1
        );
        let mut stream = Cursor::new(raw.into_bytes());
        assert_eq!(
            read_request(&mut stream).unwrap().unwrap_err(),
            RequestError::TooLarge
        );
    }

    #[test]
    fn test_truncated_body_rejected() {
        let raw = b"POST /addition HTTP/1.1\r\nContent-Length: 50\r\n\r\n{\"inputs\":[]}";
        let mut stream = Cursor::new(raw.to_vec());
        assert!(matches!(
            read_request(&mut stream).unwrap(),
            Err(RequestError::Malformed(_))
        ));
    }

    #[test]
    fn test_write_response() {
        let resp = HttpResponse {
            status: 403,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: b"{}".to_vec(),
        };
        let mut buf = Vec::new();
        write_response(&mut buf, &resp);
        let output = String::from_utf8_lossy(&buf);
        assert!(output.starts_with("HTTP/1.1 403 Forbidden\r\n"));
        assert!(output.contains("Content-Length: 2\r\n"));
        assert!(output.contains("Connection: close\r\n"));
        assert!(output.contains("Content-Type: application/json\r\n"));
        assert!(output.ends_with("{}"));
    }

    #[test]
    fn test_empty_stream_returns_none() {
        let mut stream = Cursor::new(Vec::<u8>::new());
        assert!(read_request(&mut stream).is_none());
    }

    #[test]
    fn test_headers_too_large() {
        let huge_header = format!(
            "GET / HTTP/1.1\r\nX-Big: {}\r\n\r\n",
            "A".repeat(MAX_HEADER_SIZE)
        );
        let mut stream = Cursor::new(huge_header.into_bytes());
        match read_request(&mut stream).unwrap() {
            Err(RequestError::Malformed(msg)) => assert!(msg.contains("too large")),
            other => panic!("expected malformed, got {:?}", other),
        }
    }
}
