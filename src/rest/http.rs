//! HTTP/1.0 request lexer and payload model (§4.7 "Wire"). A character-by-character
//! state machine over {METHOD, URI, VERSION, HEADERS, BODY}, grounded in
//! `examples/original_source/src/common/network/rest/http/HTTPLexer.{h,cpp}`'s
//! `consume()` state table (reduced here to the five state groups spec.md names,
//! rather than transcribing every sub-state of the `HTTP_VERSION_*`/`HTTP_STATUS_*`
//! split the original uses for both request and reply parsing — this crate's lexer
//! only ever parses requests) and `HTTPPayload.h`'s status/header/content fields.

use std::collections::HashMap;

/// HTTP method, per spec.md §4.7's taxonomy (GET/POST/PUT/DELETE/OPTIONS).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Options,
}

impl Method {
    fn from_str(s: &str) -> Option<Method> {
        match s {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            "OPTIONS" => Some(Method::Options),
            _ => None,
        }
    }
}

/// HTTP status codes used by the REST control plane, per `HTTPPayload.h`'s
/// `StatusType`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    Ok = 200,
    Created = 201,
    NoContent = 204,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    InternalServerError = 500,
}

impl Status {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Created => "Created",
            Status::NoContent => "No Content",
            Status::BadRequest => "Bad Request",
            Status::Unauthorized => "Unauthorized",
            Status::Forbidden => "Forbidden",
            Status::NotFound => "Not Found",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

/// A parsed (or in-progress) HTTP/1.0 request or a response to be written, per
/// `HTTPPayload`. One type serves both directions, matching the original.
#[derive(Clone, Debug, Default)]
pub struct Payload {
    pub method: String,
    pub uri: String,
    pub version_major: u8,
    pub version_minor: u8,
    pub headers: HashMap<String, String>,
    pub content: Vec<u8>,
    pub status: Option<Status>,
}

impl Payload {
    pub fn new() -> Payload {
        Payload::default()
    }

    /// Case-insensitive header lookup, per spec.md's "case-insensitive header names".
    pub fn header(&self, name: &str) -> Option<&str> {
        let lower = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_ascii_lowercase() == lower)
            .map(|(_, v)| v.as_str())
    }

    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length").and_then(|v| v.parse().ok())
    }

    /// Build a minimal status-only response, the `statusPayload` equivalent.
    pub fn status_payload(status: Status) -> Payload {
        let mut p = Payload::new();
        p.status = Some(status);
        p.headers.insert("Content-Type".into(), "application/json".into());
        p
    }

    /// Build a JSON response body with the given status.
    pub fn json_payload(status: Status, body: &serde_json::Value) -> Payload {
        let mut p = Payload::status_payload(status);
        p.content = serde_json::to_vec(body).unwrap_or_default();
        p
    }

    /// Serialize to the bytes that go out on the wire (CRLF-terminated status line,
    /// headers, blank line, body).
    pub fn to_bytes(&self) -> Vec<u8> {
        let status = self.status.unwrap_or(Status::Ok);
        let mut out = format!("HTTP/1.0 {} {}\r\n", status.code(), status.reason()).into_bytes();
        for (k, v) in &self.headers {
            out.extend_from_slice(format!("{k}: {v}\r\n").as_bytes());
        }
        out.extend_from_slice(format!("Content-Length: {}\r\n\r\n", self.content.len()).as_bytes());
        out.extend_from_slice(&self.content);
        out
    }
}

/// Result of feeding bytes into the lexer, per spec.md §4.7: `GOOD` on a complete
/// request, `BAD` on illegal input (→ 400), `INDETERMINATE` when more data is needed
/// (the server re-reads).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LexResult {
    Good,
    Bad,
    Indeterminate,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum State {
    Method,
    Uri,
    Version,
    HeaderLineStart,
    HeaderName,
    HeaderValue,
    ExpectingNewline,
    Body,
}

/// Character-by-character HTTP/1.0 request lexer. One instance parses one request;
/// `reset()` prepares it for the next.
pub struct Lexer {
    state: State,
    method_buf: String,
    uri_buf: String,
    version_buf: String,
    header_name_buf: String,
    header_value_buf: String,
    content_length: Option<usize>,
}

impl Lexer {
    pub fn new() -> Lexer {
        Lexer {
            state: State::Method,
            method_buf: String::new(),
            uri_buf: String::new(),
            version_buf: String::new(),
            header_name_buf: String::new(),
            header_value_buf: String::new(),
            content_length: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Lexer::new();
    }

    /// Feed in one buffer's worth of bytes. Returns `(GOOD, n)` once `payload` holds
    /// a complete request (`n` is how many bytes of `buf` were consumed, possibly
    /// fewer than `buf.len()`); `(BAD, n)` on malformed input; `(INDETERMINATE,
    /// buf.len())` when the whole buffer was consumed but the request isn't
    /// complete yet — the "continue" mode of spec.md §4.7, where the caller appends
    /// the next read and calls `parse` again with the same lexer/payload.
    pub fn parse(&mut self, payload: &mut Payload, buf: &[u8]) -> (LexResult, usize) {
        for (i, &byte) in buf.iter().enumerate() {
            match self.consume(payload, byte) {
                LexResult::Indeterminate => continue,
                result => return (result, i + 1),
            }
        }
        (LexResult::Indeterminate, buf.len())
    }

    fn consume(&mut self, payload: &mut Payload, c: u8) -> LexResult {
        match self.state {
            State::Method => {
                if c == b' ' {
                    match Method::from_str(&self.method_buf) {
                        Some(_) => {
                            payload.method = self.method_buf.clone();
                            self.state = State::Uri;
                            LexResult::Indeterminate
                        }
                        None => LexResult::Bad,
                    }
                } else if c.is_ascii_uppercase() {
                    self.method_buf.push(c as char);
                    LexResult::Indeterminate
                } else {
                    LexResult::Bad
                }
            }
            State::Uri => {
                if c == b' ' {
                    payload.uri = self.uri_buf.clone();
                    self.state = State::Version;
                    LexResult::Indeterminate
                } else if c == b'\r' || c == b'\n' || c == 0 {
                    LexResult::Bad
                } else {
                    self.uri_buf.push(c as char);
                    LexResult::Indeterminate
                }
            }
            State::Version => {
                if c == b'\r' {
                    if !self.version_buf.starts_with("HTTP/") {
                        return LexResult::Bad;
                    }
                    let digits = &self.version_buf[5..];
                    let mut parts = digits.splitn(2, '.');
                    let parsed = match (parts.next(), parts.next()) {
                        (Some(maj), Some(min)) => maj.parse().ok().zip(min.parse().ok()),
                        _ => None,
                    };
                    let (maj, min) = match parsed {
                        Some(pair) => pair,
                        None => return LexResult::Bad,
                    };
                    payload.version_major = maj;
                    payload.version_minor = min;
                    self.state = State::ExpectingNewline;
                    LexResult::Indeterminate
                } else {
                    self.version_buf.push(c as char);
                    LexResult::Indeterminate
                }
            }
            State::ExpectingNewline => {
                if c != b'\n' {
                    return LexResult::Bad;
                }
                self.state = State::HeaderLineStart;
                LexResult::Indeterminate
            }
            State::HeaderLineStart => {
                if c == b'\r' {
                    // Blank line: headers are done.
                    self.content_length = payload.content_length();
                    match self.content_length {
                        Some(0) | None => LexResult::Good,
                        Some(_) => {
                            self.state = State::Body;
                            LexResult::Indeterminate
                        }
                    }
                } else if c == b':' {
                    LexResult::Bad
                } else {
                    self.header_name_buf.clear();
                    self.header_name_buf.push(c as char);
                    self.state = State::HeaderName;
                    LexResult::Indeterminate
                }
            }
            State::HeaderName => {
                if c == b':' {
                    self.header_value_buf.clear();
                    self.state = State::HeaderValue;
                    LexResult::Indeterminate
                } else if c == b'\r' || c == b'\n' {
                    LexResult::Bad
                } else {
                    self.header_name_buf.push(c as char);
                    LexResult::Indeterminate
                }
            }
            State::HeaderValue => {
                if c == b'\r' {
                    payload.headers.insert(
                        self.header_name_buf.trim().to_string(),
                        self.header_value_buf.trim().to_string(),
                    );
                    self.state = State::ExpectingNewline;
                    LexResult::Indeterminate
                } else {
                    self.header_value_buf.push(c as char);
                    LexResult::Indeterminate
                }
            }
            State::Body => {
                payload.content.push(c);
                let want = self.content_length.unwrap_or(0);
                if payload.content.len() >= want {
                    LexResult::Good
                } else {
                    LexResult::Indeterminate
                }
            }
        }
    }
}

impl Default for Lexer {
    fn default() -> Lexer {
        Lexer::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn run(input: &[u8]) -> (LexResult, Payload) {
        let mut lexer = Lexer::new();
        let mut payload = Payload::new();
        let (result, _) = lexer.parse(&mut payload, input);
        (result, payload)
    }

    #[test]
    fn test_get_request_no_body() {
        let req = b"GET /status HTTP/1.0\r\nHost: x\r\n\r\n";
        let (result, payload) = run(req);
        assert_eq!(result, LexResult::Good);
        assert_eq!(payload.method, "GET");
        assert_eq!(payload.uri, "/status");
        assert_eq!(payload.header("Host"), Some("x"));
    }

    #[test]
    fn test_put_request_with_body() {
        let req = b"PUT /auth HTTP/1.0\r\nContent-Length: 5\r\n\r\nhello";
        let (result, payload) = run(req);
        assert_eq!(result, LexResult::Good);
        assert_eq!(payload.content, b"hello");
    }

    #[test]
    fn test_indeterminate_then_continue() {
        let mut lexer = Lexer::new();
        let mut payload = Payload::new();
        let (r1, n1) = lexer.parse(&mut payload, b"PUT /auth HTTP/1.0\r\nContent-Length: 5\r\n\r\nhel");
        assert_eq!(r1, LexResult::Indeterminate);
        assert_eq!(n1, "PUT /auth HTTP/1.0\r\nContent-Length: 5\r\n\r\nhel".len());

        let (r2, _) = lexer.parse(&mut payload, b"lo");
        assert_eq!(r2, LexResult::Good);
        assert_eq!(payload.content, b"hello");
    }

    #[test]
    fn test_illegal_method_rejected() {
        let (result, _) = run(b"FETCH /x HTTP/1.0\r\n\r\n");
        assert_eq!(result, LexResult::Bad);
    }

    #[test]
    fn test_malformed_version_rejected() {
        let (result, _) = run(b"GET /x NOTHTTP\r\n\r\n");
        assert_eq!(result, LexResult::Bad);
    }
}
