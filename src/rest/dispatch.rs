//! Route dispatcher (§4.7 "Dispatcher"): routes registered as either literal
//! substring or regex matches on the URI, handlers keyed by HTTP method, CORS headers
//! injected on every response, `OPTIONS` short-circuited with `200 OK`. Grounded in
//! `examples/original_source/src/common/network/rest/RequestDispatcher.h`'s
//! `RequestMatcher`/`RequestDispatcher` template pair, generalized from C++ templates
//! to a boxed-closure map since Rust has no equivalent of instantiating the dispatcher
//! per `(Request, Reply)` type pair (this crate only ever dispatches one concrete
//! payload type).

use std::collections::HashMap;

use regex::Regex;

use crate::rest::http::{Method, Payload, Status};

/// A matched request, with any regex capture groups alongside the raw body.
pub struct RequestMatch<'a> {
    pub captures: Vec<String>,
    pub body: &'a [u8],
}

pub type Handler = Box<dyn Fn(&Payload, &RequestMatch) -> Payload + Send + Sync>;

enum Expression {
    Literal(String),
    Regex(Regex),
}

struct Matcher {
    expression: Expression,
    handlers: HashMap<Method, Handler>,
}

impl Matcher {
    fn matches(&self, uri: &str) -> Option<Vec<String>> {
        match &self.expression {
            Expression::Literal(lit) => uri.contains(lit.as_str()).then(Vec::new),
            Expression::Regex(re) => re.captures(uri).map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect()
            }),
        }
    }
}

/// Registers routes and dispatches incoming requests to their handler, per
/// `RequestDispatcher`. Route registration order matters: the first matching
/// expression wins, same as the original's linear scan over `m_matchers`.
#[derive(Default)]
pub struct Dispatcher {
    matchers: Vec<Matcher>,
}

impl Dispatcher {
    pub fn new() -> Dispatcher {
        Dispatcher { matchers: Vec::new() }
    }

    /// Register a literal-substring route. Returns a builder to attach per-method
    /// handlers.
    pub fn route(&mut self, expression: &str) -> RouteBuilder {
        self.matchers.push(Matcher { expression: Expression::Literal(expression.to_string()), handlers: HashMap::new() });
        let index = self.matchers.len() - 1;
        RouteBuilder { dispatcher: self, index }
    }

    /// Register a regex route.
    pub fn route_regex(&mut self, expression: &str) -> RouteBuilder {
        let re = Regex::new(expression).expect("route regex must compile");
        self.matchers.push(Matcher { expression: Expression::Regex(re), handlers: HashMap::new() });
        let index = self.matchers.len() - 1;
        RouteBuilder { dispatcher: self, index }
    }

    /// Route `request` to its handler, injecting CORS headers and short-circuiting
    /// `OPTIONS` on every matched route, per `RequestDispatcher::handleRequest`.
    pub fn dispatch(&self, request: &Payload) -> Payload {
        for matcher in &self.matchers {
            if let Some(captures) = matcher.matches(&request.uri) {
                let mut reply = if request.method == "OPTIONS" {
                    Payload::status_payload(Status::Ok)
                } else {
                    let method = match method_from_str(&request.method) {
                        Some(m) => m,
                        None => return Payload::status_payload(Status::BadRequest),
                    };
                    match matcher.handlers.get(&method) {
                        Some(handler) => {
                            let rmatch = RequestMatch { captures, body: &request.content };
                            handler(request, &rmatch)
                        }
                        None => Payload::status_payload(Status::NotFound),
                    }
                };
                add_cors_headers(&mut reply);
                return reply;
            }
        }

        let mut reply = Payload::status_payload(Status::BadRequest);
        add_cors_headers(&mut reply);
        reply
    }
}

fn add_cors_headers(reply: &mut Payload) {
    reply.headers.insert("Access-Control-Allow-Origin".into(), "*".into());
    reply.headers.insert("Access-Control-Allow-Methods".into(), "*".into());
    reply.headers.insert("Access-Control-Allow-Headers".into(), "*".into());
}

fn method_from_str(s: &str) -> Option<Method> {
    match s {
        "GET" => Some(Method::Get),
        "POST" => Some(Method::Post),
        "PUT" => Some(Method::Put),
        "DELETE" => Some(Method::Delete),
        "OPTIONS" => Some(Method::Options),
        _ => None,
    }
}

/// Attaches method handlers to the route just registered with
/// [`Dispatcher::route`]/[`Dispatcher::route_regex`], mirroring `RequestMatcher`'s
/// fluent `get()`/`post()`/`put()`/`del()`/`options()` builder.
pub struct RouteBuilder<'a> {
    dispatcher: &'a mut Dispatcher,
    index: usize,
}

impl<'a> RouteBuilder<'a> {
    pub fn get(self, handler: impl Fn(&Payload, &RequestMatch) -> Payload + Send + Sync + 'static) -> Self {
        self.insert(Method::Get, handler)
    }

    pub fn post(self, handler: impl Fn(&Payload, &RequestMatch) -> Payload + Send + Sync + 'static) -> Self {
        self.insert(Method::Post, handler)
    }

    pub fn put(self, handler: impl Fn(&Payload, &RequestMatch) -> Payload + Send + Sync + 'static) -> Self {
        self.insert(Method::Put, handler)
    }

    pub fn del(self, handler: impl Fn(&Payload, &RequestMatch) -> Payload + Send + Sync + 'static) -> Self {
        self.insert(Method::Delete, handler)
    }

    fn insert(self, method: Method, handler: impl Fn(&Payload, &RequestMatch) -> Payload + Send + Sync + 'static) -> Self {
        self.dispatcher.matchers[self.index].handlers.insert(method, Box::new(handler));
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_literal_route_dispatches_by_method() {
        let mut d = Dispatcher::new();
        d.route("/version").get(|_req, _m| Payload::status_payload(Status::Ok));

        let mut req = Payload::new();
        req.method = "GET".into();
        req.uri = "/version".into();
        let reply = d.dispatch(&req);
        assert_eq!(reply.status, Some(Status::Ok));
        assert_eq!(reply.headers.get("Access-Control-Allow-Origin").map(String::as_str), Some("*"));
    }

    #[test]
    fn test_unmatched_method_returns_404() {
        let mut d = Dispatcher::new();
        d.route("/version").get(|_req, _m| Payload::status_payload(Status::Ok));

        let mut req = Payload::new();
        req.method = "PUT".into();
        req.uri = "/version".into();
        let reply = d.dispatch(&req);
        assert_eq!(reply.status, Some(Status::NotFound));
    }

    #[test]
    fn test_unmatched_uri_returns_400() {
        let d = Dispatcher::new();
        let mut req = Payload::new();
        req.method = "GET".into();
        req.uri = "/nonexistent".into();
        let reply = d.dispatch(&req);
        assert_eq!(reply.status, Some(Status::BadRequest));
    }

    #[test]
    fn test_options_short_circuits_200() {
        let mut d = Dispatcher::new();
        d.route("/mode").put(|_req, _m| Payload::status_payload(Status::Ok));

        let mut req = Payload::new();
        req.method = "OPTIONS".into();
        req.uri = "/mode".into();
        let reply = d.dispatch(&req);
        assert_eq!(reply.status, Some(Status::Ok));
    }

    #[test]
    fn test_regex_route_captures() {
        let mut d = Dispatcher::new();
        d.route_regex(r"^/dmr-rid/(\d+)$").get(|_req, m| {
            assert_eq!(m.captures[0], "10001");
            Payload::status_payload(Status::Ok)
        });

        let mut req = Payload::new();
        req.method = "GET".into();
        req.uri = "/dmr-rid/10001".into();
        let reply = d.dispatch(&req);
        assert_eq!(reply.status, Some(Status::Ok));
    }
}
