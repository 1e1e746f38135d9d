//! Route dispatch for mocked endpoints
//!
//! A route is an explicit `(method, pattern, handler)` tuple. The table keeps
//! routes ordered most-specific-first so that `/api/user/me` is consulted
//! before `/api/user/*`, independent of the order routes were added in.
//! Patterns with equal specificity keep their registration order.
//!
//! Pattern syntax, matched against the path only (never the query string):
//! - `literal` matches the segment exactly
//! - `*` matches exactly one segment
//! - `**` as the final segment matches zero or more remaining segments

use std::collections::HashMap;

use axum::http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use pizzamock_common::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Rest,
}

/// A parsed path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Ordering key for patterns. Larger is more specific.
///
/// Fields compare in declaration order: literal segment count, then whether
/// the pattern is free of a trailing `**`, then single wildcard count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    literals: usize,
    exact: bool,
    wildcards: usize,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if pattern.contains('?') {
            return Err(invalid("query strings are not part of a pattern"));
        }

        let parts = split_path(pattern);
        let last = parts.len().saturating_sub(1);
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = match *part {
                "**" if i == last => Segment::Rest,
                "**" => return Err(invalid("'**' is only allowed as the final segment")),
                "*" => Segment::Any,
                p if p.contains('*') => {
                    return Err(invalid("wildcards must occupy a whole segment"))
                }
                p => Segment::Literal(p.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn specificity(&self) -> Specificity {
        let mut spec = Specificity {
            literals: 0,
            exact: true,
            wildcards: 0,
        };
        for segment in &self.segments {
            match segment {
                Segment::Literal(_) => spec.literals += 1,
                Segment::Any => spec.wildcards += 1,
                Segment::Rest => spec.exact = false,
            }
        }
        spec
    }

    /// Match a request path, returning the wildcard captures on success.
    ///
    /// A `**` capture is the remaining segments joined with `/`.
    pub fn matches(&self, path: &str) -> Option<Vec<String>> {
        let parts = split_path(path);
        let mut captures = Vec::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Rest => {
                    captures.push(parts.get(i..).unwrap_or_default().join("/"));
                    return Some(captures);
                }
                Segment::Any => captures.push(parts.get(i)?.to_string()),
                Segment::Literal(lit) => {
                    if *parts.get(i)? != lit.as_str() {
                        return None;
                    }
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(captures)
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('?')
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

// ============================================================================
// Requests and responses
// ============================================================================

/// An intercepted request, reduced to what the handlers look at
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

impl MockRequest {
    /// Build a request from a path that may carry a query string
    pub fn new(method: Method, path_and_query: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path_and_query, None),
        };
        Self {
            method,
            path: path.to_string(),
            query: parse_query(query),
            body: None,
        }
    }

    /// Build a request from raw HTTP parts. Bodies that are empty or not JSON
    /// are treated as absent.
    pub fn from_parts(method: Method, path: &str, query: Option<&str>, body: &[u8]) -> Self {
        let body = if body.is_empty() {
            None
        } else {
            match serde_json::from_slice(body) {
                Ok(v) => Some(v),
                Err(e) => {
                    debug!("ignoring non-JSON body on {} {}: {}", method, path, e);
                    None
                }
            }
        };
        Self {
            method,
            path: path.to_string(),
            query: parse_query(query),
            body,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

/// A fulfilled response
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl MockResponse {
    pub fn ok(body: impl Serialize) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn json(status: StatusCode, body: impl Serialize) -> Self {
        Self {
            status,
            body: serde_json::to_value(body).unwrap_or_else(|e| {
                warn!("response body failed to serialize: {}", e);
                Value::Null
            }),
        }
    }
}

/// What a handler decided to do with a call
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Fulfill(MockResponse),
    /// Not handled here; try the next matching route
    Fallback,
}

/// A request bound to the route that matched it
pub struct Call<'a> {
    pub request: &'a MockRequest,
    captures: Vec<String>,
}

impl<'a> Call<'a> {
    pub fn new(request: &'a MockRequest, captures: Vec<String>) -> Self {
        Self { request, captures }
    }

    /// The i-th wildcard capture, in pattern order
    pub fn capture(&self, i: usize) -> Option<&str> {
        self.captures.get(i).map(String::as_str)
    }

    /// Decode the body. A missing or mismatched body yields `T::default()`.
    pub fn json<T: DeserializeOwned + Default>(&self) -> T {
        let Some(body) = self.request.body.clone() else {
            return T::default();
        };
        serde_json::from_value(body).unwrap_or_else(|e| {
            warn!("ignoring request body that does not decode: {}", e);
            T::default()
        })
    }
}

// ============================================================================
// Route table
// ============================================================================

pub type Handler<S> = Box<dyn Fn(&mut S, &Call<'_>) -> Outcome + Send + Sync>;

struct Route<S> {
    name: &'static str,
    method: Method,
    pattern: RoutePattern,
    handler: Handler<S>,
}

/// Result of dispatching one request
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Fulfilled {
        route: &'static str,
        response: MockResponse,
    },
    /// No route fulfilled the request
    Passthrough,
}

/// Ordered set of routes over handler state `S`
pub struct RouteTable<S> {
    routes: Vec<Route<S>>,
}

impl<S> Default for RouteTable<S> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<S> RouteTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route and re-establish most-specific-first order
    pub fn register<F>(
        &mut self,
        method: Method,
        pattern: &str,
        name: &'static str,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(&mut S, &Call<'_>) -> Outcome + Send + Sync + 'static,
    {
        let pattern = RoutePattern::parse(pattern)?;
        self.routes.push(Route {
            name,
            method,
            pattern,
            handler: Box::new(handler),
        });
        // sort_by is stable, so equal specificity keeps registration order
        self.routes
            .sort_by(|a, b| b.pattern.specificity().cmp(&a.pattern.specificity()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// `(method, pattern, name)` in evaluation order
    pub fn describe(&self) -> Vec<(Method, String, &'static str)> {
        self.routes
            .iter()
            .map(|r| (r.method.clone(), r.pattern.as_str().to_string(), r.name))
            .collect()
    }

    pub fn dispatch(&self, state: &mut S, request: &MockRequest) -> Dispatch {
        for route in &self.routes {
            if route.method != request.method {
                continue;
            }
            let Some(captures) = route.pattern.matches(&request.path) else {
                continue;
            };

            let call = Call::new(request, captures);
            match (route.handler)(state, &call) {
                Outcome::Fulfill(response) => {
                    debug!(
                        "{} {} -> {} ({})",
                        request.method, request.path, route.name, response.status
                    );
                    return Dispatch::Fulfilled {
                        route: route.name,
                        response,
                    };
                }
                Outcome::Fallback => {
                    debug!("{} {} fell back from {}", request.method, request.path, route.name);
                }
            }
        }

        debug!("{} {} not mocked", request.method, request.path);
        Dispatch::Passthrough
    }
}
