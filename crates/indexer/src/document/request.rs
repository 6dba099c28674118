//! Request-line and header value decomposition.

use super::model::{ABSENT, UNKNOWN};

/// `%r` split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub resource: String,
    pub params: String,
    pub protocol: String,
}

impl RequestLine {
    /// Split `METHOD resource[?params] PROTOCOL`.
    ///
    /// The method ends at the first space and the protocol starts after the
    /// last one, so resources containing spaces survive intact.
    pub fn decompose(request: &str) -> Self {
        let (method, rest) = match request.split_once(' ') {
            Some((method, rest)) => (method, rest),
            None => (ABSENT, request),
        };

        let (resource, protocol) = match rest.rsplit_once(' ') {
            Some((resource, protocol)) => (resource, protocol),
            None => (rest, ABSENT),
        };

        let (path, params) = match resource.split_once('?') {
            Some((path, params)) => (path, params),
            None => (resource, ABSENT),
        };

        Self {
            method: method.to_string(),
            resource: if path.is_empty() { ABSENT } else { path }.to_string(),
            params: params.to_string(),
            protocol: protocol.to_string(),
        }
    }

    /// Used when the format has no `%r` directive at all.
    pub fn unknown() -> Self {
        Self {
            method: UNKNOWN.to_string(),
            resource: UNKNOWN.to_string(),
            params: UNKNOWN.to_string(),
            protocol: UNKNOWN.to_string(),
        }
    }
}

/// Split an `X-Forwarded-For` value into individual addresses, in order.
pub fn split_forwarded(value: &str) -> Vec<String> {
    let addresses: Vec<String> = value
        .split(", ")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();

    if addresses.is_empty() {
        vec![ABSENT.to_string()]
    } else {
        addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_full_request() {
        let req = RequestLine::decompose("GET /a/b?x=1 HTTP/1.1");
        assert_eq!(req.method, "GET");
        assert_eq!(req.resource, "/a/b");
        assert_eq!(req.params, "x=1");
        assert_eq!(req.protocol, "HTTP/1.1");
    }

    #[test]
    fn test_decompose_without_query() {
        let req = RequestLine::decompose("POST /api/v1/data HTTP/1.0");
        assert_eq!(req.resource, "/api/v1/data");
        assert_eq!(req.params, "-");
    }

    #[test]
    fn test_decompose_keeps_later_question_marks_in_params() {
        let req = RequestLine::decompose("GET /search?q=a?b HTTP/1.1");
        assert_eq!(req.resource, "/search");
        assert_eq!(req.params, "q=a?b");
    }

    #[test]
    fn test_decompose_resource_with_spaces() {
        let req = RequestLine::decompose("GET /my file.txt HTTP/1.1");
        assert_eq!(req.method, "GET");
        assert_eq!(req.resource, "/my file.txt");
        assert_eq!(req.protocol, "HTTP/1.1");
    }

    #[test]
    fn test_decompose_dash_request() {
        // Apache logs "-" for connections that never sent a request line
        let req = RequestLine::decompose("-");
        assert_eq!(req.method, "-");
        assert_eq!(req.resource, "-");
        assert_eq!(req.params, "-");
        assert_eq!(req.protocol, "-");
    }

    #[test]
    fn test_decompose_http09_request_without_protocol() {
        let req = RequestLine::decompose("GET /");
        assert_eq!(req.method, "GET");
        assert_eq!(req.resource, "/");
        assert_eq!(req.protocol, "-");
    }

    #[test]
    fn test_decompose_query_only_resource() {
        let req = RequestLine::decompose("GET ?x=1 HTTP/1.1");
        assert_eq!(req.resource, "-");
        assert_eq!(req.params, "x=1");
    }

    #[test]
    fn test_split_forwarded_in_order() {
        assert_eq!(
            split_forwarded("70.196.196.64, 23.57.68.53, 127.0.0.1"),
            vec!["70.196.196.64", "23.57.68.53", "127.0.0.1"]
        );
    }

    #[test]
    fn test_split_forwarded_single_and_empty() {
        assert_eq!(split_forwarded("10.1.1.1"), vec!["10.1.1.1"]);
        assert_eq!(split_forwarded(""), vec!["-"]);
    }
}
