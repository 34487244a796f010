//! Per-request context — the parsed request plus the path parameters captured
//! by the router.

use std::collections::HashMap;
use std::str::FromStr;

use crate::Request;

/// Path parameters extracted from the matched route, e.g. `id → "42"` for
/// `/players/:id`.
#[derive(Default, Debug, Clone)]
pub struct PathParams {
    map: HashMap<String, String>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.map.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Per-request context handed to middleware and handlers.
pub struct Context {
    request: Request,
    params: PathParams,
}

impl Context {
    /// Create a context with no path parameters.
    pub fn new(request: Request) -> Self {
        Self::with_params(request, PathParams::new())
    }

    /// Create a context carrying the parameters captured by the router.
    pub fn with_params(request: Request, params: PathParams) -> Self {
        Self { request, params }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Parses the path parameter `name` into `T`.
    ///
    /// Returns `None` both when the parameter is absent and when it does not
    /// parse; handlers answer either case with `400 Bad Request`.
    pub fn param<T: FromStr>(&self, name: &str) -> Option<T> {
        self.params.get(name)?.parse().ok()
    }

    /// Like [`Context::param`], but also rejects text that parses yet is not
    /// how `T` prints itself, e.g. `"01"` or `"+1"` for an integer.
    ///
    /// Cache keys are built from the raw path, so only one spelling of a
    /// resource may be served.
    pub fn canonical_param<T: FromStr + ToString>(&self, name: &str) -> Option<T> {
        let raw = self.params.get(name)?;
        let value: T = raw.parse().ok()?;
        (value.to_string() == raw).then_some(value)
    }

    /// Deserializes the request body as JSON.
    pub fn json<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_slice(self.request.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(raw: &str, params: &[(&str, &str)]) -> Context {
        let (req, _) = Request::parse(raw.as_bytes()).unwrap();
        let mut p = PathParams::new();
        for (k, v) in params {
            p.insert((*k).to_owned(), (*v).to_owned());
        }
        Context::with_params(req, p)
    }

    #[test]
    fn numeric_param_parses() {
        let ctx = ctx_with("GET /players/7 HTTP/1.1\r\n\r\n", &[("id", "7")]);
        assert_eq!(ctx.param::<i64>("id"), Some(7));
    }

    #[test]
    fn non_numeric_param_is_none() {
        let ctx = ctx_with("GET /players/abc HTTP/1.1\r\n\r\n", &[("id", "abc")]);
        assert_eq!(ctx.param::<i64>("id"), None);
        assert_eq!(ctx.param::<i64>("missing"), None);
    }

    #[test]
    fn canonical_param_rejects_alternate_spellings() {
        for raw in ["01", "+1", "-0"] {
            let ctx = ctx_with("GET /players/x HTTP/1.1\r\n\r\n", &[("id", raw)]);
            assert_eq!(ctx.canonical_param::<i64>("id"), None, "{raw}");
            assert!(ctx.param::<i64>("id").is_some());
        }
        let ctx = ctx_with("GET /players/-3 HTTP/1.1\r\n\r\n", &[("id", "-3")]);
        assert_eq!(ctx.canonical_param::<i64>("id"), Some(-3));
    }

    #[test]
    fn empty_body_is_a_json_error() {
        let ctx = ctx_with("POST /players HTTP/1.1\r\n\r\n", &[]);
        assert!(ctx.json::<serde_json::Value>().is_err());
    }
}
