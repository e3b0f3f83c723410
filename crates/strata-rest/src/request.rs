//! Generic requests and paged responses
//!
//! Transport-independent: a [`Request`] is a method, a path, query
//! parameters and an optional JSON body; a [`Response`] is a status,
//! headers and an optional [`ResultBody`].

use crate::error::RestError;
use crate::path::ResourcePath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Request verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Read
    Get,
    /// Read without body
    Head,
    /// List allowed verbs
    Options,
    /// Create
    Post,
    /// Update
    Put,
    /// Partial update (never supported)
    Patch,
    /// Delete
    Delete,
}

impl Method {
    /// Upper-case verb name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(RestError::UnknownMethod(s.to_string())),
        }
    }
}

/// One request against the resource tree
#[derive(Debug, Clone)]
pub struct Request {
    /// Verb
    pub method: Method,
    /// Parsed path
    pub path: ResourcePath,
    /// Query parameters in request order
    pub params: IndexMap<String, String>,
    /// JSON object body (POST/PUT)
    pub body: Option<Map<String, Value>>,
}

impl Request {
    /// Create request without parameters or body
    #[inline]
    #[must_use]
    pub fn new(method: Method, path: ResourcePath) -> Self {
        Self {
            method,
            path,
            params: IndexMap::new(),
            body: None,
        }
    }

    /// GET request
    ///
    /// # Errors
    /// Returns error if the path is malformed
    pub fn get(path: &str) -> Result<Self, RestError> {
        Ok(Self::new(Method::Get, path.parse()?))
    }

    /// POST request with a body
    ///
    /// # Errors
    /// Returns error if the path is malformed
    pub fn post(path: &str, body: Map<String, Value>) -> Result<Self, RestError> {
        Ok(Self::new(Method::Post, path.parse()?).with_body(body))
    }

    /// With a query parameter
    #[inline]
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// With a body
    #[inline]
    #[must_use]
    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    /// Query parameter by name
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Serialized response payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBody {
    /// Entity, list of entities or schema description
    pub result: Value,
    /// Number of matches before paging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_count: Option<usize>,
    /// Number of pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    /// Effective page size (0 = unpaged)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    /// Returned page (1-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

impl ResultBody {
    /// Single, unpaged result
    #[inline]
    #[must_use]
    pub fn single(result: Value) -> Self {
        Self {
            result,
            ..Self::default()
        }
    }
}

/// Outcome of a handled request
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP-style status
    pub status: u16,
    /// Response headers (`Location`, `Allow`)
    pub headers: IndexMap<String, String>,
    /// Payload, absent for HEAD, DELETE and OPTIONS
    pub body: Option<ResultBody>,
}

impl Response {
    /// 200 with a payload
    #[inline]
    #[must_use]
    pub fn ok(body: ResultBody) -> Self {
        Self {
            status: 200,
            headers: IndexMap::new(),
            body: Some(body),
        }
    }

    /// 200 without payload
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            status: 200,
            headers: IndexMap::new(),
            body: None,
        }
    }

    /// 201 pointing at the created entity
    #[inline]
    #[must_use]
    pub fn created(location: impl Into<String>) -> Self {
        Self::empty()
            .with_status(201)
            .with_header("Location", location)
    }

    /// With status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// With header
    #[inline]
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Header by name
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Result value of the payload
    #[inline]
    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        self.body.as_ref().map(|body| &body.result)
    }
}
