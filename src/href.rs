//! Link targets as the routing layer accepts them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::Error, query::Query};

/// A logical link target: either an opaque path string (which may carry a
/// raw `?query` suffix) or a structured path plus query mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Href {
    Path(String),
    Structured {
        #[serde(rename = "pathname", alias = "path")]
        path: String,
        #[serde(default)]
        query: Query,
    },
}

impl Href {
    pub fn structured(path: impl Into<String>, query: Query) -> Self {
        Href::Structured {
            path: path.into(),
            query,
        }
    }

    /// Build an href from a loosely-typed props value.
    ///
    /// Accepts a string, or an object with `pathname` (or `path`) and an
    /// optional `query` object whose values are strings, numbers, booleans,
    /// or lists of those for repeated keys.
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::String(s) => Ok(Href::Path(s.clone())),
            Value::Object(map) => {
                let path = match map.get("pathname").or_else(|| map.get("path")) {
                    Some(Value::String(p)) => p.clone(),
                    Some(other) => {
                        return Err(Error::malformed_href(format!(
                            "pathname must be a string, got {}",
                            value_kind(other)
                        )));
                    }
                    None => {
                        return Err(Error::malformed_href(
                            "object href is missing `pathname`",
                        ));
                    }
                };
                let query = match map.get("query") {
                    None | Some(Value::Null) => Query::new(),
                    Some(Value::Object(q)) => query_from_map(q)?,
                    Some(other) => {
                        return Err(Error::malformed_href(format!(
                            "query must be an object, got {}",
                            value_kind(other)
                        )));
                    }
                };
                Ok(Href::Structured { path, query })
            }
            other => Err(Error::malformed_href(format!(
                "expected a string or an object, got {}",
                value_kind(other)
            ))),
        }
    }

    /// Convert back into the props shape handed to the link primitive.
    pub fn to_value(&self) -> Value {
        match self {
            Href::Path(s) => Value::String(s.clone()),
            Href::Structured { path, query } => {
                let mut map = Map::new();
                map.insert("pathname".to_string(), Value::String(path.clone()));
                let query = query
                    .grouped()
                    .into_iter()
                    .map(|(k, values)| {
                        let value = match values.as_slice() {
                            [single] => Value::String(single.to_string()),
                            many => Value::Array(
                                many.iter().map(|v| Value::String(v.to_string())).collect(),
                            ),
                        };
                        (k.to_string(), value)
                    })
                    .collect::<Map<_, _>>();
                map.insert("query".to_string(), Value::Object(query));
                Value::Object(map)
            }
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Href::Path(s) => s.split_once('?').map_or(s.as_str(), |(path, _)| path),
            Href::Structured { path, .. } => path,
        }
    }
}

impl From<&str> for Href {
    fn from(value: &str) -> Self {
        Href::Path(value.to_string())
    }
}

impl From<String> for Href {
    fn from(value: String) -> Self {
        Href::Path(value)
    }
}

fn query_from_map(map: &Map<String, Value>) -> Result<Query, Error> {
    let mut query = Query::new();
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    query.append(key.clone(), query_scalar(key, item)?);
                }
            }
            other => query.append(key.clone(), query_scalar(key, other)?),
        }
    }
    Ok(query)
}

fn query_scalar(key: &str, value: &Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::malformed_href(format!(
            "query value for `{}` must be a scalar or a list of scalars, got {}",
            key,
            value_kind(other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Per-render input to the link rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub href: Href,
    /// Explicit displayed target, if the caller supplied one.
    pub as_: Option<String>,
    /// Active locale for this render.
    pub locale: Option<String>,
}

impl LinkTarget {
    pub fn new(href: impl Into<Href>) -> Self {
        Self {
            href: href.into(),
            as_: None,
            locale: None,
        }
    }

    pub fn with_as(mut self, as_: impl Into<String>) -> Self {
        self.as_ = Some(as_.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// The `(href, as)` pair handed to the link primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewrittenLink {
    pub href: Href,
    #[serde(rename = "as", skip_serializing_if = "Option::is_none", default)]
    pub as_: Option<String>,
}
