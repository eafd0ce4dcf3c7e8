//! Ordered query-string mapping used by structured hrefs.
//!
//! Iteration follows the order keys first appeared. A key may carry several
//! values (`?a=1&a=2`); [`Query::append`] keeps them all, while
//! [`Query::insert`] collapses a key to one value at its first position.

use std::fmt::Display;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};
use url::form_urlencoded;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

/// One value or a list of values, as a query key holds in JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query suffix (the text after `?`, without the `?`).
    ///
    /// A segment without `=` yields an empty value. Keys and values are
    /// form-url-decoded. Repeated keys keep every value.
    pub fn parse(raw: &str) -> Self {
        form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect()
    }

    /// Add a value, keeping any values the key already has.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Set a key to a single value. An existing key keeps its position and
    /// loses any other values.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || *k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key, value)),
        }
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of key/value pairs, counting repeated keys once per value.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Distinct keys in first-appearance order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.grouped().into_iter().map(|(k, _)| k)
    }

    /// Every pair, repeated keys included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Values grouped per distinct key, in first-appearance order.
    pub fn grouped(&self) -> Vec<(&str, Vec<&str>)> {
        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        for (key, value) in &self.pairs {
            match groups.iter_mut().find(|(k, _)| *k == key.as_str()) {
                Some((_, values)) => values.push(value.as_str()),
                None => groups.push((key.as_str(), vec![value.as_str()])),
            }
        }
        groups
    }

    /// Render as `key=value` pairs joined by `&`, in mapping order.
    ///
    /// Keys and values are written as they are, without percent-encoding.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (key, value) in iter {
            query.append(key, value);
        }
        query
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let groups = self.grouped();
        let mut map = serializer.serialize_map(Some(groups.len()))?;
        for (key, values) in groups {
            match values.as_slice() {
                [single] => map.serialize_entry(key, single)?,
                many => map.serialize_entry(key, many)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QueryVisitor;

        impl<'de> Visitor<'de> for QueryVisitor {
            type Value = Query;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a map of query keys to a string or a list of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Query, A::Error> {
                let mut query = Query::new();
                while let Some((key, value)) = access.next_entry::<String, OneOrMany>()? {
                    match value {
                        OneOrMany::One(v) => query.append(key, v),
                        OneOrMany::Many(vs) => {
                            for v in vs {
                                query.append(key.clone(), v);
                            }
                        }
                    }
                }
                Ok(query)
            }
        }

        deserializer.deserialize_map(QueryVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_key_yields_empty_value() {
        let query = Query::parse("baz");
        assert_eq!(query.len(), 1);
        assert_eq!(query.get("baz"), Some(""));
    }

    #[test]
    fn test_parse_keeps_order() {
        let query = Query::parse("z=1&a=2&m");
        assert_eq!(query.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parse_decodes_values() {
        let query = Query::parse("q=hello%20world&p=a+b");
        assert_eq!(query.get("q"), Some("hello world"));
        assert_eq!(query.get("p"), Some("a b"));
    }

    #[test]
    fn test_parse_keeps_repeated_keys() {
        let query = Query::parse("a=1&b=x&a=2");
        assert_eq!(query.len(), 3);
        assert_eq!(query.get_all("a").collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(query.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(query.grouped(), vec![("a", vec!["1", "2"]), ("b", vec!["x"])]);
    }

    #[test]
    fn test_insert_existing_key_replaces_in_place() {
        let mut query = Query::parse("lng=fr&page=2");
        query.insert("lng", "de");
        assert_eq!(
            query.iter().collect::<Vec<_>>(),
            vec![("lng", "de"), ("page", "2")]
        );
    }

    #[test]
    fn test_insert_collapses_repeated_key() {
        let mut query = Query::parse("lng=fr&page=2&lng=it");
        query.insert("lng", "de");
        assert_eq!(
            query.iter().collect::<Vec<_>>(),
            vec![("lng", "de"), ("page", "2")]
        );
    }

    #[test]
    fn test_to_query_string_renders_empty_values_with_equals() {
        let query: Query = [("baz", "")].into_iter().collect();
        assert_eq!(query.to_query_string(), "baz=");
    }

    #[test]
    fn test_to_query_string_writes_plain_pairs() {
        let query: Query = [("q", "a b"), ("r", "x/y"), ("q", "c")].into_iter().collect();
        assert_eq!(query.to_string(), "q=a b&r=x/y&q=c");
    }

    #[test]
    fn test_serde_preserves_order() {
        let query: Query = serde_json::from_str(r#"{"b":"1","a":""}"#).unwrap();
        assert_eq!(query.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(serde_json::to_string(&query).unwrap(), r#"{"b":"1","a":""}"#);
    }

    #[test]
    fn test_serde_repeated_keys_as_lists() {
        let query: Query = serde_json::from_str(r#"{"a":["1","2"],"b":"x"}"#).unwrap();
        assert_eq!(query.len(), 3);
        assert_eq!(
            serde_json::to_string(&query).unwrap(),
            r#"{"a":["1","2"],"b":"x"}"#
        );
    }
}
