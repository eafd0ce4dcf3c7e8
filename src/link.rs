//! Render-time glue between the surrounding component props and the
//! external link primitive.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    config::EffectiveConfig,
    error::Error,
    href::{Href, LinkTarget},
    props::filter_props,
    rewrite::{rewrite, subpath_locale},
};

/// The configuration carrier handed down the component tree.
#[derive(Debug, Clone)]
pub struct LinkContext {
    pub config: Arc<EffectiveConfig>,
}

impl LinkContext {
    pub fn new(config: EffectiveConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Rewrite and filter one link's props. See [`link_props`].
    pub fn link_props(&self, props: Map<String, Value>) -> Result<Map<String, Value>, Error> {
        link_props(props, self)
    }
}

impl From<Arc<EffectiveConfig>> for LinkContext {
    fn from(config: Arc<EffectiveConfig>) -> Self {
        Self { config }
    }
}

/// Turn the props of one link render into the props for the link primitive.
///
/// Reads `href`, `as` and `lng`. When the locale is not embedded in the URL
/// the props keep `href` and `as` exactly as given; otherwise [`rewrite`]
/// supplies both. The internal translation props are always stripped.
pub fn link_props(mut props: Map<String, Value>, ctx: &LinkContext) -> Result<Map<String, Value>, Error> {
    let original = props
        .get("href")
        .ok_or_else(|| Error::malformed_href("link props have no `href`"))?;
    let as_ = optional_string(&props, "as")?;
    let locale = optional_string(&props, "lng")?;

    if subpath_locale(locale.as_deref(), &ctx.config).is_none() {
        if !matches!(original, Value::String(_) | Value::Object(_)) {
            Href::from_value(original)?;
        }
        return Ok(filter_props(props));
    }

    let href = Href::from_value(original)?;
    let link = rewrite(&LinkTarget { href, as_, locale }, &ctx.config);
    let href = merge_href_value(original, &link.href);

    props.insert("href".to_string(), href);
    match link.as_ {
        Some(as_) => {
            props.insert("as".to_string(), Value::String(as_));
        }
        None => {
            props.shift_remove("as");
        }
    }

    Ok(filter_props(props))
}

/// Write a rewritten href back over the caller's object, keeping keys the
/// rewriter does not own (`hash`, ...).
fn merge_href_value(original: &Value, rewritten: &Href) -> Value {
    match (original, rewritten.to_value()) {
        (Value::Object(original), Value::Object(rewritten)) => {
            let mut merged = original.clone();
            merged.shift_remove("path");
            for (key, value) in rewritten {
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (_, rewritten) => rewritten,
    }
}

fn optional_string(props: &Map<String, Value>, key: &str) -> Result<Option<String>, Error> {
    match props.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::InvalidProp(format!(
            "link prop `{}` must be a string, got `{}`",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResolveContext, UserConfig, resolve};
    use serde_json::json;

    fn ctx(locale_subpaths: &str) -> LinkContext {
        let user = UserConfig::from_value(json!({
            "defaultLanguage": "en",
            "otherLanguages": ["de"],
            "localeSubpaths": locale_subpaths,
        }))
        .unwrap();
        LinkContext::new(resolve(&user, &ResolveContext::client()).unwrap())
    }

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("props must be an object"),
        }
    }

    #[test]
    fn test_link_props_rewrites_and_strips() {
        let out = ctx("foreign")
            .link_props(props(json!({
                "href": "/foo/bar?baz",
                "lng": "de",
                "t": "fn",
                "tReady": true,
                "prefetch": false,
            })))
            .unwrap();

        assert_eq!(
            out.get("href"),
            Some(&json!({ "pathname": "/foo/bar", "query": { "baz": "", "lng": "de" } }))
        );
        assert_eq!(out.get("as"), Some(&json!("/de/foo/bar?baz")));
        assert_eq!(out.get("prefetch"), Some(&json!(false)));
        assert!(!out.contains_key("lng"));
        assert!(!out.contains_key("t"));
        assert!(!out.contains_key("tReady"));
    }

    #[test]
    fn test_link_props_identity_leaves_as_absent() {
        let out = ctx("none")
            .link_props(props(json!({ "href": "/foo/bar", "lng": "de" })))
            .unwrap();
        assert_eq!(out.get("href"), Some(&json!("/foo/bar")));
        assert!(!out.contains_key("as"));
    }

    #[test]
    fn test_link_props_structured_href() {
        let out = ctx("all")
            .link_props(props(json!({
                "href": { "pathname": "/foo/bar", "query": {} },
                "as": "/foo?bar",
                "lng": "de",
            })))
            .unwrap();
        assert_eq!(
            out.get("href"),
            Some(&json!({ "pathname": "/foo/bar", "query": { "lng": "de" } }))
        );
        assert_eq!(out.get("as"), Some(&json!("/de/foo?bar")));
    }

    #[test]
    fn test_link_props_identity_keeps_structured_href_untouched() {
        let href = json!({ "pathname": "/foo", "query": { "page": 2 }, "hash": "top" });
        for (mode, lng) in [("none", json!("de")), ("foreign", json!("en")), ("foreign", Value::Null)] {
            let out = ctx(mode)
                .link_props(props(json!({ "href": href.clone(), "lng": lng, "as": "/foo#top" })))
                .unwrap();
            assert_eq!(out.get("href"), Some(&href));
            assert_eq!(out.get("as"), Some(&json!("/foo#top")));
        }

        let href = json!({ "path": "/foo", "query": null });
        let out = ctx("none")
            .link_props(props(json!({ "href": href.clone(), "lng": "de" })))
            .unwrap();
        assert_eq!(out.get("href"), Some(&href));
    }

    #[test]
    fn test_link_props_rewrite_keeps_extra_href_keys() {
        let out = ctx("foreign")
            .link_props(props(json!({
                "href": { "path": "/foo", "query": { "page": 2 }, "hash": "top" },
                "lng": "de",
            })))
            .unwrap();
        assert_eq!(
            out.get("href"),
            Some(&json!({
                "query": { "page": "2", "lng": "de" },
                "hash": "top",
                "pathname": "/foo",
            }))
        );
        assert_eq!(out.get("as"), Some(&json!("/de/foo?page=2")));
    }

    #[test]
    fn test_link_props_malformed_href() {
        let err = ctx("foreign")
            .link_props(props(json!({ "href": 12, "lng": "de" })))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedHref(_)));

        let err = ctx("foreign").link_props(props(json!({ "lng": "de" }))).unwrap_err();
        assert!(matches!(err, Error::MalformedHref(_)));
    }

    #[test]
    fn test_link_props_rejects_non_string_locale() {
        let err = ctx("foreign")
            .link_props(props(json!({ "href": "/", "lng": 3 })))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidProp(_)));
    }
}
