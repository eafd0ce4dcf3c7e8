//! Locale-aware link rewriting.
//!
//! For a non-default locale with subpaths enabled, the logical href becomes
//! a structured `{pathname, query}` carrying `lng`, and the displayed href
//! gains a `/{locale}` prefix. Otherwise the link passes through untouched.

use tracing::trace;

use crate::{
    config::EffectiveConfig,
    href::{Href, LinkTarget, RewrittenLink},
    query::Query,
};

/// Query key the active locale is passed to the routing layer under.
pub const LOCALE_QUERY_KEY: &str = "lng";

/// The locale to embed in the URL, or `None` when the link must pass
/// through unchanged.
pub fn subpath_locale<'a>(locale: Option<&'a str>, config: &EffectiveConfig) -> Option<&'a str> {
    locale.filter(|l| config.locale_subpaths_enabled() && !config.is_default_language(l))
}

/// Compute the `(href, as)` pair for one link render.
pub fn rewrite(target: &LinkTarget, config: &EffectiveConfig) -> RewrittenLink {
    let locale = match subpath_locale(target.locale.as_deref(), config) {
        Some(locale) => locale,
        None => {
            return RewrittenLink {
                href: target.href.clone(),
                as_: target.as_.clone(),
            };
        }
    };

    let (path, query, displayed_query) = match &target.href {
        Href::Path(href) => match href.split_once('?') {
            Some((path, raw)) => (path, Query::parse(raw), Some(raw.to_string())),
            None => (href.as_str(), Query::new(), None),
        },
        Href::Structured { path, query } => {
            let displayed = (!query.is_empty()).then(|| query.to_query_string());
            (path.as_str(), query.clone(), displayed)
        }
    };

    let as_ = match &target.as_ {
        Some(explicit) => format!("/{}{}", locale, explicit),
        None => match displayed_query {
            Some(q) => format!("/{}{}?{}", locale, path, q),
            None => format!("/{}{}", locale, path),
        },
    };

    let mut query = query;
    query.insert(LOCALE_QUERY_KEY, locale);

    trace!(locale, path, as_ = %as_, "rewrote link for locale subpath");

    RewrittenLink {
        href: Href::structured(path, query),
        as_: Some(as_),
    }
}
