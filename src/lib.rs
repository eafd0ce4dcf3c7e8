#![forbid(unsafe_code)]
//! Locale-aware links for server-rendered Rust web frontends.
//!
//! Two pieces do the work:
//!
//! - [`resolve`] turns user options into an immutable [`EffectiveConfig`],
//!   scanning the translation directory for namespaces when the
//!   [`ResolveContext`] allows filesystem access.
//! - [`rewrite`] computes the logical `href` and the displayed `as` of a link
//!   for the active locale, prefixing the displayed URL with `/{locale}` when
//!   locale subpaths are enabled.
//!
//! # Quick Start
//!
//! ```rust
//! use locale_link::{Href, LinkTarget, ResolveContext, UserConfig, resolve, rewrite};
//! use serde_json::json;
//!
//! let user = UserConfig::from_value(json!({
//!     "defaultLanguage": "en",
//!     "otherLanguages": ["de"],
//!     "localeSubpaths": "foreign",
//! }))?;
//! let config = resolve(&user, &ResolveContext::client())?;
//!
//! let link = rewrite(&LinkTarget::new("/foo/bar?baz").with_locale("de"), &config);
//! assert_eq!(link.as_.as_deref(), Some("/de/foo/bar?baz"));
//! assert!(matches!(link.href, Href::Structured { .. }));
//! # Ok::<(), locale_link::Error>(())
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod href;
pub mod link;
pub mod props;
pub mod query;
pub mod rewrite;
pub mod translator;

// Re-export most used types for easy consumption
pub use crate::{
    backend::BackendPaths,
    config::{
        EffectiveConfig, FallbackLng, LocaleSubpaths, MergeStrategy, ResolveContext, UserConfig,
        resolve,
    },
    error::Error,
    href::{Href, LinkTarget, RewrittenLink},
    link::{LinkContext, link_props},
    props::filter_props,
    query::Query,
    rewrite::rewrite,
    translator::{StaticTranslator, Translator, trans},
};
