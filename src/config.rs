//! Configuration resolution.
//!
//! User options are merged over [`default_config`] according to the
//! per-key [`MERGE_STRATEGIES`] table, validated, and expanded into an
//! immutable [`EffectiveConfig`]. In server-capable contexts the resolver
//! also scans the default-language translation directory for namespaces and
//! derives the backend file paths.
//!
//! ```rust
//! use locale_link::{ResolveContext, UserConfig, resolve};
//! use serde_json::json;
//!
//! let user = UserConfig::from_value(json!({
//!     "defaultLanguage": "en",
//!     "otherLanguages": ["de", "fr"],
//!     "localeSubpaths": "foreign",
//! }))?;
//! let config = resolve(&user, &ResolveContext::client())?;
//!
//! assert_eq!(config.all_languages, vec!["de", "fr", "en"]);
//! assert!(config.locale_subpaths_enabled());
//! # Ok::<(), locale_link::Error>(())
//! ```

use std::{
    collections::HashSet,
    fmt::Display,
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};
use tracing::{debug, trace};
use unic_langid::LanguageIdentifier;

use crate::{backend::BackendPaths, error::Error};

/// Message returned when `localeSubpaths` is still configured as a boolean.
pub const LOCALE_SUBPATHS_MIGRATION: &str =
    "The localeSubpaths option has been changed to a string: \"none\", \"foreign\", or \"all\"";

/// Keys computed by the resolver. User values under these keys are discarded.
const DERIVED_KEYS: &[&str] = &["allLanguages", "whitelist", "ns"];

/// Keys computed only where the filesystem is reachable. Elsewhere the
/// user's values pass through in [`EffectiveConfig::extra`].
const SERVER_DERIVED_KEYS: &[&str] = &["preload", "backend"];

/// How a user value under a given top-level key combines with the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The user value replaces the default wholesale.
    Replace,
    /// Both values are objects; user entries win key by key.
    Deep,
}

/// Top-level keys that do not use [`MergeStrategy::Replace`].
pub const MERGE_STRATEGIES: &[(&str, MergeStrategy)] = &[("detection", MergeStrategy::Deep)];

pub fn merge_strategy(key: &str) -> MergeStrategy {
    MERGE_STRATEGIES
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(MergeStrategy::Replace, |(_, strategy)| *strategy)
}

/// The options every resolution starts from.
pub fn default_config() -> Map<String, Value> {
    let value = json!({
        "defaultLanguage": "en",
        "otherLanguages": [],
        "load": "currentOnly",
        "localePath": "static/locales",
        "localeStructure": "{{lng}}/{{ns}}",
        "localeSubpaths": "none",
        "defaultNS": "common",
        "interpolation": {
            "escapeValue": false,
            "formatSeparator": ",",
        },
        "browserLanguageDetection": true,
        "serverLanguageDetection": true,
        "ignoreRoutes": ["/_next/", "/static/"],
        "detection": {
            "lookupCookie": "next-i18next",
            "order": ["cookie", "header", "querystring"],
            "caches": ["cookie"],
        },
        "react": {
            "wait": true,
        },
        "strictMode": true,
        "shallowRender": false,
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Raw, user-supplied options keyed by their public camelCase names.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserConfig(Map<String, Value>);

impl UserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::config_error(format!(
                "user configuration must be an object, got `{}`",
                other
            ))),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        Self::from_value(serde_json::from_str(s)?)
    }

    /// Sets one option, returning `self` for chaining.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for UserConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Whether and for which locales the locale is encoded as a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleSubpaths {
    #[default]
    None,
    Foreign,
    All,
}

impl FromStr for LocaleSubpaths {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(LocaleSubpaths::None),
            "foreign" => Ok(LocaleSubpaths::Foreign),
            "all" => Ok(LocaleSubpaths::All),
            _ => Err(Error::config_error(format!(
                "unknown localeSubpaths value `{}`; expected \"none\", \"foreign\", or \"all\"",
                s
            ))),
        }
    }
}

impl Display for LocaleSubpaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LocaleSubpaths::None => "none",
            LocaleSubpaths::Foreign => "foreign",
            LocaleSubpaths::All => "all",
        };
        write!(f, "{}", s)
    }
}

/// Language(s) to fall back to when a key is missing, or `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackLng {
    Disabled,
    Language(String),
    Languages(Vec<String>),
}

impl FallbackLng {
    fn from_user_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::String(lng) => Ok(FallbackLng::Language(lng.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(lng) => Ok(lng.clone()),
                    other => Err(Error::config_error(format!(
                        "fallbackLng entries must be strings, got `{}`",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FallbackLng::Languages),
            other => Err(Error::config_error(format!(
                "fallbackLng must be a string, a list of strings, or false, got `{}`",
                other
            ))),
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, FallbackLng::Disabled)
    }
}

impl Serialize for FallbackLng {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FallbackLng::Disabled => serializer.serialize_bool(false),
            FallbackLng::Language(lng) => serializer.serialize_str(lng),
            FallbackLng::Languages(lngs) => lngs.serialize(serializer),
        }
    }
}

/// Capabilities of the environment a resolution runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    /// Production-like environment; controls the `fallbackLng` default.
    pub production: bool,
    /// Server-capable context with filesystem access.
    pub can_access_filesystem: bool,
    /// Directory `localePath` is relative to.
    pub root: PathBuf,
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::client()
    }
}

impl ResolveContext {
    /// A client-side runtime: no filesystem, development defaults.
    pub fn client() -> Self {
        Self {
            production: false,
            can_access_filesystem: false,
            root: PathBuf::from("."),
        }
    }

    /// A server-capable runtime rooted at `root`.
    pub fn server(root: impl Into<PathBuf>) -> Self {
        Self {
            production: false,
            can_access_filesystem: true,
            root: root.into(),
        }
    }

    /// Server context from the process environment.
    ///
    /// `APP_ENV` (or `NODE_ENV` when unset) equal to `production` selects
    /// production defaults; the root is the current working directory.
    pub fn from_env() -> Result<Self, Error> {
        let env = std::env::var("APP_ENV").or_else(|_| std::env::var("NODE_ENV"));
        Ok(Self {
            production: env.is_ok_and(|v| v == "production"),
            can_access_filesystem: true,
            root: std::env::current_dir()?,
        })
    }

    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn with_filesystem(mut self, can_access_filesystem: bool) -> Self {
        self.can_access_filesystem = can_access_filesystem;
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MergedOptions {
    default_language: String,
    other_languages: Vec<String>,
    load: String,
    locale_path: String,
    locale_structure: String,
    locale_subpaths: LocaleSubpaths,
    #[serde(rename = "defaultNS")]
    default_ns: String,
    interpolation: Map<String, Value>,
    browser_language_detection: bool,
    server_language_detection: bool,
    ignore_routes: Vec<String>,
    detection: Map<String, Value>,
    react: Map<String, Value>,
    strict_mode: bool,
    shallow_render: bool,
    // Computed from the raw user value; kept out of `extra`.
    #[serde(default, rename = "fallbackLng")]
    _fallback_lng: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Fully resolved, validated configuration. Read-only after [`resolve`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    pub default_language: String,
    pub other_languages: Vec<String>,
    /// `other_languages` followed by `default_language`.
    pub all_languages: Vec<String>,
    pub whitelist: Vec<String>,
    pub locale_subpaths: LocaleSubpaths,
    pub fallback_lng: FallbackLng,
    #[serde(rename = "defaultNS")]
    pub default_ns: String,
    #[serde(rename = "ns")]
    pub namespaces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preload: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendPaths>,
    pub load: String,
    pub locale_path: String,
    pub locale_structure: String,
    pub detection: Map<String, Value>,
    pub interpolation: Map<String, Value>,
    pub react: Map<String, Value>,
    pub browser_language_detection: bool,
    pub server_language_detection: bool,
    pub ignore_routes: Vec<String>,
    pub strict_mode: bool,
    pub shallow_render: bool,
    /// Options this crate does not interpret, passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EffectiveConfig {
    pub fn locale_subpaths_enabled(&self) -> bool {
        self.locale_subpaths != LocaleSubpaths::None
    }

    pub fn is_default_language(&self, lng: &str) -> bool {
        self.default_language == lng
    }

    pub fn is_supported_language(&self, lng: &str) -> bool {
        self.whitelist.iter().any(|l| l == lng)
    }
}

/// Resolve user options into an [`EffectiveConfig`].
///
/// Fails when `localeSubpaths` is a boolean, when an option has the wrong
/// shape, or when a language is invalid or repeated. In server-capable
/// contexts a missing or unreadable default-language directory is returned
/// as [`Error::Io`].
pub fn resolve(user: &UserConfig, ctx: &ResolveContext) -> Result<EffectiveConfig, Error> {
    let user = user.as_map();

    if let Some(Value::Bool(_)) = user.get("localeSubpaths") {
        return Err(Error::config_error(LOCALE_SUBPATHS_MIGRATION));
    }

    let defaults = default_config();
    let mut merged = merge_options(&defaults, user)?;
    let server_keys: &[&str] = if ctx.can_access_filesystem { SERVER_DERIVED_KEYS } else { &[] };
    for key in DERIVED_KEYS.iter().chain(server_keys) {
        if merged.shift_remove(*key).is_some() {
            debug!(key, "ignoring user value for derived option");
        }
    }
    trace!(?merged, "merged configuration");

    let options: MergedOptions = serde_json::from_value(Value::Object(merged))
        .map_err(|e| Error::config_error(format!("invalid option: {}", e)))?;

    let fallback_lng = match user.get("fallbackLng") {
        Some(value) if is_truthy(value) => FallbackLng::from_user_value(value)?,
        _ if ctx.production => FallbackLng::Language(options.default_language.clone()),
        _ => FallbackLng::Disabled,
    };

    let all_languages = all_languages(&options.other_languages, &options.default_language)?;

    let mut config = EffectiveConfig {
        whitelist: all_languages.clone(),
        namespaces: vec![options.default_ns.clone()],
        all_languages,
        default_language: options.default_language,
        other_languages: options.other_languages,
        locale_subpaths: options.locale_subpaths,
        fallback_lng,
        default_ns: options.default_ns,
        preload: Vec::new(),
        backend: None,
        load: options.load,
        locale_path: options.locale_path,
        locale_structure: options.locale_structure,
        detection: options.detection,
        interpolation: options.interpolation,
        react: options.react,
        browser_language_detection: options.browser_language_detection,
        server_language_detection: options.server_language_detection,
        ignore_routes: options.ignore_routes,
        strict_mode: options.strict_mode,
        shallow_render: options.shallow_render,
        extra: options.extra,
    };

    if ctx.can_access_filesystem {
        let dir = ctx
            .root
            .join(&config.locale_path)
            .join(&config.default_language);
        config.namespaces = scan_namespaces(&dir)?;
        config.preload = config.all_languages.clone();
        config.backend = Some(BackendPaths::new(
            &ctx.root,
            &config.locale_path,
            &config.locale_structure,
        ));
        debug!(
            dir = %dir.display(),
            namespaces = ?config.namespaces,
            "scanned translation namespaces"
        );
    }

    debug!(
        default_language = %config.default_language,
        languages = ?config.all_languages,
        locale_subpaths = %config.locale_subpaths,
        "resolved configuration"
    );
    Ok(config)
}

/// Merge user options over defaults, key by key, per [`merge_strategy`].
pub fn merge_options(
    defaults: &Map<String, Value>,
    user: &Map<String, Value>,
) -> Result<Map<String, Value>, Error> {
    let mut merged = defaults.clone();
    for (key, value) in user {
        let value = match merge_strategy(key) {
            MergeStrategy::Replace => value.clone(),
            MergeStrategy::Deep => Value::Object(deep_merge(key, defaults.get(key), value)?),
        };
        merged.insert(key.clone(), value);
    }
    Ok(merged)
}

fn deep_merge(key: &str, default: Option<&Value>, user: &Value) -> Result<Map<String, Value>, Error> {
    let mut merged = match default {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    match user {
        Value::Null => {}
        Value::Object(overrides) => {
            for (k, v) in overrides {
                merged.insert(k.clone(), v.clone());
            }
        }
        other => {
            return Err(Error::config_error(format!(
                "`{}` must be an object, got `{}`",
                key, other
            )));
        }
    }
    Ok(merged)
}

fn all_languages(other_languages: &[String], default_language: &str) -> Result<Vec<String>, Error> {
    let languages = other_languages
        .iter()
        .cloned()
        .chain(std::iter::once(default_language.to_string()))
        .collect::<Vec<_>>();

    let mut seen = HashSet::new();
    for lng in &languages {
        if lng.parse::<LanguageIdentifier>().is_err() && !is_well_formed_tag(lng) {
            return Err(Error::InvalidLanguage(lng.clone()));
        }
        if !seen.insert(lng.as_str()) {
            return Err(Error::config_error(format!(
                "language `{}` is listed more than once (otherLanguages must not contain defaultLanguage)",
                lng
            )));
        }
    }
    Ok(languages)
}

/// Structural check for tags `unic-langid` does not model, such as private
/// use (`en-US-x-twain`) or extension subtags: one or more `-`/`_`
/// separated subtags of 1 to 8 ASCII alphanumerics.
fn is_well_formed_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .split(['-', '_'])
            .all(|subtag| (1..=8).contains(&subtag.len()) && subtag.bytes().all(|b| b.is_ascii_alphanumeric()))
}

/// List namespace names (file stems of `*.json`) in a translation directory.
///
/// Files written to the missing-keys path (`*.missing.json`) are skipped.
pub fn scan_namespaces(dir: &Path) -> Result<Vec<String>, Error> {
    let mut namespaces = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().into_string().map_err(|name| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("translation file name is not valid UTF-8: {:?}", name),
            )
        })?;
        let Some(ns) = file_name.strip_suffix(".json") else {
            trace!(file = %file_name, "skipping non-json file");
            continue;
        };
        if ns.is_empty() || ns.ends_with(".missing") {
            continue;
        }
        namespaces.push(ns.to_string());
    }
    namespaces.sort();
    Ok(namespaces)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
