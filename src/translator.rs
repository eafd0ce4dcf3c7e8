//! Translation capability and the `Trans` adapter.
//!
//! The translation engine itself is external. Anything that can look up a
//! key for the active language implements [`Translator`]; [`trans`] hands
//! the props of a `Trans` render to it along with the instance.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::{config::FallbackLng, error::Error};

lazy_static! {
    static ref INTERPOLATION_REGEX: Regex = Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").unwrap();
}

pub trait Translator {
    /// Translate `key`, interpolating `options` into the result.
    fn translate(&self, key: &str, options: &Map<String, Value>) -> String;

    /// The language this instance translates into, if one is active.
    fn language(&self) -> Option<&str>;
}

/// Props of one `Trans` render bound to a translator instance.
pub struct TransProps<'a, T: Translator + ?Sized> {
    pub props: Map<String, Value>,
    pub i18n: &'a T,
}

impl<T: Translator + ?Sized> TransProps<'_, T> {
    /// Translate `i18nKey` with `values` (and `count`, when present) as options.
    pub fn render(&self) -> Result<String, Error> {
        let key = match self.props.get("i18nKey") {
            Some(Value::String(key)) => key,
            Some(other) => {
                return Err(Error::InvalidProp(format!(
                    "`i18nKey` must be a string, got `{}`",
                    other
                )));
            }
            None => return Err(Error::InvalidProp("`Trans` requires an `i18nKey`".to_string())),
        };

        let mut options = match self.props.get("values") {
            Some(Value::Object(values)) => values.clone(),
            _ => Map::new(),
        };
        if let Some(count) = self.props.get("count") {
            options.insert("count".to_string(), count.clone());
        }
        Ok(self.i18n.translate(key, &options))
    }
}

/// Forward `props` to the translation layer together with `translator`.
pub fn trans<T: Translator + ?Sized>(props: Map<String, Value>, translator: &T) -> TransProps<'_, T> {
    TransProps {
        props,
        i18n: translator,
    }
}

/// In-memory translator: `language -> key -> template`.
///
/// Missing keys fall back through the configured fallback languages and
/// finally to the key itself.
#[derive(Debug, Clone, Default)]
pub struct StaticTranslator {
    language: Option<String>,
    fallback: Vec<String>,
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl StaticTranslator {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Self::default()
        }
    }

    pub fn with_fallback(mut self, fallback: &FallbackLng) -> Self {
        self.fallback = match fallback {
            FallbackLng::Disabled => Vec::new(),
            FallbackLng::Language(lng) => vec![lng.clone()],
            FallbackLng::Languages(lngs) => lngs.clone(),
        };
        self
    }

    pub fn add_translation(
        &mut self,
        language: impl Into<String>,
        key: impl Into<String>,
        template: impl Into<String>,
    ) {
        self.catalogs
            .entry(language.into())
            .or_default()
            .insert(key.into(), template.into());
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.language
            .iter()
            .chain(self.fallback.iter())
            .find_map(|lng| self.catalogs.get(lng).and_then(|c| c.get(key)))
            .map(String::as_str)
    }
}

impl Translator for StaticTranslator {
    fn translate(&self, key: &str, options: &Map<String, Value>) -> String {
        match self.lookup(key) {
            Some(template) => interpolate(template, options),
            None => key.to_string(),
        }
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

/// Replace `{{name}}` placeholders with values from `options`.
///
/// Unknown placeholders are left untouched.
pub fn interpolate(template: &str, options: &Map<String, Value>) -> String {
    INTERPOLATION_REGEX
        .replace_all(template, |caps: &Captures| match options.get(&caps[1]) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => caps[0].to_string(),
            Some(other) => other.to_string(),
        })
        .into_owned()
}
