//! Translation backend file paths.
//!
//! The resolver computes two templated paths from `localePath` and
//! `localeStructure`. The templates keep their `{{lng}}` / `{{ns}}`
//! placeholders; [`BackendPaths::load_path_for`] and
//! [`BackendPaths::add_path_for`] fill them in for one language/namespace.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{\{\s*(lng|ns)\s*\}\}").unwrap();
}

/// Extension appended to the locale structure for both paths.
pub const TRANSLATION_EXTENSION: &str = "json";
/// Marker inserted before the extension of the missing-keys path.
pub const MISSING_MARKER: &str = "missing";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendPaths {
    /// `{root}/{localePath}/{localeStructure}.json`
    pub load_path: PathBuf,
    /// `{root}/{localePath}/{localeStructure}.missing.json`
    pub add_path: PathBuf,
}

impl BackendPaths {
    pub fn new(root: &Path, locale_path: &str, locale_structure: &str) -> Self {
        let base = root.join(locale_path);
        Self {
            load_path: base.join(format!("{}.{}", locale_structure, TRANSLATION_EXTENSION)),
            add_path: base.join(format!(
                "{}.{}.{}",
                locale_structure, MISSING_MARKER, TRANSLATION_EXTENSION
            )),
        }
    }

    pub fn load_path_for(&self, lng: &str, ns: &str) -> PathBuf {
        interpolate(&self.load_path, lng, ns)
    }

    pub fn add_path_for(&self, lng: &str, ns: &str) -> PathBuf {
        interpolate(&self.add_path, lng, ns)
    }
}

/// Replace `{{lng}}` and `{{ns}}` in a templated path.
pub fn interpolate_template(template: &str, lng: &str, ns: &str) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "lng" => lng.to_string(),
            _ => ns.to_string(),
        })
        .into_owned()
}

fn interpolate(template: &Path, lng: &str, ns: &str) -> PathBuf {
    PathBuf::from(interpolate_template(&template.to_string_lossy(), lng, ns))
}
