//! Removal of translation bookkeeping props before delegation.

use serde_json::{Map, Value};

/// Props injected by the translation layer that the link primitive must
/// never receive.
pub const INTERNAL_PROPS: &[&str] = &[
    "t",
    "i18n",
    "i18nOptions",
    "lng",
    "reportNS",
    "tReady",
    "defaultNS",
];

pub fn is_internal_prop(name: &str) -> bool {
    INTERNAL_PROPS.contains(&name)
}

/// Drop every internal prop; everything else passes through in order.
pub fn filter_props(mut props: Map<String, Value>) -> Map<String, Value> {
    props.retain(|name, _| !is_internal_prop(name));
    props
}
