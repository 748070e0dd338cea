use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Time;

// --- Type metadata ----------------------------------------------------------

/// API version and kind of a serialized object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

// --- Object metadata --------------------------------------------------------

/// Identity metadata every stored object carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "is_unset_map")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "is_unset_map")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// Access to an object's identity metadata.
///
/// Conversions only ever touch the annotation map through this trait; the
/// rest of `ObjectMeta` is exposed so conversion code can copy identity
/// across versions.
pub trait Object {
    fn meta(&self) -> &ObjectMeta;
    fn meta_mut(&mut self) -> &mut ObjectMeta;

    fn annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.meta().annotations.as_ref()
    }

    fn set_annotations(&mut self, annotations: Option<BTreeMap<String, String>>) {
        self.meta_mut().annotations = annotations;
    }
}

impl Object for ObjectMeta {
    fn meta(&self) -> &ObjectMeta {
        self
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        self
    }
}

// --- Conditions -------------------------------------------------------------

/// Observation of one aspect of an object's state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub observed_generation: i64,
    pub last_transition_time: Time,
    pub reason: String,
    pub message: String,
}

fn is_zero_i64(v: &i64) -> bool {
    *v == 0
}

/// An absent map and an empty one have the same wire form.
fn is_unset_map(v: &Option<BTreeMap<String, String>>) -> bool {
    v.as_ref().map_or(true, BTreeMap::is_empty)
}
