//! Shared wire-level types: reserved keys, timestamps, int-or-string unions
//! and the identifiers the scheme registers types under.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Annotation that conversions use to retain hub data across a
/// down-conversion to a spoke version.
pub const DATA_ANNOTATION: &str = "cluster.x-k8s.io/conversion-data";

/// Top-level field holding identity metadata; never part of a stash payload.
pub const METADATA_FIELD: &str = "metadata";

// --- Time -------------------------------------------------------------------

/// A UTC timestamp with the wire precision of the Kubernetes API (seconds).
///
/// The zero value is the earliest representable instant, not the Unix
/// epoch, so every real timestamp survives the wire. It travels as JSON
/// `null`, the same way an unset `metav1.Time` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Time(pub DateTime<Utc>);

impl Default for Time {
    fn default() -> Self {
        Time(DateTime::<Utc>::MIN_UTC)
    }
}

impl Time {
    /// The zero timestamp.
    pub fn zero() -> Self {
        Time::default()
    }

    pub fn is_zero(&self) -> bool {
        *self == Time::zero()
    }

    /// Builds a timestamp from Unix seconds and nanoseconds.
    /// Returns `None` when the pair is outside chrono's representable range.
    pub fn from_unix(sec: i64, nsec: u32) -> Option<Self> {
        DateTime::<Utc>::from_timestamp(sec, nsec).map(Time)
    }

    /// Copy truncated to the precision that survives serialization.
    pub fn rfc3339_copy(&self) -> Self {
        Time(self.0.trunc_subsecs(0))
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

impl Serialize for Time {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_zero() {
            serializer.serialize_none()
        } else {
            serializer.collect_str(self)
        }
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Time::zero()),
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|t| Time(t.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

// --- IntOrString ------------------------------------------------------------

/// A value that is either an integer or a string, e.g. `maxUnavailable: 25%`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i32),
    String(String),
}

impl IntOrString {
    pub fn from_int(value: i32) -> Self {
        IntOrString::Int(value)
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        IntOrString::String(value.into())
    }
}

impl Default for IntOrString {
    fn default() -> Self {
        IntOrString::Int(0)
    }
}

// --- Kinds ------------------------------------------------------------------

/// An API group and version, e.g. `example.io/v1alpha1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupVersion {
    pub group: String,
    pub version: String,
}

impl GroupVersion {
    pub fn new(group: impl Into<String>, version: impl Into<String>) -> Self {
        GroupVersion { group: group.into(), version: version.into() }
    }

    pub fn with_kind(&self, kind: impl Into<String>) -> GroupVersionKind {
        GroupVersionKind {
            group: self.group.clone(),
            version: self.version.clone(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.version)
        } else {
            write!(f, "{}/{}", self.group, self.version)
        }
    }
}

/// Identifies one version of one resource kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        GroupVersionKind { group: group.into(), version: version.into(), kind: kind.into() }
    }

    pub fn group_version(&self) -> GroupVersion {
        GroupVersion::new(self.group.clone(), self.version.clone())
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.group_version(), self.kind)
    }
}
