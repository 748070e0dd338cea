//! Annotation-backed data stash.
//!
//! When an object is converted from the hub down to a spoke that cannot
//! represent every hub field, the conversion stores the hub object (minus its
//! identity metadata) as JSON under [`DATA_ANNOTATION`] on the spoke. The
//! up-conversion reads it back and removes it.
//!
//! There is at most one stash per object. Reads are destructive and are
//! built from two explicit steps, [`peek`] then [`delete`], so callers can
//! assert the intermediate state.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StashError;
use crate::primitives::Object;
use crate::types::{DATA_ANNOTATION, METADATA_FIELD};

/// Stores `src` as JSON in the annotations of `dst`, ignoring the metadata
/// of `src`. Any previous stash on `dst` is overwritten; other annotations
/// are left alone.
pub fn store<S, D>(src: &S, dst: &mut D) -> Result<(), StashError>
where
    S: Object + Serialize + ?Sized,
    D: Object + ?Sized,
{
    let mut unstructured = serde_json::to_value(src).map_err(StashError::ToUnstructured)?;
    unstructured
        .as_object_mut()
        .ok_or(StashError::NotAnObject)?
        .remove(METADATA_FIELD);

    let data = serde_json::to_string(&unstructured).map_err(StashError::Marshal)?;
    tracing::trace!(bytes = data.len(), "storing conversion data");

    dst.meta_mut()
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(DATA_ANNOTATION.to_string(), data);
    Ok(())
}

/// Decodes the stash on `from` into `to` and removes it.
///
/// The payload is merged into `to`: members it carries overwrite the
/// matching members of `to`, nested objects are merged the same way, and
/// everything else on `to` (its metadata in particular) is kept.
///
/// Returns `Ok(false)` without touching either argument when there is no
/// stash. A stash that does not decode is reported as an error and left in
/// place; `to` is only written on success.
pub fn restore<O, T>(from: &mut O, to: &mut T) -> Result<bool, StashError>
where
    O: Object + ?Sized,
    T: Serialize + DeserializeOwned,
{
    let merged = match peek(from) {
        Some(data) => merge_into(to, data)?,
        None => return Ok(false),
    };
    *to = merged;
    delete(from);
    tracing::trace!("restored conversion data");
    Ok(true)
}

/// Like [`restore`], merging into `T::default()` and returning the result.
pub fn take<O, T>(from: &mut O) -> Result<Option<T>, StashError>
where
    O: Object + ?Sized,
    T: Default + Serialize + DeserializeOwned,
{
    let mut value = T::default();
    Ok(restore(from, &mut value)?.then_some(value))
}

fn merge_into<T>(base: &T, data: &str) -> Result<T, StashError>
where
    T: Serialize + DeserializeOwned,
{
    let payload: Value = serde_json::from_str(data).map_err(StashError::Unmarshal)?;
    let mut merged = serde_json::to_value(base).map_err(StashError::Target)?;
    overlay(&mut merged, payload);
    serde_json::from_value(merged).map_err(StashError::Unmarshal)
}

// Objects merge member-wise; any other payload value replaces the base.
fn overlay(base: &mut Value, payload: Value) {
    match (base, payload) {
        (Value::Object(base), Value::Object(payload)) => {
            for (key, value) in payload {
                match base.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, payload) => *base = payload,
    }
}

/// The raw stash on `obj`, if any.
pub fn peek<O: Object + ?Sized>(obj: &O) -> Option<&str> {
    obj.annotations()
        .and_then(|annotations| annotations.get(DATA_ANNOTATION))
        .map(String::as_str)
}

/// Removes the stash from `obj`, reporting whether one was present.
/// An annotation map left empty stays allocated.
pub fn delete<O: Object + ?Sized>(obj: &mut O) -> bool {
    obj.meta_mut()
        .annotations
        .as_mut()
        .is_some_and(|annotations| annotations.remove(DATA_ANNOTATION).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::ObjectMeta;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Widget {
        #[serde(default)]
        metadata: ObjectMeta,
        #[serde(default)]
        size: u32,
    }

    impl Object for Widget {
        fn meta(&self) -> &ObjectMeta {
            &self.metadata
        }
        fn meta_mut(&mut self) -> &mut ObjectMeta {
            &mut self.metadata
        }
    }

    #[test]
    fn test_store_creates_annotation_map() {
        let src = Widget { size: 3, ..Default::default() };
        let mut dst = Widget::default();
        store(&src, &mut dst).unwrap();
        assert_eq!(peek(&dst), Some(r#"{"size":3}"#));
    }

    #[test]
    fn test_store_overwrites_previous_stash() {
        let mut dst = Widget::default();
        store(&Widget { size: 1, ..Default::default() }, &mut dst).unwrap();
        store(&Widget { size: 2, ..Default::default() }, &mut dst).unwrap();
        assert_eq!(dst.annotations().map(BTreeMap::len), Some(1));
        assert_eq!(peek(&dst), Some(r#"{"size":2}"#));
    }

    #[test]
    fn test_delete_keeps_empty_map() {
        let mut dst = Widget::default();
        store(&Widget::default(), &mut dst).unwrap();
        assert!(delete(&mut dst));
        assert!(!delete(&mut dst));
        assert_eq!(dst.annotations().map(BTreeMap::is_empty), Some(true));
    }

    #[test]
    fn test_restore_absent_and_empty_are_equivalent() {
        let mut to = Widget { size: 9, ..Default::default() };

        let mut absent = Widget::default();
        assert!(!restore(&mut absent, &mut to).unwrap());
        assert!(absent.annotations().is_none());

        let mut empty = Widget::default();
        empty.set_annotations(Some(BTreeMap::new()));
        assert!(!restore(&mut empty, &mut to).unwrap());
        assert_eq!(to.size, 9, "target untouched when nothing is stashed");
    }

    #[test]
    fn test_take_returns_value() {
        let mut holder = Widget::default();
        store(&Widget { size: 5, ..Default::default() }, &mut holder).unwrap();
        let got: Option<Widget> = take(&mut holder).unwrap();
        assert_eq!(got.map(|w| w.size), Some(5));
        assert!(peek(&holder).is_none());
    }

    #[test]
    fn test_restore_keeps_target_members_missing_from_payload() {
        let mut holder = Widget::default();
        store(&Widget { size: 4, ..Default::default() }, &mut holder).unwrap();

        let mut to = Widget {
            metadata: ObjectMeta { name: Some("kept".into()), ..Default::default() },
            size: 1,
        };
        assert!(restore(&mut holder, &mut to).unwrap());
        assert_eq!(to.size, 4);
        assert_eq!(to.metadata.name.as_deref(), Some("kept"));
    }

    #[test]
    fn test_overlay_merges_objects_and_replaces_the_rest() {
        let mut base = serde_json::json!({
            "spec": { "a": 1, "b": [1, 2] },
            "status": { "ready": true },
        });
        let payload = serde_json::json!({
            "spec": { "b": [3], "c": "new" },
            "status": { "ready": null },
        });
        overlay(&mut base, payload);
        assert_eq!(
            base,
            serde_json::json!({
                "spec": { "a": 1, "b": [3], "c": "new" },
                "status": { "ready": null },
            })
        );
    }

    #[test]
    fn test_non_object_source_is_rejected() {
        struct Scalar(ObjectMeta);
        impl Object for Scalar {
            fn meta(&self) -> &ObjectMeta {
                &self.0
            }
            fn meta_mut(&mut self) -> &mut ObjectMeta {
                &mut self.0
            }
        }
        impl Serialize for Scalar {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_u8(7)
            }
        }

        let mut dst = Widget::default();
        let err = store(&Scalar(ObjectMeta::default()), &mut dst).unwrap_err();
        assert!(matches!(err, StashError::NotAnObject));
        assert!(dst.annotations().is_none());
    }
}
