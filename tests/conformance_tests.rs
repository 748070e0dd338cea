#![cfg(test)]

use std::collections::BTreeMap;

use conversion_fuzz::error::StashError;
use conversion_fuzz::primitives::{Object, ObjectMeta};
use conversion_fuzz::stash;
use conversion_fuzz::types::DATA_ANNOTATION;
use serde::{Deserialize, Serialize};

// --- Test Resource ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct TestSpec {
    field1: String,
    field2: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct TestStatus {
    ready: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct TestResource {
    #[serde(default)]
    metadata: ObjectMeta,
    spec: TestSpec,
    status: TestStatus,
}

impl Object for TestResource {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

fn resource(name: &str, field1: &str, field2: i32, ready: bool) -> TestResource {
    TestResource {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            labels: Some(BTreeMap::from([("label1".to_string(), "value1".to_string())])),
            ..Default::default()
        },
        spec: TestSpec { field1: field1.to_string(), field2 },
        status: TestStatus { ready },
    }
}

fn annotations(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
}

// --- store ---

#[test]
fn store_writes_payload_without_metadata() {
    let src = resource("test-object", "test-value", 42, false);
    let mut dst = TestResource::default();

    stash::store(&src, &mut dst).unwrap();

    let data = stash::peek(&dst).expect("stash present");
    assert!(data.contains("test-value"));
    assert!(data.contains("42"));
    assert!(!data.contains("test-object"));
    assert!(!data.contains("label1"));
}

#[test]
fn store_preserves_existing_annotations() {
    let src = resource("src", "v", 1, true);
    let mut dst = TestResource::default();
    dst.set_annotations(annotations(&[("existing-annotation", "existing-value")]));

    stash::store(&src, &mut dst).unwrap();

    let annotations = dst.annotations().unwrap();
    assert_eq!(annotations.get("existing-annotation").map(String::as_str), Some("existing-value"));
    assert!(annotations.contains_key(DATA_ANNOTATION));
}

#[test]
fn store_of_empty_source_still_stashes() {
    let mut dst = TestResource::default();
    stash::store(&TestResource::default(), &mut dst).unwrap();
    assert!(stash::peek(&dst).is_some());
}

#[test]
fn store_replaces_previous_stash() {
    let mut dst = TestResource::default();
    stash::store(&resource("a", "first", 1, false), &mut dst).unwrap();
    stash::store(&resource("a", "second", 2, false), &mut dst).unwrap();

    assert_eq!(dst.annotations().unwrap().len(), 1);
    let restored: TestResource = stash::take(&mut dst).unwrap().unwrap();
    assert_eq!(restored.spec.field1, "second");
}

// --- restore ---

#[test]
fn restore_without_stash_reports_not_found() {
    let mut from = resource("a", "x", 1, false);
    let before = from.clone();
    let mut to = TestResource::default();

    assert!(!stash::restore(&mut from, &mut to).unwrap());
    assert_eq!(from, before);
    assert_eq!(to, TestResource::default());
}

#[test]
fn restore_decodes_stashed_fields() {
    let src = resource("src", "test-value", 99, true);
    let mut intermediate = TestResource::default();
    stash::store(&src, &mut intermediate).unwrap();

    let mut to = TestResource::default();
    assert!(stash::restore(&mut intermediate, &mut to).unwrap());
    assert_eq!(to.spec, TestSpec { field1: "test-value".into(), field2: 99 });
    assert!(to.status.ready);
    // Identity is never carried through the stash.
    assert_eq!(to.metadata, ObjectMeta::default());
}

#[test]
fn restore_removes_only_the_stash() {
    let mut intermediate = TestResource::default();
    intermediate.set_annotations(annotations(&[("other-annotation", "other-value")]));
    stash::store(&resource("src", "x", 1, false), &mut intermediate).unwrap();

    let mut to = TestResource::default();
    assert!(stash::restore(&mut intermediate, &mut to).unwrap());

    let annotations = intermediate.annotations().unwrap();
    assert_eq!(annotations.get("other-annotation").map(String::as_str), Some("other-value"));
    assert!(!annotations.contains_key(DATA_ANNOTATION));

    // A second read finds nothing.
    assert!(!stash::restore(&mut intermediate, &mut to).unwrap());
}

#[test]
fn restore_of_invalid_json_is_an_error_and_keeps_the_stash() {
    let mut from = TestResource::default();
    from.set_annotations(annotations(&[(DATA_ANNOTATION, "{invalid json")]));
    let mut to = TestResource::default();

    let err = stash::restore(&mut from, &mut to).unwrap_err();
    assert!(matches!(err, StashError::Unmarshal(_)));
    assert_eq!(stash::peek(&from), Some("{invalid json"));
    assert_eq!(to, TestResource::default());
}

#[test]
fn restore_into_differently_shaped_target() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Fields {
        spec: BTreeMap<String, serde_json::Value>,
    }

    let mut holder = ObjectMeta::default();
    stash::store(&resource("src", "x", 42, false), &mut holder).unwrap();

    let mut fields = Fields::default();
    assert!(stash::restore(&mut holder, &mut fields).unwrap());
    assert_eq!(fields.spec.get("field1"), Some(&serde_json::json!("x")));
    assert_eq!(fields.spec.get("field2"), Some(&serde_json::json!(42)));
}

#[test]
fn restore_into_target_with_required_metadata() {
    // No `#[serde(default)]`: the payload never carries `metadata`.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Plain {
        metadata: ObjectMeta,
        spec: TestSpec,
    }

    let mut holder = ObjectMeta::default();
    stash::store(&resource("src", "x", 7, false), &mut holder).unwrap();

    let mut to = Plain::default();
    assert!(stash::restore(&mut holder, &mut to).unwrap());
    assert_eq!(to.spec, TestSpec { field1: "x".into(), field2: 7 });
    assert_eq!(to.metadata, ObjectMeta::default());
    assert_eq!(stash::peek(&holder), None);
}

#[test]
fn restore_keeps_target_metadata() {
    let mut holder = TestResource::default();
    stash::store(&resource("src", "x", 1, true), &mut holder).unwrap();

    let mut to = resource("target", "old", 0, false);
    let target_meta = to.metadata.clone();
    assert!(stash::restore(&mut holder, &mut to).unwrap());
    assert_eq!(to.metadata, target_meta);
    assert_eq!(to.spec, TestSpec { field1: "x".into(), field2: 1 });
    assert!(to.status.ready);
}

#[test]
fn restore_keeps_target_fields_absent_from_payload() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Wider {
        #[serde(default)]
        metadata: ObjectMeta,
        spec: TestSpec,
        extra: String,
    }

    let mut holder = ObjectMeta::default();
    stash::store(&resource("src", "x", 2, false), &mut holder).unwrap();

    let mut to = Wider { extra: "local".into(), ..Default::default() };
    assert!(stash::restore(&mut holder, &mut to).unwrap());
    assert_eq!(to.spec.field2, 2);
    assert_eq!(to.extra, "local");
}

// --- peek / delete ---

#[test]
fn peek_then_delete_is_a_destructive_read() {
    let mut obj = TestResource::default();
    stash::store(&resource("src", "x", 1, false), &mut obj).unwrap();

    let raw = stash::peek(&obj).map(str::to_owned);
    assert!(raw.is_some());
    assert!(stash::delete(&mut obj));
    assert_eq!(stash::peek(&obj), None);
    assert!(!stash::delete(&mut obj));
}

#[test]
fn scenario_stash_and_restore_with_existing_annotation() {
    let src = TestResource {
        metadata: ObjectMeta { name: Some("a".into()), ..Default::default() },
        spec: TestSpec { field1: "x".into(), field2: 42 },
        ..Default::default()
    };
    let mut dst = TestResource::default();
    dst.set_annotations(annotations(&[("k", "v")]));

    stash::store(&src, &mut dst).unwrap();
    let stored = dst.annotations().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.get("k").map(String::as_str), Some("v"));
    let data = stored.get(DATA_ANNOTATION).unwrap();
    assert!(data.contains("\"field1\":\"x\"") && data.contains("\"field2\":42"));

    let mut fresh = TestResource::default();
    assert!(stash::restore(&mut dst, &mut fresh).unwrap());
    assert_eq!(fresh.spec, TestSpec { field1: "x".into(), field2: 42 });
    assert_eq!(dst.metadata.annotations, annotations(&[("k", "v")]));
}

#[test]
fn empty_and_absent_annotation_maps_are_not_found() {
    let mut to = TestResource::default();

    let mut absent = TestResource::default();
    assert!(!stash::restore(&mut absent, &mut to).unwrap());
    assert_eq!(absent.metadata.annotations, None);

    let mut empty = TestResource::default();
    empty.set_annotations(Some(BTreeMap::new()));
    assert!(!stash::restore(&mut empty, &mut to).unwrap());
    assert_eq!(empty.metadata.annotations, Some(BTreeMap::new()));
}
