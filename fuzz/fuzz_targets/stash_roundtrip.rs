#![no_main]

use std::collections::BTreeMap;

use conversion_fuzz::primitives::{Object, ObjectMeta};
use conversion_fuzz::stash;
use libfuzzer_sys::fuzz_target;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, arbitrary::Arbitrary)]
struct Payload {
    #[serde(skip)]
    #[arbitrary(default)]
    metadata: ObjectMeta,
    name: String,
    replicas: i32,
    labels: BTreeMap<String, String>,
    note: Option<String>,
}

impl Object for Payload {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[derive(Debug, arbitrary::Arbitrary)]
struct Input {
    payload: Payload,
    others: BTreeMap<String, String>,
}

fuzz_target!(|input: Input| {
    let mut holder = ObjectMeta { annotations: Some(input.others.clone()), ..Default::default() };
    if stash::store(&input.payload, &mut holder).is_err() {
        return;
    }

    let mut restored = Payload::default();
    let found = stash::restore(&mut holder, &mut restored).expect("stored data decodes");
    assert!(found);
    assert_eq!(restored, input.payload);

    let mut expected = input.others;
    expected.remove(conversion_fuzz::types::DATA_ANNOTATION);
    assert_eq!(holder.annotations, Some(expected));
});
