#![no_main]

use std::collections::BTreeMap;

use conversion_fuzz::primitives::ObjectMeta;
use conversion_fuzz::stash;
use conversion_fuzz::types::DATA_ANNOTATION;
use libfuzzer_sys::fuzz_target;

// Arbitrary annotation contents must never panic; a failed decode keeps the stash.
fuzz_target!(|data: String| {
    let mut holder = ObjectMeta {
        annotations: Some(BTreeMap::from([(DATA_ANNOTATION.to_string(), data.clone())])),
        ..Default::default()
    };

    let mut target = serde_json::Value::Null;
    match stash::restore(&mut holder, &mut target) {
        Ok(found) => {
            assert!(found);
            assert!(stash::peek(&holder).is_none());
        }
        Err(_) => assert_eq!(stash::peek(&holder), Some(data.as_str())),
    }
});
