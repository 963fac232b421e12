use crate::collada::translate_str;
use crate::sink::{FieldValue, RecordingSink};

mod index_test;

/// Translate a document, asserting success and a balanced event stream.
/// Returns the content events and the recorded routes separately.
fn translate(xml: &str) -> (RecordingSink, RecordingSink) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut content = RecordingSink::new();
    let mut routes = RecordingSink::new();
    translate_str(xml, &mut content, &mut routes).expect("translation failed");
    assert!(content.is_balanced());
    (content, routes)
}

/// The single Ints payload of the named field.
fn ints_of(sink: &RecordingSink, field: &str) -> Vec<i32> {
    match sink.field_values(field).as_slice() {
        [FieldValue::Ints(v)] => v.clone(),
        other => panic!("expected one Ints value for '{}', got {:?}", field, other),
    }
}

/// The single Floats payload of the named field.
fn floats_of(sink: &RecordingSink, field: &str) -> Vec<f32> {
    match sink.field_values(field).as_slice() {
        [FieldValue::Floats(v)] => v.clone(),
        other => panic!("expected one Floats value for '{}', got {:?}", field, other),
    }
}
