//! Output event protocol for translated scene graphs.
//!
//! The translator produces an ordered stream of node/field events through
//! [`ContentSink`] and route declarations through [`RouteSink`]. Every
//! `start_node`/`start_field` is matched by exactly one `end_node`/
//! `end_field` in LIFO order. A sink may build an in-memory graph, serialize
//! text, or forward to a renderer; [`RecordingSink`] captures the raw stream
//! and is what the tests assert against.

/// A single field payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Single float (e.g. shininess).
    Float(f32),
    /// Flat float array (points, vectors, colors, keys).
    Floats(Vec<f32>),
    /// Single integer.
    Int(i32),
    /// Flat integer array (index fields, -1 terminated where face-sets need it).
    Ints(Vec<i32>),
    /// Boolean (e.g. loop).
    Bool(bool),
    /// Time value in seconds (e.g. cycleInterval).
    Time(f64),
    /// Single string (e.g. description).
    Str(String),
    /// String array (name/idref source data).
    Strings(Vec<String>),
}

/// Receiver for the node/field event stream.
pub trait ContentSink {
    /// Open a node of the given type, optionally declaring a reusable id.
    fn start_node(&mut self, type_tag: &str, def_id: Option<&str>);

    /// Close the most recently opened node.
    fn end_node(&mut self);

    /// Open a field of the current node.
    fn start_field(&mut self, name: &str);

    /// Close the most recently opened field.
    fn end_field(&mut self);

    /// Reference a previously declared id instead of re-emitting content.
    fn use_decl(&mut self, def_id: &str);

    /// Set the value of the current field.
    fn field_value(&mut self, value: FieldValue);
}

/// Receiver for route declarations produced by animation wiring.
pub trait RouteSink {
    /// Declare an event route from a source node's output field to a target
    /// node's input field.
    fn route_decl(&mut self, src_def: &str, src_field: &str, dst_def: &str, dst_field: &str);
}

/// One recorded sink event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartNode {
        type_tag: String,
        def_id: Option<String>,
    },
    EndNode,
    StartField(String),
    EndField,
    UseDecl(String),
    Value(FieldValue),
    Route {
        src_def: String,
        src_field: String,
        dst_def: String,
        dst_field: String,
    },
}

/// Captures the event stream as a flat `Vec<Event>`.
///
/// Tracks nesting depth so tests can assert the stream is balanced.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// All recorded events in emission order.
    pub events: Vec<Event>,
    depth: i32,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every start event has been matched by its end event.
    pub fn is_balanced(&self) -> bool {
        self.depth == 0
    }

    /// All values set for fields with the given name, in emission order.
    pub fn field_values(&self, field: &str) -> Vec<&FieldValue> {
        let mut values = Vec::new();
        let mut pending = false;
        for event in &self.events {
            match event {
                Event::StartField(name) => pending = name == field,
                Event::Value(value) if pending => {
                    values.push(value);
                    pending = false;
                }
                Event::EndField => pending = false,
                _ => {}
            }
        }
        values
    }

    /// Count of `StartNode` events with the given type tag.
    pub fn node_count(&self, type_tag: &str) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::StartNode { type_tag: t, .. } if t == type_tag))
            .count()
    }

    /// Def ids declared on `StartNode` events, in emission order.
    pub fn def_ids(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::StartNode {
                    def_id: Some(id), ..
                } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl ContentSink for RecordingSink {
    fn start_node(&mut self, type_tag: &str, def_id: Option<&str>) {
        self.depth += 1;
        self.events.push(Event::StartNode {
            type_tag: type_tag.to_string(),
            def_id: def_id.map(String::from),
        });
    }

    fn end_node(&mut self) {
        self.depth -= 1;
        self.events.push(Event::EndNode);
    }

    fn start_field(&mut self, name: &str) {
        self.depth += 1;
        self.events.push(Event::StartField(name.to_string()));
    }

    fn end_field(&mut self) {
        self.depth -= 1;
        self.events.push(Event::EndField);
    }

    fn use_decl(&mut self, def_id: &str) {
        self.events.push(Event::UseDecl(def_id.to_string()));
    }

    fn field_value(&mut self, value: FieldValue) {
        self.events.push(Event::Value(value));
    }
}

impl RouteSink for RecordingSink {
    fn route_decl(&mut self, src_def: &str, src_field: &str, dst_def: &str, dst_field: &str) {
        self.events.push(Event::Route {
            src_def: src_def.to_string(),
            src_field: src_field.to_string(),
            dst_def: dst_def.to_string(),
            dst_field: dst_field.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_balance() {
        let mut sink = RecordingSink::new();
        sink.start_node("Shape", None);
        sink.start_field("geometry");
        assert!(!sink.is_balanced());
        sink.end_field();
        sink.end_node();
        assert!(sink.is_balanced());
    }

    #[test]
    fn field_value_lookup() {
        let mut sink = RecordingSink::new();
        sink.start_node("Coordinate", Some("c1"));
        sink.start_field("point");
        sink.field_value(FieldValue::Floats(vec![1.0, 2.0, 3.0]));
        sink.end_field();
        sink.end_node();

        let values = sink.field_values("point");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], &FieldValue::Floats(vec![1.0, 2.0, 3.0]));
        assert_eq!(sink.def_ids(), vec!["c1"]);
    }
}
