//! `<input>` bindings: semantic lookup and index channel counting.

use xmltree::Element;

use crate::dom;

use super::strings as s;

/// A shared `<input>` of a primitive or `<vertices>` element.
#[derive(Debug, Clone)]
pub struct SharedInput {
    pub offset: usize,
    pub semantic: String,
    /// Local id of the referenced source (leading `#` stripped).
    pub source: String,
    pub set: Option<usize>,
}

/// Parse all `<input>` children of an element, in document order.
pub fn inputs(parent: &Element) -> Vec<SharedInput> {
    dom::find_children(parent, s::INPUT)
        .into_iter()
        .map(|input| SharedInput {
            offset: dom::attribute_usize(input, s::OFFSET),
            semantic: dom::attribute(input, s::SEMANTIC)
                .unwrap_or_default()
                .to_string(),
            source: super::local_ref(dom::attribute(input, s::SOURCE).unwrap_or_default())
                .to_string(),
            set: dom::attribute(input, s::SET).and_then(|v| v.parse().ok()),
        })
        .collect()
}

/// Number of interleaved index channels in a `<p>` stream.
///
/// With more than one input the channels are the offset range `0..=max`,
/// even when offsets are shared or sparse; a single input is one channel
/// regardless of its offset.
pub fn channel_count(inputs: &[SharedInput]) -> usize {
    if inputs.len() > 1 {
        inputs.iter().map(|i| i.offset).max().unwrap_or(0) + 1
    } else {
        inputs.len()
    }
}

/// Find the first input with the given semantic (exact, case-sensitive).
pub fn find_semantic<'a>(inputs: &'a [SharedInput], semantic: &str) -> Option<&'a SharedInput> {
    inputs.iter().find(|i| i.semantic == semantic)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(offset: usize, semantic: &str) -> SharedInput {
        SharedInput {
            offset,
            semantic: semantic.to_string(),
            source: String::new(),
            set: None,
        }
    }

    #[test]
    fn channel_count_spans_sparse_offsets() {
        let set = [input(0, "VERTEX"), input(2, "NORMAL")];
        assert_eq!(channel_count(&set), 3);
    }

    #[test]
    fn single_input_is_one_channel() {
        assert_eq!(channel_count(&[input(5, "VERTEX")]), 1);
        assert_eq!(channel_count(&[]), 0);
    }

    #[test]
    fn semantic_lookup_is_case_sensitive() {
        let set = [input(0, "VERTEX"), input(1, "NORMAL")];
        assert!(find_semantic(&set, "NORMAL").is_some());
        assert!(find_semantic(&set, "normal").is_none());
    }

    #[test]
    fn parse_inputs() {
        let xml = "<triangles>\
                     <input semantic=\"VERTEX\" source=\"#verts\" offset=\"0\"/>\
                     <input semantic=\"TEXCOORD\" source=\"#uv\" offset=\"1\" set=\"0\"/>\
                   </triangles>";
        let element = Element::parse(xml.as_bytes()).unwrap();
        let parsed = inputs(&element);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].source, "verts");
        assert_eq!(parsed[1].set, Some(0));
        assert_eq!(channel_count(&parsed), 2);
    }
}
