//! Read-only query helpers over an `xmltree` document.
//!
//! The translator only ever reads the tree: children by tag in document
//! order, text content, and attributes (absent means `None`, never an
//! error). These helpers are the whole surface it consumes.

use xmltree::{Element, XMLNode};

/// First direct child element with the given tag, in document order.
pub fn find_child<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    child_elements(element).find(|child| child.name == name)
}

/// All direct child elements with the given tag, in document order.
pub fn find_children<'a>(element: &'a Element, name: &'a str) -> Vec<&'a Element> {
    child_elements(element)
        .filter(|child| child.name == name)
        .collect()
}

/// All direct child elements, in document order.
pub fn all_children(element: &Element) -> Vec<&Element> {
    child_elements(element).collect()
}

/// All descendant elements with the given tag, in document order.
///
/// Depth-first pre-order, matching DOM `getElementsByTagName`.
pub fn descendants<'a>(element: &'a Element, name: &str) -> Vec<&'a Element> {
    let mut found = Vec::new();
    collect_descendants(element, name, &mut found);
    found
}

/// Concatenated text content of an element's direct text children.
pub fn element_text(element: &Element) -> String {
    let mut text = String::new();
    for node in &element.children {
        if let XMLNode::Text(t) = node {
            text.push_str(t);
        }
    }
    text
}

/// Attribute value, or `None` when the attribute is absent.
pub fn attribute<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attributes.get(name).map(String::as_str)
}

/// Attribute value parsed as `usize`, defaulting to 0 when absent or malformed.
pub fn attribute_usize(element: &Element, name: &str) -> usize {
    attribute(element, name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(child) => Some(child),
        _ => None,
    })
}

fn collect_descendants<'a>(element: &'a Element, name: &str, found: &mut Vec<&'a Element>) {
    for child in child_elements(element) {
        if child.name == name {
            found.push(child);
        }
        collect_descendants(child, name, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).expect("test xml must parse")
    }

    #[test]
    fn find_child_in_document_order() {
        let root = parse("<a><b id=\"1\"/><c/><b id=\"2\"/></a>");
        let first = find_child(&root, "b").unwrap();
        assert_eq!(attribute(first, "id"), Some("1"));
        assert_eq!(find_children(&root, "b").len(), 2);
        assert!(find_child(&root, "missing").is_none());
    }

    #[test]
    fn descendants_are_deep() {
        let root = parse("<a><b><c/></b><c/></a>");
        assert_eq!(descendants(&root, "c").len(), 2);
    }

    #[test]
    fn text_and_attributes() {
        let root = parse("<a x=\"1\">hello <b/>world</a>");
        assert_eq!(element_text(&root), "hello world");
        assert_eq!(attribute(&root, "x"), Some("1"));
        assert_eq!(attribute(&root, "y"), None);
        assert_eq!(attribute_usize(&root, "x"), 1);
        assert_eq!(attribute_usize(&root, "y"), 0);
    }
}
