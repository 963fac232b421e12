//! COLLADA document translation.
//!
//! The entry points parse a `.dae` document and walk its scene, emitting a
//! scene-graph event stream through a [`ContentSink`] and animation routes
//! through a [`RouteSink`]. Degraded content (unresolved references,
//! unsupported primitives, broken material chains) is skipped with a
//! warning; only an unparseable document or a non-COLLADA root is fatal.

pub mod animation;
pub mod codec;
pub mod error;
pub mod geometry;
pub mod index;
pub mod input;
pub mod material;
pub mod source;
pub mod strings;
pub mod transform;

#[cfg(test)]
mod tests;

pub use self::error::ColladaError;
pub use self::geometry::PrimitiveKind;

use std::collections::{HashMap, HashSet};
use std::io::Read;

use xmltree::Element;

use crate::dom;
use crate::sink::{ContentSink, FieldValue, RouteSink};

use self::strings as s;

/// DEF id of the wrapper Transform that carries the document's unit scale
/// and up-axis correction.
pub const UNITS_TRANSFORM_ID: &str = "COLLADA_UNITS";

/// Strip the local-reference prefix from a url/ref attribute.
pub(crate) fn local_ref(url: &str) -> &str {
    url.strip_prefix('#').unwrap_or(url)
}

/// Find the library resource with the given id.
///
/// Searches every `library_*` child of the document root, deeply, so nested
/// resources (nodes inside nodes) resolve too.
pub(crate) fn resource_by_id<'a>(root: &'a Element, id: &str) -> Option<&'a Element> {
    dom::all_children(root)
        .into_iter()
        .filter(|child| child.name.starts_with("library_"))
        .find_map(|library| find_by_id(library, id))
}

fn find_by_id<'a>(element: &'a Element, id: &str) -> Option<&'a Element> {
    for child in dom::all_children(element) {
        if dom::attribute(child, s::ID) == Some(id) {
            return Some(child);
        }
        if let Some(found) = find_by_id(child, id) {
            return Some(found);
        }
    }
    None
}

/// DEF/USE bookkeeping threaded through the whole translation.
#[derive(Debug, Default)]
pub struct TranslationState {
    /// Source ids whose coord/normal/texcoord buffer was already emitted.
    pub emitted_buffers: HashSet<String>,
    /// Effect ids whose Material node was already emitted.
    pub emitted_materials: HashSet<String>,
    /// Node ids already emitted; a later `<instance_node>` becomes a USE.
    pub emitted_nodes: HashSet<String>,
    /// `node_id/sid` → Transform field name, for animation targeting.
    pub def_fields: HashMap<String, String>,
}

/// Translate a COLLADA document read from `reader`.
pub fn translate<R: Read>(
    reader: R,
    sink: &mut dyn ContentSink,
    routes: &mut dyn RouteSink,
) -> Result<(), ColladaError> {
    let root = Element::parse(reader)?;
    translate_document(&root, sink, routes)
}

/// Translate a COLLADA document held in a string.
pub fn translate_str(
    text: &str,
    sink: &mut dyn ContentSink,
    routes: &mut dyn RouteSink,
) -> Result<(), ColladaError> {
    translate(text.as_bytes(), sink, routes)
}

/// Translate an already parsed document.
///
/// The scene walk runs first and populates the DEF'ed transform-field map;
/// animations are wired afterwards so every channel target is known.
pub fn translate_document(
    root: &Element,
    sink: &mut dyn ContentSink,
    routes: &mut dyn RouteSink,
) -> Result<(), ColladaError> {
    if root.name != s::COLLADA {
        return Err(ColladaError::NotCollada(root.name.clone()));
    }

    let mut state = TranslationState::default();

    sink.start_node("Transform", Some(UNITS_TRANSFORM_ID));
    emit_asset_fields(root, sink);

    sink.start_field("children");
    for node in scene_nodes(root) {
        translate_node(root, node, sink, &mut state);
    }
    sink.end_field();
    sink.end_node();

    animation::translate_animations(root, sink, routes, &state);
    Ok(())
}

/// Unit scale and up-axis correction from the document's `<asset>`.
fn emit_asset_fields(root: &Element, sink: &mut dyn ContentSink) {
    let asset = match dom::find_child(root, s::ASSET) {
        Some(asset) => asset,
        None => return,
    };

    if let Some(unit) = dom::find_child(asset, s::UNIT) {
        let scale: f32 = dom::attribute(unit, s::METER)
            .and_then(|v| v.parse().ok())
            .unwrap_or(1.0);
        if scale != 1.0 {
            sink.start_field("scale");
            sink.field_value(FieldValue::Floats(vec![scale, scale, scale]));
            sink.end_field();
        }
    }

    if let Some(axis) = dom::find_child(asset, s::UP_AXIS) {
        let rotation = match dom::element_text(axis).trim() {
            s::X_UP => Some(vec![0.0, 0.0, 1.0, 1.570_796]),
            s::Z_UP => Some(vec![-1.0, 0.0, 0.0, 1.570_796]),
            _ => None, // Y_UP is the scene graph's native orientation
        };
        if let Some(rotation) = rotation {
            sink.start_field("rotation");
            sink.field_value(FieldValue::Floats(rotation));
            sink.end_field();
        }
    }
}

/// Root nodes of the instanced visual scene, in document order.
fn scene_nodes(root: &Element) -> Vec<&Element> {
    let scene = match dom::find_child(root, s::SCENE) {
        Some(scene) => scene,
        None => return Vec::new(),
    };
    let instance = match dom::find_child(scene, s::INSTANCE_VISUAL_SCENE) {
        Some(instance) => instance,
        None => return Vec::new(),
    };
    let url = dom::attribute(instance, s::URL).map(local_ref).unwrap_or_default();
    match resource_by_id(root, url) {
        Some(visual_scene) => dom::find_children(visual_scene, s::NODE),
        None => {
            log::warn!("unresolved visual scene '{}'", url);
            Vec::new()
        }
    }
}

/// Translate one `<node>`: a Transform DEF'ed by the node id, wrapping the
/// node's transform-element chain as nested Transforms, wrapping its
/// instances and child nodes.
fn translate_node(
    root: &Element,
    node: &Element,
    sink: &mut dyn ContentSink,
    state: &mut TranslationState,
) {
    let id = dom::attribute(node, s::ID);
    if let Some(id) = id {
        state.emitted_nodes.insert(id.to_string());
    }

    sink.start_node("Transform", id);
    sink.start_field("children");

    let transforms = transform::transform_elements(node);
    for element in &transforms {
        open_transform_element(element, id, sink, state);
    }

    for child in dom::all_children(node) {
        match child.name.as_str() {
            s::INSTANCE_GEOMETRY => {
                geometry::translate_instance_geometry(root, child, sink, state)
            }
            s::INSTANCE_CAMERA => translate_camera_instance(root, child, sink),
            s::INSTANCE_NODE => translate_node_instance(root, child, sink, state),
            s::NODE => translate_node(root, child, sink, state),
            _ => {}
        }
    }

    for _ in &transforms {
        sink.end_field();
        sink.end_node();
    }

    sink.end_field();
    sink.end_node();
}

/// Open one nested Transform for a transform element, leaving its
/// `children` field open for the rest of the node's content.
///
/// Elements with a direct field mapping and an sid are DEF'ed as
/// `node_id/sid` and recorded for animation targeting; an sid without a
/// direct field DEFs the Transform under the bare sid.
fn open_transform_element(
    element: &transform::TransformElement,
    node_id: Option<&str>,
    sink: &mut dyn ContentSink,
    state: &mut TranslationState,
) {
    let direct = element.direct_field();
    let def_id = match (element.sid(), &direct) {
        (Some(sid), Some((field, _))) => {
            let def = format!("{}/{}", node_id.unwrap_or_default(), sid);
            state.def_fields.insert(def.clone(), field.to_string());
            Some(def)
        }
        (Some(sid), None) => Some(sid.to_string()),
        (None, _) => None,
    };

    sink.start_node("Transform", def_id.as_deref());
    for (field, value) in element.fields() {
        sink.start_field(field);
        sink.field_value(value);
        sink.end_field();
    }
    sink.start_field("children");
}

/// An `<instance_node>`: USE when the target node was already emitted,
/// otherwise translate the referenced node in place (DEF'ing it).
fn translate_node_instance(
    root: &Element,
    instance: &Element,
    sink: &mut dyn ContentSink,
    state: &mut TranslationState,
) {
    let url = dom::attribute(instance, s::URL).unwrap_or_default();
    let id = local_ref(url);
    if state.emitted_nodes.contains(id) {
        sink.start_node("Transform", None);
        sink.use_decl(id);
        sink.end_node();
        return;
    }
    match resource_by_id(root, id) {
        Some(node) => translate_node(root, node, sink, state),
        None => log::warn!("unresolved node instance '{}', skipping", id),
    }
}

/// An `<instance_camera>`: perspective cameras become a Viewpoint at the
/// local origin; orthographic cameras are skipped.
fn translate_camera_instance(root: &Element, instance: &Element, sink: &mut dyn ContentSink) {
    let url = dom::attribute(instance, s::URL).unwrap_or_default();
    let id = local_ref(url);
    let camera = match resource_by_id(root, id) {
        Some(camera) => camera,
        None => {
            log::warn!("unresolved camera '{}', skipping", id);
            return;
        }
    };
    let technique_common = dom::find_child(camera, s::OPTICS)
        .and_then(|optics| dom::find_child(optics, s::TECHNIQUE_COMMON));
    let technique_common = match technique_common {
        Some(tc) => tc,
        None => {
            log::warn!("camera '{}' has no common optics, skipping", id);
            return;
        }
    };
    if dom::find_child(technique_common, s::PERSPECTIVE).is_none() {
        if dom::find_child(technique_common, s::ORTHOGRAPHIC).is_some() {
            log::warn!("orthographic camera '{}' not supported, skipping", id);
        }
        return;
    }

    let name = dom::attribute(camera, s::NAME).unwrap_or_default();
    sink.start_node("Viewpoint", Some(id));
    sink.start_field("description");
    sink.field_value(FieldValue::Str(name.to_string()));
    sink.end_field();
    sink.start_field("position");
    sink.field_value(FieldValue::Floats(vec![0.0, 0.0, 0.0]));
    sink.end_field();
    sink.end_node();
}
