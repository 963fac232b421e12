//! Material binding and the material → effect → shading-element chain.

use std::collections::{HashMap, HashSet};

use xmltree::Element;

use crate::dom;
use crate::sink::{ContentSink, FieldValue};

use super::codec;
use super::strings as s;

/// Default diffuse grey used when a material cannot be resolved.
const DEFAULT_DIFFUSE: [f32; 3] = [0.7, 0.7, 0.7];

/// Symbol → material-id bindings of an `<instance_geometry>`.
#[derive(Debug, Default)]
pub struct BindMaterial {
    bindings: HashMap<String, String>,
}

impl BindMaterial {
    /// Parse the `<bind_material>` child of a geometry instance, if any.
    pub fn parse(instance: &Element) -> Self {
        let mut bindings = HashMap::new();
        if let Some(bind) = dom::find_child(instance, s::BIND_MATERIAL) {
            if let Some(tc) = dom::find_child(bind, s::TECHNIQUE_COMMON) {
                for im in dom::find_children(tc, s::INSTANCE_MATERIAL) {
                    let symbol = dom::attribute(im, s::SYMBOL);
                    let target = dom::attribute(im, s::TARGET).map(super::local_ref);
                    if let (Some(symbol), Some(target)) = (symbol, target) {
                        bindings.insert(symbol.to_string(), target.to_string());
                    }
                }
            }
        }
        BindMaterial { bindings }
    }

    /// Material id bound to a primitive's material symbol.
    pub fn target(&self, symbol: &str) -> Option<&str> {
        self.bindings.get(symbol).map(String::as_str)
    }
}

/// Resolved shading fields for one material instance.
#[derive(Debug, Default, PartialEq)]
pub struct MaterialFields {
    /// Effect id the fields came from; used as the Material DEF id.
    pub effect_id: Option<String>,
    pub emissive: Option<[f32; 3]>,
    pub diffuse: Option<[f32; 3]>,
    pub specular: Option<[f32; 3]>,
    pub shininess: Option<f32>,
}

impl MaterialFields {
    /// The grey fallback emitted when resolution fails at any link.
    pub fn default_grey() -> Self {
        MaterialFields {
            diffuse: Some(DEFAULT_DIFFUSE),
            ..Default::default()
        }
    }
}

/// Follow symbol → material → effect → profile_COMMON → technique → shading
/// element. Any broken link falls back to the default grey fields.
pub fn resolve(root: &Element, bindings: &BindMaterial, symbol: Option<&str>) -> MaterialFields {
    match try_resolve(root, bindings, symbol) {
        Some(fields) => fields,
        None => {
            if let Some(symbol) = symbol {
                log::warn!("material symbol '{}' did not resolve, using default", symbol);
            }
            MaterialFields::default_grey()
        }
    }
}

fn try_resolve(
    root: &Element,
    bindings: &BindMaterial,
    symbol: Option<&str>,
) -> Option<MaterialFields> {
    let material_id = bindings.target(symbol?)?;
    let material = super::resource_by_id(root, material_id)?;
    let effect_url = dom::find_child(material, s::INSTANCE_EFFECT)
        .and_then(|ie| dom::attribute(ie, s::URL))
        .map(super::local_ref)?;
    let effect = super::resource_by_id(root, effect_url)?;
    let technique = dom::find_child(effect, s::PROFILE_COMMON)
        .and_then(|profile| dom::find_child(profile, s::TECHNIQUE))?;

    let shading = [s::BLINN, s::CONSTANT, s::LAMBERT, s::PHONG]
        .iter()
        .find_map(|tag| dom::find_child(technique, tag))?;

    let mut fields = MaterialFields {
        effect_id: Some(effect_url.to_string()),
        ..Default::default()
    };
    fields.emissive = color_of(shading, s::EMISSION);
    fields.diffuse = color_of(shading, s::DIFFUSE);
    fields.specular = color_of(shading, s::SPECULAR);
    fields.shininess = float_of(shading, s::SHININESS).map(|v| {
        // COLLADA shininess is a Phong exponent; normalize to [0, 1].
        if v > 1.0 {
            v / 128.0
        } else {
            v
        }
    });
    Some(fields)
}

/// First three floats of a `<color>` child; the alpha component is dropped.
fn color_of(shading: &Element, component: &str) -> Option<[f32; 3]> {
    let color = dom::find_child(shading, component)
        .and_then(|c| dom::find_child(c, s::COLOR))?;
    let text = dom::element_text(color);
    let values = codec::to_f32(&codec::split(&text)).ok()?;
    if values.len() < 3 {
        return None;
    }
    Some([values[0], values[1], values[2]])
}

fn float_of(shading: &Element, component: &str) -> Option<f32> {
    let float = dom::find_child(shading, component)
        .and_then(|c| dom::find_child(c, s::FLOAT))?;
    dom::element_text(float).trim().parse().ok()
}

/// Emit an Appearance node holding a Material with the resolved fields.
///
/// Materials carrying an effect id are DEF'ed by it; a repeat emission of
/// the same effect becomes a USE reference.
pub fn emit_appearance(
    sink: &mut dyn ContentSink,
    fields: &MaterialFields,
    emitted: &mut HashSet<String>,
) {
    sink.start_node("Appearance", None);
    sink.start_field("material");
    match &fields.effect_id {
        Some(effect_id) if emitted.contains(effect_id) => {
            sink.use_decl(effect_id);
        }
        def_id => {
            if let Some(effect_id) = def_id {
                emitted.insert(effect_id.clone());
            }
            sink.start_node("Material", def_id.as_deref());
            emit_color(sink, "emissiveColor", fields.emissive);
            emit_color(sink, "diffuseColor", fields.diffuse);
            emit_color(sink, "specularColor", fields.specular);
            if let Some(shininess) = fields.shininess {
                sink.start_field("shininess");
                sink.field_value(FieldValue::Float(shininess));
                sink.end_field();
            }
            sink.end_node();
        }
    }
    sink.end_field();
    sink.end_node();
}

fn emit_color(sink: &mut dyn ContentSink, field: &str, color: Option<[f32; 3]>) {
    if let Some(color) = color {
        sink.start_field(field);
        sink.field_value(FieldValue::Floats(color.to_vec()));
        sink.end_field();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;

    fn parse(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    fn document() -> Element {
        parse(
            "<COLLADA>\
               <library_materials>\
                 <material id=\"mat1\"><instance_effect url=\"#fx1\"/></material>\
               </library_materials>\
               <library_effects>\
                 <effect id=\"fx1\">\
                   <profile_COMMON><technique sid=\"common\">\
                     <phong>\
                       <diffuse><color>0.8 0.1 0.1 1</color></diffuse>\
                       <specular><color>1 1 1 1</color></specular>\
                       <shininess><float>64</float></shininess>\
                     </phong>\
                   </technique></profile_COMMON>\
                 </effect>\
               </library_effects>\
             </COLLADA>",
        )
    }

    fn bindings() -> BindMaterial {
        let instance = parse(
            "<instance_geometry url=\"#g\">\
               <bind_material><technique_common>\
                 <instance_material symbol=\"sym\" target=\"#mat1\"/>\
               </technique_common></bind_material>\
             </instance_geometry>",
        );
        BindMaterial::parse(&instance)
    }

    #[test]
    fn chain_resolves_to_effect_fields() {
        let root = document();
        let fields = resolve(&root, &bindings(), Some("sym"));
        assert_eq!(fields.effect_id.as_deref(), Some("fx1"));
        assert_eq!(fields.diffuse, Some([0.8, 0.1, 0.1]));
        assert_eq!(fields.shininess, Some(0.5));
    }

    #[test]
    fn broken_link_falls_back_to_grey() {
        let root = document();
        let fields = resolve(&root, &bindings(), Some("unknown"));
        assert_eq!(fields, MaterialFields::default_grey());
        assert_eq!(fields.diffuse, Some(DEFAULT_DIFFUSE));
    }

    #[test]
    fn second_emission_uses_reference() {
        let fields = MaterialFields {
            effect_id: Some("fx1".into()),
            diffuse: Some([1.0, 0.0, 0.0]),
            ..Default::default()
        };
        let mut emitted = HashSet::new();
        let mut sink = RecordingSink::new();
        emit_appearance(&mut sink, &fields, &mut emitted);
        emit_appearance(&mut sink, &fields, &mut emitted);
        assert!(sink.is_balanced());
        assert_eq!(sink.node_count("Material"), 1);
        assert_eq!(sink.def_ids(), vec!["fx1"]);
    }
}
