//! Mesh primitive translation: data binding, index expansion, and Shape
//! emission.
//!
//! Each primitive resolves its inputs down to coordinate/normal/texcoord
//! sources, decides between the shared-index and face-set output paths, and
//! expands its `<p>` streams accordingly. All fallible work (binding, source
//! decode, index parse) happens before the first sink event, so a skipped
//! primitive never leaves the sink unbalanced.

use std::collections::HashMap;

use xmltree::Element;

use crate::dom;
use crate::sink::{ContentSink, FieldValue};

use super::error::ColladaError;
use super::index::{index_streams, IndexStream, Vcount};
use super::input::{self, SharedInput};
use super::material::{self, BindMaterial};
use super::source::{Source, SourceData};
use super::strings as s;
use super::TranslationState;

/// The mesh primitive elements this translator handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Triangles,
    Trifans,
    Tristrips,
    Polylist,
    Polygons,
    Lines,
    Linestrips,
}

impl PrimitiveKind {
    /// Map a mesh child tag to a primitive kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            s::TRIANGLES => Some(PrimitiveKind::Triangles),
            s::TRIFANS => Some(PrimitiveKind::Trifans),
            s::TRISTRIPS => Some(PrimitiveKind::Tristrips),
            s::POLYLIST => Some(PrimitiveKind::Polylist),
            s::POLYGONS => Some(PrimitiveKind::Polygons),
            s::LINES => Some(PrimitiveKind::Lines),
            s::LINESTRIPS => Some(PrimitiveKind::Linestrips),
            _ => None,
        }
    }

    fn is_lines(self) -> bool {
        matches!(self, PrimitiveKind::Lines | PrimitiveKind::Linestrips)
    }
}

/// One bound attribute channel: which source feeds it, at which index offset.
#[derive(Debug, Clone)]
struct Channel {
    source: String,
    offset: usize,
}

/// Resolved data binding of one primitive.
struct Binding {
    coord: Channel,
    normal: Option<Channel>,
    texcoord: Option<Channel>,
    channels: usize,
}

impl Binding {
    fn resolve(mesh: &Element, primitive: &Element) -> Result<Self, ColladaError> {
        let prim_inputs = input::inputs(primitive);
        let vertex = input::find_semantic(&prim_inputs, s::SEM_VERTEX)
            .ok_or(ColladaError::MissingInput(s::SEM_VERTEX))?;

        let vertices = dom::find_children(mesh, s::VERTICES)
            .into_iter()
            .find(|v| dom::attribute(v, s::ID) == Some(vertex.source.as_str()))
            .ok_or_else(|| ColladaError::UnresolvedReference(vertex.source.clone()))?;
        let vertices_inputs = input::inputs(vertices);

        let position = input::find_semantic(&vertices_inputs, s::SEM_POSITION)
            .ok_or(ColladaError::MissingInput(s::SEM_POSITION))?;

        let coord = Channel {
            source: position.source.clone(),
            offset: vertex.offset,
        };
        Ok(Binding {
            normal: resolve_attribute(&prim_inputs, &vertices_inputs, s::SEM_NORMAL, &coord),
            texcoord: resolve_attribute(&prim_inputs, &vertices_inputs, s::SEM_TEXCOORD, &coord),
            channels: input::channel_count(&prim_inputs),
            coord,
        })
    }

    /// True when any bound channel indexes differently from the coordinates.
    fn divergent(&self) -> bool {
        let differs = |c: &Option<Channel>| {
            c.as_ref().is_some_and(|c| c.offset != self.coord.offset)
        };
        differs(&self.normal) || differs(&self.texcoord)
    }
}

/// A primitive-level input wins; a `<vertices>`-level input rides the
/// vertex index channel.
fn resolve_attribute(
    prim_inputs: &[SharedInput],
    vertices_inputs: &[SharedInput],
    semantic: &'static str,
    coord: &Channel,
) -> Option<Channel> {
    if let Some(own) = input::find_semantic(prim_inputs, semantic) {
        return Some(Channel {
            source: own.source.clone(),
            offset: own.offset,
        });
    }
    input::find_semantic(vertices_inputs, semantic).map(|shared| Channel {
        source: shared.source.clone(),
        offset: coord.offset,
    })
}

/// A coord/normal/texCoord buffer scheduled for emission.
struct BufferPlan {
    field: &'static str,
    node_type: &'static str,
    value_field: &'static str,
    source_id: String,
    /// `None` when the id was already emitted: becomes a USE reference.
    data: Option<Vec<f32>>,
}

/// Everything a primitive will emit, computed before any sink event.
struct PrimitivePlan {
    node_type: &'static str,
    index_fields: Vec<(&'static str, Vec<i32>)>,
    buffers: Vec<BufferPlan>,
}

/// Translate every primitive of an `<instance_geometry>` into Shape nodes.
///
/// Failures resolve to warnings: a geometry that cannot be translated is
/// skipped, never fatal.
pub fn translate_instance_geometry(
    root: &Element,
    instance: &Element,
    sink: &mut dyn ContentSink,
    state: &mut TranslationState,
) {
    let url = match dom::attribute(instance, s::URL) {
        Some(url) => url,
        None => {
            log::warn!("instance_geometry without url, skipping");
            return;
        }
    };
    if !url.starts_with('#') {
        log::warn!("non-local geometry url '{}', skipping", url);
        return;
    }
    let id = super::local_ref(url);

    let geometry = match super::resource_by_id(root, id) {
        Some(g) => g,
        None => {
            log::warn!("unresolved geometry '{}', skipping", id);
            return;
        }
    };
    let mesh = match dom::find_child(geometry, s::MESH) {
        Some(m) => m,
        None => {
            log::warn!("geometry '{}' has no mesh, skipping", id);
            return;
        }
    };

    let sources = super::source::source_map(mesh);
    let bindings = BindMaterial::parse(instance);

    for child in dom::all_children(mesh) {
        let kind = match PrimitiveKind::from_tag(&child.name) {
            Some(kind) => kind,
            None => continue,
        };
        match plan_primitive(child, kind, mesh, &sources, state) {
            Ok(plan) => {
                let symbol = dom::attribute(child, s::MATERIAL);
                let fields = material::resolve(root, &bindings, symbol);
                emit_shape(sink, state, &plan, &fields);
            }
            Err(err) => {
                log::warn!("skipping <{}> in geometry '{}': {}", child.name, id, err);
            }
        }
    }
}

fn plan_primitive(
    primitive: &Element,
    kind: PrimitiveKind,
    mesh: &Element,
    sources: &HashMap<String, Source>,
    state: &TranslationState,
) -> Result<PrimitivePlan, ColladaError> {
    let binding = Binding::resolve(mesh, primitive)?;
    let streams = index_streams(primitive)?;
    let count = dom::attribute_usize(primitive, s::COUNT);

    let (node_type, index_fields) = expand_indices(primitive, kind, &binding, &streams, count)?;

    let mut buffers = Vec::new();
    buffers.push(plan_buffer(
        "coord",
        "Coordinate",
        "point",
        &binding.coord.source,
        sources,
        state,
    )?);
    if !kind.is_lines() {
        if let Some(normal) = &binding.normal {
            buffers.push(plan_buffer(
                "normal",
                "Normal",
                "vector",
                &normal.source,
                sources,
                state,
            )?);
        }
        if let Some(texcoord) = &binding.texcoord {
            buffers.push(plan_buffer(
                "texCoord",
                "TextureCoordinate",
                "point",
                &texcoord.source,
                sources,
                state,
            )?);
        }
    }

    Ok(PrimitivePlan {
        node_type,
        index_fields,
        buffers,
    })
}

type Expansion = (&'static str, Vec<(&'static str, Vec<i32>)>);

fn expand_indices(
    primitive: &Element,
    kind: PrimitiveKind,
    binding: &Binding,
    streams: &[IndexStream],
    count: usize,
) -> Result<Expansion, ColladaError> {
    let ch = binding.channels;
    let coord = binding.coord.offset;
    let empty = IndexStream::from_indices(Vec::new());
    let first = streams.first().unwrap_or(&empty);

    // For the face-set path, a channel gets its own index field only when
    // it diverges from the coordinate channel.
    let diverging: Vec<(&'static str, usize)> = [
        ("normalIndex", &binding.normal),
        ("texCoordIndex", &binding.texcoord),
    ]
    .into_iter()
    .filter_map(|(field, channel)| {
        channel
            .as_ref()
            .filter(|c| c.offset != coord)
            .map(|c| (field, c.offset))
    })
    .collect();

    type ExpandFn<'a> = &'a dyn Fn(usize) -> Result<Vec<i32>, ColladaError>;
    type PerStreamFn<'a> = &'a dyn Fn(&IndexStream, usize) -> Result<Vec<i32>, ColladaError>;

    let face_set = |expand: ExpandFn| -> Result<Expansion, ColladaError> {
        let mut fields = vec![("coordIndex", expand(coord)?)];
        for &(field, offset) in &diverging {
            fields.push((field, expand(offset)?));
        }
        Ok(("IndexedFaceSet", fields))
    };

    let concat = |per_stream: PerStreamFn, offset: usize| -> Result<Vec<i32>, ColladaError> {
        let mut out = Vec::new();
        for stream in streams {
            out.extend(per_stream(stream, offset)?);
        }
        Ok(out)
    };

    let expansion = match kind {
        PrimitiveKind::Triangles => {
            if binding.divergent() {
                face_set(&|offset| first.triangle_faces(count, offset, ch))?
            } else {
                (
                    "IndexedTriangleSet",
                    vec![("index", first.triangles(count, coord, ch)?)],
                )
            }
        }
        PrimitiveKind::Trifans => {
            if binding.divergent() {
                face_set(&|offset| concat(&|p, o| p.fan_faces(o, ch), offset))?
            } else {
                (
                    "IndexedTriangleFanSet",
                    vec![("index", concat(&|p, o| p.face(o, ch), coord)?)],
                )
            }
        }
        PrimitiveKind::Tristrips => {
            if binding.divergent() {
                face_set(&|offset| concat(&|p, o| p.strip_faces(o, ch), offset))?
            } else {
                (
                    "IndexedTriangleStripSet",
                    vec![("index", concat(&|p, o| p.face(o, ch), coord)?)],
                )
            }
        }
        PrimitiveKind::Polylist => {
            let vcount = match dom::find_child(primitive, s::VCOUNT) {
                Some(vc) => Vcount::parse(vc)?,
                None => Vcount { counts: Vec::new() },
            };
            face_set(&|offset| first.polylist_faces(&vcount, offset, ch))?
        }
        PrimitiveKind::Polygons => face_set(&|offset| concat(&|p, o| p.face(o, ch), offset))?,
        PrimitiveKind::Lines => (
            "IndexedLineSet",
            vec![("coordIndex", first.lines(count, coord, ch)?)],
        ),
        PrimitiveKind::Linestrips => (
            "IndexedLineSet",
            vec![("coordIndex", concat(&|p, o| p.face(o, ch), coord)?)],
        ),
    };
    Ok(expansion)
}

fn plan_buffer(
    field: &'static str,
    node_type: &'static str,
    value_field: &'static str,
    source_id: &str,
    sources: &HashMap<String, Source>,
    state: &TranslationState,
) -> Result<BufferPlan, ColladaError> {
    let data = if state.emitted_buffers.contains(source_id) {
        None
    } else {
        let source = sources
            .get(source_id)
            .ok_or_else(|| ColladaError::UnresolvedReference(source_id.to_string()))?;
        match source.data()? {
            SourceData::Floats(values) => Some(values),
            _ => {
                return Err(ColladaError::Structural(format!(
                    "source '{}' is not a float buffer",
                    source_id
                )))
            }
        }
    };
    Ok(BufferPlan {
        field,
        node_type,
        value_field,
        source_id: source_id.to_string(),
        data,
    })
}

fn emit_shape(
    sink: &mut dyn ContentSink,
    state: &mut TranslationState,
    plan: &PrimitivePlan,
    fields: &material::MaterialFields,
) {
    sink.start_node("Shape", None);

    sink.start_field("appearance");
    material::emit_appearance(sink, fields, &mut state.emitted_materials);
    sink.end_field();

    sink.start_field("geometry");
    sink.start_node(plan.node_type, None);
    for (field, indices) in &plan.index_fields {
        sink.start_field(field);
        sink.field_value(FieldValue::Ints(indices.clone()));
        sink.end_field();
    }
    for buffer in &plan.buffers {
        sink.start_field(buffer.field);
        match &buffer.data {
            Some(values) => {
                state.emitted_buffers.insert(buffer.source_id.clone());
                sink.start_node(buffer.node_type, Some(&buffer.source_id));
                sink.start_field(buffer.value_field);
                sink.field_value(FieldValue::Floats(values.clone()));
                sink.end_field();
                sink.end_node();
            }
            None => sink.use_decl(&buffer.source_id),
        }
        sink.end_field();
    }
    sink.end_node();
    sink.end_field();

    sink.end_node();
}
