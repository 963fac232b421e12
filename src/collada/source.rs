//! `<source>` decoding: raw arrays, accessors, and compacted typed output.

use std::collections::HashMap;

use xmltree::Element;

use crate::dom;

use super::codec;
use super::error::ColladaError;
use super::strings as s;

/// Element kind of a raw data array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    Bool,
    Float,
    Int,
    Name,
    Idref,
}

impl ArrayKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            s::BOOL_ARRAY => Some(ArrayKind::Bool),
            s::FLOAT_ARRAY => Some(ArrayKind::Float),
            s::INT_ARRAY => Some(ArrayKind::Int),
            s::NAME_ARRAY => Some(ArrayKind::Name),
            s::IDREF_ARRAY => Some(ArrayKind::Idref),
            _ => None,
        }
    }
}

/// A `<*_array>` child of a source, tokenized eagerly.
#[derive(Debug)]
pub struct RawArray {
    pub id: Option<String>,
    pub name: Option<String>,
    pub kind: ArrayKind,
    pub count: usize,
    pub tokens: Vec<String>,
}

impl RawArray {
    fn parse(element: &Element, kind: ArrayKind) -> Self {
        let text = dom::element_text(element);
        RawArray {
            id: dom::attribute(element, s::ID).map(String::from),
            name: dom::attribute(element, s::NAME).map(String::from),
            kind,
            count: dom::attribute_usize(element, s::COUNT),
            tokens: codec::split(&text).into_iter().map(String::from).collect(),
        }
    }
}

/// One `<param>` of an accessor; unnamed params are stride padding.
#[derive(Debug)]
pub struct Param {
    pub name: Option<String>,
}

/// The `<accessor>` of a source's `<technique_common>`.
#[derive(Debug)]
pub struct Accessor {
    pub source_id: String,
    pub count: usize,
    pub offset: usize,
    pub stride: usize,
    pub params: Vec<Param>,
}

impl Accessor {
    fn parse(element: &Element) -> Self {
        let stride = dom::attribute(element, s::STRIDE)
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        let params = dom::find_children(element, s::PARAM)
            .into_iter()
            .map(|p| Param {
                name: dom::attribute(p, s::NAME).map(String::from),
            })
            .collect();
        Accessor {
            source_id: dom::attribute(element, s::SOURCE)
                .map(super::local_ref)
                .unwrap_or_default()
                .to_string(),
            count: dom::attribute_usize(element, s::COUNT),
            offset: dom::attribute_usize(element, s::OFFSET),
            stride,
            params,
        }
    }

    fn valid_params(&self) -> usize {
        self.params.iter().filter(|p| p.name.is_some()).count()
    }
}

/// Typed, compacted source data: `count` records of the valid params only,
/// record-major.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceData {
    Floats(Vec<f32>),
    Ints(Vec<i32>),
    Strings(Vec<String>),
}

impl SourceData {
    /// Borrow the float payload, if that is what this source decodes to.
    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            SourceData::Floats(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the string payload, if that is what this source decodes to.
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            SourceData::Strings(v) => Some(v),
            _ => None,
        }
    }
}

/// A `<source>`: its raw array plus the accessor describing its layout.
#[derive(Debug)]
pub struct Source {
    pub id: String,
    pub array: RawArray,
    pub accessor: Option<Accessor>,
}

impl Source {
    /// Parse a `<source>` element.
    ///
    /// The accessor is required exactly when `<technique_common>` is present,
    /// and its `source` ref must name this source's array.
    pub fn parse(element: &Element) -> Result<Self, ColladaError> {
        let id = dom::attribute(element, s::ID).unwrap_or_default().to_string();

        let mut array = None;
        for child in dom::all_children(element) {
            if let Some(kind) = ArrayKind::from_tag(&child.name) {
                array = Some(RawArray::parse(child, kind));
                break;
            }
        }
        let array = array.ok_or_else(|| {
            ColladaError::Structural(format!("source '{}' has no data array", id))
        })?;

        let accessor = match dom::find_child(element, s::TECHNIQUE_COMMON) {
            Some(tc) => {
                let acc = dom::find_child(tc, s::ACCESSOR).ok_or_else(|| {
                    ColladaError::Structural(format!(
                        "source '{}': technique_common without accessor",
                        id
                    ))
                })?;
                let acc = Accessor::parse(acc);
                if let Some(array_id) = &array.id {
                    if acc.source_id != *array_id {
                        return Err(ColladaError::Structural(format!(
                            "source '{}': accessor targets '{}', array is '{}'",
                            id, acc.source_id, array_id
                        )));
                    }
                }
                Some(acc)
            }
            None => None,
        };

        Ok(Source {
            id,
            array,
            accessor,
        })
    }

    /// Number of records the accessor declares.
    pub fn count(&self) -> usize {
        self.accessor.as_ref().map_or(0, |a| a.count)
    }

    /// Number of named (valid) params per record.
    pub fn valid_params(&self) -> usize {
        self.accessor.as_ref().map_or(0, |a| a.valid_params())
    }

    /// Decode this source's tokens into typed, compacted data.
    ///
    /// When every param is named and the accessor is dense (offset 0, stride
    /// equal to the param count) the whole token array converts in one pass.
    /// Otherwise the valid columns of each record are gathered first, so the
    /// output is always exactly `count * valid_params` values.
    pub fn data(&self) -> Result<SourceData, ColladaError> {
        let accessor = self.accessor.as_ref().ok_or_else(|| {
            ColladaError::Structural(format!("source '{}' has no accessor", self.id))
        })?;

        if self.array.kind == ArrayKind::Bool {
            return Err(ColladaError::Unsupported(format!(
                "bool_array source '{}'",
                self.id
            )));
        }

        let valid = accessor.valid_params();
        let dense = accessor.offset == 0
            && accessor.stride == accessor.params.len()
            && valid == accessor.params.len();

        let tokens: Vec<&str> = if dense {
            self.array.tokens.iter().map(String::as_str).collect()
        } else {
            let mut picked = Vec::with_capacity(accessor.count * valid);
            for record in 0..accessor.count {
                let base = accessor.offset + record * accessor.stride;
                for (column, param) in accessor.params.iter().enumerate() {
                    if param.name.is_none() {
                        continue;
                    }
                    let index = base + column;
                    let token = self.array.tokens.get(index).ok_or_else(|| {
                        ColladaError::Structural(format!(
                            "source '{}': accessor reads past the array (index {})",
                            self.id, index
                        ))
                    })?;
                    picked.push(token.as_str());
                }
            }
            picked
        };

        match self.array.kind {
            ArrayKind::Float => Ok(SourceData::Floats(codec::to_f32(&tokens)?)),
            ArrayKind::Int => Ok(SourceData::Ints(codec::to_i32(&tokens)?)),
            ArrayKind::Name | ArrayKind::Idref => Ok(SourceData::Strings(
                tokens.into_iter().map(String::from).collect(),
            )),
            ArrayKind::Bool => unreachable!("rejected above"),
        }
    }
}

/// Parse all `<source>` children of an element into an id-keyed map.
///
/// Sources that fail to parse are skipped with a warning; a missing source is
/// only an error at the point something references it.
pub fn source_map(parent: &Element) -> HashMap<String, Source> {
    let mut map = HashMap::new();
    for child in dom::find_children(parent, s::SOURCE) {
        match Source::parse(child) {
            Ok(source) => {
                map.insert(source.id.clone(), source);
            }
            Err(err) => log::warn!("skipping malformed source: {}", err),
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    fn float_source(accessor: &str) -> Source {
        let xml = format!(
            "<source id=\"s\">\
               <float_array id=\"a\" count=\"8\">0 1 2 3 4 5 6 7</float_array>\
               <technique_common>{}</technique_common>\
             </source>",
            accessor
        );
        Source::parse(&parse(&xml)).unwrap()
    }

    #[test]
    fn dense_decode() {
        let source = float_source(
            "<accessor source=\"#a\" count=\"4\" stride=\"2\">\
               <param name=\"U\" type=\"float\"/><param name=\"V\" type=\"float\"/>\
             </accessor>",
        );
        let data = source.data().unwrap();
        assert_eq!(
            data,
            SourceData::Floats(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])
        );
    }

    #[test]
    fn sparse_decode_skips_unnamed_params() {
        let source = float_source(
            "<accessor source=\"#a\" count=\"4\" stride=\"2\">\
               <param name=\"U\" type=\"float\"/><param type=\"float\"/>\
             </accessor>",
        );
        let data = source.data().unwrap();
        assert_eq!(data, SourceData::Floats(vec![0.0, 2.0, 4.0, 6.0]));
    }

    #[test]
    fn offset_decode() {
        let source = float_source(
            "<accessor source=\"#a\" count=\"3\" offset=\"2\" stride=\"2\">\
               <param name=\"U\" type=\"float\"/><param name=\"V\" type=\"float\"/>\
             </accessor>",
        );
        let data = source.data().unwrap();
        assert_eq!(data, SourceData::Floats(vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]));
    }

    #[test]
    fn accessor_array_mismatch_is_structural() {
        let xml = "<source id=\"s\">\
                     <float_array id=\"a\" count=\"1\">0</float_array>\
                     <technique_common>\
                       <accessor source=\"#other\" count=\"1\" stride=\"1\">\
                         <param name=\"X\" type=\"float\"/>\
                       </accessor>\
                     </technique_common>\
                   </source>";
        assert!(matches!(
            Source::parse(&parse(xml)),
            Err(ColladaError::Structural(_))
        ));
    }

    #[test]
    fn bool_array_is_unsupported() {
        let xml = "<source id=\"s\">\
                     <bool_array id=\"a\" count=\"2\">true false</bool_array>\
                     <technique_common>\
                       <accessor source=\"#a\" count=\"2\" stride=\"1\">\
                         <param name=\"B\" type=\"bool\"/>\
                       </accessor>\
                     </technique_common>\
                   </source>";
        let source = Source::parse(&parse(xml)).unwrap();
        assert!(matches!(source.data(), Err(ColladaError::Unsupported(_))));
    }

    #[test]
    fn name_array_decodes_to_strings() {
        let xml = "<source id=\"s\">\
                     <Name_array id=\"a\" count=\"2\">LINEAR BEZIER</Name_array>\
                     <technique_common>\
                       <accessor source=\"#a\" count=\"2\" stride=\"1\">\
                         <param name=\"INTERPOLATION\" type=\"name\"/>\
                       </accessor>\
                     </technique_common>\
                   </source>";
        let source = Source::parse(&parse(xml)).unwrap();
        assert_eq!(
            source.data().unwrap(),
            SourceData::Strings(vec!["LINEAR".into(), "BEZIER".into()])
        );
    }
}
