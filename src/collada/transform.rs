//! COLLADA transform elements and their mapping onto Transform node fields.

use xmltree::Element;

use crate::dom;
use crate::math::{
    self, axis_angle_of, look_at_model, mat4_from_axis_angle, mat4_from_scale,
    mat4_from_translation, translation_of, Mat4, Vec3,
};
use crate::sink::FieldValue;

use super::codec;
use super::error::ColladaError;
use super::strings as s;

/// One transform child of a `<node>`, in document order.
#[derive(Debug, Clone)]
pub enum TransformElement {
    Translate {
        sid: Option<String>,
        offset: Vec3,
    },
    Rotate {
        sid: Option<String>,
        axis: Vec3,
        angle_deg: f32,
    },
    Scale {
        sid: Option<String>,
        factor: Vec3,
    },
    Skew {
        sid: Option<String>,
        angle_deg: f32,
        rotation_axis: Vec3,
        translation_axis: Vec3,
    },
    Matrix {
        sid: Option<String>,
        matrix: Mat4,
    },
    Lookat {
        sid: Option<String>,
        eye: Vec3,
        target: Vec3,
        up: Vec3,
    },
}

impl TransformElement {
    /// Parse a node child if it is a transform element, `None` otherwise.
    pub fn parse(element: &Element) -> Result<Option<Self>, ColladaError> {
        let tag = element.name.as_str();
        if !matches!(
            tag,
            s::TRANSLATE | s::ROTATE | s::SCALE | s::SKEW | s::MATRIX | s::LOOKAT
        ) {
            return Ok(None);
        }

        let sid = dom::attribute(element, s::SID).map(String::from);
        let text = dom::element_text(element);
        let values = codec::to_f32(&codec::split(&text))?;
        let need = |n: usize| -> Result<(), ColladaError> {
            if values.len() < n {
                Err(ColladaError::Structural(format!(
                    "<{}> holds {} floats, expected {}",
                    tag,
                    values.len(),
                    n
                )))
            } else {
                Ok(())
            }
        };
        let v3 = |i: usize| Vec3::new(values[i], values[i + 1], values[i + 2]);

        let element = match tag {
            s::TRANSLATE => {
                need(3)?;
                TransformElement::Translate {
                    sid,
                    offset: v3(0),
                }
            }
            s::ROTATE => {
                need(4)?;
                TransformElement::Rotate {
                    sid,
                    axis: v3(0),
                    angle_deg: values[3],
                }
            }
            s::SCALE => {
                need(3)?;
                TransformElement::Scale {
                    sid,
                    factor: v3(0),
                }
            }
            s::SKEW => {
                need(7)?;
                TransformElement::Skew {
                    sid,
                    angle_deg: values[0],
                    rotation_axis: v3(1),
                    translation_axis: v3(4),
                }
            }
            s::MATRIX => {
                need(16)?;
                TransformElement::Matrix {
                    sid,
                    matrix: Mat4::from_row_slice(&values[..16]),
                }
            }
            s::LOOKAT => {
                need(9)?;
                TransformElement::Lookat {
                    sid,
                    eye: v3(0),
                    target: v3(3),
                    up: v3(6),
                }
            }
            _ => unreachable!(),
        };
        Ok(Some(element))
    }

    /// The element's scoped id, used for animation targeting.
    pub fn sid(&self) -> Option<&str> {
        match self {
            TransformElement::Translate { sid, .. }
            | TransformElement::Rotate { sid, .. }
            | TransformElement::Scale { sid, .. }
            | TransformElement::Skew { sid, .. }
            | TransformElement::Matrix { sid, .. }
            | TransformElement::Lookat { sid, .. } => sid.as_deref(),
        }
    }

    /// The element as a 4x4 matrix. Always derivable.
    pub fn matrix(&self) -> Mat4 {
        match self {
            TransformElement::Translate { offset, .. } => mat4_from_translation(*offset),
            TransformElement::Rotate {
                axis, angle_deg, ..
            } => mat4_from_axis_angle(*axis, angle_deg.to_radians()),
            TransformElement::Scale { factor, .. } => mat4_from_scale(*factor),
            TransformElement::Skew {
                angle_deg,
                rotation_axis,
                translation_axis,
                ..
            } => skew_matrix(*angle_deg, *rotation_axis, *translation_axis),
            TransformElement::Matrix { matrix, .. } => *matrix,
            TransformElement::Lookat {
                eye, target, up, ..
            } => look_at_model(*eye, *target, *up),
        }
    }

    /// The Transform field this element maps onto directly, if it has one.
    pub fn direct_field(&self) -> Option<(&'static str, FieldValue)> {
        match self {
            TransformElement::Translate { offset, .. } => Some((
                "translation",
                FieldValue::Floats(vec![offset.x, offset.y, offset.z]),
            )),
            TransformElement::Rotate {
                axis, angle_deg, ..
            } => Some((
                "rotation",
                FieldValue::Floats(vec![axis.x, axis.y, axis.z, angle_deg.to_radians()]),
            )),
            TransformElement::Scale { factor, .. } => Some((
                "scale",
                FieldValue::Floats(vec![factor.x, factor.y, factor.z]),
            )),
            _ => None,
        }
    }

    /// Transform fields for this element: the direct mapping when one
    /// exists, otherwise rotation/translation/scale extracted from the
    /// matrix (rotation only when non-identity, scale only when non-unit).
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        if let Some(field) = self.direct_field() {
            return vec![field];
        }
        let m = self.matrix();
        let mut fields = Vec::new();
        if let Some(aa) = axis_angle_of(&m) {
            fields.push(("rotation", FieldValue::Floats(aa.to_vec())));
        }
        let t = translation_of(&m);
        fields.push(("translation", FieldValue::Floats(vec![t.x, t.y, t.z])));
        let (scale, _, _) = math::to_scale_rotation_translation(&m);
        if (scale - Vec3::new(1.0, 1.0, 1.0)).norm() > 1.0e-5 {
            fields.push(("scale", FieldValue::Floats(vec![scale.x, scale.y, scale.z])));
        }
        fields
    }
}

/// Shear matrix `I + tan(angle) * (t ⊗ r)` for the COLLADA `<skew>` element.
fn skew_matrix(angle_deg: f32, rotation_axis: Vec3, translation_axis: Vec3) -> Mat4 {
    let tan = angle_deg.to_radians().tan();
    let r = match nalgebra_unit(rotation_axis) {
        Some(v) => v,
        None => return Mat4::identity(),
    };
    let t = match nalgebra_unit(translation_axis) {
        Some(v) => v,
        None => return Mat4::identity(),
    };
    let mut m = Mat4::identity();
    for row in 0..3 {
        for col in 0..3 {
            m[(row, col)] += tan * t[row] * r[col];
        }
    }
    m
}

fn nalgebra_unit(v: Vec3) -> Option<Vec3> {
    math::nalgebra::Unit::try_new(v, 1.0e-6).map(|u| u.into_inner())
}

/// All transform children of a `<node>`, in document order.
///
/// A malformed element is skipped with a warning; the rest of the chain
/// still applies.
pub fn transform_elements(node: &Element) -> Vec<TransformElement> {
    let mut elements = Vec::new();
    for child in dom::all_children(node) {
        match TransformElement::parse(child) {
            Ok(Some(element)) => elements.push(element),
            Ok(None) => {}
            Err(err) => log::warn!("skipping malformed <{}>: {}", child.name, err),
        }
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn parse(xml: &str) -> TransformElement {
        let element = Element::parse(xml.as_bytes()).unwrap();
        TransformElement::parse(&element).unwrap().unwrap()
    }

    #[test]
    fn translate_maps_directly() {
        let t = parse("<translate sid=\"t\">1 2 3</translate>");
        let (name, value) = t.direct_field().unwrap();
        assert_eq!(name, "translation");
        assert_eq!(value, FieldValue::Floats(vec![1.0, 2.0, 3.0]));
        assert_eq!(t.sid(), Some("t"));
    }

    #[test]
    fn rotate_converts_to_radians() {
        let r = parse("<rotate>0 1 0 90</rotate>");
        let (name, value) = r.direct_field().unwrap();
        assert_eq!(name, "rotation");
        match value {
            FieldValue::Floats(v) => {
                assert_eq!(&v[..3], &[0.0, 1.0, 0.0]);
                assert!((v[3] - FRAC_PI_2).abs() < 1e-6);
            }
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn matrix_is_row_major() {
        let m = parse("<matrix>1 0 0 5  0 1 0 6  0 0 1 7  0 0 0 1</matrix>");
        assert!(m.direct_field().is_none());
        let fields = m.fields();
        // Identity rotation: only translation.
        assert_eq!(fields.len(), 1);
        assert_eq!(
            fields[0],
            ("translation", FieldValue::Floats(vec![5.0, 6.0, 7.0]))
        );
    }

    #[test]
    fn matrix_with_rotation_and_scale() {
        // 90 degrees about Z with uniform scale 2 and a translation.
        let m = parse("<matrix>0 -2 0 1  2 0 0 0  0 0 2 0  0 0 0 1</matrix>");
        let fields = m.fields();
        let names: Vec<&str> = fields.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["rotation", "translation", "scale"]);
    }

    #[test]
    fn lookat_positions_the_eye() {
        let l = parse("<lookat>0 0 10  0 0 0  0 1 0</lookat>");
        let t = translation_of(&l.matrix());
        assert!((t - Vec3::new(0.0, 0.0, 10.0)).norm() < 1e-6);
    }

    #[test]
    fn short_payload_is_structural() {
        let element = Element::parse("<translate>1 2</translate>".as_bytes()).unwrap();
        assert!(matches!(
            TransformElement::parse(&element),
            Err(ColladaError::Structural(_))
        ));
    }

    #[test]
    fn non_transform_child_is_none() {
        let element = Element::parse("<instance_geometry/>".as_bytes()).unwrap();
        assert!(TransformElement::parse(&element).unwrap().is_none());
    }
}
