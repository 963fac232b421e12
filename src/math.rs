//! Math type aliases and 4x4 matrix helpers for transform translation.

pub use nalgebra;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32).
pub type Quat = nalgebra::Quaternion<f32>;

/// Build a rotation matrix from an axis and an angle in radians.
///
/// A zero-length axis yields the identity.
pub fn mat4_from_axis_angle(axis: Vec3, angle: f32) -> Mat4 {
    match nalgebra::Unit::try_new(axis, 1.0e-6) {
        Some(unit) => nalgebra::Rotation3::from_axis_angle(&unit, angle).to_homogeneous(),
        None => Mat4::identity(),
    }
}

/// Build a translation-only 4x4 matrix.
pub fn mat4_from_translation(t: Vec3) -> Mat4 {
    Mat4::new_translation(&t)
}

/// Build a scale-only 4x4 matrix.
pub fn mat4_from_scale(s: Vec3) -> Mat4 {
    Mat4::new_nonuniform_scaling(&s)
}

/// Extract the translation column of a 4x4 matrix.
pub fn translation_of(m: &Mat4) -> Vec3 {
    Vec3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

/// Decompose a 4x4 matrix into (scale, rotation, translation).
///
/// Scale is recovered from column norms, rotation from the column-normalized
/// upper 3x3. Shear survives neither, which is acceptable for the transform
/// fields this crate emits.
pub fn to_scale_rotation_translation(m: &Mat4) -> (Vec3, Quat, Vec3) {
    let translation = translation_of(m);
    let col0 = Vec3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]);
    let col1 = Vec3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]);
    let col2 = Vec3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);
    let sx = col0.norm();
    let sy = col1.norm();
    let sz = col2.norm();
    let scale = Vec3::new(sx, sy, sz);
    let rot_mat = nalgebra::Matrix3::from_columns(&[col0 / sx, col1 / sy, col2 / sz]);
    let rotation = nalgebra::UnitQuaternion::from_rotation_matrix(
        &nalgebra::Rotation3::from_matrix_unchecked(rot_mat),
    )
    .into_inner();
    (scale, rotation, translation)
}

/// Extract an axis-angle rotation `[x, y, z, angle]` from a 4x4 matrix.
///
/// Returns `None` when the rotation part is (numerically) the identity.
pub fn axis_angle_of(m: &Mat4) -> Option<[f32; 4]> {
    let (_, rotation, _) = to_scale_rotation_translation(m);
    let unit = nalgebra::UnitQuaternion::new_normalize(rotation);
    unit.axis_angle().map(|(axis, angle)| {
        let a = axis.into_inner();
        [a.x, a.y, a.z, angle]
    })
}

/// Build the model matrix of an observer at `eye` looking at `target`.
///
/// This is the inverse of a view matrix: it positions and orients a node,
/// which is what a COLLADA `<lookat>` contributes to its parent transform.
pub fn look_at_model(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let forward = target - eye;
    let f = match nalgebra::Unit::try_new(forward, 1.0e-6) {
        Some(f) => f.into_inner(),
        None => return mat4_from_translation(eye),
    };
    let s = f.cross(&up);
    let s = match nalgebra::Unit::try_new(s, 1.0e-6) {
        Some(s) => s.into_inner(),
        None => return mat4_from_translation(eye),
    };
    let u = s.cross(&f);
    #[rustfmt::skip]
    let result = Mat4::new(
        s.x, u.x, -f.x, eye.x,
        s.y, u.y, -f.y, eye.y,
        s.z, u.z, -f.z, eye.z,
        0.0, 0.0,  0.0, 1.0,
    );
    result
}
