//! COLLADA element, attribute, and semantic names used by the translator.

// Elements
pub const COLLADA: &str = "COLLADA";
pub const ASSET: &str = "asset";
pub const UNIT: &str = "unit";
pub const UP_AXIS: &str = "up_axis";
pub const SCENE: &str = "scene";
pub const INSTANCE_VISUAL_SCENE: &str = "instance_visual_scene";
pub const NODE: &str = "node";
pub const INSTANCE_NODE: &str = "instance_node";
pub const INSTANCE_GEOMETRY: &str = "instance_geometry";
pub const INSTANCE_CAMERA: &str = "instance_camera";
pub const MESH: &str = "mesh";
pub const SOURCE: &str = "source";
pub const VERTICES: &str = "vertices";
pub const INPUT: &str = "input";
pub const ACCESSOR: &str = "accessor";
pub const PARAM: &str = "param";
pub const TECHNIQUE_COMMON: &str = "technique_common";
pub const TECHNIQUE: &str = "technique";
pub const TRIANGLES: &str = "triangles";
pub const TRIFANS: &str = "trifans";
pub const TRISTRIPS: &str = "tristrips";
pub const POLYLIST: &str = "polylist";
pub const POLYGONS: &str = "polygons";
pub const LINES: &str = "lines";
pub const LINESTRIPS: &str = "linestrips";
pub const P: &str = "p";
pub const VCOUNT: &str = "vcount";
pub const BOOL_ARRAY: &str = "bool_array";
pub const FLOAT_ARRAY: &str = "float_array";
pub const INT_ARRAY: &str = "int_array";
pub const NAME_ARRAY: &str = "Name_array";
pub const IDREF_ARRAY: &str = "IDREF_array";
pub const BIND_MATERIAL: &str = "bind_material";
pub const INSTANCE_MATERIAL: &str = "instance_material";
pub const MATERIAL: &str = "material";
pub const INSTANCE_EFFECT: &str = "instance_effect";
pub const PROFILE_COMMON: &str = "profile_COMMON";
pub const BLINN: &str = "blinn";
pub const CONSTANT: &str = "constant";
pub const LAMBERT: &str = "lambert";
pub const PHONG: &str = "phong";
pub const EMISSION: &str = "emission";
pub const DIFFUSE: &str = "diffuse";
pub const SPECULAR: &str = "specular";
pub const SHININESS: &str = "shininess";
pub const COLOR: &str = "color";
pub const FLOAT: &str = "float";
pub const OPTICS: &str = "optics";
pub const PERSPECTIVE: &str = "perspective";
pub const ORTHOGRAPHIC: &str = "orthographic";
pub const TRANSLATE: &str = "translate";
pub const ROTATE: &str = "rotate";
pub const SCALE: &str = "scale";
pub const SKEW: &str = "skew";
pub const MATRIX: &str = "matrix";
pub const LOOKAT: &str = "lookat";
pub const LIBRARY_ANIMATIONS: &str = "library_animations";
pub const ANIMATION: &str = "animation";
pub const SAMPLER: &str = "sampler";
pub const CHANNEL: &str = "channel";

// Attributes
pub const ID: &str = "id";
pub const SID: &str = "sid";
pub const NAME: &str = "name";
pub const URL: &str = "url";
pub const TARGET: &str = "target";
pub const COUNT: &str = "count";
pub const OFFSET: &str = "offset";
pub const STRIDE: &str = "stride";
pub const SET: &str = "set";
pub const SEMANTIC: &str = "semantic";
pub const SYMBOL: &str = "symbol";
pub const METER: &str = "meter";

// up_axis values
pub const X_UP: &str = "X_UP";
pub const Y_UP: &str = "Y_UP";
pub const Z_UP: &str = "Z_UP";

// Input semantics
pub const SEM_VERTEX: &str = "VERTEX";
pub const SEM_POSITION: &str = "POSITION";
pub const SEM_NORMAL: &str = "NORMAL";
pub const SEM_TEXCOORD: &str = "TEXCOORD";
pub const SEM_INPUT: &str = "INPUT";
pub const SEM_OUTPUT: &str = "OUTPUT";
pub const SEM_INTERPOLATION: &str = "INTERPOLATION";
