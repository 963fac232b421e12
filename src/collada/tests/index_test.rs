//! Index-stream parsing and expansion straight from primitive XML.

use xmltree::Element;

use crate::collada::index::{index_streams, Vcount};
use crate::collada::input::{self, channel_count};
use crate::dom;

fn parse(xml: &str) -> Element {
    Element::parse(xml.as_bytes()).unwrap()
}

#[test]
fn test_two_channel_triangles() {
    let triangles = parse(
        "<triangles count=\"2\">\
           <input semantic=\"VERTEX\" source=\"#v\" offset=\"0\"/>\
           <input semantic=\"NORMAL\" source=\"#n\" offset=\"1\"/>\
           <p>0 0 1 0 2 1 0 0 2 1 3 1</p>\
         </triangles>",
    );
    let inputs = input::inputs(&triangles);
    let ch = channel_count(&inputs);
    assert_eq!(ch, 2);

    let streams = index_streams(&triangles).unwrap();
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].triangles(2, 0, ch).unwrap(), vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(
        streams[0].triangle_faces(2, 1, ch).unwrap(),
        vec![0, 0, 1, -1, 0, 1, 1, -1]
    );
}

#[test]
fn test_sparse_offsets_widen_the_stride() {
    let triangles = parse(
        "<triangles count=\"1\">\
           <input semantic=\"VERTEX\" source=\"#v\" offset=\"0\"/>\
           <input semantic=\"TEXCOORD\" source=\"#t\" offset=\"2\"/>\
           <p>0 9 5 1 9 6 2 9 7</p>\
         </triangles>",
    );
    let inputs = input::inputs(&triangles);
    let ch = channel_count(&inputs);
    assert_eq!(ch, 3);

    let streams = index_streams(&triangles).unwrap();
    assert_eq!(streams[0].triangles(1, 0, ch).unwrap(), vec![0, 1, 2]);
    assert_eq!(streams[0].triangles(1, 2, ch).unwrap(), vec![5, 6, 7]);
}

#[test]
fn test_multiple_p_elements_stay_separate() {
    let polygons = parse(
        "<polygons count=\"2\">\
           <input semantic=\"VERTEX\" source=\"#v\" offset=\"0\"/>\
           <p>0 1 2 3</p>\
           <p>4 5 6</p>\
         </polygons>",
    );
    let streams = index_streams(&polygons).unwrap();
    assert_eq!(streams.len(), 2);
    let faces: Vec<i32> = streams.iter().flat_map(|p| p.face(0, 1).unwrap()).collect();
    assert_eq!(faces, vec![0, 1, 2, 3, -1, 4, 5, 6, -1]);
}

#[test]
fn test_polylist_vcount_walk() {
    let polylist = parse(
        "<polylist count=\"2\">\
           <input semantic=\"VERTEX\" source=\"#v\" offset=\"0\"/>\
           <vcount>4 3</vcount>\
           <p>0 1 2 3 4 5 6</p>\
         </polylist>",
    );
    let vcount = Vcount::parse(dom::find_child(&polylist, "vcount").unwrap()).unwrap();
    assert_eq!(vcount.polygon_count(), 2);
    assert_eq!(vcount.total_vertices(), 7);

    let streams = index_streams(&polylist).unwrap();
    assert_eq!(
        streams[0].polylist_faces(&vcount, 0, 1).unwrap(),
        vec![0, 1, 2, 3, -1, 4, 5, 6, -1]
    );
}

#[test]
fn test_fan_and_strip_from_xml() {
    let trifans = parse(
        "<trifans count=\"1\">\
           <input semantic=\"VERTEX\" source=\"#v\" offset=\"0\"/>\
           <p>0 1 2 3 4</p>\
         </trifans>",
    );
    let streams = index_streams(&trifans).unwrap();
    // 5-vertex fan: 3 triangles, 12 tokens.
    let faces = streams[0].fan_faces(0, 1).unwrap();
    assert_eq!(faces.len(), 12);
    assert_eq!(faces, vec![0, 1, 2, -1, 0, 2, 3, -1, 0, 3, 4, -1]);
    // Shared-index fan layout: the stream itself plus a terminator.
    assert_eq!(streams[0].face(0, 1).unwrap(), vec![0, 1, 2, 3, 4, -1]);
}
