//! `<p>` index streams and their expansion into output index arrays.
//!
//! A `<p>` stream interleaves one index per channel per vertex. Every
//! expansion walks one channel (`offset`) at the channel-count stride and
//! lays the picked indices out in the shape the output node needs, appending
//! `-1` face terminators where the target field is face-delimited.

use xmltree::Element;

use crate::dom;

use super::codec;
use super::error::ColladaError;
use super::strings as s;

/// One tokenized, parsed `<p>` element.
#[derive(Debug)]
pub struct IndexStream {
    indices: Vec<i32>,
}

impl IndexStream {
    /// Parse a `<p>` element's text into indices.
    pub fn parse(element: &Element) -> Result<Self, ColladaError> {
        let text = dom::element_text(element);
        let indices = codec::to_i32(&codec::split(&text))?;
        Ok(IndexStream { indices })
    }

    /// Build a stream directly from indices.
    pub fn from_indices(indices: Vec<i32>) -> Self {
        IndexStream { indices }
    }

    /// Total token count of the stream.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when the stream holds no indices.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of vertices in the stream for a given channel count.
    pub fn vertex_count(&self, channels: usize) -> usize {
        if channels == 0 {
            return 0;
        }
        debug_assert!(self.indices.len() % channels == 0);
        self.indices.len() / channels
    }

    fn pick(&self, vertex: usize, offset: usize, channels: usize) -> i32 {
        self.indices[vertex * channels + offset]
    }

    /// Check that `vertices` vertices can be read at the given offset and
    /// stride. A declared primitive count that overruns the stream is a
    /// structural error, caught at the per-primitive boundary.
    fn ensure(&self, vertices: usize, offset: usize, channels: usize) -> Result<(), ColladaError> {
        if vertices == 0 {
            return Ok(());
        }
        if offset >= channels || vertices * channels > self.indices.len() {
            return Err(ColladaError::Structural(format!(
                "index stream holds {} tokens, needs {} ({} vertices at {} channels)",
                self.indices.len(),
                vertices * channels,
                vertices,
                channels
            )));
        }
        Ok(())
    }

    /// Indices of `count` triangles, 3 per triangle, no terminators.
    pub fn triangles(
        &self,
        count: usize,
        offset: usize,
        channels: usize,
    ) -> Result<Vec<i32>, ColladaError> {
        self.ensure(count * 3, offset, channels)?;
        let mut out = Vec::with_capacity(count * 3);
        for vertex in 0..count * 3 {
            out.push(self.pick(vertex, offset, channels));
        }
        Ok(out)
    }

    /// Indices of `count` triangles as faces: 3 indices plus `-1` each.
    pub fn triangle_faces(
        &self,
        count: usize,
        offset: usize,
        channels: usize,
    ) -> Result<Vec<i32>, ColladaError> {
        self.ensure(count * 3, offset, channels)?;
        let mut out = Vec::with_capacity(count * 4);
        for triangle in 0..count {
            for corner in 0..3 {
                out.push(self.pick(triangle * 3 + corner, offset, channels));
            }
            out.push(-1);
        }
        Ok(out)
    }

    /// One triangle fan as faces: the first vertex is the shared center, so
    /// an `L`-vertex fan yields `L - 2` terminated triangles.
    pub fn fan_faces(&self, offset: usize, channels: usize) -> Result<Vec<i32>, ColladaError> {
        let vertices = self.vertex_count(channels);
        if vertices < 3 {
            return Ok(Vec::new());
        }
        self.ensure(vertices, offset, channels)?;
        let mut out = Vec::with_capacity((vertices - 2) * 4);
        let center = self.pick(0, offset, channels);
        for i in 1..vertices - 1 {
            out.push(center);
            out.push(self.pick(i, offset, channels));
            out.push(self.pick(i + 1, offset, channels));
            out.push(-1);
        }
        Ok(out)
    }

    /// One triangle strip as faces. Odd triangles swap their first two
    /// indices to keep a consistent winding.
    pub fn strip_faces(&self, offset: usize, channels: usize) -> Result<Vec<i32>, ColladaError> {
        let vertices = self.vertex_count(channels);
        if vertices < 3 {
            return Ok(Vec::new());
        }
        self.ensure(vertices, offset, channels)?;
        let mut out = Vec::with_capacity((vertices - 2) * 4);
        for i in 0..vertices - 2 {
            let (a, b) = if i % 2 == 0 { (i, i + 1) } else { (i + 1, i) };
            out.push(self.pick(a, offset, channels));
            out.push(self.pick(b, offset, channels));
            out.push(self.pick(i + 2, offset, channels));
            out.push(-1);
        }
        Ok(out)
    }

    /// Polylist polygons as faces: `vcount[i]` indices plus `-1` per polygon.
    pub fn polylist_faces(
        &self,
        vcount: &Vcount,
        offset: usize,
        channels: usize,
    ) -> Result<Vec<i32>, ColladaError> {
        self.ensure(vcount.total_vertices(), offset, channels)?;
        let mut out = Vec::with_capacity(vcount.total_vertices() + vcount.polygon_count());
        let mut vertex = 0;
        for &count in &vcount.counts {
            for _ in 0..count {
                out.push(self.pick(vertex, offset, channels));
                vertex += 1;
            }
            out.push(-1);
        }
        Ok(out)
    }

    /// The whole stream as one face: every vertex's index plus a single
    /// trailing `-1`. Shape of a `<polygons>` polygon, a shared-index
    /// fan/strip, or a linestrip chain.
    pub fn face(&self, offset: usize, channels: usize) -> Result<Vec<i32>, ColladaError> {
        let vertices = self.vertex_count(channels);
        self.ensure(vertices, offset, channels)?;
        let mut out = Vec::with_capacity(vertices + 1);
        for vertex in 0..vertices {
            out.push(self.pick(vertex, offset, channels));
        }
        out.push(-1);
        Ok(out)
    }

    /// Indices of `count` line segments: 2 indices plus `-1` each.
    pub fn lines(
        &self,
        count: usize,
        offset: usize,
        channels: usize,
    ) -> Result<Vec<i32>, ColladaError> {
        self.ensure(count * 2, offset, channels)?;
        let mut out = Vec::with_capacity(count * 3);
        for segment in 0..count {
            out.push(self.pick(segment * 2, offset, channels));
            out.push(self.pick(segment * 2 + 1, offset, channels));
            out.push(-1);
        }
        Ok(out)
    }
}

/// Parsed `<vcount>`: per-polygon vertex counts of a polylist.
#[derive(Debug)]
pub struct Vcount {
    pub counts: Vec<usize>,
}

impl Vcount {
    /// Parse a `<vcount>` element.
    pub fn parse(element: &Element) -> Result<Self, ColladaError> {
        let text = dom::element_text(element);
        let counts = codec::to_i32(&codec::split(&text))?
            .into_iter()
            .map(|c| c.max(0) as usize)
            .collect();
        Ok(Vcount { counts })
    }

    /// Total number of vertices across all polygons.
    pub fn total_vertices(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Number of polygons.
    pub fn polygon_count(&self) -> usize {
        self.counts.len()
    }
}

/// Parse all `<p>` children of a primitive element, in document order.
pub fn index_streams(parent: &Element) -> Result<Vec<IndexStream>, ColladaError> {
    dom::find_children(parent, s::P)
        .into_iter()
        .map(IndexStream::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(indices: &[i32]) -> IndexStream {
        IndexStream::from_indices(indices.to_vec())
    }

    #[test]
    fn triangles_pick_one_channel() {
        // 2 triangles, 2 channels: (vertex, normal) pairs.
        let p = stream(&[0, 0, 1, 0, 2, 1, 0, 1, 2, 1, 3, 1]);
        assert_eq!(p.triangles(2, 0, 2).unwrap(), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(
            p.triangle_faces(2, 1, 2).unwrap(),
            vec![0, 0, 1, -1, 1, 1, 1, -1]
        );
    }

    #[test]
    fn fan_expansion_token_count() {
        // 5-vertex fan, 1 channel: 3 triangles, 12 output tokens.
        let p = stream(&[4, 0, 1, 2, 3]);
        let out = p.fan_faces(0, 1).unwrap();
        assert_eq!(out.len(), 12);
        assert_eq!(out, vec![4, 0, 1, -1, 4, 1, 2, -1, 4, 2, 3, -1]);
    }

    #[test]
    fn strip_alternates_winding() {
        let p = stream(&[0, 1, 2, 3]);
        assert_eq!(
            p.strip_faces(0, 1).unwrap(),
            vec![0, 1, 2, -1, 2, 1, 3, -1]
        );
    }

    #[test]
    fn degenerate_fan_and_strip_are_empty() {
        let p = stream(&[0, 1]);
        assert!(p.fan_faces(0, 1).unwrap().is_empty());
        assert!(p.strip_faces(0, 1).unwrap().is_empty());
    }

    #[test]
    fn polylist_walks_vcount() {
        let p = stream(&[0, 1, 2, 3, 4, 5, 6]);
        let vcount = Vcount {
            counts: vec![3, 4],
        };
        assert_eq!(
            p.polylist_faces(&vcount, 0, 1).unwrap(),
            vec![0, 1, 2, -1, 3, 4, 5, 6, -1]
        );
        assert_eq!(vcount.total_vertices(), 7);
    }

    #[test]
    fn whole_stream_face() {
        let p = stream(&[0, 5, 1, 6, 2, 7]);
        assert_eq!(p.face(0, 2).unwrap(), vec![0, 1, 2, -1]);
        assert_eq!(p.face(1, 2).unwrap(), vec![5, 6, 7, -1]);
    }

    #[test]
    fn line_segments() {
        let p = stream(&[0, 1, 1, 2]);
        assert_eq!(p.lines(2, 0, 1).unwrap(), vec![0, 1, -1, 1, 2, -1]);
    }

    #[test]
    fn zero_count_is_empty() {
        let p = stream(&[]);
        assert!(p.triangles(0, 0, 2).unwrap().is_empty());
        assert!(p.lines(0, 0, 1).unwrap().is_empty());
    }

    #[test]
    fn declared_count_overrun_is_structural() {
        // 6 tokens cannot hold 4 triangles.
        let p = stream(&[0, 1, 2, 0, 2, 3]);
        assert!(matches!(
            p.triangles(4, 0, 1),
            Err(ColladaError::Structural(_))
        ));
        assert!(matches!(
            p.triangle_faces(4, 0, 1),
            Err(ColladaError::Structural(_))
        ));
        assert!(matches!(p.lines(4, 0, 1), Err(ColladaError::Structural(_))));
        let vcount = Vcount {
            counts: vec![4, 4],
        };
        assert!(matches!(
            p.polylist_faces(&vcount, 0, 1),
            Err(ColladaError::Structural(_))
        ));
    }

    #[test]
    fn offset_outside_channels_is_structural() {
        let p = stream(&[0, 1, 2]);
        assert!(matches!(
            p.triangles(1, 1, 1),
            Err(ColladaError::Structural(_))
        ));
    }
}
