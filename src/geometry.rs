//! Procedural geometry: vertex format, index buffers and primitive generators.
//!
//! All generated geometry is CPU-side [`GeometryData`]; upload happens in
//! [`Geometry::new`](crate::Geometry::new).
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//!
//! Stride is 24 bytes.
//!
//! # Index Width
//!
//! Index buffers are 16-bit unless they hold more than 65535 indices, in which
//! case they are 32-bit. See [`Indices::from_u32`].

use glam::Vec3;

/// Largest index count still stored as 16-bit.
pub const MAX_U16_INDEX_COUNT: usize = 65535;

/// Interleaved position + normal vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    /// Vertex buffer layout matching the default shaders' `VertexInput`.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: Self::STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// An index buffer in the narrowest format that fits it.
#[derive(Clone, Debug, PartialEq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    /// Picks 16-bit storage when `indices.len() <= 65535`, 32-bit otherwise.
    ///
    /// The decision is made on the number of indices, not on their values: in
    /// a 16-bit buffer any value above `u16::MAX` is truncated, and a warning
    /// is logged.
    pub fn from_u32(indices: Vec<u32>) -> Self {
        if indices.len() > MAX_U16_INDEX_COUNT {
            return Indices::U32(indices);
        }

        if let Some(max) = indices.iter().copied().max().filter(|&m| m > u16::MAX as u32) {
            log::warn!(
                "{} indices stored as 16-bit but index {} exceeds {}; values will wrap",
                indices.len(),
                max,
                u16::MAX
            );
        }
        Indices::U16(indices.into_iter().map(|i| i as u16).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Indices::U16(v) => v.len(),
            Indices::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            Indices::U16(_) => wgpu::IndexFormat::Uint16,
            Indices::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U16(v) => bytemuck::cast_slice(v),
            Indices::U32(v) => bytemuck::cast_slice(v),
        }
    }

    /// Index values widened to `u32`.
    pub fn to_u32(&self) -> Vec<u32> {
        match self {
            Indices::U16(v) => v.iter().map(|&i| i as u32).collect(),
            Indices::U32(v) => v.clone(),
        }
    }
}

/// CPU-side mesh data before GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryData {
    pub vertices: Vec<Vertex>,
    pub indices: Indices,
}

impl GeometryData {
    /// Wraps vertices and triangle indices. Index width is chosen by
    /// [`Indices::from_u32`].
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices: Indices::from_u32(indices),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Whether there is anything to draw. Empty geometry is uploaded but
    /// never bound.
    pub fn is_drawable(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    /// Flips every vertex normal, e.g. to view a sphere from inside.
    pub fn invert_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = (-Vec3::from(v.normal)).into();
        }
    }
}

/// Describes the shape a mesh is built from.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryDescriptor {
    Cube {
        size: f32,
        subdivisions: u32,
    },
    Sphere {
        radius: f32,
        lat_bands: u32,
        lon_bands: u32,
    },
    /// Caller-supplied triangles. Index width follows [`Indices::from_u32`],
    /// so at most 65535 indices must not reference vertices past 65535.
    /// Empty data builds a mesh that is never drawn.
    Custom {
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    },
}

impl GeometryDescriptor {
    /// Unit cube with one quad per face.
    pub fn cube() -> Self {
        GeometryDescriptor::Cube {
            size: 1.0,
            subdivisions: 1,
        }
    }

    /// Unit-radius sphere with 30 latitude and 30 longitude bands.
    pub fn sphere() -> Self {
        GeometryDescriptor::Sphere {
            radius: 1.0,
            lat_bands: 30,
            lon_bands: 30,
        }
    }

    /// Generates the vertex and index data for this descriptor.
    pub fn build(&self) -> GeometryData {
        match self {
            GeometryDescriptor::Cube { size, subdivisions } => {
                create_cube_data(*size, *subdivisions)
            }
            GeometryDescriptor::Sphere {
                radius,
                lat_bands,
                lon_bands,
            } => create_sphere_data(*radius, *lat_bands, *lon_bands),
            GeometryDescriptor::Custom { vertices, indices } => {
                GeometryData::new(vertices.clone(), indices.clone())
            }
        }
    }
}

/// Per-face tangent frame; `u × v == normal` for every entry.
struct FaceBasis {
    normal: Vec3,
    u: Vec3,
    v: Vec3,
}

#[rustfmt::skip]
const CUBE_FACES: [FaceBasis; 6] = [
    // front
    FaceBasis { normal: Vec3::new( 0.0,  0.0,  1.0), u: Vec3::new( 1.0, 0.0, 0.0), v: Vec3::new(0.0, 1.0,  0.0) },
    // back
    FaceBasis { normal: Vec3::new( 0.0,  0.0, -1.0), u: Vec3::new(-1.0, 0.0, 0.0), v: Vec3::new(0.0, 1.0,  0.0) },
    // top
    FaceBasis { normal: Vec3::new( 0.0,  1.0,  0.0), u: Vec3::new( 1.0, 0.0, 0.0), v: Vec3::new(0.0, 0.0, -1.0) },
    // bottom
    FaceBasis { normal: Vec3::new( 0.0, -1.0,  0.0), u: Vec3::new( 1.0, 0.0, 0.0), v: Vec3::new(0.0, 0.0,  1.0) },
    // right
    FaceBasis { normal: Vec3::new( 1.0,  0.0,  0.0), u: Vec3::new( 0.0, 0.0, -1.0), v: Vec3::new(0.0, 1.0,  0.0) },
    // left
    FaceBasis { normal: Vec3::new(-1.0,  0.0,  0.0), u: Vec3::new( 0.0, 0.0,  1.0), v: Vec3::new(0.0, 1.0,  0.0) },
];

/// Builds an axis-aligned cube of edge `size` centered at the origin.
///
/// Each face is an independent `(s + 1) × (s + 1)` vertex grid carrying the
/// face normal, so shading is flat and seams are not shared. Every grid cell
/// becomes two triangles wound counter-clockwise when seen from outside the
/// cube. A `subdivisions` of 0 is treated as 1.
pub fn create_cube_data(size: f32, subdivisions: u32) -> GeometryData {
    let subdivisions = subdivisions.max(1);
    let half = size / 2.0;
    let step = size / subdivisions as f32;
    let row = subdivisions + 1;

    let mut vertices = Vec::with_capacity(6 * (row * row) as usize);
    let mut indices = Vec::with_capacity(6 * 6 * (subdivisions * subdivisions) as usize);

    for face in &CUBE_FACES {
        let base = vertices.len() as u32;

        for i in 0..=subdivisions {
            for j in 0..=subdivisions {
                let u = -half + i as f32 * step;
                let v = -half + j as f32 * step;
                let position = face.normal * half + face.u * u + face.v * v;
                vertices.push(Vertex::new(position.into(), face.normal.into()));
            }
        }

        for i in 0..subdivisions {
            for j in 0..subdivisions {
                let a = base + i * row + j;
                let b = a + row;
                let c = b + 1;
                let d = a + 1;

                indices.extend_from_slice(&[a, b, d]);
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    GeometryData::new(vertices, indices)
}

/// Builds a UV sphere of the given radius centered at the origin.
///
/// Produces `(lat_bands + 1) × (lon_bands + 1)` vertices; the seam column is
/// duplicated. Normals are the unit-sphere positions. Zero band counts are
/// treated as 1.
pub fn create_sphere_data(radius: f32, lat_bands: u32, lon_bands: u32) -> GeometryData {
    let lat_bands = lat_bands.max(1);
    let lon_bands = lon_bands.max(1);

    let mut vertices = Vec::with_capacity(((lat_bands + 1) * (lon_bands + 1)) as usize);
    let mut indices = Vec::with_capacity((lat_bands * lon_bands * 6) as usize);

    for lat in 0..=lat_bands {
        let theta = lat as f32 * std::f32::consts::PI / lat_bands as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for lon in 0..=lon_bands {
            let phi = lon as f32 * 2.0 * std::f32::consts::PI / lon_bands as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let normal = Vec3::new(cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);
            vertices.push(Vertex::new((normal * radius).into(), normal.into()));
        }
    }

    for lat in 0..lat_bands {
        for lon in 0..lon_bands {
            let first = lat * (lon_bands + 1) + lon;
            let second = first + lon_bands + 1;

            indices.extend_from_slice(&[first, first + 1, second]);
            indices.extend_from_slice(&[second, first + 1, second + 1]);
        }
    }

    GeometryData::new(vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vertex_stride_is_24_bytes() {
        assert_eq!(Vertex::STRIDE, 24);
        assert_eq!(Vertex::LAYOUT.attributes[1].offset, 12);
    }

    #[test]
    fn cube_counts_and_extent() {
        let cube = create_cube_data(2.0, 1);
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.index_count(), 36);

        for v in &cube.vertices {
            for c in v.position {
                assert!(c.abs() <= 1.0 + 1e-6);
            }
        }

        let (min, max) = cube.bounds();
        assert_relative_eq!(min.x, -1.0);
        assert_relative_eq!(max.y, 1.0);
    }

    #[test]
    fn cube_subdivision_grid() {
        let cube = create_cube_data(1.0, 3);
        assert_eq!(cube.vertex_count(), 6 * 16);
        assert_eq!(cube.index_count(), 6 * 9 * 6);
        assert!(cube.indices.to_u32().iter().all(|&i| (i as usize) < cube.vertex_count()));
    }

    #[test]
    fn cube_faces_are_flat_and_on_surface() {
        let cube = create_cube_data(2.0, 2);
        for face in cube.vertices.chunks(9) {
            let n = Vec3::from(face[0].normal);
            for v in face {
                assert_eq!(Vec3::from(v.normal), n);
                // every vertex lies on the face plane
                assert_relative_eq!(Vec3::from(v.position).dot(n), 1.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn cube_triangles_face_outward() {
        let cube = create_cube_data(1.0, 1);
        let idx = cube.indices.to_u32();
        for tri in idx.chunks(3) {
            let p: Vec<Vec3> = tri
                .iter()
                .map(|&i| Vec3::from(cube.vertices[i as usize].position))
                .collect();
            let n = Vec3::from(cube.vertices[tri[0] as usize].normal);
            let winding = (p[1] - p[0]).cross(p[2] - p[0]).dot(n);
            assert!(winding > 0.0);
        }
    }

    #[test]
    fn cube_zero_subdivisions_clamps_to_one() {
        assert_eq!(create_cube_data(1.0, 0), create_cube_data(1.0, 1));
    }

    #[test]
    fn sphere_counts_and_normals() {
        let sphere = create_sphere_data(1.0, 4, 4);
        assert_eq!(sphere.vertex_count(), 25);
        assert_eq!(sphere.index_count(), 4 * 4 * 6);

        for v in &sphere.vertices {
            let n = Vec3::from(v.normal);
            assert_relative_eq!(n.length(), 1.0, epsilon = 1e-5);
            assert_eq!(Vec3::from(v.position), n);
        }
    }

    #[test]
    fn sphere_triangles_face_outward() {
        let sphere = create_sphere_data(1.0, 8, 8);
        let idx = sphere.indices.to_u32();
        for tri in idx.chunks(3) {
            let p: Vec<Vec3> = tri
                .iter()
                .map(|&i| Vec3::from(sphere.vertices[i as usize].position))
                .collect();
            let face = (p[1] - p[0]).cross(p[2] - p[0]);
            // pole triangles collapse to a line
            if face.length() < 1e-6 {
                continue;
            }
            let centroid = (p[0] + p[1] + p[2]) / 3.0;
            assert!(face.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn sphere_positions_scale_with_radius() {
        let sphere = create_sphere_data(2.5, 6, 8);
        for v in &sphere.vertices {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            assert_relative_eq!(p.x, n.x * 2.5, epsilon = 1e-6);
            assert_relative_eq!(p.length(), 2.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn index_width_boundary() {
        let at_limit = Indices::from_u32(vec![0; 65535]);
        assert_eq!(at_limit.format(), wgpu::IndexFormat::Uint16);
        assert_eq!(at_limit.as_bytes().len(), 65535 * 2);

        let over_limit = Indices::from_u32(vec![0; 65536]);
        assert_eq!(over_limit.format(), wgpu::IndexFormat::Uint32);
        assert_eq!(over_limit.as_bytes().len(), 65536 * 4);
    }

    #[test]
    fn short_index_list_truncates_large_values() {
        let indices = Indices::from_u32(vec![0, 1, 70_000]);
        assert_eq!(indices, Indices::U16(vec![0, 1, (70_000u32 & 0xffff) as u16]));
    }

    #[test]
    fn empty_custom_geometry_is_not_drawable() {
        let empty = GeometryDescriptor::Custom {
            vertices: vec![],
            indices: vec![],
        }
        .build();
        assert!(!empty.is_drawable());
        assert_eq!(empty.indices.as_bytes().len(), 0);

        let no_indices = GeometryData::new(vec![Vertex::new([0.0; 3], [0.0, 0.0, 1.0])], vec![]);
        assert!(!no_indices.is_drawable());

        assert!(create_cube_data(1.0, 1).is_drawable());
    }

    #[test]
    fn large_sphere_switches_to_u32() {
        // 120 * 100 * 6 = 72000 indices
        let sphere = create_sphere_data(1.0, 120, 100);
        assert_eq!(sphere.indices.format(), wgpu::IndexFormat::Uint32);
        assert_eq!(sphere.index_count(), 72000);
    }

    #[test]
    fn descriptor_resolves_custom_geometry() {
        let vertices = vec![
            Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            Vertex::new([-1.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
            Vertex::new([1.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
        ];
        let data = GeometryDescriptor::Custom {
            vertices: vertices.clone(),
            indices: vec![0, 1, 2],
        }
        .build();
        assert_eq!(data.vertices, vertices);
        assert_eq!(data.indices, Indices::U16(vec![0, 1, 2]));

        assert_eq!(GeometryDescriptor::sphere().build().vertex_count(), 31 * 31);
    }

    #[test]
    fn invert_normals_flips_every_normal() {
        let mut sphere = create_sphere_data(1.0, 3, 3);
        let before = sphere.clone();
        sphere.invert_normals();
        for (a, b) in sphere.vertices.iter().zip(&before.vertices) {
            assert_eq!(Vec3::from(a.normal), -Vec3::from(b.normal));
            assert_eq!(a.position, b.position);
        }
    }
}
