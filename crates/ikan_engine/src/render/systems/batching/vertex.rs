//! Vertex records and the static index pattern of the batch renderer

use bytemuck::{Pod, Zeroable};

use crate::render::api::{BufferElement, BufferLayout, ShaderDataType};

/// Vertices emitted per quad or circle
pub const VERTICES_PER_QUAD: u32 = 4;

/// Indices consumed per quad or circle (two triangles)
pub const INDICES_PER_QUAD: u32 = 6;

/// Unit quad corners, counter-clockwise from bottom-left
pub const QUAD_CORNERS: [[f32; 2]; 4] = [[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]];

/// Texture coordinates matching [`QUAD_CORNERS`]
pub const QUAD_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Index order for one quad, offset by 4 per quad
const QUAD_INDEX_PATTERN: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Quad vertex as uploaded to the GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// World-space position
    pub position: [f32; 3],
    /// RGBA color or tint
    pub color: [f32; 4],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
    /// Texture slot, an integer stored as float
    pub tex_index: f32,
    /// Texture coordinate multiplier
    pub tiling_factor: f32,
    /// Picking identifier
    pub object_id: i32,
}

impl QuadVertex {
    /// Layout matching the quad shader's inputs
    pub fn layout() -> BufferLayout {
        BufferLayout::new(vec![
            BufferElement::new(ShaderDataType::Float3, "a_Position"),
            BufferElement::new(ShaderDataType::Float4, "a_Color"),
            BufferElement::new(ShaderDataType::Float2, "a_TexCoord"),
            BufferElement::new(ShaderDataType::Float, "a_TexIndex"),
            BufferElement::new(ShaderDataType::Float, "a_TilingFactor"),
            BufferElement::new(ShaderDataType::Int, "a_ObjectID"),
        ])
    }
}

/// Circle vertex as uploaded to the GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct CircleVertex {
    /// World-space position
    pub position: [f32; 3],
    /// Unit quad corner scaled by 2, spans [-1, 1] for the radius test
    pub local_position: [f32; 2],
    /// RGBA color or tint
    pub color: [f32; 4],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
    /// Texture slot, an integer stored as float
    pub tex_index: f32,
    /// Texture coordinate multiplier
    pub tiling_factor: f32,
    /// Ring thickness, 1.0 is a filled disc
    pub thickness: f32,
    /// Edge falloff width
    pub fade: f32,
    /// Picking identifier
    pub object_id: i32,
}

impl CircleVertex {
    /// Layout matching the circle shader's inputs
    pub fn layout() -> BufferLayout {
        BufferLayout::new(vec![
            BufferElement::new(ShaderDataType::Float3, "a_Position"),
            BufferElement::new(ShaderDataType::Float2, "a_LocalPosition"),
            BufferElement::new(ShaderDataType::Float4, "a_Color"),
            BufferElement::new(ShaderDataType::Float2, "a_TexCoord"),
            BufferElement::new(ShaderDataType::Float, "a_TexIndex"),
            BufferElement::new(ShaderDataType::Float, "a_TilingFactor"),
            BufferElement::new(ShaderDataType::Float, "a_Thickness"),
            BufferElement::new(ShaderDataType::Float, "a_Fade"),
            BufferElement::new(ShaderDataType::Int, "a_ObjectID"),
        ])
    }
}

/// Index list for `quad_count` quads: `0,1,2,2,3,0` repeated with +4 per quad
pub fn quad_indices(quad_count: u32) -> Vec<u32> {
    (0..quad_count)
        .flat_map(|quad| QUAD_INDEX_PATTERN.map(|index| quad * VERTICES_PER_QUAD + index))
        .collect()
}
