//! Vertex buffer layouts
//!
//! A [`BufferLayout`] describes how one vertex record is packed: elements are
//! laid out back to back in declaration order, each element's offset is the
//! running sum of the sizes before it, and the stride is the total.

use serde::{Deserialize, Serialize};

/// Data types that can appear in a vertex attribute or a uniform declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderDataType {
    /// 32-bit float
    Float,
    /// Two 32-bit floats
    Float2,
    /// Three 32-bit floats
    Float3,
    /// Four 32-bit floats
    Float4,
    /// 3x3 float matrix
    Mat3,
    /// 4x4 float matrix
    Mat4,
    /// 32-bit signed integer
    Int,
    /// Two 32-bit signed integers
    Int2,
    /// Three 32-bit signed integers
    Int3,
    /// Four 32-bit signed integers
    Int4,
    /// Boolean, stored as a 32-bit integer
    Bool,
}

impl ShaderDataType {
    /// Size of one value of this type in bytes
    pub const fn size(self) -> u32 {
        match self {
            Self::Float | Self::Int | Self::Bool => 4,
            Self::Float2 | Self::Int2 => 8,
            Self::Float3 | Self::Int3 => 12,
            Self::Float4 | Self::Int4 => 16,
            Self::Mat3 => 4 * 3 * 3,
            Self::Mat4 => 4 * 4 * 4,
        }
    }

    /// Number of scalar components (matrices count one column per attribute slot)
    pub const fn component_count(self) -> u32 {
        match self {
            Self::Float | Self::Int | Self::Bool => 1,
            Self::Float2 | Self::Int2 => 2,
            Self::Float3 | Self::Int3 | Self::Mat3 => 3,
            Self::Float4 | Self::Int4 | Self::Mat4 => 4,
        }
    }

    /// Whether the attribute must be bound as an integer attribute
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int | Self::Int2 | Self::Int3 | Self::Int4 | Self::Bool)
    }

    /// Map a GLSL type name to a data type
    pub fn from_glsl(name: &str) -> Option<Self> {
        Some(match name {
            "float" => Self::Float,
            "vec2" => Self::Float2,
            "vec3" => Self::Float3,
            "vec4" => Self::Float4,
            "mat3" => Self::Mat3,
            "mat4" => Self::Mat4,
            "int" => Self::Int,
            "ivec2" => Self::Int2,
            "ivec3" => Self::Int3,
            "ivec4" => Self::Int4,
            "bool" => Self::Bool,
            _ => return None,
        })
    }
}

/// One attribute inside a vertex record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferElement {
    /// Attribute name as written in the vertex shader
    pub name: String,
    /// Attribute type
    pub ty: ShaderDataType,
    /// Size in bytes
    pub size: u32,
    /// Byte offset from the start of the vertex
    pub offset: u32,
    /// Whether integer data is normalized to [0, 1] when read as float
    pub normalized: bool,
}

impl BufferElement {
    /// Create an element; the offset is filled in by [`BufferLayout::new`]
    pub fn new(ty: ShaderDataType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            size: ty.size(),
            offset: 0,
            normalized: false,
        }
    }

    /// Mark the element as normalized
    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }
}

/// Packed description of a vertex record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: u32,
}

impl BufferLayout {
    /// Build a layout, assigning offsets in declaration order
    pub fn new(mut elements: Vec<BufferElement>) -> Self {
        let mut offset = 0;
        for element in &mut elements {
            element.offset = offset;
            offset += element.size;
        }
        Self {
            elements,
            stride: offset,
        }
    }

    /// Elements in declaration order
    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    /// Size of one vertex in bytes
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Look up an element by attribute name
    pub fn element(&self, name: &str) -> Option<&BufferElement> {
        self.elements.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_follow_declaration_order() {
        let layout = BufferLayout::new(vec![
            BufferElement::new(ShaderDataType::Float3, "a_Position"),
            BufferElement::new(ShaderDataType::Float4, "a_Color"),
            BufferElement::new(ShaderDataType::Float2, "a_TexCoord"),
            BufferElement::new(ShaderDataType::Int, "a_ObjectID"),
        ]);

        let offsets: Vec<u32> = layout.elements().iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0, 12, 28, 36]);
        assert_eq!(layout.stride(), 40);
        assert!(layout.element("a_ObjectID").unwrap().ty.is_integer());
    }

    #[test]
    fn test_empty_layout_has_zero_stride() {
        let layout = BufferLayout::new(Vec::new());
        assert_eq!(layout.stride(), 0);
        assert!(layout.elements().is_empty());
    }

    #[test]
    fn test_glsl_type_names() {
        assert_eq!(ShaderDataType::from_glsl("mat4"), Some(ShaderDataType::Mat4));
        assert_eq!(ShaderDataType::from_glsl("ivec3").map(ShaderDataType::size), Some(12));
        assert_eq!(ShaderDataType::from_glsl("sampler2D"), None);
    }
}
