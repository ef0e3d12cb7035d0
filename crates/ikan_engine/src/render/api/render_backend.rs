//! Backend abstraction traits for the rendering system
//!
//! This module defines the thin hardware-API seam the batch renderer talks
//! to. Backends receive already-allocated handles, so resource creation can
//! be deferred through the command queue while callers keep using the handle.

use serde::{Deserialize, Serialize};

use super::vertex_layout::BufferLayout;

/// Graphics API a backend implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphicsApi {
    /// No graphics API; rejected when creating a backend
    None,
    /// In-memory backend that records GPU work without a device
    Headless,
}

/// Handle to a GPU buffer (vertex, index or uniform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

/// Handle to a compiled shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderHandle(pub u64);

/// Handle to a framebuffer and its attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferHandle(pub u64);

bitflags::bitflags! {
    /// How a buffer is used by the pipeline
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Bound as a vertex stream
        const VERTEX = 1 << 0;
        /// Bound as an index stream
        const INDEX = 1 << 1;
        /// Bound as a uniform block
        const UNIFORM = 1 << 2;
        /// Rewritten frequently (every batch)
        const DYNAMIC = 1 << 3;
    }
}

/// Parameters for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDescriptor {
    /// Debug label
    pub label: String,
    /// Allocation size in bytes
    pub size: usize,
    /// Usage flags
    pub usage: BufferUsage,
    /// Vertex layout, present for vertex buffers
    pub layout: Option<BufferLayout>,
}

/// Pixel formats understood by the backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA
    Rgba8,
    /// 8-bit single channel (glyph coverage)
    R8,
}

impl TextureFormat {
    /// Bytes used by one pixel
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::R8 => 1,
        }
    }
}

/// Texture filtering modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest neighbor filtering
    Nearest,
    /// Linear filtering
    Linear,
}

/// Parameters for creating a texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Filtering mode
    pub filter: FilterMode,
}

impl TextureDescriptor {
    /// Size of the full pixel data in bytes
    pub fn data_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

/// Shader stage a uniform or source section belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderDomain {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
    /// Geometry stage
    Geometry,
}

impl ShaderDomain {
    /// All stages in pipeline order
    pub const ALL: [Self; 3] = [Self::Vertex, Self::Fragment, Self::Geometry];

    /// Dense index for per-domain arrays
    pub const fn index(self) -> usize {
        match self {
            Self::Vertex => 0,
            Self::Fragment => 1,
            Self::Geometry => 2,
        }
    }
}

/// Source text for one shader stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderStageSource {
    /// Stage the source compiles to
    pub domain: ShaderDomain,
    /// GLSL source text
    pub source: String,
}

/// Formats a framebuffer attachment can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTextureFormat {
    /// Color attachment, 8-bit RGBA
    Rgba8,
    /// Integer attachment used for object-ID picking
    RedInteger,
    /// Combined depth/stencil attachment
    Depth24Stencil8,
}

impl FramebufferTextureFormat {
    /// Whether this is a depth attachment
    pub const fn is_depth(self) -> bool {
        matches!(self, Self::Depth24Stencil8)
    }
}

/// Size and attachments of a framebuffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferSpecification {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Attachments in binding order
    pub attachments: Vec<FramebufferTextureFormat>,
    /// MSAA sample count
    pub samples: u32,
}

impl Default for FramebufferSpecification {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            attachments: vec![
                FramebufferTextureFormat::Rgba8,
                FramebufferTextureFormat::RedInteger,
                FramebufferTextureFormat::Depth24Stencil8,
            ],
            samples: 1,
        }
    }
}

/// Limits reported by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    /// Number of texture units a single draw can sample from
    pub max_texture_units: u32,
}

/// Main rendering backend trait
///
/// Every method is a direct, blocking call made from the thread that owns the
/// graphics context, normally while the command queue is being drained.
/// Passing a handle the backend does not know is a programming error and
/// backends are expected to panic on it.
pub trait GraphicsBackend {
    /// API this backend implements
    fn api(&self) -> GraphicsApi;

    /// Hardware limits
    fn capabilities(&self) -> BackendCapabilities;

    /// Allocate a buffer, optionally with initial contents
    fn create_buffer(&mut self, handle: BufferHandle, descriptor: &BufferDescriptor, contents: Option<&[u8]>);

    /// Upload bytes at `offset` into an existing buffer
    fn write_buffer(&mut self, handle: BufferHandle, offset: usize, data: &[u8]);

    /// Release a buffer
    fn destroy_buffer(&mut self, handle: BufferHandle);

    /// Allocate a texture, optionally with initial pixels
    fn create_texture(&mut self, handle: TextureHandle, descriptor: &TextureDescriptor, pixels: Option<&[u8]>);

    /// Replace the full pixel data of a texture
    fn write_texture(&mut self, handle: TextureHandle, pixels: &[u8]);

    /// Bind a texture to a texture unit for the next draw
    fn bind_texture(&mut self, handle: TextureHandle, unit: u32);

    /// Release a texture
    fn destroy_texture(&mut self, handle: TextureHandle);

    /// Compile and link a shader program
    fn create_shader(&mut self, handle: ShaderHandle, name: &str, stages: &[ShaderStageSource]);

    /// Make a shader program current
    fn bind_shader(&mut self, handle: ShaderHandle);

    /// Push the whole uniform block of one stage
    fn upload_uniform_block(&mut self, handle: ShaderHandle, domain: ShaderDomain, data: &[u8]);

    /// Release a shader program
    fn destroy_shader(&mut self, handle: ShaderHandle);

    /// Draw indexed triangles with the current shader and textures
    fn draw_indexed(&mut self, vertex_buffer: BufferHandle, index_buffer: BufferHandle, index_count: u32);

    /// Draw non-indexed triangles with the current shader and textures
    fn draw_arrays(&mut self, vertex_buffer: BufferHandle, vertex_count: u32);

    /// Allocate a framebuffer and its attachments
    fn create_framebuffer(&mut self, handle: FramebufferHandle, specification: &FramebufferSpecification);

    /// Bind a framebuffer as render target, `None` selects the default target
    fn bind_framebuffer(&mut self, handle: Option<FramebufferHandle>);

    /// Fill one attachment with a value
    fn clear_attachment(&mut self, handle: FramebufferHandle, attachment: usize, value: i32);

    /// Read back one pixel of an attachment
    fn read_pixel(&self, handle: FramebufferHandle, attachment: usize, x: u32, y: u32) -> i32;

    /// Release a framebuffer
    fn destroy_framebuffer(&mut self, handle: FramebufferHandle);

    /// Downcast to concrete backend type for inspection
    fn as_any(&self) -> &dyn std::any::Any;

    /// Downcast to mutable concrete backend type for inspection
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
