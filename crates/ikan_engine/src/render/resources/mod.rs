//! GPU resource wrappers
//!
//! Thin owning wrappers around backend objects. Every wrapper allocates its
//! handle up front and queues creation, updates and destruction on the
//! [`RenderContext`](crate::render::command_queue::RenderContext).

pub mod buffer;
pub mod framebuffer;
pub mod materials;
pub mod shader;
pub mod texture;

pub use buffer::{IndexBuffer, VertexBuffer};
pub use framebuffer::Framebuffer;
pub use materials::{Material, MaterialInstance};
pub use shader::{Shader, ShaderReflection, ShaderResourceType, ShaderUniformDeclaration};
pub use texture::{SubTexture2D, Texture2D};
