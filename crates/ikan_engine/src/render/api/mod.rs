//! Rendering API definitions
//!
//! Backend-agnostic types shared by the renderers and every backend.

pub mod render_backend;
pub mod vertex_layout;

pub use render_backend::*;
pub use vertex_layout::{BufferElement, BufferLayout, ShaderDataType};
