//! # iKan Engine
//!
//! The rendering core of the iKan engine: a 2D batch renderer for quads and
//! circles, a per-glyph text renderer, a material layer resolving named
//! uniforms through shader reflection, and a deferred command queue that
//! lets resources be created and destroyed from anywhere while all GPU work
//! runs at one drain point per frame.
//!
//! ## Features
//!
//! - **Batching**: quads and circles packed into vertex arenas, flushed as
//!   one indexed draw per kind, with automatic batch boundaries on arena or
//!   texture slot exhaustion
//! - **Texture Slots**: per-batch slot cache keyed by texture identity, slot 0
//!   reserved for a white texture
//! - **Object Picking**: every vertex carries an integer object ID written to
//!   an integer framebuffer attachment
//! - **Backends**: selected at runtime behind the `GraphicsBackend` trait; the
//!   headless backend runs without a window
//!
//! ## Quick Start
//!
//! ```rust
//! use ikan_engine::prelude::*;
//!
//! fn main() -> Result<(), RenderError> {
//!     let mut renderer = Renderer::new(RendererConfig::default())?;
//!     let mut batch = BatchRenderer::new(&renderer);
//!
//!     let camera = Mat4::orthographic(-8.0, 8.0, -4.5, 4.5, -1.0, 1.0);
//!     batch.begin_batch(&camera, &Mat4::identity());
//!     batch.draw_quad(&Mat4::identity(), Vec4::new(0.8, 0.2, 0.3, 1.0), 1);
//!     batch.draw_circle(&Mat4::new_scaling(2.0), Vec4::new(0.2, 0.3, 0.8, 1.0), 1.0, 0.005, 2);
//!     batch.end_batch();
//!
//!     renderer.wait_and_render();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, RendererConfig},
        foundation::math::{Mat4, Mat4Ext, Transform, Vec2, Vec3, Vec4},
        render::{
            reset_statistics, statistics, BatchRenderer, Framebuffer, GraphicsApi, Material, MaterialInstance,
            RenderError, RenderResult, Renderer, RendererStatistics, Shader, SpriteVisual, SubTexture2D,
            TextRenderer, Texture2D,
        },
    };
}
