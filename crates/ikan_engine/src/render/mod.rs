//! # Rendering System
//!
//! The 2D rendering core of the engine: batch and text renderers on top of a
//! thin GPU resource layer, with all GPU work deferred through a command
//! queue.
//!
//! ## Architecture
//!
//! - **Renderer**: owns the selected backend and the shared [`RenderContext`];
//!   drains deferred work once per frame
//! - **Resources**: RAII wrappers (buffers, textures, shaders, framebuffers,
//!   materials) that queue their own creation and destruction
//! - **Systems**: the batch renderer (quads, circles) and the text renderer
//! - **Backends**: implementations of [`GraphicsBackend`], selected by
//!   [`GraphicsApi`]
//!
//! ## Frame Flow
//!
//! ```rust
//! use ikan_engine::prelude::*;
//!
//! let mut renderer = Renderer::new(RendererConfig::default()).unwrap();
//! let mut batch = BatchRenderer::new(&renderer);
//!
//! batch.begin_batch(&Mat4::identity(), &Mat4::identity());
//! batch.draw_quad(&Mat4::identity(), Vec4::new(1.0, 0.0, 0.0, 1.0), 0);
//! batch.end_batch();
//!
//! renderer.wait_and_render();
//! ```

pub mod api;
pub mod backends;
pub mod command_queue;
pub mod resources;
pub mod statistics;
pub mod systems;


pub use api::{BackendCapabilities, GraphicsApi, GraphicsBackend};
pub use backends::{create_backend, HeadlessBackend};
pub use command_queue::{RenderCommand, RenderCommandQueue, RenderContext};
pub use resources::{
    Framebuffer, IndexBuffer, Material, MaterialInstance, Shader, SubTexture2D, Texture2D, VertexBuffer,
};
pub use statistics::{reset_statistics, statistics, RendererStatistics};
pub use systems::batching::{BatchRenderer, CircleVertex, PrimitiveKind, QuadVertex, SpriteVisual};
pub use systems::text::{FontFace, Glyph, GlyphRasterizer, TextRenderer, TextVertex};

use thiserror::Error;

use crate::config::RendererConfig;

/// Owner of the graphics backend and the deferred command queue
///
/// Everything that touches the GPU is submitted through [`Renderer::context`]
/// and runs when [`Renderer::wait_and_render`] drains the queue.
pub struct Renderer {
    backend: Box<dyn GraphicsBackend>,
    context: RenderContext,
    config: RendererConfig,
    frame_count: u64,
}

impl Renderer {
    /// Create the backend named by the configuration
    pub fn new(config: RendererConfig) -> RenderResult<Self> {
        let backend = create_backend(config.graphics_api)?;
        Ok(Self::with_backend(backend, config))
    }

    /// Use an already constructed backend
    pub fn with_backend(backend: Box<dyn GraphicsBackend>, config: RendererConfig) -> Self {
        log::info!(
            "Renderer initialized: api={:?}, max_texture_units={}",
            backend.api(),
            backend.capabilities().max_texture_units
        );
        Self {
            backend,
            context: RenderContext::new(),
            config,
            frame_count: 0,
        }
    }

    /// Shared context resources and renderers submit through
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Configuration the renderer was created with
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Limits of the active backend
    pub fn capabilities(&self) -> BackendCapabilities {
        self.backend.capabilities()
    }

    /// Queue a command for the next drain
    pub fn submit<F>(&self, command: F)
    where
        F: FnOnce(&mut dyn GraphicsBackend) + 'static,
    {
        self.context.submit(command);
    }

    /// Execute every queued command against the backend
    pub fn wait_and_render(&mut self) {
        log::trace!(
            "Frame {}: executing {} render commands ({} bytes captured)",
            self.frame_count,
            self.context.pending_commands(),
            self.context.pending_bytes()
        );
        self.context.execute(self.backend.as_mut());
        self.frame_count += 1;
    }

    /// Active backend
    pub fn backend(&self) -> &dyn GraphicsBackend {
        self.backend.as_ref()
    }

    /// Active backend, mutable
    pub fn backend_mut(&mut self) -> &mut dyn GraphicsBackend {
        self.backend.as_mut()
    }

    /// Downcast the backend to its concrete type
    pub fn backend_as<T: 'static>(&self) -> Option<&T> {
        self.backend.as_any().downcast_ref::<T>()
    }

    /// Number of completed drains
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Errors from loading render resources or selecting a backend
///
/// Only load-time failures are reported this way; misuse of the renderer
/// (unknown uniforms, overruns, unknown handles) panics.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested graphics API has no backend
    #[error("Graphics API {0:?} is not supported")]
    UnsupportedApi(GraphicsApi),

    /// A resource file could not be read
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A texture file could not be opened or decoded
    #[error("Failed to load texture '{path}': {source}")]
    TextureLoad {
        /// File path
        path: String,
        /// Decoder error
        source: image::ImageError,
    },

    /// Font data could not be parsed
    #[error("Failed to parse font: {0}")]
    FontParse(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
