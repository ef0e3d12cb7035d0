//! Text renderer
//!
//! Every ASCII glyph lives in its own single-channel texture. Strings are
//! drawn one glyph at a time: six vertices, the glyph texture at unit 0 and
//! one non-indexed draw per character.
//!
//! The anchor transform is decomposed into position, rotation and scale;
//! only position and scale reach the glyph quads, rotation is dropped.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Mat4, Transform, Vec2, Vec3, Vec4};
use crate::render::api::{BufferElement, BufferLayout, ShaderDataType, TextureFormat};
use crate::render::command_queue::RenderContext;
use crate::render::resources::{Material, Shader, Texture2D, VertexBuffer};
use crate::render::statistics;
use crate::render::{RenderResult, Renderer};

use super::font::{FontFace, GlyphRasterizer, RasterizedGlyph};

const TEXT_SHADER: &str = include_str!("../../shaders/text.glsl");

/// Glyphs loaded per font, the ASCII range
pub const GLYPH_RANGE: std::ops::Range<u8> = 0..128;

const VERTICES_PER_GLYPH: usize = 6;

/// Glyph vertex as uploaded to the GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct TextVertex {
    /// World-space position
    pub position: [f32; 3],
    /// RGBA color
    pub color: [f32; 4],
    /// Texture coordinate inside the glyph texture
    pub tex_coord: [f32; 2],
    /// Picking identifier
    pub object_id: i32,
}

impl TextVertex {
    /// Layout matching the text shader's inputs
    pub fn layout() -> BufferLayout {
        BufferLayout::new(vec![
            BufferElement::new(ShaderDataType::Float3, "a_Position"),
            BufferElement::new(ShaderDataType::Float4, "a_Color"),
            BufferElement::new(ShaderDataType::Float2, "a_TexCoord"),
            BufferElement::new(ShaderDataType::Int, "a_ObjectID"),
        ])
    }
}

/// A loaded glyph
#[derive(Debug)]
pub struct Glyph {
    /// Coverage texture (`R8`)
    pub texture: Texture2D,
    /// Bitmap size in pixels
    pub size: Vec2,
    /// Offset from the pen to the bitmap's top-left, y up from the baseline
    pub bearing: Vec2,
    /// Horizontal pen advance in pixels
    pub advance: f32,
}

impl Glyph {
    fn upload(context: &RenderContext, rasterized: &RasterizedGlyph) -> Self {
        // empty glyphs (space) still get a texture so every glyph binds the same way
        let texture = if rasterized.width == 0 || rasterized.height == 0 {
            Texture2D::from_pixels(context, 1, 1, TextureFormat::R8, &[0])
        } else {
            Texture2D::from_pixels(
                context,
                rasterized.width,
                rasterized.height,
                TextureFormat::R8,
                &rasterized.coverage,
            )
        };

        Self {
            texture,
            size: Vec2::new(rasterized.width as f32, rasterized.height as f32),
            bearing: rasterized.bearing,
            advance: rasterized.advance,
        }
    }
}

/// Quad for one glyph at pen position `pen`, two triangles
pub fn glyph_vertices(glyph: &Glyph, pen: Vec3, scale: Vec2, color: Vec4, object_id: i32) -> [TextVertex; 6] {
    let x = pen.x + glyph.bearing.x * scale.x;
    let y = pen.y - (glyph.size.y - glyph.bearing.y) * scale.y;
    let w = glyph.size.x * scale.x;
    let h = glyph.size.y * scale.y;

    let corner = |px: f32, py: f32, u: f32, v: f32| TextVertex {
        position: [px, py, pen.z],
        color: color.into(),
        tex_coord: [u, v],
        object_id,
    };

    [
        corner(x, y + h, 0.0, 0.0),
        corner(x, y, 0.0, 1.0),
        corner(x + w, y, 1.0, 1.0),
        corner(x, y + h, 0.0, 0.0),
        corner(x + w, y, 1.0, 1.0),
        corner(x + w, y + h, 1.0, 0.0),
    ]
}

/// One-draw-per-glyph text renderer
pub struct TextRenderer {
    context: RenderContext,
    pixel_size: f32,
    glyphs: HashMap<char, Glyph>,
    vertex_buffer: VertexBuffer,
    material: Material,
}

impl TextRenderer {
    /// Create a text renderer using the configured glyph size
    pub fn new(renderer: &Renderer) -> Self {
        Self::with_pixel_size(renderer.context(), renderer.config().glyph_pixel_size)
    }

    /// Create a text renderer rasterizing at `pixel_size`
    pub fn with_pixel_size(context: &RenderContext, pixel_size: u32) -> Self {
        assert!(pixel_size > 0, "glyph pixel size must be greater than zero");
        let vertex_buffer = VertexBuffer::new(
            context,
            "text glyph",
            VERTICES_PER_GLYPH * std::mem::size_of::<TextVertex>(),
            TextVertex::layout(),
        );
        let shader = Shader::from_source(context, "text", TEXT_SHADER);

        Self {
            context: context.clone(),
            pixel_size: pixel_size as f32,
            glyphs: HashMap::new(),
            vertex_buffer,
            material: Material::new(Rc::new(shader)),
        }
    }

    /// Load the ASCII glyphs of a font file, replacing any loaded glyphs
    pub fn load_font(&mut self, path: impl AsRef<Path>) -> RenderResult<()> {
        let face = FontFace::from_file(path)?;
        self.load_glyphs(&face);
        Ok(())
    }

    /// Load the ASCII glyphs of any glyph source, replacing any loaded glyphs
    ///
    /// Characters the source cannot rasterize are logged and left out.
    pub fn load_glyphs(&mut self, rasterizer: &dyn GlyphRasterizer) {
        self.glyphs.clear();
        for code in GLYPH_RANGE {
            let ch = char::from(code);
            match rasterizer.rasterize(ch, self.pixel_size) {
                Some(rasterized) => {
                    self.glyphs.insert(ch, Glyph::upload(&self.context, &rasterized));
                }
                None => log::warn!("Failed to load glyph '{}'", ch.escape_default()),
            }
        }
        log::info!("Loaded {} glyphs at {}px", self.glyphs.len(), self.pixel_size);
    }

    /// Upload the camera for the following text
    pub fn begin_batch(&mut self, view_projection: &Mat4) {
        let view_projection: [[f32; 4]; 4] = (*view_projection).into();
        self.material.set("u_ViewProjection", view_projection);
    }

    /// Draw `text` with its baseline origin at the transform's position
    ///
    /// # Panics
    /// If `text` contains a character that was not loaded.
    pub fn render_text(&mut self, text: &str, transform: &Mat4, color: Vec4, object_id: i32) {
        let anchor = Transform::from_matrix(transform);
        let scale = Vec2::new(anchor.scale.x, anchor.scale.y);
        let mut pen = anchor.position;

        self.material.bind();
        for ch in text.chars() {
            let glyph = self
                .glyphs
                .get(&ch)
                .unwrap_or_else(|| panic!("glyph '{}' was never loaded", ch.escape_default()));

            let vertices = glyph_vertices(glyph, pen, scale, color, object_id);
            self.vertex_buffer.set_data(bytemuck::cast_slice(&vertices));
            glyph.texture.bind(0);

            let vertex_buffer = self.vertex_buffer.handle();
            self.context
                .submit(move |gpu| gpu.draw_arrays(vertex_buffer, VERTICES_PER_GLYPH as u32));
            statistics::record(|stats| {
                stats.glyph_count += 1;
                stats.draw_calls += 1;
            });

            pen.x += glyph.advance * scale.x;
        }
    }

    /// Draw `text` at a 2D position with a uniform scale
    pub fn render_text_at(&mut self, text: &str, position: Vec2, scale: f32, color: Vec4, object_id: i32) {
        let transform = Transform::from_position_scale(
            Vec3::new(position.x, position.y, 0.0),
            Vec3::new(scale, scale, 1.0),
        )
        .to_matrix();
        self.render_text(text, &transform, color, object_id);
    }

    /// A loaded glyph
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    /// Number of loaded glyphs
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Rasterization size in pixels
    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("pixel_size", &self.pixel_size)
            .field("glyphs", &self.glyphs.len())
            .finish()
    }
}
