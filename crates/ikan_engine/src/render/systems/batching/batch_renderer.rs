//! # Batch Renderer
//!
//! Accumulates quads and circles into per-kind vertex arenas and flushes each
//! kind as one indexed draw call. Two limits open a new batch mid-frame:
//!
//! - **Arena capacity**: before a primitive is written, a kind whose index
//!   count has reached its maximum is flushed first, so the arena never
//!   grows past `max * 4` vertices.
//! - **Texture slots**: textures are cached per batch by handle. A texture
//!   that is not cached and finds the slot table full flushes the batch and
//!   starts a fresh table.
//!
//! Both boundaries are invisible to callers apart from the extra draw call.
//! Draw order within a kind is preserved.

use std::path::Path;
use std::rc::Rc;

use bytemuck::Pod;

use crate::config::RendererConfig;
use crate::foundation::math::{Mat4, Mat4Ext, Vec4};
use crate::render::api::BufferLayout;
use crate::render::command_queue::RenderContext;
use crate::render::resources::{IndexBuffer, Material, Shader, SubTexture2D, Texture2D, VertexBuffer};
use crate::render::statistics;
use crate::render::Renderer;

use super::texture_slots::TextureSlots;
use super::vertex::{
    quad_indices, CircleVertex, QuadVertex, INDICES_PER_QUAD, QUAD_CORNERS, QUAD_TEX_COORDS, VERTICES_PER_QUAD,
};

const QUAD_SHADER: &str = include_str!("../../shaders/quad.glsl");
const CIRCLE_SHADER: &str = include_str!("../../shaders/circle.glsl");

/// Placeholder in the batch shaders replaced with the texture slot count
pub const MAX_TEXTURE_SLOTS_TOKEN: &str = "$MAX_TEXTURE_SLOTS";

/// Primitive kinds with their own arena, buffers and shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Quads
    Quad,
    /// Circles and rings
    Circle,
}

/// What a sprite looks like, as handed over by the scene
#[derive(Debug, Clone)]
pub enum SpriteVisual {
    /// Flat color
    Color(Vec4),
    /// Whole texture with a tint
    Texture {
        /// Texture to sample
        texture: Rc<Texture2D>,
        /// Multiplied with the sampled color
        tint: Vec4,
        /// Texture coordinate multiplier
        tiling_factor: f32,
    },
    /// Region of a texture
    SubTexture(SubTexture2D),
}

/// Arena, slot table and GPU objects of one primitive kind
struct PrimitiveBatch<V: Pod> {
    kind: PrimitiveKind,
    vertices: Vec<V>,
    index_count: u32,
    max_indices: u32,
    slots: TextureSlots,
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    material: Material,
}

impl<V: Pod> PrimitiveBatch<V> {
    fn new(
        context: &RenderContext,
        kind: PrimitiveKind,
        max_primitives: u32,
        layout: BufferLayout,
        shader: Shader,
        white: Rc<Texture2D>,
        slot_count: usize,
    ) -> Self {
        let max_vertices = (max_primitives * VERTICES_PER_QUAD) as usize;
        let label = format!("{kind:?} batch");
        let vertex_buffer = VertexBuffer::new(context, &label, max_vertices * std::mem::size_of::<V>(), layout);
        let index_buffer = IndexBuffer::new(context, &label, &quad_indices(max_primitives));

        Self {
            kind,
            vertices: Vec::with_capacity(max_vertices),
            index_count: 0,
            max_indices: max_primitives * INDICES_PER_QUAD,
            slots: TextureSlots::new(white, slot_count),
            vertex_buffer,
            index_buffer,
            material: Material::new(Rc::new(shader)),
        }
    }

    fn is_full(&self) -> bool {
        self.index_count >= self.max_indices
    }

    fn push_primitive(&mut self, vertices: [V; 4]) {
        debug_assert!(!self.is_full(), "{:?} arena overrun", self.kind);
        self.vertices.extend_from_slice(&vertices);
        self.index_count += INDICES_PER_QUAD;
    }

    fn reset(&mut self) {
        self.vertices.clear();
        self.index_count = 0;
        self.slots.reset();
    }

    fn flush(&self, context: &RenderContext) {
        if self.index_count == 0 {
            return;
        }

        self.vertex_buffer.set_data(bytemuck::cast_slice(&self.vertices));
        self.material.bind();
        for (unit, texture) in self.slots.textures().iter().enumerate() {
            texture.bind(unit as u32);
        }

        let vertex_buffer = self.vertex_buffer.handle();
        let index_buffer = self.index_buffer.handle();
        let index_count = self.index_count;
        context.submit(move |gpu| gpu.draw_indexed(vertex_buffer, index_buffer, index_count));

        log::trace!(
            "Flushed {:?} batch: {} indices, {} texture slots",
            self.kind,
            index_count,
            self.slots.occupied()
        );
        statistics::record(|stats| stats.draw_calls += 1);
    }
}

/// Write camera uniforms; `u_View` only when the shader declares it
fn set_camera(material: &mut Material, view_projection: &Mat4, view: &Mat4) {
    let view_projection: [[f32; 4]; 4] = (*view_projection).into();
    material.set("u_ViewProjection", view_projection);
    if material.has_uniform("u_View") {
        let view: [[f32; 4]; 4] = (*view).into();
        material.set("u_View", view);
    }
}

/// Batched quad and circle renderer
pub struct BatchRenderer {
    context: RenderContext,
    white_texture: Rc<Texture2D>,
    quads: PrimitiveBatch<QuadVertex>,
    circles: PrimitiveBatch<CircleVertex>,
}

impl BatchRenderer {
    /// Create a batch renderer sized by the renderer's configuration
    pub fn new(renderer: &Renderer) -> Self {
        Self::with_config(
            renderer.context(),
            renderer.config(),
            renderer.capabilities().max_texture_units,
        )
    }

    /// Create a batch renderer for a context directly
    ///
    /// `max_texture_units` is the backend limit; the configured slot count is
    /// clamped to it.
    ///
    /// # Panics
    /// If a configured capacity is zero or too large for 32-bit indices, or
    /// fewer than two texture slots remain after clamping.
    pub fn with_config(context: &RenderContext, config: &RendererConfig, max_texture_units: u32) -> Self {
        for (name, max_primitives) in [("max_quads", config.max_quads), ("max_circles", config.max_circles)] {
            assert!(max_primitives > 0, "{name} must be greater than zero");
            assert!(
                max_primitives.checked_mul(INDICES_PER_QUAD).is_some(),
                "{name} = {max_primitives} overflows the 32-bit index range of a batch"
            );
        }

        let mut slot_count = config.max_texture_slots;
        if slot_count > max_texture_units {
            log::warn!(
                "Requested {} texture slots but the backend supports {}; clamping",
                slot_count,
                max_texture_units
            );
            slot_count = max_texture_units;
        }
        assert!(
            slot_count >= 2,
            "a batch needs at least two texture slots (white plus one), got {slot_count}"
        );

        let white_texture = Rc::new(Texture2D::white(context));

        let quad_shader = Shader::from_source(
            context,
            "batch_quad",
            &QUAD_SHADER.replace(MAX_TEXTURE_SLOTS_TOKEN, &slot_count.to_string()),
        );
        let circle_shader = Shader::from_source(
            context,
            "batch_circle",
            &CIRCLE_SHADER.replace(MAX_TEXTURE_SLOTS_TOKEN, &slot_count.to_string()),
        );

        let quads = PrimitiveBatch::new(
            context,
            PrimitiveKind::Quad,
            config.max_quads,
            QuadVertex::layout(),
            quad_shader,
            Rc::clone(&white_texture),
            slot_count as usize,
        );
        let circles = PrimitiveBatch::new(
            context,
            PrimitiveKind::Circle,
            config.max_circles,
            CircleVertex::layout(),
            circle_shader,
            Rc::clone(&white_texture),
            slot_count as usize,
        );

        log::info!(
            "Batch renderer initialized: {} quads, {} circles, {} texture slots per batch",
            config.max_quads,
            config.max_circles,
            slot_count
        );

        Self {
            context: context.clone(),
            white_texture,
            quads,
            circles,
        }
    }

    /// Upload the camera and start a fresh batch for every kind
    pub fn begin_batch(&mut self, view_projection: &Mat4, view: &Mat4) {
        set_camera(&mut self.quads.material, view_projection, view);
        set_camera(&mut self.circles.material, view_projection, view);
        self.start_batch();
    }

    /// Flush every kind holding primitives
    pub fn end_batch(&mut self) {
        self.quads.flush(&self.context);
        self.circles.flush(&self.context);
    }

    /// Flush, then reset every kind without touching the camera
    pub fn next_batch(&mut self) {
        self.end_batch();
        self.start_batch();
    }

    fn start_batch(&mut self) {
        self.quads.reset();
        self.circles.reset();
    }

    /// Solid colored quad
    pub fn draw_quad(&mut self, transform: &Mat4, color: Vec4, object_id: i32) {
        self.write_quad(transform, color, None, 1.0, &QUAD_TEX_COORDS, object_id);
    }

    /// Textured quad with a tint and tiling factor
    pub fn draw_textured_quad(
        &mut self,
        transform: &Mat4,
        texture: &Rc<Texture2D>,
        tint: Vec4,
        tiling_factor: f32,
        object_id: i32,
    ) {
        self.write_quad(transform, tint, Some(texture), tiling_factor, &QUAD_TEX_COORDS, object_id);
    }

    /// Quad showing a region of a texture
    pub fn draw_sub_textured_quad(&mut self, transform: &Mat4, sub_texture: &SubTexture2D, object_id: i32) {
        let tex_coords = sub_texture.tex_coords().map(|uv| [uv.x, uv.y]);
        self.write_quad(
            transform,
            Vec4::new(1.0, 1.0, 1.0, 1.0),
            Some(sub_texture.texture()),
            1.0,
            &tex_coords,
            object_id,
        );
    }

    /// Solid circle or ring
    ///
    /// `thickness` 1.0 fills the disc; `fade` is the width of the soft edge.
    pub fn draw_circle(&mut self, transform: &Mat4, color: Vec4, thickness: f32, fade: f32, object_id: i32) {
        self.write_circle(transform, color, None, 1.0, &QUAD_TEX_COORDS, thickness, fade, object_id);
    }

    /// Textured circle or ring
    pub fn draw_textured_circle(
        &mut self,
        transform: &Mat4,
        texture: &Rc<Texture2D>,
        tint: Vec4,
        tiling_factor: f32,
        thickness: f32,
        fade: f32,
        object_id: i32,
    ) {
        self.write_circle(
            transform,
            tint,
            Some(texture),
            tiling_factor,
            &QUAD_TEX_COORDS,
            thickness,
            fade,
            object_id,
        );
    }

    /// Quad for a scene sprite
    pub fn draw_sprite(&mut self, transform: &Mat4, visual: &SpriteVisual, object_id: i32) {
        match visual {
            SpriteVisual::Color(color) => self.draw_quad(transform, *color, object_id),
            SpriteVisual::Texture {
                texture,
                tint,
                tiling_factor,
            } => self.draw_textured_quad(transform, texture, *tint, *tiling_factor, object_id),
            SpriteVisual::SubTexture(sub_texture) => self.draw_sub_textured_quad(transform, sub_texture, object_id),
        }
    }

    /// Circle for a scene sprite
    pub fn draw_circle_sprite(
        &mut self,
        transform: &Mat4,
        visual: &SpriteVisual,
        thickness: f32,
        fade: f32,
        object_id: i32,
    ) {
        match visual {
            SpriteVisual::Color(color) => self.draw_circle(transform, *color, thickness, fade, object_id),
            SpriteVisual::Texture {
                texture,
                tint,
                tiling_factor,
            } => self.draw_textured_circle(transform, texture, *tint, *tiling_factor, thickness, fade, object_id),
            SpriteVisual::SubTexture(sub_texture) => {
                let tex_coords = sub_texture.tex_coords().map(|uv| [uv.x, uv.y]);
                self.write_circle(
                    transform,
                    Vec4::new(1.0, 1.0, 1.0, 1.0),
                    Some(sub_texture.texture()),
                    1.0,
                    &tex_coords,
                    thickness,
                    fade,
                    object_id,
                );
            }
        }
    }

    fn write_quad(
        &mut self,
        transform: &Mat4,
        color: Vec4,
        texture: Option<&Rc<Texture2D>>,
        tiling_factor: f32,
        tex_coords: &[[f32; 2]; 4],
        object_id: i32,
    ) {
        if self.quads.is_full() {
            log::debug!("Quad arena full, starting a new batch");
            self.next_batch();
        }
        let tex_index = self.texture_index(PrimitiveKind::Quad, texture);

        let vertices = std::array::from_fn(|i| {
            let [x, y] = QUAD_CORNERS[i];
            QuadVertex {
                position: transform.transform_corner(&Vec4::new(x, y, 0.0, 1.0)).into(),
                color: color.into(),
                tex_coord: tex_coords[i],
                tex_index,
                tiling_factor,
                object_id,
            }
        });
        self.quads.push_primitive(vertices);
        statistics::record(|stats| stats.quad_count += 1);
    }

    fn write_circle(
        &mut self,
        transform: &Mat4,
        color: Vec4,
        texture: Option<&Rc<Texture2D>>,
        tiling_factor: f32,
        tex_coords: &[[f32; 2]; 4],
        thickness: f32,
        fade: f32,
        object_id: i32,
    ) {
        if self.circles.is_full() {
            log::debug!("Circle arena full, starting a new batch");
            self.next_batch();
        }
        let tex_index = self.texture_index(PrimitiveKind::Circle, texture);

        let vertices = std::array::from_fn(|i| {
            let [x, y] = QUAD_CORNERS[i];
            CircleVertex {
                position: transform.transform_corner(&Vec4::new(x, y, 0.0, 1.0)).into(),
                local_position: [x * 2.0, y * 2.0],
                color: color.into(),
                tex_coord: tex_coords[i],
                tex_index,
                tiling_factor,
                thickness,
                fade,
                object_id,
            }
        });
        self.circles.push_primitive(vertices);
        statistics::record(|stats| stats.circle_count += 1);
    }

    /// Slot index for `texture` in the current batch of `kind`
    fn texture_index(&mut self, kind: PrimitiveKind, texture: Option<&Rc<Texture2D>>) -> f32 {
        let Some(texture) = texture else {
            return 0.0;
        };

        if let Some(slot) = self.slots(kind).find(texture) {
            return slot as f32;
        }

        if self.slots(kind).is_full() {
            log::debug!("{:?} texture slots exhausted, starting a new batch", kind);
            self.next_batch();
        }

        let slots = match kind {
            PrimitiveKind::Quad => &mut self.quads.slots,
            PrimitiveKind::Circle => &mut self.circles.slots,
        };
        slots.insert(Rc::clone(texture)) as f32
    }

    fn slots(&self, kind: PrimitiveKind) -> &TextureSlots {
        match kind {
            PrimitiveKind::Quad => &self.quads.slots,
            PrimitiveKind::Circle => &self.circles.slots,
        }
    }

    /// Load a texture, falling back to the white texture when loading fails
    pub fn load_texture_or_white(&self, path: impl AsRef<Path>) -> Rc<Texture2D> {
        match Texture2D::from_file(&self.context, path) {
            Ok(texture) => Rc::new(texture),
            Err(error) => {
                log::warn!("{}; using the white texture instead", error);
                Rc::clone(&self.white_texture)
            }
        }
    }

    /// The reserved 1x1 white texture in slot 0
    pub fn white_texture(&self) -> &Rc<Texture2D> {
        &self.white_texture
    }

    /// Quad vertices written in the current batch
    pub fn quad_vertices(&self) -> &[QuadVertex] {
        &self.quads.vertices
    }

    /// Circle vertices written in the current batch
    pub fn circle_vertices(&self) -> &[CircleVertex] {
        &self.circles.vertices
    }

    /// Indices accumulated for `kind` in the current batch
    pub fn index_count(&self, kind: PrimitiveKind) -> u32 {
        match kind {
            PrimitiveKind::Quad => self.quads.index_count,
            PrimitiveKind::Circle => self.circles.index_count,
        }
    }

    /// Occupied texture slots of `kind`, white texture first
    pub fn texture_slots(&self, kind: PrimitiveKind) -> &[Rc<Texture2D>] {
        self.slots(kind).textures()
    }

    /// Slot table size per batch
    pub fn max_texture_slots(&self) -> usize {
        self.quads.slots.capacity()
    }

    /// Material used for `kind`, e.g. to inspect camera uniforms
    pub fn material(&self, kind: PrimitiveKind) -> &Material {
        match kind {
            PrimitiveKind::Quad => &self.quads.material,
            PrimitiveKind::Circle => &self.circles.material,
        }
    }
}

impl std::fmt::Debug for BatchRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRenderer")
            .field("quad_indices", &self.quads.index_count)
            .field("circle_indices", &self.circles.index_count)
            .field("max_texture_slots", &self.max_texture_slots())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::ShaderDomain;
    use crate::render::backends::HeadlessBackend;
    use approx::assert_relative_eq;

    fn renderer(context: &RenderContext) -> BatchRenderer {
        BatchRenderer::with_config(context, &RendererConfig::default(), 32)
    }

    #[test]
    fn test_untextured_quad_uses_white_slot() {
        let context = RenderContext::new();
        let mut batch = renderer(&context);
        batch.begin_batch(&Mat4::identity(), &Mat4::identity());

        batch.draw_quad(&Mat4::identity(), Vec4::new(0.2, 0.4, 0.6, 1.0), 7);

        assert_eq!(batch.quad_vertices().len(), 4);
        assert!(batch.quad_vertices().iter().all(|v| v.tex_index == 0.0 && v.object_id == 7));
        assert_eq!(batch.index_count(PrimitiveKind::Quad), 6);
        assert_eq!(batch.texture_slots(PrimitiveKind::Quad).len(), 1);
    }

    #[test]
    fn test_white_texture_resolves_to_slot_zero() {
        let context = RenderContext::new();
        let mut batch = renderer(&context);
        batch.begin_batch(&Mat4::identity(), &Mat4::identity());

        let white = Rc::clone(batch.white_texture());
        batch.draw_textured_quad(&Mat4::identity(), &white, Vec4::new(1.0, 1.0, 1.0, 1.0), 1.0, 0);

        assert_eq!(batch.quad_vertices()[0].tex_index, 0.0);
        assert_eq!(batch.texture_slots(PrimitiveKind::Quad).len(), 1);
    }

    #[test]
    fn test_circle_local_position_spans_unit_disc() {
        let context = RenderContext::new();
        let mut batch = renderer(&context);
        batch.begin_batch(&Mat4::identity(), &Mat4::identity());

        batch.draw_circle(&Mat4::new_scaling(3.0), Vec4::new(1.0, 1.0, 1.0, 1.0), 0.5, 0.01, 2);

        let vertices = batch.circle_vertices();
        assert_eq!(vertices[0].local_position, [-1.0, -1.0]);
        assert_eq!(vertices[2].local_position, [1.0, 1.0]);
        assert_eq!(vertices[2].tex_coord, [1.0, 1.0]);
        assert_relative_eq!(vertices[2].position[0], 1.5f32);
        assert_eq!((vertices[0].thickness, vertices[0].fade), (0.5, 0.01));
        assert_eq!(batch.index_count(PrimitiveKind::Quad), 0);
    }

    #[test]
    fn test_sub_texture_coordinates_are_emitted() {
        let context = RenderContext::new();
        let mut batch = renderer(&context);
        batch.begin_batch(&Mat4::identity(), &Mat4::identity());

        let sheet = Rc::new(Texture2D::white(&context));
        let sprite = SubTexture2D::new(
            Rc::clone(&sheet),
            crate::foundation::math::Vec2::new(0.25, 0.5),
            crate::foundation::math::Vec2::new(0.5, 1.0),
        );
        batch.draw_sprite(&Mat4::identity(), &SpriteVisual::SubTexture(sprite), 0);

        let vertices = batch.quad_vertices();
        assert_eq!(vertices[0].tex_coord, [0.25, 0.5]);
        assert_eq!(vertices[2].tex_coord, [0.5, 1.0]);
        assert_eq!(vertices[0].tex_index, 1.0);
    }

    #[test]
    fn test_sub_texture_circle_keeps_local_position() {
        let context = RenderContext::new();
        let mut batch = renderer(&context);
        batch.begin_batch(&Mat4::identity(), &Mat4::identity());

        let sheet = Rc::new(Texture2D::white(&context));
        let sprite = SubTexture2D::new(
            Rc::clone(&sheet),
            crate::foundation::math::Vec2::new(0.25, 0.5),
            crate::foundation::math::Vec2::new(0.5, 1.0),
        );
        batch.draw_circle_sprite(&Mat4::identity(), &SpriteVisual::SubTexture(sprite), 0.3, 0.02, 9);

        let vertices = batch.circle_vertices();
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[0].tex_coord, [0.25, 0.5]);
        assert_eq!(vertices[2].tex_coord, [0.5, 1.0]);
        assert_eq!(vertices[0].local_position, [-1.0, -1.0]);
        assert_eq!(vertices[2].local_position, [1.0, 1.0]);
        assert!(vertices.iter().all(|v| v.tex_index == 1.0 && v.object_id == 9 && v.thickness == 0.3));
        assert_eq!(batch.texture_slots(PrimitiveKind::Circle)[1].handle(), sheet.handle());
        assert!(batch.quad_vertices().is_empty());
    }

    #[test]
    fn test_camera_uniform_is_uploaded_on_flush() {
        let context = RenderContext::new();
        let mut backend = HeadlessBackend::new();
        let mut batch = renderer(&context);

        let view_projection = Mat4::new_scaling(0.5);
        batch.begin_batch(&view_projection, &Mat4::identity());
        batch.draw_quad(&Mat4::identity(), Vec4::new(1.0, 1.0, 1.0, 1.0), 0);
        batch.end_batch();
        context.execute(&mut backend);

        let shader = batch.material(PrimitiveKind::Quad).shader().handle();
        let block = backend.shader(shader).unwrap().uniform_block(ShaderDomain::Vertex);
        let expected: [[f32; 4]; 4] = view_projection.into();
        assert_eq!(block, bytemuck::bytes_of(&expected));
    }

    #[test]
    fn test_view_is_set_only_when_declared() {
        let context = RenderContext::new();
        let source = "#type vertex\nuniform mat4 u_ViewProjection;\nuniform mat4 u_View;\n";
        let mut with_view = Material::new(Rc::new(Shader::from_source(&context, "with_view", source)));
        let view = Mat4::new_translation(&crate::foundation::math::Vec3::new(1.0, 2.0, 3.0));

        set_camera(&mut with_view, &Mat4::identity(), &view);
        let stored: [[f32; 4]; 4] = with_view.get("u_View");
        assert_eq!(stored, <[[f32; 4]; 4]>::from(view));

        let mut batch = renderer(&context);
        batch.begin_batch(&Mat4::identity(), &view);
        assert!(!batch.material(PrimitiveKind::Quad).has_uniform("u_View"));
    }

    #[test]
    fn test_empty_batch_issues_no_draws() {
        let context = RenderContext::new();
        let mut backend = HeadlessBackend::new();
        let mut batch = renderer(&context);

        batch.begin_batch(&Mat4::identity(), &Mat4::identity());
        batch.end_batch();
        context.execute(&mut backend);

        assert!(backend.draws().is_empty());
    }

    #[test]
    fn test_slot_count_is_clamped_to_backend_units() {
        let context = RenderContext::new();
        let config = RendererConfig {
            max_texture_slots: 64,
            ..RendererConfig::default()
        };
        let batch = BatchRenderer::with_config(&context, &config, 8);
        assert_eq!(batch.max_texture_slots(), 8);

        let fragment = batch.material(PrimitiveKind::Quad).shader().reflection().find_resource("u_Textures");
        assert_eq!(fragment.map(|r| r.count), Some(8));
    }

    #[test]
    fn test_missing_texture_degrades_to_white() {
        let context = RenderContext::new();
        let batch = renderer(&context);
        let texture = batch.load_texture_or_white("missing/texture.png");
        assert!(Rc::ptr_eq(&texture, batch.white_texture()));
    }

    #[test]
    #[should_panic(expected = "max_quads must be greater than zero")]
    fn test_zero_capacity_is_rejected() {
        let context = RenderContext::new();
        let config = RendererConfig {
            max_quads: 0,
            ..RendererConfig::default()
        };
        BatchRenderer::with_config(&context, &config, 32);
    }

    #[test]
    #[should_panic(expected = "max_quads = 1200000000 overflows the 32-bit index range")]
    fn test_capacity_beyond_index_range_is_rejected() {
        let context = RenderContext::new();
        let config = RendererConfig {
            max_quads: 1_200_000_000,
            ..RendererConfig::default()
        };
        BatchRenderer::with_config(&context, &config, 32);
    }

    #[test]
    #[should_panic(expected = "max_circles = 4294967295 overflows")]
    fn test_circle_capacity_beyond_index_range_is_rejected() {
        let context = RenderContext::new();
        let config = RendererConfig {
            max_circles: u32::MAX,
            ..RendererConfig::default()
        };
        BatchRenderer::with_config(&context, &config, 32);
    }

    #[test]
    #[should_panic(expected = "a batch needs at least two texture slots (white plus one), got 1")]
    fn test_single_configured_slot_is_rejected() {
        let context = RenderContext::new();
        let config = RendererConfig {
            max_texture_slots: 1,
            ..RendererConfig::default()
        };
        BatchRenderer::with_config(&context, &config, 32);
    }

    #[test]
    #[should_panic(expected = "a batch needs at least two texture slots (white plus one), got 1")]
    fn test_single_backend_texture_unit_is_rejected() {
        let context = RenderContext::new();
        BatchRenderer::with_config(&context, &RendererConfig::default(), 1);
    }
}
