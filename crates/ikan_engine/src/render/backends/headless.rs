//! Headless graphics backend
//!
//! Keeps every GPU resource in host memory and records each draw call instead
//! of rasterizing it. The recorded [`DrawRecord`]s capture the state a real
//! driver would see (shader, buffers, textures bound for the draw), which
//! makes this backend the reference for testing the batch renderer and the
//! way to run the engine without a window.

use std::collections::HashMap;

use crate::render::api::{
    BackendCapabilities, BufferDescriptor, BufferHandle, BufferUsage, FramebufferHandle,
    FramebufferSpecification, GraphicsApi, GraphicsBackend, ShaderDomain, ShaderHandle,
    ShaderStageSource, TextureDescriptor, TextureHandle,
};

/// Texture units exposed when no explicit limit is requested
pub const DEFAULT_TEXTURE_UNITS: u32 = 32;

/// Host-side copy of a GPU buffer
#[derive(Debug, Clone)]
pub struct HostBuffer {
    /// Creation parameters
    pub descriptor: BufferDescriptor,
    /// Current contents
    pub data: Vec<u8>,
}

/// Host-side copy of a texture
#[derive(Debug, Clone)]
pub struct HostTexture {
    /// Creation parameters
    pub descriptor: TextureDescriptor,
    /// Current pixel data
    pub pixels: Vec<u8>,
}

/// Host-side shader program
#[derive(Debug, Clone)]
pub struct HostShader {
    /// Debug name
    pub name: String,
    /// Stage sources it was created from
    pub stages: Vec<ShaderStageSource>,
    /// Last uniform block uploaded per stage, indexed by [`ShaderDomain::index`]
    pub uniform_blocks: [Vec<u8>; 3],
}

impl HostShader {
    /// Last uniform block uploaded for a stage
    pub fn uniform_block(&self, domain: ShaderDomain) -> &[u8] {
        &self.uniform_blocks[domain.index()]
    }
}

/// Host-side framebuffer; color attachments hold one `i32` per pixel
#[derive(Debug, Clone)]
pub struct HostFramebuffer {
    /// Creation parameters
    pub specification: FramebufferSpecification,
    /// Color attachments in order (depth attachments are not stored)
    pub color_attachments: Vec<Vec<i32>>,
}

/// Kind of a recorded draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    /// Indexed triangles
    Indexed {
        /// Index buffer used
        index_buffer: BufferHandle,
        /// Number of indices drawn
        index_count: u32,
    },
    /// Non-indexed triangles
    Arrays {
        /// Number of vertices drawn
        vertex_count: u32,
    },
}

/// One draw call as the backend received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    /// Shader bound at draw time
    pub shader: ShaderHandle,
    /// Vertex buffer drawn from
    pub vertex_buffer: BufferHandle,
    /// Indexed or array draw
    pub kind: DrawKind,
    /// Textures bound since the previous draw, as (unit, texture), sorted by unit
    pub textures: Vec<(u32, TextureHandle)>,
    /// Render target bound at draw time
    pub framebuffer: Option<FramebufferHandle>,
}

impl DrawRecord {
    /// Number of indices for indexed draws, vertices for array draws
    pub fn element_count(&self) -> u32 {
        match self.kind {
            DrawKind::Indexed { index_count, .. } => index_count,
            DrawKind::Arrays { vertex_count } => vertex_count,
        }
    }
}

/// In-memory backend
#[derive(Debug)]
pub struct HeadlessBackend {
    capabilities: BackendCapabilities,
    buffers: HashMap<BufferHandle, HostBuffer>,
    textures: HashMap<TextureHandle, HostTexture>,
    shaders: HashMap<ShaderHandle, HostShader>,
    framebuffers: HashMap<FramebufferHandle, HostFramebuffer>,
    bound_shader: Option<ShaderHandle>,
    bound_framebuffer: Option<FramebufferHandle>,
    texture_units: Vec<Option<TextureHandle>>,
    pending_bindings: Vec<(u32, TextureHandle)>,
    draws: Vec<DrawRecord>,
}

impl HeadlessBackend {
    /// Create a backend with [`DEFAULT_TEXTURE_UNITS`] texture units
    pub fn new() -> Self {
        Self::with_max_texture_units(DEFAULT_TEXTURE_UNITS)
    }

    /// Create a backend exposing a specific number of texture units
    pub fn with_max_texture_units(max_texture_units: u32) -> Self {
        assert!(max_texture_units > 0, "a backend needs at least one texture unit");
        log::info!("Headless backend created with {} texture units", max_texture_units);
        Self {
            capabilities: BackendCapabilities { max_texture_units },
            buffers: HashMap::new(),
            textures: HashMap::new(),
            shaders: HashMap::new(),
            framebuffers: HashMap::new(),
            bound_shader: None,
            bound_framebuffer: None,
            texture_units: vec![None; max_texture_units as usize],
            pending_bindings: Vec::new(),
            draws: Vec::new(),
        }
    }

    /// Buffer contents, if the buffer exists
    pub fn buffer(&self, handle: BufferHandle) -> Option<&HostBuffer> {
        self.buffers.get(&handle)
    }

    /// Texture contents, if the texture exists
    pub fn texture(&self, handle: TextureHandle) -> Option<&HostTexture> {
        self.textures.get(&handle)
    }

    /// Shader state, if the shader exists
    pub fn shader(&self, handle: ShaderHandle) -> Option<&HostShader> {
        self.shaders.get(&handle)
    }

    /// Framebuffer state, if the framebuffer exists
    pub fn framebuffer(&self, handle: FramebufferHandle) -> Option<&HostFramebuffer> {
        self.framebuffers.get(&handle)
    }

    /// Texture currently bound to a unit
    pub fn texture_unit(&self, unit: u32) -> Option<TextureHandle> {
        self.texture_units.get(unit as usize).copied().flatten()
    }

    /// Every draw recorded so far
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Forget recorded draws, keeping resources
    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }

    /// Number of live buffers
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of live textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of live shaders
    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    fn buffer_mut(&mut self, handle: BufferHandle) -> &mut HostBuffer {
        self.buffers
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("unknown buffer handle {handle:?}"))
    }

    fn record_draw(&mut self, vertex_buffer: BufferHandle, kind: DrawKind) {
        let shader = self
            .bound_shader
            .unwrap_or_else(|| panic!("draw issued with no shader bound"));
        let buffer = self
            .buffers
            .get(&vertex_buffer)
            .unwrap_or_else(|| panic!("unknown vertex buffer {vertex_buffer:?}"));
        assert!(
            buffer.descriptor.usage.contains(BufferUsage::VERTEX),
            "buffer '{}' is not a vertex buffer",
            buffer.descriptor.label
        );

        let mut textures = std::mem::take(&mut self.pending_bindings);
        textures.sort_by_key(|(unit, _)| *unit);

        self.draws.push(DrawRecord {
            shader,
            vertex_buffer,
            kind,
            textures,
            framebuffer: self.bound_framebuffer,
        });
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn api(&self) -> GraphicsApi {
        GraphicsApi::Headless
    }

    fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }

    fn create_buffer(&mut self, handle: BufferHandle, descriptor: &BufferDescriptor, contents: Option<&[u8]>) {
        let mut data = vec![0u8; descriptor.size];
        if let Some(contents) = contents {
            assert!(
                contents.len() <= descriptor.size,
                "initial contents ({} bytes) exceed buffer '{}' ({} bytes)",
                contents.len(),
                descriptor.label,
                descriptor.size
            );
            data[..contents.len()].copy_from_slice(contents);
        }
        log::trace!("create buffer '{}' {:?} ({} bytes)", descriptor.label, handle, descriptor.size);
        self.buffers.insert(
            handle,
            HostBuffer {
                descriptor: descriptor.clone(),
                data,
            },
        );
    }

    fn write_buffer(&mut self, handle: BufferHandle, offset: usize, data: &[u8]) {
        let buffer = self.buffer_mut(handle);
        let end = offset + data.len();
        assert!(
            end <= buffer.data.len(),
            "write of {} bytes at offset {} overruns buffer '{}' ({} bytes)",
            data.len(),
            offset,
            buffer.descriptor.label,
            buffer.data.len()
        );
        buffer.data[offset..end].copy_from_slice(data);
    }

    fn destroy_buffer(&mut self, handle: BufferHandle) {
        self.buffers
            .remove(&handle)
            .unwrap_or_else(|| panic!("destroying unknown buffer {handle:?}"));
    }

    fn create_texture(&mut self, handle: TextureHandle, descriptor: &TextureDescriptor, pixels: Option<&[u8]>) {
        let size = descriptor.data_size();
        let pixels = match pixels {
            Some(pixels) => {
                assert_eq!(pixels.len(), size, "texture data must cover the entire texture");
                pixels.to_vec()
            }
            None => vec![0u8; size],
        };
        log::trace!("create texture {:?} {}x{}", handle, descriptor.width, descriptor.height);
        self.textures.insert(
            handle,
            HostTexture {
                descriptor: descriptor.clone(),
                pixels,
            },
        );
    }

    fn write_texture(&mut self, handle: TextureHandle, pixels: &[u8]) {
        let texture = self
            .textures
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("unknown texture handle {handle:?}"));
        assert_eq!(
            pixels.len(),
            texture.descriptor.data_size(),
            "texture data must cover the entire texture"
        );
        texture.pixels.copy_from_slice(pixels);
    }

    fn bind_texture(&mut self, handle: TextureHandle, unit: u32) {
        assert!(self.textures.contains_key(&handle), "binding unknown texture {handle:?}");
        assert!(
            unit < self.capabilities.max_texture_units,
            "texture unit {} out of range (max {})",
            unit,
            self.capabilities.max_texture_units
        );
        self.texture_units[unit as usize] = Some(handle);
        self.pending_bindings.retain(|(u, _)| *u != unit);
        self.pending_bindings.push((unit, handle));
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        self.textures
            .remove(&handle)
            .unwrap_or_else(|| panic!("destroying unknown texture {handle:?}"));
        for unit in &mut self.texture_units {
            if *unit == Some(handle) {
                *unit = None;
            }
        }
    }

    fn create_shader(&mut self, handle: ShaderHandle, name: &str, stages: &[ShaderStageSource]) {
        assert!(
            stages.iter().any(|s| s.domain == ShaderDomain::Vertex)
                && stages.iter().any(|s| s.domain == ShaderDomain::Fragment),
            "shader '{name}' needs both a vertex and a fragment stage"
        );
        log::trace!("create shader '{}' {:?}", name, handle);
        self.shaders.insert(
            handle,
            HostShader {
                name: name.to_string(),
                stages: stages.to_vec(),
                uniform_blocks: Default::default(),
            },
        );
    }

    fn bind_shader(&mut self, handle: ShaderHandle) {
        assert!(self.shaders.contains_key(&handle), "binding unknown shader {handle:?}");
        self.bound_shader = Some(handle);
    }

    fn upload_uniform_block(&mut self, handle: ShaderHandle, domain: ShaderDomain, data: &[u8]) {
        let shader = self
            .shaders
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("unknown shader handle {handle:?}"));
        shader.uniform_blocks[domain.index()] = data.to_vec();
    }

    fn destroy_shader(&mut self, handle: ShaderHandle) {
        self.shaders
            .remove(&handle)
            .unwrap_or_else(|| panic!("destroying unknown shader {handle:?}"));
        if self.bound_shader == Some(handle) {
            self.bound_shader = None;
        }
    }

    fn draw_indexed(&mut self, vertex_buffer: BufferHandle, index_buffer: BufferHandle, index_count: u32) {
        let indices = self
            .buffers
            .get(&index_buffer)
            .unwrap_or_else(|| panic!("unknown index buffer {index_buffer:?}"));
        assert!(
            indices.descriptor.usage.contains(BufferUsage::INDEX),
            "buffer '{}' is not an index buffer",
            indices.descriptor.label
        );
        assert!(
            index_count as usize * std::mem::size_of::<u32>() <= indices.data.len(),
            "draw of {} indices overruns index buffer '{}'",
            index_count,
            indices.descriptor.label
        );
        self.record_draw(
            vertex_buffer,
            DrawKind::Indexed {
                index_buffer,
                index_count,
            },
        );
    }

    fn draw_arrays(&mut self, vertex_buffer: BufferHandle, vertex_count: u32) {
        self.record_draw(vertex_buffer, DrawKind::Arrays { vertex_count });
    }

    fn create_framebuffer(&mut self, handle: FramebufferHandle, specification: &FramebufferSpecification) {
        let pixels = specification.width as usize * specification.height as usize;
        let color_attachments = specification
            .attachments
            .iter()
            .filter(|format| !format.is_depth())
            .map(|_| vec![0i32; pixels])
            .collect();
        self.framebuffers.insert(
            handle,
            HostFramebuffer {
                specification: specification.clone(),
                color_attachments,
            },
        );
    }

    fn bind_framebuffer(&mut self, handle: Option<FramebufferHandle>) {
        if let Some(handle) = handle {
            assert!(self.framebuffers.contains_key(&handle), "binding unknown framebuffer {handle:?}");
        }
        self.bound_framebuffer = handle;
    }

    fn clear_attachment(&mut self, handle: FramebufferHandle, attachment: usize, value: i32) {
        let framebuffer = self
            .framebuffers
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("unknown framebuffer {handle:?}"));
        let pixels = framebuffer
            .color_attachments
            .get_mut(attachment)
            .unwrap_or_else(|| panic!("framebuffer {handle:?} has no color attachment {attachment}"));
        pixels.fill(value);
    }

    fn read_pixel(&self, handle: FramebufferHandle, attachment: usize, x: u32, y: u32) -> i32 {
        let framebuffer = self
            .framebuffers
            .get(&handle)
            .unwrap_or_else(|| panic!("unknown framebuffer {handle:?}"));
        let spec = &framebuffer.specification;
        assert!(
            x < spec.width && y < spec.height,
            "pixel ({x}, {y}) outside {}x{} framebuffer",
            spec.width,
            spec.height
        );
        let pixels = framebuffer
            .color_attachments
            .get(attachment)
            .unwrap_or_else(|| panic!("framebuffer {handle:?} has no color attachment {attachment}"));
        pixels[y as usize * spec.width as usize + x as usize]
    }

    fn destroy_framebuffer(&mut self, handle: FramebufferHandle) {
        self.framebuffers
            .remove(&handle)
            .unwrap_or_else(|| panic!("destroying unknown framebuffer {handle:?}"));
        if self.bound_framebuffer == Some(handle) {
            self.bound_framebuffer = None;
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{FilterMode, TextureFormat};

    fn vertex_buffer(backend: &mut HeadlessBackend, id: u64, size: usize) -> BufferHandle {
        let handle = BufferHandle(id);
        backend.create_buffer(
            handle,
            &BufferDescriptor {
                label: "vb".into(),
                size,
                usage: BufferUsage::VERTEX | BufferUsage::DYNAMIC,
                layout: None,
            },
            None,
        );
        handle
    }

    fn texture(backend: &mut HeadlessBackend, id: u64) -> TextureHandle {
        let handle = TextureHandle(id);
        let descriptor = TextureDescriptor {
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8,
            filter: FilterMode::Linear,
        };
        backend.create_texture(handle, &descriptor, Some(&[255; 4]));
        handle
    }

    fn shader(backend: &mut HeadlessBackend, id: u64) -> ShaderHandle {
        let handle = ShaderHandle(id);
        let stages = [
            ShaderStageSource { domain: ShaderDomain::Vertex, source: String::new() },
            ShaderStageSource { domain: ShaderDomain::Fragment, source: String::new() },
        ];
        backend.create_shader(handle, "test", &stages);
        handle
    }

    #[test]
    fn test_write_buffer_at_offset() {
        let mut backend = HeadlessBackend::new();
        let vb = vertex_buffer(&mut backend, 1, 8);
        backend.write_buffer(vb, 4, &[1, 2, 3, 4]);
        assert_eq!(backend.buffer(vb).unwrap().data, vec![0, 0, 0, 0, 1, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "overruns buffer")]
    fn test_write_past_end_panics() {
        let mut backend = HeadlessBackend::new();
        let vb = vertex_buffer(&mut backend, 1, 4);
        backend.write_buffer(vb, 2, &[0; 4]);
    }

    #[test]
    fn test_draw_records_textures_bound_since_last_draw() {
        let mut backend = HeadlessBackend::new();
        let vb = vertex_buffer(&mut backend, 1, 64);
        let program = shader(&mut backend, 2);
        let a = texture(&mut backend, 3);
        let b = texture(&mut backend, 4);

        backend.bind_shader(program);
        backend.bind_texture(b, 1);
        backend.bind_texture(a, 0);
        backend.draw_arrays(vb, 6);
        backend.draw_arrays(vb, 6);

        let draws = backend.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].textures, vec![(0, a), (1, b)]);
        assert!(draws[1].textures.is_empty());
        assert_eq!(backend.texture_unit(1), Some(b));
    }

    #[test]
    #[should_panic(expected = "no shader bound")]
    fn test_draw_without_shader_panics() {
        let mut backend = HeadlessBackend::new();
        let vb = vertex_buffer(&mut backend, 1, 64);
        backend.draw_arrays(vb, 3);
    }

    #[test]
    fn test_framebuffer_clear_and_read_back() {
        let mut backend = HeadlessBackend::new();
        let fb = FramebufferHandle(9);
        backend.create_framebuffer(
            fb,
            &FramebufferSpecification {
                width: 4,
                height: 2,
                ..Default::default()
            },
        );
        backend.clear_attachment(fb, 1, -1);
        assert_eq!(backend.read_pixel(fb, 1, 3, 1), -1);
        assert_eq!(backend.read_pixel(fb, 0, 0, 0), 0);
        assert_eq!(backend.framebuffer(fb).unwrap().color_attachments.len(), 2);
    }
}
