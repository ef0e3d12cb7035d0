//! Vertex and index buffers
//!
//! RAII wrappers around backend buffers. Creation, uploads and destruction
//! are queued on the [`RenderContext`]; the handle is valid immediately.

use crate::render::api::{BufferDescriptor, BufferHandle, BufferLayout, BufferUsage};
use crate::render::command_queue::RenderContext;

/// GPU vertex buffer with a fixed allocation size and vertex layout
pub struct VertexBuffer {
    context: RenderContext,
    handle: BufferHandle,
    size: usize,
    layout: BufferLayout,
}

impl VertexBuffer {
    /// Allocate a dynamic vertex buffer of `size` bytes
    pub fn new(context: &RenderContext, label: &str, size: usize, layout: BufferLayout) -> Self {
        let handle = BufferHandle(context.allocate_id());
        let descriptor = BufferDescriptor {
            label: label.to_string(),
            size,
            usage: BufferUsage::VERTEX | BufferUsage::DYNAMIC,
            layout: Some(layout.clone()),
        };
        context.submit(move |gpu| gpu.create_buffer(handle, &descriptor, None));

        Self {
            context: context.clone(),
            handle,
            size,
            layout,
        }
    }

    /// Upload `data` to the start of the buffer
    ///
    /// # Panics
    /// If `data` is larger than the allocation.
    pub fn set_data(&self, data: &[u8]) {
        assert!(
            data.len() <= self.size,
            "vertex upload of {} bytes exceeds buffer size {}",
            data.len(),
            self.size
        );
        let handle = self.handle;
        let data = data.to_vec();
        self.context.submit(move |gpu| gpu.write_buffer(handle, 0, &data));
    }

    /// Backend handle
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// Allocation size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Vertex layout
    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        let handle = self.handle;
        self.context.submit(move |gpu| gpu.destroy_buffer(handle));
    }
}

/// GPU index buffer of 32-bit indices
pub struct IndexBuffer {
    context: RenderContext,
    handle: BufferHandle,
    count: u32,
}

impl IndexBuffer {
    /// Create a static index buffer holding `indices`
    pub fn new(context: &RenderContext, label: &str, indices: &[u32]) -> Self {
        let handle = BufferHandle(context.allocate_id());
        let bytes: Vec<u8> = bytemuck::cast_slice(indices).to_vec();
        let descriptor = BufferDescriptor {
            label: label.to_string(),
            size: bytes.len(),
            usage: BufferUsage::INDEX,
            layout: None,
        };
        context.submit(move |gpu| gpu.create_buffer(handle, &descriptor, Some(&bytes)));

        Self {
            context: context.clone(),
            handle,
            count: u32::try_from(indices.len()).expect("index count exceeds u32"),
        }
    }

    /// Backend handle
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// Number of indices stored
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        let handle = self.handle;
        self.context.submit(move |gpu| gpu.destroy_buffer(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{BufferElement, ShaderDataType};
    use crate::render::backends::HeadlessBackend;

    fn layout() -> BufferLayout {
        BufferLayout::new(vec![BufferElement::new(ShaderDataType::Float2, "a_Position")])
    }

    #[test]
    fn test_creation_is_deferred_until_drain() {
        let context = RenderContext::new();
        let mut backend = HeadlessBackend::new();

        let buffer = VertexBuffer::new(&context, "deferred", 32, layout());
        assert!(backend.buffer(buffer.handle()).is_none());

        context.execute(&mut backend);
        let stored = backend.buffer(buffer.handle()).unwrap();
        assert_eq!(stored.data.len(), 32);
        assert_eq!(stored.descriptor.layout.as_ref().unwrap().stride(), 8);
    }

    #[test]
    fn test_set_data_and_drop() {
        let context = RenderContext::new();
        let mut backend = HeadlessBackend::new();

        let buffer = VertexBuffer::new(&context, "dynamic", 8, layout());
        buffer.set_data(&[7, 7, 7, 7]);
        context.execute(&mut backend);
        assert_eq!(backend.buffer(buffer.handle()).unwrap().data, vec![7, 7, 7, 7, 0, 0, 0, 0]);

        let handle = buffer.handle();
        drop(buffer);
        context.execute(&mut backend);
        assert!(backend.buffer(handle).is_none());
    }

    #[test]
    fn test_index_buffer_contents() {
        let context = RenderContext::new();
        let mut backend = HeadlessBackend::new();

        let indices = IndexBuffer::new(&context, "indices", &[0, 1, 2]);
        context.execute(&mut backend);

        let stored = &backend.buffer(indices.handle()).unwrap().data;
        let read: Vec<u32> = stored
            .chunks_exact(4)
            .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(read, vec![0, 1, 2]);
        assert_eq!(indices.count(), 3);
    }

    #[test]
    #[should_panic(expected = "exceeds buffer size")]
    fn test_oversized_upload_panics() {
        let context = RenderContext::new();
        let buffer = VertexBuffer::new(&context, "small", 4, layout());
        buffer.set_data(&[0; 8]);
    }
}
