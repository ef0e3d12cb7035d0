//! Off-screen render targets
//!
//! Besides the color target, the default specification carries a
//! `RedInteger` attachment the batch shaders write object IDs into; reading a
//! pixel back from it is how the editor picks the entity under the cursor.

use crate::render::api::{FramebufferHandle, FramebufferSpecification, GraphicsBackend};
use crate::render::command_queue::RenderContext;

/// Largest accepted framebuffer edge in pixels
pub const MAX_FRAMEBUFFER_SIZE: u32 = 8192;

/// GPU framebuffer with its attachments
pub struct Framebuffer {
    context: RenderContext,
    handle: FramebufferHandle,
    specification: FramebufferSpecification,
}

impl Framebuffer {
    /// Create a framebuffer from a specification
    pub fn new(context: &RenderContext, specification: FramebufferSpecification) -> Self {
        let handle = FramebufferHandle(context.allocate_id());
        let spec = specification.clone();
        context.submit(move |gpu| gpu.create_framebuffer(handle, &spec));

        Self {
            context: context.clone(),
            handle,
            specification,
        }
    }

    /// Recreate the attachments at a new size
    ///
    /// Zero or oversized dimensions are rejected with a warning and leave the
    /// framebuffer unchanged. The handle stays the same.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || width > MAX_FRAMEBUFFER_SIZE || height > MAX_FRAMEBUFFER_SIZE {
            log::warn!("Attempted to resize framebuffer to {}x{}", width, height);
            return;
        }
        if width == self.specification.width && height == self.specification.height {
            return;
        }

        self.specification.width = width;
        self.specification.height = height;

        let handle = self.handle;
        let spec = self.specification.clone();
        self.context.submit(move |gpu| {
            gpu.destroy_framebuffer(handle);
            gpu.create_framebuffer(handle, &spec);
        });
    }

    /// Render into this framebuffer
    pub fn bind(&self) {
        let handle = self.handle;
        self.context.submit(move |gpu| gpu.bind_framebuffer(Some(handle)));
    }

    /// Render into the default target again
    pub fn unbind(&self) {
        self.context.submit(|gpu| gpu.bind_framebuffer(None));
    }

    /// Fill a color attachment with one integer value
    ///
    /// `index` counts color attachments only; depth attachments are skipped.
    pub fn clear_attachment(&self, index: usize, value: i32) {
        let handle = self.handle;
        self.context.submit(move |gpu| gpu.clear_attachment(handle, index, value));
    }

    /// Read one pixel of a color attachment
    ///
    /// Reads hit the backend directly, so drain the queue first for the
    /// result to reflect pending draws.
    pub fn read_pixel(&self, backend: &dyn GraphicsBackend, index: usize, x: u32, y: u32) -> i32 {
        backend.read_pixel(self.handle, index, x, y)
    }

    /// Backend handle
    pub fn handle(&self) -> FramebufferHandle {
        self.handle
    }

    /// Current specification
    pub fn specification(&self) -> &FramebufferSpecification {
        &self.specification
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("handle", &self.handle)
            .field("specification", &self.specification)
            .finish()
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        let handle = self.handle;
        self.context.submit(move |gpu| gpu.destroy_framebuffer(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    fn small() -> FramebufferSpecification {
        FramebufferSpecification {
            width: 4,
            height: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_picking_read_back() {
        let context = RenderContext::new();
        let mut backend = HeadlessBackend::new();

        let framebuffer = Framebuffer::new(&context, small());
        framebuffer.clear_attachment(1, -1);
        context.execute(&mut backend);

        assert_eq!(framebuffer.read_pixel(&backend, 1, 3, 3), -1);
        assert_eq!(framebuffer.read_pixel(&backend, 0, 0, 0), 0);
    }

    #[test]
    fn test_resize_keeps_handle() {
        let context = RenderContext::new();
        let mut backend = HeadlessBackend::new();

        let mut framebuffer = Framebuffer::new(&context, small());
        framebuffer.resize(16, 8);
        context.execute(&mut backend);

        let stored = backend.framebuffer(framebuffer.handle()).unwrap();
        assert_eq!((stored.specification.width, stored.specification.height), (16, 8));
        assert_eq!(stored.color_attachments[0].len(), 16 * 8);
    }

    #[test]
    fn test_invalid_resize_is_ignored() {
        let context = RenderContext::new();
        let mut framebuffer = Framebuffer::new(&context, small());
        let pending = context.pending_commands();

        framebuffer.resize(0, 10);
        framebuffer.resize(MAX_FRAMEBUFFER_SIZE + 1, 10);

        assert_eq!(context.pending_commands(), pending);
        assert_eq!(framebuffer.specification().width, 4);
    }

    #[test]
    fn test_drop_destroys_framebuffer() {
        let context = RenderContext::new();
        let mut backend = HeadlessBackend::new();
        let framebuffer = Framebuffer::new(&context, small());
        let handle = framebuffer.handle();
        framebuffer.bind();
        context.execute(&mut backend);
        assert!(backend.framebuffer(handle).is_some());

        drop(framebuffer);
        context.execute(&mut backend);
        assert!(backend.framebuffer(handle).is_none());
    }
}
