//! 2D textures and sub-textures
//!
//! Texture identity is the backend handle: two `Texture2D` values are the
//! same texture only if they share a handle, which is what the batch
//! renderer's slot cache compares.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::foundation::math::Vec2;
use crate::render::api::{FilterMode, TextureDescriptor, TextureFormat, TextureHandle};
use crate::render::command_queue::RenderContext;
use crate::render::{RenderError, RenderResult};

/// GPU 2D texture
pub struct Texture2D {
    context: RenderContext,
    handle: TextureHandle,
    descriptor: TextureDescriptor,
    path: Option<PathBuf>,
}

impl Texture2D {
    /// Create a texture with zeroed pixels
    pub fn new(context: &RenderContext, descriptor: TextureDescriptor) -> Self {
        Self::create(context, descriptor, None, None)
    }

    /// Create a texture from raw pixels in `format`
    ///
    /// # Panics
    /// If `pixels` does not cover exactly `width * height` pixels.
    pub fn from_pixels(
        context: &RenderContext,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixels: &[u8],
    ) -> Self {
        let descriptor = TextureDescriptor {
            width,
            height,
            format,
            filter: FilterMode::Linear,
        };
        assert_eq!(
            pixels.len(),
            descriptor.data_size(),
            "texture data must cover the entire texture"
        );
        Self::create(context, descriptor, Some(pixels.to_vec()), None)
    }

    /// 1x1 opaque white texture used for untextured primitives
    pub fn white(context: &RenderContext) -> Self {
        Self::from_pixels(context, 1, 1, TextureFormat::Rgba8, &[0xff; 4])
    }

    /// Load a texture from an image file
    ///
    /// The image is flipped vertically so the first row is the bottom of the
    /// texture, and converted to RGBA8.
    pub fn from_file(context: &RenderContext, path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| RenderError::TextureLoad {
            path: path.display().to_string(),
            source,
        })?;
        let rgba = image.flipv().to_rgba8();
        let (width, height) = rgba.dimensions();

        log::debug!("Loaded texture '{}' ({}x{})", path.display(), width, height);

        let descriptor = TextureDescriptor {
            width,
            height,
            format: TextureFormat::Rgba8,
            filter: FilterMode::Linear,
        };
        Ok(Self::create(context, descriptor, Some(rgba.into_raw()), Some(path.to_path_buf())))
    }

    fn create(
        context: &RenderContext,
        descriptor: TextureDescriptor,
        pixels: Option<Vec<u8>>,
        path: Option<PathBuf>,
    ) -> Self {
        let handle = TextureHandle(context.allocate_id());
        let create_descriptor = descriptor.clone();
        context.submit(move |gpu| gpu.create_texture(handle, &create_descriptor, pixels.as_deref()));

        Self {
            context: context.clone(),
            handle,
            descriptor,
            path,
        }
    }

    /// Replace the pixel data
    ///
    /// # Panics
    /// If `pixels` does not cover the entire texture.
    pub fn set_data(&self, pixels: &[u8]) {
        assert_eq!(
            pixels.len(),
            self.descriptor.data_size(),
            "texture data must cover the entire texture"
        );
        let handle = self.handle;
        let pixels = pixels.to_vec();
        self.context.submit(move |gpu| gpu.write_texture(handle, &pixels));
    }

    /// Bind to a texture unit
    pub fn bind(&self, unit: u32) {
        let handle = self.handle;
        self.context.submit(move |gpu| gpu.bind_texture(handle, unit));
    }

    /// Backend handle
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.descriptor.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.descriptor.height
    }

    /// Pixel format
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// File the texture was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl PartialEq for Texture2D {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Texture2D {}

impl std::fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture2D")
            .field("handle", &self.handle)
            .field("width", &self.descriptor.width)
            .field("height", &self.descriptor.height)
            .field("path", &self.path)
            .finish()
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        let handle = self.handle;
        self.context.submit(move |gpu| gpu.destroy_texture(handle));
    }
}

/// A rectangular region of a texture, e.g. one sprite of a sheet
#[derive(Debug, Clone)]
pub struct SubTexture2D {
    texture: Rc<Texture2D>,
    tex_coords: [Vec2; 4],
}

impl SubTexture2D {
    /// Region between two UV corners
    ///
    /// Coordinates are emitted counter-clockwise starting bottom-left, in the
    /// same order as the unit quad corners.
    pub fn new(texture: Rc<Texture2D>, min: Vec2, max: Vec2) -> Self {
        Self {
            texture,
            tex_coords: [
                Vec2::new(min.x, min.y),
                Vec2::new(max.x, min.y),
                Vec2::new(max.x, max.y),
                Vec2::new(min.x, max.y),
            ],
        }
    }

    /// Region of a sprite sheet
    ///
    /// `coords` is the cell index, `cell_size` the size of one cell in pixels
    /// and `sprite_size` the sprite extent in cells.
    pub fn from_coords(texture: Rc<Texture2D>, coords: Vec2, cell_size: Vec2, sprite_size: Vec2) -> Self {
        let width = texture.width() as f32;
        let height = texture.height() as f32;
        let min = Vec2::new(
            coords.x * cell_size.x / width,
            coords.y * cell_size.y / height,
        );
        let max = Vec2::new(
            (coords.x + sprite_size.x) * cell_size.x / width,
            (coords.y + sprite_size.y) * cell_size.y / height,
        );
        Self::new(texture, min, max)
    }

    /// Underlying texture
    pub fn texture(&self) -> &Rc<Texture2D> {
        &self.texture
    }

    /// UV coordinates of the four corners
    pub fn tex_coords(&self) -> &[Vec2; 4] {
        &self.tex_coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;
    use approx::assert_relative_eq;

    #[test]
    fn test_white_texture_contents() {
        let context = RenderContext::new();
        let mut backend = HeadlessBackend::new();

        let white = Texture2D::white(&context);
        context.execute(&mut backend);

        let stored = backend.texture(white.handle()).unwrap();
        assert_eq!(stored.pixels, vec![0xff; 4]);
        assert_eq!((white.width(), white.height()), (1, 1));
    }

    #[test]
    fn test_identity_is_by_handle() {
        let context = RenderContext::new();
        let a = Texture2D::white(&context);
        let b = Texture2D::white(&context);
        assert_eq!(a, a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let context = RenderContext::new();
        let result = Texture2D::from_file(&context, "does/not/exist.png");
        assert!(matches!(result, Err(RenderError::TextureLoad { .. })));
        assert_eq!(context.pending_commands(), 0);
    }

    #[test]
    fn test_sub_texture_from_sprite_sheet_coords() {
        let context = RenderContext::new();
        let sheet = Rc::new(Texture2D::new(
            &context,
            TextureDescriptor {
                width: 256,
                height: 128,
                format: TextureFormat::Rgba8,
                filter: FilterMode::Nearest,
            },
        ));

        let sprite = SubTexture2D::from_coords(
            Rc::clone(&sheet),
            Vec2::new(1.0, 2.0),
            Vec2::new(32.0, 32.0),
            Vec2::new(2.0, 1.0),
        );

        let coords = sprite.tex_coords();
        assert_relative_eq!(coords[0], Vec2::new(0.125, 0.5));
        assert_relative_eq!(coords[2], Vec2::new(0.375, 0.75));
        assert_relative_eq!(coords[3], Vec2::new(0.125, 0.75));
        assert_eq!(sprite.texture().handle(), sheet.handle());
    }
}
