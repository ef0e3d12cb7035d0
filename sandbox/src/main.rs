//! Sandbox application
//!
//! Drives a few headless frames through the batch renderer: a grid of quads
//! and rings using a handful of textures, plus a text label when a font is
//! given.
//!
//! ```text
//! sandbox [renderer.toml|renderer.ron] [font.ttf]
//! ```

use std::rc::Rc;

use ikan_engine::foundation::logging;
use ikan_engine::prelude::*;
use ikan_engine::render::api::TextureFormat;

const FRAMES: u32 = 3;
const GRID: i32 = 40;

fn checkerboard(renderer: &Renderer, tint: [u8; 3]) -> Rc<Texture2D> {
    let size = 8u32;
    let pixels: Vec<u8> = (0..size * size)
        .flat_map(|i| {
            let dark = ((i % size) + (i / size)) % 2 == 0;
            let shade = |c: u8| if dark { c / 2 } else { c };
            [shade(tint[0]), shade(tint[1]), shade(tint[2]), 0xff]
        })
        .collect();
    Rc::new(Texture2D::from_pixels(renderer.context(), size, size, TextureFormat::Rgba8, &pixels))
}

fn load_config(path: Option<&str>) -> RendererConfig {
    let Some(path) = path else {
        return RendererConfig::default();
    };
    match RendererConfig::load_from_file(path) {
        Ok(config) => {
            log::info!("Loaded renderer config from '{}'", path);
            config
        }
        Err(error) => {
            log::warn!("Could not load '{}': {}; using defaults", path, error);
            RendererConfig::default()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str));
    log::info!("Starting sandbox with {:?}", config);

    let mut renderer = Renderer::new(config)?;
    let mut batch = BatchRenderer::new(&renderer);

    let mut text = match args.get(1) {
        Some(font) => {
            let mut text = TextRenderer::new(&renderer);
            text.load_font(font)?;
            Some(text)
        }
        None => None,
    };

    let textures = [
        checkerboard(&renderer, [0xff, 0x40, 0x40]),
        checkerboard(&renderer, [0x40, 0xff, 0x40]),
        checkerboard(&renderer, [0x40, 0x40, 0xff]),
        batch.load_texture_or_white("assets/textures/missing.png"),
    ];

    let half = GRID as f32 / 2.0;
    let camera = Mat4::orthographic(-half, half, -half, half, -1.0, 1.0);

    for frame in 0..FRAMES {
        reset_statistics();
        batch.begin_batch(&camera, &Mat4::identity());

        for y in 0..GRID {
            for x in 0..GRID {
                let object_id = y * GRID + x;
                let position = Vec3::new(x as f32 - half + 0.5, y as f32 - half + 0.5, 0.0);
                let transform = Transform::from_position_scale(position, Vec3::new(0.9, 0.9, 1.0)).to_matrix();

                let visual = match object_id % 3 {
                    0 => SpriteVisual::Color(Vec4::new(x as f32 / GRID as f32, y as f32 / GRID as f32, 0.5, 1.0)),
                    _ => SpriteVisual::Texture {
                        texture: Rc::clone(&textures[object_id as usize % textures.len()]),
                        tint: Vec4::new(1.0, 1.0, 1.0, 1.0),
                        tiling_factor: 1.0 + frame as f32,
                    },
                };

                if (x + y) % 5 == 0 {
                    batch.draw_circle_sprite(&transform, &visual, 0.2, 0.01, object_id);
                } else {
                    batch.draw_sprite(&transform, &visual, object_id);
                }
            }
        }
        batch.end_batch();

        if let Some(text) = text.as_mut() {
            text.begin_batch(&camera);
            text.render_text_at(&format!("frame {frame}"), Vec2::new(-half + 1.0, half - 2.0), 0.02, Vec4::new(1.0, 1.0, 1.0, 1.0), -1);
        }

        renderer.wait_and_render();

        let stats = statistics();
        log::info!(
            "Frame {}: {} draw calls, {} quads, {} circles, {} glyphs, {} vertices, {} indices",
            frame,
            stats.draw_calls,
            stats.quad_count,
            stats.circle_count,
            stats.glyph_count,
            stats.vertex_count(),
            stats.index_count()
        );
    }

    log::info!("Sandbox finished after {} frames", renderer.frame_count());
    Ok(())
}
