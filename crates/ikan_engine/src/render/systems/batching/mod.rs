//! Batch rendering system
//!
//! Quads and circles accumulated into vertex arenas and drawn with as few
//! indexed draw calls as the arena and texture slot limits allow.

pub mod batch_renderer;
pub mod texture_slots;
pub mod vertex;

pub use batch_renderer::{BatchRenderer, PrimitiveKind, SpriteVisual};
pub use texture_slots::TextureSlots;
pub use vertex::{quad_indices, CircleVertex, QuadVertex};
