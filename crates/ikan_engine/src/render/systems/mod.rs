//! Active rendering systems
//!
//! Stateful renderers that turn draw requests into GPU commands: the quad
//! and circle batch renderer and the text renderer.

pub mod batching;
pub mod text;
