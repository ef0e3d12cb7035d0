//! Graphics backend implementations
//!
//! Backends are chosen at initialization from a [`GraphicsApi`] value and
//! used through the [`GraphicsBackend`] trait from then on.

pub mod headless;

pub use headless::{DrawKind, DrawRecord, HeadlessBackend};

use crate::render::api::{GraphicsApi, GraphicsBackend};
use crate::render::{RenderError, RenderResult};

/// Create the backend for a graphics API
pub fn create_backend(api: GraphicsApi) -> RenderResult<Box<dyn GraphicsBackend>> {
    match api {
        GraphicsApi::Headless => Ok(Box::new(HeadlessBackend::new())),
        GraphicsApi::None => Err(RenderError::UnsupportedApi(api)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_api_is_rejected() {
        assert!(matches!(
            create_backend(GraphicsApi::None),
            Err(RenderError::UnsupportedApi(GraphicsApi::None))
        ));
    }

    #[test]
    fn test_headless_backend_reports_its_api() {
        let backend = create_backend(GraphicsApi::Headless).unwrap();
        assert_eq!(backend.api(), GraphicsApi::Headless);
        assert!(backend.as_any().downcast_ref::<HeadlessBackend>().is_some());
    }
}
