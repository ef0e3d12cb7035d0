//! Renderer statistics
//!
//! Counters accumulated by the batch and text renderers over a frame. There
//! is one set per thread, matching the single render thread the renderers
//! run on; the frame loop resets it once per frame.

use std::cell::Cell;

/// Per-frame draw counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStatistics {
    /// Draw calls issued
    pub draw_calls: u32,
    /// Quads accepted
    pub quad_count: u32,
    /// Circles accepted
    pub circle_count: u32,
    /// Glyphs drawn
    pub glyph_count: u32,
}

impl RendererStatistics {
    /// Vertices written by quads and circles (4 each) and glyphs (6 each)
    pub fn vertex_count(&self) -> u32 {
        (self.quad_count + self.circle_count) * 4 + self.glyph_count * 6
    }

    /// Indices consumed by quads and circles
    pub fn index_count(&self) -> u32 {
        (self.quad_count + self.circle_count) * 6
    }
}

thread_local! {
    static STATISTICS: Cell<RendererStatistics> = Cell::new(RendererStatistics::default());
}

/// Snapshot of the current counters
pub fn statistics() -> RendererStatistics {
    STATISTICS.with(Cell::get)
}

/// Zero every counter
pub fn reset_statistics() {
    STATISTICS.with(|stats| stats.set(RendererStatistics::default()));
}

pub(crate) fn record(update: impl FnOnce(&mut RendererStatistics)) {
    STATISTICS.with(|stats| {
        let mut current = stats.get();
        update(&mut current);
        stats.set(current);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_reset() {
        reset_statistics();
        record(|stats| {
            stats.quad_count += 2;
            stats.glyph_count += 1;
            stats.draw_calls += 1;
        });

        let stats = statistics();
        assert_eq!(stats.vertex_count(), 2 * 4 + 6);
        assert_eq!(stats.index_count(), 12);

        reset_statistics();
        assert_eq!(statistics(), RendererStatistics::default());
    }
}
