//! Infinite-scroll trigger and the line geometry it measures against.

use crate::pipeline::ViewMode;

/// Terminal lines per grid card, borders included.
pub const CARD_HEIGHT: usize = 6;
/// Terminal columns per grid card, borders included.
pub const CARD_WIDTH: usize = 30;

/// Vertical scroll position, in terminal lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollPosition {
    pub offset: usize,
    pub viewport: usize,
    pub content: usize,
}

impl ScrollPosition {
    pub fn remaining(&self) -> usize {
        self.content.saturating_sub(self.offset + self.viewport)
    }
}

/// Fires when fewer than `threshold` lines remain below the viewport.
#[derive(Debug, Clone, Copy)]
pub struct ScrollTrigger {
    threshold: usize,
}

impl ScrollTrigger {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn should_load(&self, pos: ScrollPosition) -> bool {
        pos.remaining() < self.threshold
    }
}

/// How products map onto terminal lines for the current view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub mode: ViewMode,
    /// Grid columns; ignored in list mode.
    pub columns: usize,
}

impl Geometry {
    pub fn new(mode: ViewMode, columns: usize) -> Self {
        Self {
            mode,
            columns: columns.max(1),
        }
    }

    /// Grid columns that fit in `inner_width`.
    pub fn columns_for_width(inner_width: usize) -> usize {
        (inner_width / CARD_WIDTH).max(1)
    }

    pub fn per_row(&self) -> usize {
        match self.mode {
            ViewMode::Grid => self.columns,
            ViewMode::List => 1,
        }
    }

    pub fn row_height(&self) -> usize {
        match self.mode {
            ViewMode::Grid => CARD_HEIGHT,
            ViewMode::List => 1,
        }
    }

    pub fn content_height(&self, count: usize) -> usize {
        count.div_ceil(self.per_row()) * self.row_height()
    }

    /// First line of the row holding item `index`.
    pub fn line_of(&self, index: usize) -> usize {
        (index / self.per_row()) * self.row_height()
    }

    /// Smallest adjustment of `offset` that keeps item `index` fully visible.
    pub fn follow(&self, index: usize, offset: usize, viewport: usize) -> usize {
        let top = self.line_of(index);
        let bottom = top + self.row_height();
        if top < offset {
            top
        } else if bottom > offset + viewport {
            // Align to a row boundary so grid cards are never cut at the top.
            let min_offset = bottom.saturating_sub(viewport);
            (min_offset.div_ceil(self.row_height()) * self.row_height()).min(top)
        } else {
            offset
        }
    }

    pub fn position(&self, count: usize, offset: usize, viewport: usize) -> ScrollPosition {
        ScrollPosition {
            offset,
            viewport,
            content: self.content_height(count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_saturates() {
        let pos = ScrollPosition { offset: 10, viewport: 20, content: 15 };
        assert_eq!(pos.remaining(), 0);
        let pos = ScrollPosition { offset: 0, viewport: 20, content: 50 };
        assert_eq!(pos.remaining(), 30);
    }

    #[test]
    fn test_trigger_threshold_is_strict() {
        let trigger = ScrollTrigger::new(4);
        assert!(!trigger.should_load(ScrollPosition { offset: 0, viewport: 10, content: 14 }));
        assert!(trigger.should_load(ScrollPosition { offset: 1, viewport: 10, content: 14 }));
        assert!(trigger.should_load(ScrollPosition { offset: 0, viewport: 20, content: 14 }));
    }

    #[test]
    fn test_zero_threshold_never_fires() {
        let trigger = ScrollTrigger::new(0);
        assert!(!trigger.should_load(ScrollPosition { offset: 100, viewport: 10, content: 5 }));
    }

    #[test]
    fn test_list_geometry() {
        let g = Geometry::new(ViewMode::List, 4);
        assert_eq!(g.per_row(), 1);
        assert_eq!(g.content_height(12), 12);
        assert_eq!(g.line_of(7), 7);
    }

    #[test]
    fn test_grid_geometry() {
        let g = Geometry::new(ViewMode::Grid, 3);
        assert_eq!(g.content_height(12), 4 * CARD_HEIGHT);
        assert_eq!(g.content_height(13), 5 * CARD_HEIGHT);
        assert_eq!(g.line_of(5), CARD_HEIGHT);
        assert_eq!(g.line_of(6), 2 * CARD_HEIGHT);
    }

    #[test]
    fn test_columns_for_width() {
        assert_eq!(Geometry::columns_for_width(10), 1);
        assert_eq!(Geometry::columns_for_width(CARD_WIDTH * 3 + 5), 3);
        assert_eq!(Geometry::new(ViewMode::Grid, 0).columns, 1);
    }

    #[test]
    fn test_follow_list() {
        let g = Geometry::new(ViewMode::List, 1);
        assert_eq!(g.follow(3, 0, 10), 0);
        assert_eq!(g.follow(10, 0, 10), 1);
        assert_eq!(g.follow(2, 5, 10), 2);
    }

    #[test]
    fn test_follow_grid_aligns_to_rows() {
        let g = Geometry::new(ViewMode::Grid, 2);
        // viewport fits 2 full rows + 2 lines
        let viewport = 2 * CARD_HEIGHT + 2;
        assert_eq!(g.follow(3, 0, viewport), 0);
        // item 4 is row 2: bottom = 18, min offset = 4, aligned up to 6
        assert_eq!(g.follow(4, 0, viewport), CARD_HEIGHT);
        assert_eq!(g.follow(0, CARD_HEIGHT, viewport), 0);
    }
}
