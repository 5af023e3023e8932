//! Masonry grid layout engine.
//!
//! Greedy shortest-column-first packing: each item extends the currently
//! shortest column (leftmost wins ties), so earlier placements never move when
//! items are appended and the whole pass reruns. O(n * columns), recomputed
//! wholesale on every invalidation — item counts are tens to low hundreds, so
//! incremental patching is not worth the bookkeeping.
//!
//! Pure function of its inputs: no network, no cache, no hidden state.

/// Columns when the viewport is taller than wide.
pub const PORTRAIT_COLUMNS: usize = 3;
/// Columns when the viewport is wider than tall.
pub const LANDSCAPE_COLUMNS: usize = 5;

/// Loading-indicator footer placed after the tallest column.
pub const FOOTER_HEIGHT: f32 = 48.0;

const DEFAULT_CELL_PADDING: f32 = 8.0;

/// Axis-aligned rectangle in grid coordinates (origin top-left, y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }
}

/// Computed placement for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemAttributes {
    pub frame: Rect,
    /// Index of the page the item belongs to.
    pub section: usize,
    /// Index of the item within its page.
    pub item: usize,
}

/// Result of one layout pass: item frames in input order, the footer frame,
/// and the total content height.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub items: Vec<ItemAttributes>,
    pub footer: Rect,
    pub content_height: f32,
}

/// The layout engine. Holds only the fixed styling constants; everything that
/// varies per pass (items, column count, width) is an explicit argument.
#[derive(Debug, Clone, Copy)]
pub struct GridLayoutEngine {
    pub cell_padding: f32,
    pub footer_height: f32,
}

impl Default for GridLayoutEngine {
    fn default() -> Self {
        Self {
            cell_padding: DEFAULT_CELL_PADDING,
            footer_height: FOOTER_HEIGHT,
        }
    }
}

impl GridLayoutEngine {
    /// Column count policy: 5 in landscape, 3 in portrait.
    pub fn column_count_for(viewport_width: f32, viewport_height: f32) -> usize {
        if viewport_width > viewport_height {
            LANDSCAPE_COLUMNS
        } else {
            PORTRAIT_COLUMNS
        }
    }

    /// Compute frames for `sections` (aspect ratios as height/width, grouped
    /// per page, in display order).
    ///
    /// Column width is `content_width / column_count`; cells are inset by the
    /// padding. Non-finite or non-positive ratios fall back to 1 (square).
    pub fn compute(
        &self,
        sections: &[Vec<f32>],
        column_count: usize,
        content_width: f32,
    ) -> GridLayout {
        let column_count = column_count.max(1);
        let column_width = content_width / column_count as f32;
        let cell_width = column_width - self.cell_padding;
        let left_inset = self.cell_padding * 0.5;

        let mut y_offset = vec![0.0f32; column_count];
        let mut content_height = 0.0f32;
        let mut items = Vec::with_capacity(sections.iter().map(Vec::len).sum());

        for (section, ratios) in sections.iter().enumerate() {
            for (item, &ratio) in ratios.iter().enumerate() {
                let ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
                let cell_height = cell_width * ratio;

                // Shortest column; leftmost wins ties.
                let mut column = 0;
                for (i, &offset) in y_offset.iter().enumerate() {
                    if offset < y_offset[column] {
                        column = i;
                    }
                }

                let frame = Rect {
                    x: left_inset + column as f32 * column_width,
                    y: self.cell_padding + y_offset[column],
                    width: cell_width,
                    height: cell_height,
                };
                y_offset[column] += cell_height + self.cell_padding;
                content_height = content_height.max(y_offset[column]);

                items.push(ItemAttributes { frame, section, item });
            }
        }

        let footer = Rect {
            x: 0.0,
            y: content_height,
            width: content_width,
            height: self.footer_height,
        };

        GridLayout {
            items,
            footer,
            content_height: content_height + self.footer_height,
        }
    }
}
