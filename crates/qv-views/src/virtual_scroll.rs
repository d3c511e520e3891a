//! Row virtualization: materialize only the visible slice of a row set
//!
//! The virtualizer is headless. The table layer feeds it the scroll offset
//! and viewport extent it observes each frame and renders exactly the rows
//! the computed window names, at the absolute pixel offsets it provides.
//! Row height is uniform for this dataset shape, so the total scrollable
//! extent is a single multiplication.

use qv_core::ScrollAlign;

/// Extra rows materialized on each side of the visible range to absorb
/// scroll jitter without blanking.
pub const OVERSCAN_ROWS: usize = 5;

/// One materialized row descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualRow {
    pub index: usize,
    /// Absolute pixel offset of the row top within the full content extent.
    pub offset: f32,
    pub height: f32,
}

/// The contiguous range of rows currently materialized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowWindow {
    pub start_index: usize,
    /// Inclusive. Equal to `start_index` when zero or one row exists.
    pub end_index: usize,
    pub rows: Vec<VirtualRow>,
}

/// How a programmatic scroll transition should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// A resolved scroll target awaiting application by the scroll container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingScroll {
    pub offset: f32,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WindowKey {
    row_count: usize,
    offset_bits: u32,
    extent_bits: u32,
}

/// Computes row windows and programmatic scroll targets for a uniform-height
/// row set.
///
/// Window computation is memoized on `(row_count, offset, extent)`, so the
/// per-frame recompute triggered by high-frequency scroll events collapses
/// to a key comparison when nothing moved.
pub struct RowVirtualizer {
    row_count: usize,
    row_height: f32,
    overscan: usize,
    scroll_offset: f32,
    viewport_extent: f32,
    pending: Option<PendingScroll>,
    cache: Option<(WindowKey, RowWindow)>,
}

impl RowVirtualizer {
    pub fn new(row_height: f32) -> Self {
        Self {
            row_count: 0,
            row_height,
            overscan: OVERSCAN_ROWS,
            scroll_offset: 0.0,
            viewport_extent: 0.0,
            pending: None,
            cache: None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    /// Total scrollable extent in pixels.
    pub fn total_extent(&self) -> f32 {
        self.row_count as f32 * self.row_height
    }

    fn max_offset(&self) -> f32 {
        (self.total_extent() - self.viewport_extent).max(0.0)
    }

    /// Update the row count after a re-sort or re-filter.
    ///
    /// The scroll offset is kept; it only clamps when it now exceeds the
    /// new maximum, in which case an instant correction is queued for the
    /// scroll container.
    pub fn set_row_count(&mut self, row_count: usize) {
        if self.row_count == row_count {
            return;
        }
        self.row_count = row_count;
        self.cache = None;

        let max_offset = self.max_offset();
        if self.scroll_offset > max_offset {
            self.scroll_offset = max_offset;
            self.pending = Some(PendingScroll {
                offset: max_offset,
                behavior: ScrollBehavior::Instant,
            });
        }
    }

    /// Compute (or reuse) the window covering
    /// `[scroll_offset, scroll_offset + viewport_extent]` plus overscan.
    pub fn window(&mut self, scroll_offset: f32, viewport_extent: f32) -> &RowWindow {
        let offset = scroll_offset.max(0.0);
        self.scroll_offset = offset;
        self.viewport_extent = viewport_extent;

        let key = WindowKey {
            row_count: self.row_count,
            offset_bits: offset.to_bits(),
            extent_bits: viewport_extent.to_bits(),
        };
        if !matches!(&self.cache, Some((cached_key, _)) if *cached_key == key) {
            let window = self.compute_window(offset, viewport_extent);
            self.cache = Some((key, window));
        }
        &self.cache.as_ref().expect("window cache just populated").1
    }

    fn compute_window(&self, offset: f32, extent: f32) -> RowWindow {
        if self.row_count == 0 {
            return RowWindow::default();
        }

        let last_row = self.row_count - 1;
        let first_visible = ((offset / self.row_height).floor() as usize).min(last_row);
        // Index of the last row whose top is above the viewport bottom.
        let last_visible = (((offset + extent) / self.row_height).ceil() as usize)
            .saturating_sub(1)
            .min(last_row);

        let start_index = first_visible.saturating_sub(self.overscan);
        let end_index = (last_visible + self.overscan).min(last_row);

        let rows = (start_index..=end_index)
            .map(|index| VirtualRow {
                index,
                offset: index as f32 * self.row_height,
                height: self.row_height,
            })
            .collect();

        RowWindow {
            start_index,
            end_index,
            rows,
        }
    }

    /// Queue a programmatic scroll that brings `index` into view.
    ///
    /// An index outside `[0, row_count)` is a silent no-op (the row may
    /// legitimately have been filtered out); returns whether a scroll was
    /// queued.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign, behavior: ScrollBehavior) -> bool {
        if index >= self.row_count {
            return false;
        }

        let row_top = index as f32 * self.row_height;
        let target = match align {
            ScrollAlign::Start => row_top,
            ScrollAlign::Center => row_top + self.row_height * 0.5 - self.viewport_extent * 0.5,
            ScrollAlign::End => row_top + self.row_height - self.viewport_extent,
        };
        self.pending = Some(PendingScroll {
            offset: target.clamp(0.0, self.max_offset()),
            behavior,
        });
        true
    }

    /// Take the queued scroll target for the scroll container to apply.
    pub fn take_pending_scroll(&mut self) -> Option<PendingScroll> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW_H: f32 = 24.0;

    fn virtualizer(rows: usize, viewport: f32) -> RowVirtualizer {
        let mut v = RowVirtualizer::new(ROW_H);
        v.set_row_count(rows);
        // Prime the viewport extent the way the table layer does each frame.
        v.window(0.0, viewport);
        v
    }

    #[test]
    fn window_covers_every_intersecting_row() {
        let mut v = virtualizer(10_000, 480.0);
        let max_offset = v.total_extent() - 480.0;

        let mut offset = 0.0;
        while offset <= max_offset {
            let window = v.window(offset, 480.0).clone();
            for index in 0..10_000usize {
                let top = index as f32 * ROW_H;
                let bottom = top + ROW_H;
                let intersects = top < offset + 480.0 && bottom > offset;
                if intersects {
                    assert!(
                        index >= window.start_index && index <= window.end_index,
                        "row {index} visible at offset {offset} but outside window \
                         [{}, {}]",
                        window.start_index,
                        window.end_index
                    );
                }
            }
            offset += 3137.0; // stride with no relation to the row height
        }
    }

    #[test]
    fn overscan_extends_both_sides_within_bounds() {
        let mut v = virtualizer(1000, 240.0);
        let window = v.window(2400.0, 240.0).clone();

        // Rows 100..=109 are visible; overscan widens by 5 each side.
        assert_eq!(window.start_index, 95);
        assert_eq!(window.end_index, 114);

        // At the top there is nothing above to overscan into.
        let window = v.window(0.0, 240.0).clone();
        assert_eq!(window.start_index, 0);
    }

    #[test]
    fn row_offsets_are_absolute() {
        let mut v = virtualizer(100, 240.0);
        let window = v.window(480.0, 240.0).clone();
        for row in &window.rows {
            assert_eq!(row.offset, row.index as f32 * ROW_H);
            assert_eq!(row.height, ROW_H);
        }
    }

    #[test]
    fn scroll_to_center_contains_target_row() {
        // 10,000 rows, viewport showing 20: select sorted index 500.
        let mut v = virtualizer(10_000, 20.0 * ROW_H);
        assert!(v.scroll_to_index(500, ScrollAlign::Center, ScrollBehavior::Smooth));

        let pending = v.take_pending_scroll().expect("scroll queued");
        assert_eq!(pending.behavior, ScrollBehavior::Smooth);

        let window = v.window(pending.offset, 20.0 * ROW_H).clone();
        assert!(window.start_index <= 500 && 500 <= window.end_index);

        // Centered: roughly as many rows above as below.
        let above = 500 - window.start_index;
        let below = window.end_index - 500;
        assert!((above as i64 - below as i64).abs() <= 1);
    }

    #[test]
    fn scroll_alignments_clamp_to_valid_offsets() {
        let mut v = virtualizer(100, 240.0);

        v.scroll_to_index(0, ScrollAlign::Center, ScrollBehavior::Instant);
        assert_eq!(v.take_pending_scroll().unwrap().offset, 0.0);

        v.scroll_to_index(99, ScrollAlign::End, ScrollBehavior::Instant);
        let pending = v.take_pending_scroll().unwrap();
        assert_eq!(pending.offset, 100.0 * ROW_H - 240.0);

        v.scroll_to_index(40, ScrollAlign::Start, ScrollBehavior::Instant);
        assert_eq!(v.take_pending_scroll().unwrap().offset, 40.0 * ROW_H);
    }

    #[test]
    fn out_of_range_scroll_is_a_silent_no_op() {
        let mut v = virtualizer(100, 240.0);
        assert!(!v.scroll_to_index(100, ScrollAlign::Center, ScrollBehavior::Instant));
        assert!(v.take_pending_scroll().is_none());
    }

    #[test]
    fn shrinking_row_count_clamps_offset() {
        let mut v = virtualizer(1000, 240.0);
        v.window(20_000.0, 240.0);

        v.set_row_count(100);
        let pending = v.take_pending_scroll().expect("clamp correction queued");
        assert_eq!(pending.behavior, ScrollBehavior::Instant);
        assert_eq!(pending.offset, 100.0 * ROW_H - 240.0);
    }

    #[test]
    fn growing_row_count_keeps_offset() {
        let mut v = virtualizer(100, 240.0);
        v.window(480.0, 240.0);
        v.set_row_count(200);
        assert!(v.take_pending_scroll().is_none());
        let window = v.window(480.0, 240.0).clone();
        assert_eq!(window.start_index, 15);
    }

    #[test]
    fn empty_row_set_produces_empty_window() {
        let mut v = RowVirtualizer::new(ROW_H);
        let window = v.window(0.0, 240.0).clone();
        assert!(window.rows.is_empty());
        assert_eq!(v.total_extent(), 0.0);
    }

    #[test]
    fn identical_inputs_reuse_the_cached_window() {
        let mut v = virtualizer(1000, 240.0);
        let first = v.window(2400.0, 240.0).clone();
        let second = v.window(2400.0, 240.0).clone();
        assert_eq!(first, second);
    }
}
