//! Row-wrapping flow placement used by container nodes.
//!
//! ```text
//! +------------------------------------+
//! | [ 6c        ][ 3c  ][ 3c  ]        |  row 0: height = tallest
//! | [ 4c   ]   [ offset-1c + 4c ]      |  row 1
//! | [ 12c                            ] |  row 2
//! +------------------------------------+
//! ```
//!
//! A slot that would overflow the available width starts a new row.

/// Tolerance for column sums that land a hair past the edge.
const OVERFLOW_EPSILON: f32 = 0.01;

/// Incremental flow cursor.
///
/// Placement is split in two steps because a child's height is only known
/// after it has been laid out at its final position.
#[derive(Debug, Clone)]
pub struct FlowLayout {
    origin_x: f32,
    origin_y: f32,
    available_width: f32,
    cursor_x: f32,
    cursor_y: f32,
    row_height: f32,
    pending_y_offset: f32,
}

impl FlowLayout {
    /// Creates a flow starting at the given origin.
    #[must_use]
    pub const fn new(origin_x: f32, origin_y: f32, available_width: f32) -> Self {
        Self {
            origin_x,
            origin_y,
            available_width,
            cursor_x: 0.0,
            cursor_y: 0.0,
            row_height: 0.0,
            pending_y_offset: 0.0,
        }
    }

    /// Reserves horizontal space and returns the slot's top-left corner.
    pub fn place(&mut self, width: f32, x_offset: f32, y_offset: f32) -> (f32, f32) {
        let needed = self.cursor_x + x_offset + width;
        if self.cursor_x > 0.0 && needed > self.available_width + OVERFLOW_EPSILON {
            self.cursor_y += self.row_height;
            self.cursor_x = 0.0;
            self.row_height = 0.0;
        }
        let x = self.origin_x + self.cursor_x + x_offset;
        let y = self.origin_y + self.cursor_y + y_offset;
        self.cursor_x += x_offset + width;
        self.pending_y_offset = y_offset;
        (x, y)
    }

    /// Records the height of the slot placed last.
    pub fn finish(&mut self, height: f32) {
        self.row_height = self.row_height.max(self.pending_y_offset + height);
        self.pending_y_offset = 0.0;
    }

    /// Total height used so far.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.cursor_y + self.row_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;

    #[derive(Clone, Copy, Default)]
    struct FlowSlot {
        width: f32,
        height: f32,
        x_offset: f32,
        y_offset: f32,
    }

    fn slot(width: f32, height: f32) -> FlowSlot {
        FlowSlot {
            width,
            height,
            ..FlowSlot::default()
        }
    }

    fn arrange(bounds: Rect, slots: &[FlowSlot]) -> (Vec<Rect>, f32) {
        let mut flow = FlowLayout::new(bounds.x, bounds.y, bounds.width);
        let mut rects = Vec::with_capacity(slots.len());
        for slot in slots {
            let (x, y) = flow.place(slot.width, slot.x_offset, slot.y_offset);
            flow.finish(slot.height);
            rects.push(Rect::new(x, y, slot.width, slot.height));
        }
        (rects, flow.height())
    }

    #[test]
    fn test_fills_rows_then_wraps() {
        let bounds = Rect::new(10.0, 20.0, 300.0, 1000.0);
        let (rects, height) =
            arrange(bounds, &[slot(150.0, 30.0), slot(150.0, 50.0), slot(200.0, 40.0)]);

        assert_eq!(rects[0], Rect::new(10.0, 20.0, 150.0, 30.0));
        assert_eq!(rects[1], Rect::new(160.0, 20.0, 150.0, 50.0));
        // Third slot wraps below the tallest of row 0.
        assert_eq!(rects[2], Rect::new(10.0, 70.0, 200.0, 40.0));
        assert!((height - 90.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_offsets_shift_slot() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
        let offset = FlowSlot {
            width: 100.0,
            height: 20.0,
            x_offset: 50.0,
            y_offset: 5.0,
        };
        let (rects, height) = arrange(bounds, &[slot(100.0, 20.0), offset]);

        assert_eq!(rects[1], Rect::new(150.0, 5.0, 100.0, 20.0));
        assert!((height - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_oversized_first_slot_stays_on_row() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let (rects, _) = arrange(bounds, &[slot(140.0, 10.0), slot(50.0, 10.0)]);
        assert_eq!(rects[0].y, 0.0);
        assert_eq!(rects[1], Rect::new(0.0, 10.0, 50.0, 10.0));
    }

    #[test]
    fn test_twelve_columns_fit_one_row() {
        let width = 1000.0;
        let column = width / 12.0;
        let slots = vec![slot(column, 10.0); 12];
        let (rects, height) = arrange(Rect::new(0.0, 0.0, width, 0.0), &slots);
        assert!(rects.iter().all(|r| r.y == 0.0));
        assert!((height - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_flow_has_no_height() {
        let (rects, height) = arrange(Rect::new(0.0, 0.0, 100.0, 100.0), &[]);
        assert!(rects.is_empty());
        assert!(height.abs() < f32::EPSILON);
    }
}
