/// Axis-aligned face bounding box in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Builds a box from detector corner coordinates
    /// `(left, top, right, bottom)`.
    pub fn from_corners(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: left,
            y: top,
            w: right - left,
            h: bottom - top,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.w as f64 / 2.0,
            self.y as f64 + self.h as f64 / 2.0,
        )
    }

    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.w).min(other.x + other.w);
        let iy2 = (self.y + self.h).min(other.y + other.h);

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.w as f64 * self.h as f64;
        let area_b = other.w as f64 * other.h as f64;
        inter / (area_a + area_b - inter)
    }

    /// True when any edge coordinate differs from `other` by more than
    /// `jitter_px`. With a jitter of zero, any change counts as movement.
    pub fn moved_beyond(&self, other: &BoundingBox, jitter_px: i32) -> bool {
        (self.x - other.x).abs() > jitter_px
            || (self.y - other.y).abs() > jitter_px
            || (self.w - other.w).abs() > jitter_px
            || (self.h - other.h).abs() > jitter_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    // ── IoU ──────────────────────────────────────────────────────────

    #[test]
    fn test_iou_identical_boxes() {
        let a = BoundingBox::new(10, 10, 100, 100);
        assert_relative_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = BoundingBox::new(0, 0, 50, 50);
        let b = BoundingBox::new(100, 100, 50, 50);
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // a: [0,0]-[100,100], b: [50,0]-[150,100]
        // intersection: 50*100 = 5000, union: 15000
        let a = BoundingBox::new(0, 0, 100, 100);
        let b = BoundingBox::new(50, 0, 100, 100);
        assert_relative_eq!(a.iou(&b), 5000.0 / 15000.0);
    }

    #[test]
    fn test_iou_contained() {
        let a = BoundingBox::new(0, 0, 100, 100);
        let b = BoundingBox::new(25, 25, 50, 50);
        assert_relative_eq!(a.iou(&b), 2500.0 / 10000.0);
    }

    #[test]
    fn test_iou_touching_edges() {
        let a = BoundingBox::new(0, 0, 50, 50);
        let b = BoundingBox::new(50, 0, 50, 50);
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    #[rstest]
    #[case::zero_width(BoundingBox::new(0, 0, 0, 100), 0.0)]
    #[case::zero_height(BoundingBox::new(0, 0, 100, 0), 0.0)]
    fn test_iou_degenerate(#[case] a: BoundingBox, #[case] expected: f64) {
        let b = BoundingBox::new(0, 0, 50, 50);
        assert_relative_eq!(a.iou(&b), expected);
    }

    // ── Corners and center ───────────────────────────────────────────

    #[test]
    fn test_from_corners() {
        let b = BoundingBox::from_corners(2, 3, 10, 9);
        assert_eq!(b, BoundingBox::new(2, 3, 8, 6));
    }

    #[test]
    fn test_center() {
        let b = BoundingBox::new(0, 0, 10, 20);
        let (cx, cy) = b.center();
        assert_relative_eq!(cx, 5.0);
        assert_relative_eq!(cy, 10.0);
    }

    // ── Movement / jitter ────────────────────────────────────────────

    #[test]
    fn test_moved_beyond_zero_jitter_detects_any_change() {
        let a = BoundingBox::new(2, 2, 4, 4);
        let b = BoundingBox::new(3, 2, 4, 4);
        assert!(a.moved_beyond(&b, 0));
        assert!(!a.moved_beyond(&a, 0));
    }

    #[rstest]
    #[case::within(BoundingBox::new(3, 2, 4, 4), 1, false)]
    #[case::at_edge(BoundingBox::new(4, 2, 4, 4), 1, true)]
    #[case::size_change(BoundingBox::new(2, 2, 7, 4), 2, true)]
    fn test_moved_beyond_jitter_threshold(
        #[case] moved: BoundingBox,
        #[case] jitter: i32,
        #[case] expected: bool,
    ) {
        let base = BoundingBox::new(2, 2, 4, 4);
        assert_eq!(base.moved_beyond(&moved, jitter), expected);
    }
}
