use ndarray::ArrayView3;
use thiserror::Error;

use crate::shared::bbox::BoundingBox;
use crate::shared::constants::BYTES_PER_PIXEL;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "frame data length {len} does not match {width}x{height} RGB8 ({expected} bytes expected)"
)]
pub struct FrameFormatError {
    pub width: u32,
    pub height: u32,
    pub len: usize,
    pub expected: usize,
}

/// One camera frame: contiguous RGB8 bytes in row-major order, no row
/// padding.
///
/// Format conversion happens at the submission boundary only; the
/// tracking layer treats pixel data as opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            byte_len(width, height),
            "data length must equal 3 * width * height"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// A zero-sized placeholder, typically grown later via [`assign`].
    ///
    /// [`assign`]: Frame::assign
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Replaces this frame's contents, reallocating only when the
    /// dimensions changed.
    pub fn assign(&mut self, width: u32, height: u32, data: &[u8]) {
        debug_assert_eq!(
            data.len(),
            byte_len(width, height),
            "data length must equal 3 * width * height"
        );
        self.width = width;
        self.height = height;
        self.data.resize(data.len(), 0);
        self.data.copy_from_slice(data);
    }

    /// Copies out the sub-rectangle covered by `bbox`, clamped to the
    /// frame bounds. Returns an empty frame when nothing overlaps.
    pub fn crop(&self, bbox: BoundingBox) -> Frame {
        let x0 = bbox.x.max(0) as u32;
        let y0 = bbox.y.max(0) as u32;
        let x1 = (bbox.x + bbox.w).clamp(0, self.width as i32) as u32;
        let y1 = (bbox.y + bbox.h).clamp(0, self.height as i32) as u32;
        if x0 >= x1 || y0 >= y1 {
            return Frame::empty();
        }

        let w = x1 - x0;
        let h = y1 - y0;
        let row_bytes = w as usize * BYTES_PER_PIXEL;
        let stride = self.width as usize * BYTES_PER_PIXEL;
        let mut out = Vec::with_capacity(row_bytes * h as usize);
        for row in y0..y1 {
            let start = row as usize * stride + x0 as usize * BYTES_PER_PIXEL;
            out.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        Frame::new(out, w, h)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, BYTES_PER_PIXEL),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }
}

/// Byte length of a `width`x`height` RGB8 frame.
pub fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}
