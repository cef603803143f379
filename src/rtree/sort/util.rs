use crate::r#type::IndexableNum;
use crate::rtree::rect::Rect;
use crate::rtree::sort::SortParams;

const GRID_MAX: f64 = ((1 << 16) - 1) as f64;

/// Map the centre of `rect` into the 16-bit grid spanned by the dataset extent.
///
/// An axis on which the whole dataset has zero width maps every item to 0.
#[inline]
pub(super) fn grid_coords<N: IndexableNum>(params: &SortParams<N>, rect: &Rect<N>) -> (u32, u32) {
    let extent = &params.extent;
    let (center_x, center_y) = rect.center();
    let x = grid_axis(center_x, extent.min_x().as_(), extent.max_x().as_());
    let y = grid_axis(center_y, extent.min_y().as_(), extent.max_y().as_());
    (x, y)
}

#[inline]
fn grid_axis(value: f64, min: f64, max: f64) -> u32 {
    let width = max - min;
    if width <= 0. {
        return 0;
    }
    (GRID_MAX * (value - min) / width).floor().clamp(0., GRID_MAX) as u32
}

/// Spread the low 16 bits of `v` so that they occupy the even bit positions.
#[inline]
pub(super) fn spread_bits(v: u32) -> u32 {
    let mut v = v & 0xFFFF;
    v = (v | (v << 8)) & 0x00FF_00FF;
    v = (v | (v << 4)) & 0x0F0F_0F0F;
    v = (v | (v << 2)) & 0x3333_3333;
    v = (v | (v << 1)) & 0x5555_5555;
    v
}
