use crate::r#type::IndexableNum;
use crate::rtree::sort::util::spread_bits;
use crate::rtree::sort::Sort;

/// Z-order (Morton) packing.
///
/// The code interleaves the bits of the two grid coordinates, `x` in the even bit positions and
/// `y` in the odd ones. Sorting by it clusters items that are close in space without any
/// nearest-neighbor grouping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZOrderSort;

impl<N: IndexableNum> Sort<N> for ZOrderSort {
    #[inline]
    fn curve_value(x: u32, y: u32) -> u32 {
        morton(x, y)
    }
}

#[inline]
pub(crate) fn morton(x: u32, y: u32) -> u32 {
    (spread_bits(y) << 1) | spread_bits(x)
}
