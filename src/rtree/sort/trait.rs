#[cfg(feature = "rayon")]
use rayon::slice::ParallelSliceMut;

use crate::r#type::IndexableNum;
use crate::rtree::index::Entry;
use crate::rtree::rect::Rect;
use crate::rtree::sort::util::grid_coords;

/// The extent of all items being packed, used to map item centres onto the curve grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortParams<N: IndexableNum> {
    pub(crate) extent: Rect<N>,
}

impl<N: IndexableNum> SortParams<N> {
    pub fn new(extent: Rect<N>) -> Self {
        Self { extent }
    }

    pub fn extent(&self) -> &Rect<N> {
        &self.extent
    }

    /// The curve code of a rectangle under the ordering `S`.
    pub fn key<S: Sort<N> + ?Sized>(&self, rect: &Rect<N>) -> u32 {
        let (x, y) = grid_coords(self, rect);
        S::curve_value(x, y)
    }
}

/// An ordering of items along a space-filling curve.
///
/// Implementors only supply the curve itself; each item's centre is first mapped onto a
/// `65536 x 65536` grid spanning the extent of the whole dataset.
pub trait Sort<N: IndexableNum> {
    /// Map a grid cell to its position along the curve.
    fn curve_value(x: u32, y: u32) -> u32;

    /// Stably sort entries by the curve code of their centres.
    fn sort(params: &SortParams<N>, entries: &mut [Entry<N>]) {
        #[cfg(feature = "rayon")]
        entries.par_sort_by_cached_key(|entry| params.key::<Self>(&entry.rect));

        #[cfg(not(feature = "rayon"))]
        entries.sort_by_cached_key(|entry| params.key::<Self>(&entry.rect));
    }
}
