//! Minimum bounding rectangles and the geometric predicates the tree is built on.

use geo_traits::{CoordTrait, RectTrait};
use serde::{Deserialize, Serialize};

use crate::error::{PackedRTreeError, Result};
use crate::r#type::IndexableNum;

/// An axis-aligned bounding rectangle with closed intervals on both axes.
///
/// A rectangle whose low and high coordinates are equal on both axes is a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "N: IndexableNum")]
pub struct Rect<N: IndexableNum> {
    min_x: N,
    min_y: N,
    max_x: N,
    max_y: N,
}

impl<N: IndexableNum> Rect<N> {
    /// Create a rectangle without validating it.
    ///
    /// Use [`Rect::try_new`] for untrusted coordinates. Every public entry point of the tree
    /// validates rectangles before using them, so an inverted rectangle created here is rejected
    /// later rather than silently indexed.
    pub fn new(min_x: N, min_y: N, max_x: N, max_y: N) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create a rectangle, rejecting inverted or non-finite bounds.
    pub fn try_new(min_x: N, min_y: N, max_x: N, max_y: N) -> Result<Self> {
        let rect = Self::new(min_x, min_y, max_x, max_y);
        rect.validate()?;
        Ok(rect)
    }

    /// Create a degenerate rectangle covering a single point.
    pub fn from_point(x: N, y: N) -> Self {
        Self::new(x, y, x, y)
    }

    /// The minimal rectangle enclosing all of the given points.
    pub fn from_points(points: impl IntoIterator<Item = (N, N)>) -> Result<Self> {
        Self::union_all(points.into_iter().map(|(x, y)| Self::from_point(x, y)))
    }

    /// The minimal rectangle enclosing all of the given rectangles.
    ///
    /// Fails with [`PackedRTreeError::InvalidGeometry`] when the input is empty.
    pub fn union_all(rects: impl IntoIterator<Item = Self>) -> Result<Self> {
        let mut rects = rects.into_iter();
        let first = rects.next().ok_or_else(|| {
            PackedRTreeError::InvalidGeometry("union of an empty set of rectangles".to_string())
        })?;
        Ok(rects.fold(first, |acc, rect| acc.union(&rect)))
    }

    /// Returns an error if `low > high` on an axis or any coordinate is not finite.
    ///
    /// NaN fails the ordering comparisons and is rejected as well.
    pub fn validate(&self) -> Result<()> {
        let coords: [f64; 4] = [
            self.min_x.as_(),
            self.min_y.as_(),
            self.max_x.as_(),
            self.max_y.as_(),
        ];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(PackedRTreeError::InvalidGeometry(format!(
                "non-finite coordinate in {:?}",
                self
            )));
        }
        let ordered_x = self.min_x <= self.max_x;
        let ordered_y = self.min_y <= self.max_y;
        if !ordered_x || !ordered_y {
            return Err(PackedRTreeError::InvalidGeometry(format!(
                "low exceeds high in {:?}",
                self
            )));
        }
        Ok(())
    }

    pub fn min_x(&self) -> N {
        self.min_x
    }

    pub fn min_y(&self) -> N {
        self.min_y
    }

    pub fn max_x(&self) -> N {
        self.max_x
    }

    pub fn max_y(&self) -> N {
        self.max_y
    }

    /// Returns `true` if the rectangle degenerates to a single point.
    pub fn is_point(&self) -> bool {
        self.min_x == self.max_x && self.min_y == self.max_y
    }

    /// The centre of the rectangle in `f64`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x.as_() + self.max_x.as_()) / 2.,
            (self.min_y.as_() + self.max_y.as_()) / 2.,
        )
    }

    /// The minimal rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: partial_min(self.min_x, other.min_x),
            min_y: partial_min(self.min_y, other.min_y),
            max_x: partial_max(self.max_x, other.max_x),
            max_y: partial_max(self.max_y, other.max_y),
        }
    }

    /// Returns `true` if the two rectangles overlap or touch.
    ///
    /// Both rectangles are closed, so sharing only an edge or a corner counts as intersecting.
    pub fn intersects(&self, other: &Self) -> bool {
        if self.max_x < other.min_x {
            return false;
        }

        if self.max_y < other.min_y {
            return false;
        }

        if self.min_x > other.max_x {
            return false;
        }

        if self.min_y > other.max_y {
            return false;
        }

        true
    }

    /// Euclidean distance from a point to the nearest point of this rectangle, or `0.` if the
    /// point lies inside or on the boundary.
    ///
    /// This is a lower bound on the distance from the point to anything contained in the
    /// rectangle, which is what makes best-first nearest neighbor search exact.
    #[inline]
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        self.distance_squared_to_point(x, y).sqrt()
    }

    #[inline]
    fn distance_squared_to_point(&self, x: f64, y: f64) -> f64 {
        let dx = axis_dist(x, self.min_x.as_(), self.max_x.as_());
        let dy = axis_dist(y, self.min_y.as_(), self.max_y.as_());
        dx * dx + dy * dy
    }
}

/// 1D distance from a value to a range.
#[inline]
fn axis_dist(k: f64, min: f64, max: f64) -> f64 {
    (min - k).max(0.).max(k - max)
}

#[inline]
fn partial_min<N: IndexableNum>(a: N, b: N) -> N {
    if b < a {
        b
    } else {
        a
    }
}

#[inline]
fn partial_max<N: IndexableNum>(a: N, b: N) -> N {
    if b > a {
        b
    } else {
        a
    }
}

/// A single coordinate.
///
/// Used in the implementation of RectTrait for Rect.
pub struct Coord<N: IndexableNum> {
    x: N,
    y: N,
}

impl<N: IndexableNum> CoordTrait for Coord<N> {
    type T = N;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Invalid index of coord"),
        }
    }
}

impl<N: IndexableNum> RectTrait for Rect<N> {
    type T = N;
    type CoordType<'a>
        = Coord<N>
    where
        Self: 'a;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn min(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.min_x,
            y: self.min_y,
        }
    }

    fn max(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.max_x,
            y: self.max_y,
        }
    }
}

/// Copy any [`RectTrait`] implementation into a [`Rect`].
pub(crate) fn rect_from_trait<N: IndexableNum>(rect: &impl RectTrait<T = N>) -> Rect<N> {
    Rect::new(
        rect.min().x(),
        rect.min().y(),
        rect.max().x(),
        rect.max().y(),
    )
}
