//! Space-filling-curve orderings used to pack a tree.

mod hilbert;
mod r#trait;
mod util;
mod zorder;

pub use hilbert::HilbertSort;
pub use r#trait::{Sort, SortParams};
pub use zorder::ZOrderSort;
