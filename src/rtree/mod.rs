//! An immutable, bulk-loaded RTree.
//!
//! Objects are sorted along a space-filling curve, packed bottom-up into nodes that hold
//! between [`RTreeOptions::min_entries`] and [`RTreeOptions::max_entries`] entries, and then
//! queried with window search or best-first nearest neighbor search through [`RTreeIndex`].

pub mod builder;
pub mod index;
pub mod options;
pub mod records;
pub mod rect;
pub mod sort;
pub mod r#trait;
pub mod traversal;
mod util;

pub use builder::RTreeBuilder;
pub use index::{Entry, EntryRef, Node, RTree};
pub use options::RTreeOptions;
pub use r#trait::RTreeIndex;
pub use rect::Rect;
pub use records::NodeRecord;
pub use sort::{HilbertSort, ZOrderSort};
pub use traversal::NodeRef;

#[cfg(test)]
mod test;
