#![doc = include_str!("../README.md")]

mod error;
pub mod input;
pub mod rtree;
mod r#type;

pub use error::{PackedRTreeError, Result};
pub use r#type::IndexableNum;

#[cfg(test)]
pub(crate) mod test;
