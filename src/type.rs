use std::fmt::Debug;

use num_traits::{AsPrimitive, Bounded, Num, NumCast};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Distances are always
/// computed in `f64`, so every coordinate type must convert losslessly enough through
/// [`AsPrimitive<f64>`].
pub trait IndexableNum:
    private::Sealed
    + Num
    + NumCast
    + AsPrimitive<f64>
    + PartialOrd
    + Debug
    + Send
    + Sync
    + Bounded
    + Serialize
    + DeserializeOwned
{
}

impl IndexableNum for i8 {}
impl IndexableNum for u8 {}
impl IndexableNum for i16 {}
impl IndexableNum for u16 {}
impl IndexableNum for i32 {}
impl IndexableNum for u32 {}
impl IndexableNum for f32 {}
impl IndexableNum for f64 {}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for u16 {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
