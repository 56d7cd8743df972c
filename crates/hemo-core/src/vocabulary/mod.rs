//! Cell-class vocabulary and per-image count maps.
//!
//! - `class`: the closed [`CellClass`] enumeration and label parsing
//! - `counts`: [`ClassCounts`], the count map produced for each image

mod class;
mod counts;

pub use class::CellClass;
pub use counts::ClassCounts;
