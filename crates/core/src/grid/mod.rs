//! Dense voxel grid addressing

pub mod index;

pub use index::{GridCoord, GridIndex};
