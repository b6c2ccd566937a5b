//! Plain data types shared across the embryoid workspace.

pub mod data;

pub use data::agent::*;
pub use data::vector::*;
