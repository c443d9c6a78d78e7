//! Portfolio construction.
//!
//! - **Allocation**: rank-weighted curves normalized to exactly 100%
//! - **Types**: [`Holding`] and [`Portfolio`]

pub mod allocation;
pub mod types;

pub use allocation::{allocate, base_curve, weights};
pub use types::{Holding, Portfolio};
