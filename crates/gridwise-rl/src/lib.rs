//! Visibility and heat fields on top of [`gridwise_paths`] graphs.
//!
//! - [`Fov`]: recursive symmetric shadow casting with an optional accumulation mode.
//! - [`Heatmap`]: scalar heat spread from sources along weighted graph
//!   edges, for gradient-following movement.

pub mod fov;
pub mod heatmap;

pub use fov::{Fov, FovConfig};
pub use heatmap::{Decay, HeatSource, Heatmap, HeatmapConfig};
