//! **gridwise-core** — foundational types for grid-based spatial reasoning.
//!
//! This crate provides the lattice geometry shared by the rest of the
//! *gridwise* workspace ([`Point`], [`Range`]), obstacle [`Shape`]s with
//! symmetric overlap predicates, and [`SpatialIndex`], a broad-phase uniform
//! grid that answers "does this shape overlap anything" by cell.

pub mod error;
pub mod geom;
pub mod shape;
pub mod spatial;

pub use error::SpatialError;
pub use geom::{Point, Range, RangeIter};
pub use glam::Vec2;
pub use shape::{Bounds, Circle, Rect, Shape, ShapeKind};
pub use spatial::{IndexConfig, ObstacleId, ObstacleMut, SpatialIndex};
