//! Pathfinding over implicit grid graphs.
//!
//! - [`GridGraph`]: a grid whose edges are computed on demand from a
//!   [`Lattice`], a blocked predicate, a weight function and a
//!   [`DiagonalWeight`].
//! - [`Pathfinder`]: reusable A* search ([`Pathfinder::find_path`]), the
//!   multi-target variants in [`targets`] and breadth-first
//!   [`reachable`](Pathfinder::reachable) queries.
//! - [`IndexedMinQueue`]: the decrease-key priority queue behind the search.
//!
//! Everything downstream consumes graphs through the [`Graph`] trait, so
//! hand-written graphs work with the pathfinder, field of view and heatmap
//! alike.
//!
//! ```ignore
//! use gridwise_paths::{GridGraph, Pathfinder, distance};
//!
//! let graph = GridGraph::bounded(10, 10).with_diagonal_weight(1.0)?;
//! let mut pf = Pathfinder::new().with_heuristic(distance::chebyshev);
//! let path = pf.find_path(&graph, (0, 0).into(), (4, 4).into())?;
//! assert_eq!(path.len(), 5);
//! ```

mod astar;
mod diagonal;
pub mod distance;
mod error;
mod graph;
mod lattice;
mod path;
mod pathfinder;
mod queue;
mod reach;
pub mod targets;
mod traits;

pub use diagonal::DiagonalWeight;
pub use distance::Heuristic;
pub use error::PathError;
pub use graph::{Adjacent, GridGraph};
pub use lattice::{CellGrid, Lattice};
pub use path::Path;
pub use pathfinder::Pathfinder;
pub use queue::IndexedMinQueue;
pub use reach::ReachLimit;
pub use targets::{Target, TargetPath};
pub use traits::{Edge, Graph};
