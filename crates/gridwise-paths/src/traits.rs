use gridwise_core::{Point, Range};

/// A directed, weighted edge produced during adjacency enumeration.
///
/// Edges are transient: graphs compute them on demand and never store them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: Point,
    pub to: Point,
    pub weight: f32,
}

/// An implicit graph over lattice cells.
///
/// Everything in this crate (and the field-of-view and heatmap code built on
/// it) consumes graphs through this trait.
pub trait Graph {
    /// Iterator over the outgoing edges of one vertex.
    type Edges<'g>: Iterator<Item = Edge>
    where
        Self: 'g;

    /// Bounds of the graph. Every vertex lies inside this range.
    fn range(&self) -> Range;

    /// Whether `p` is out of bounds or impassable.
    fn is_blocked(&self, p: Point) -> bool;

    /// Outgoing edges of `p`. Blocked vertices have none.
    fn adjacent(&self, p: Point) -> Self::Edges<'_>;

    #[inline]
    fn is_walkable(&self, p: Point) -> bool {
        !self.is_blocked(p)
    }
}
